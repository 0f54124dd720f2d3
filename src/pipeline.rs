//! Search-then-scrape orchestration.
//!
//! [`ArticleSearch::search`] walks the requested pages in order:
//!
//! 1. **Pacing**: wait at every multiple of the per-second cap ([`Pacer`])
//! 2. **Search**: build the page request and fetch it
//! 3. **Parsing**: pull headline, url and publication date out of each document
//! 4. **Scraping**: fetch each article page and extract its story body
//!
//! Failed search pages and article pages are logged, recorded in
//! [`SearchReport::failures`] and skipped. Malformed API data ends the run
//! unless the configuration selects [`MalformedPolicy::Skip`].

use crate::config::{MalformedPolicy, ScraperConfig};
use crate::error::ScrapeError;
use crate::fetch::{Fetch, HttpFetcher};
use crate::models::{Article, Document, Failure, FailureStage, SearchReport};
use crate::pacing::{Pacer, capped_pages};
use crate::request::SearchQuery;
use crate::response::{decode_body, parse_response, parse_response_lenient};
use crate::scrapers::{StorySelector, scrape_article};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// A configured search client.
#[derive(Debug)]
pub struct ArticleSearch<F = HttpFetcher> {
    config: ScraperConfig,
    fetcher: F,
    selector: StorySelector,
}

impl ArticleSearch<HttpFetcher> {
    /// Build a client that talks HTTP with the configured timeouts.
    pub fn new(config: ScraperConfig) -> Result<Self, ScrapeError> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Self::with_fetcher(config, fetcher)
    }
}

impl<F: Fetch> ArticleSearch<F> {
    /// Build a client over any [`Fetch`] implementation.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, pacing, selector and malformed-data policy
    /// * `fetcher` - Used for both search pages and article pages
    ///
    /// # Returns
    ///
    /// The client, or an error if `config` fails validation or its story
    /// selector is not valid CSS.
    pub fn with_fetcher(config: ScraperConfig, fetcher: F) -> Result<Self, ScrapeError> {
        config.validate()?;
        let selector = StorySelector::from_config(&config.story_selector)?;
        Ok(Self {
            config,
            fetcher,
            selector,
        })
    }

    /// The validated configuration this client runs with.
    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Run `query` to completion.
    ///
    /// Returns `Err` only for malformed API data under
    /// [`MalformedPolicy::Abort`]; every other failure is in the report.
    #[instrument(level = "info", skip_all, fields(query = %query.query, pages = query.num_pages))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchReport, ScrapeError> {
        let t0 = Instant::now();
        let limits = &self.config.rate_limit;
        let pages = capped_pages(query.num_pages, limits.max_pages_per_run);
        if pages < query.num_pages {
            info!(
                requested = query.num_pages,
                capped = pages,
                "Page count capped at per-run quota"
            );
        }

        let mut report = SearchReport {
            pages_requested: query.num_pages,
            pages_attempted: pages,
            ..Default::default()
        };

        let mut pacer = Pacer::start(limits);
        for page in 0..pages {
            pacer.pace(page).await;

            let documents = match self.fetch_page(query, page, &mut report).await? {
                Some(documents) => documents,
                None => continue,
            };
            let articles = self.scrape_page(page, documents, &mut report).await;
            info!(page, count = articles.len(), "Page complete");
            report.articles.extend(articles);
        }

        info!(
            articles = report.articles.len(),
            failures = report.failures.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Search complete"
        );
        Ok(report)
    }

    /// Fetch and parse one search page. `Ok(None)` means the page was skipped.
    async fn fetch_page(
        &self,
        query: &SearchQuery,
        page: u32,
        report: &mut SearchReport,
    ) -> Result<Option<Vec<Document>>, ScrapeError> {
        let request = query.request_for_page(page, self.config.default_fields.as_deref());
        let url = request.url(&self.config.search_endpoint);

        let body = match self.fetcher.get_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                error!(page, error = %e, "Search request failed; skipping page");
                report
                    .failures
                    .push(Failure::new(FailureStage::SearchPage { page }, &e));
                return Ok(None);
            }
        };

        let parsed = decode_body(&body, page).and_then(|content| match self.config.malformed_policy {
            MalformedPolicy::Abort => parse_response(&content, page),
            MalformedPolicy::Skip => {
                let (documents, errors) = parse_response_lenient(&content, page)?;
                for e in errors {
                    warn!(page, error = %e, "Skipping malformed document");
                    let stage = match e {
                        ScrapeError::MalformedDocument { index, .. } => {
                            FailureStage::Document { page, index }
                        }
                        _ => FailureStage::SearchPage { page },
                    };
                    report.failures.push(Failure::new(stage, &e));
                }
                Ok(documents)
            }
        });

        match parsed {
            Ok(documents) => Ok(Some(documents)),
            Err(e) if self.config.malformed_policy == MalformedPolicy::Skip => {
                warn!(page, error = %e, "Skipping malformed search page");
                report
                    .failures
                    .push(Failure::new(FailureStage::SearchPage { page }, &e));
                Ok(None)
            }
            Err(e) => {
                error!(page, error = %e, "Malformed search response; aborting run");
                Err(e)
            }
        }
    }

    /// Scrape each document's article page in response order.
    async fn scrape_page(
        &self,
        page: u32,
        documents: Vec<Document>,
        report: &mut SearchReport,
    ) -> Vec<Article> {
        // Each article is stamped as soon as its own page arrives.
        let scraped: Vec<(Document, Result<String, ScrapeError>, DateTime<Utc>)> =
            stream::iter(documents)
                .then(|document| async move {
                    let content =
                        scrape_article(&self.fetcher, &self.selector, &document.url).await;
                    (document, content, Utc::now())
                })
                .collect()
                .await;

        let mut articles = Vec::with_capacity(scraped.len());
        for (document, content, fetched_at) in scraped {
            match content {
                Ok(content) => articles.push(Article::from_document(document, content, fetched_at)),
                Err(e) => {
                    error!(page, url = %document.url, error = %e, "Article fetch failed; skipping article");
                    report.failures.push(Failure::new(
                        FailureStage::ArticlePage {
                            page,
                            url: document.url,
                        },
                        &e,
                    ));
                }
            }
        }
        articles
    }
}
