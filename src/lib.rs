//! # NYT Article Search
//!
//! Query the New York Times Article Search API page by page, stay inside the
//! noncommercial rate limits, and scrape the story body of every result from
//! the article's own web page.
//!
//! ## Pipeline
//!
//! 1. **Pacing**: at most `requests_per_second` search calls per second and at
//!    most `max_pages_per_run` pages per run
//! 2. **Search**: one API call per page (ten documents each)
//! 3. **Parsing**: headline, url and publication date of every document
//! 4. **Scraping**: story paragraphs from each article page, concatenated
//!
//! Failed pages and articles are logged and skipped; see
//! [`SearchReport::failures`].
//!
//! ## Usage
//!
//! ```no_run
//! use nyt_article_search::{ArticleSearch, ScraperConfig, SearchQuery};
//!
//! # async fn run() -> Result<(), nyt_article_search::ScrapeError> {
//! let search = ArticleSearch::new(ScraperConfig::default())?;
//! let report = search
//!     .search(&SearchQuery::new("YOUR_API_KEY", "climate").pages(3))
//!     .await?;
//! for article in &report.articles {
//!     println!("{} {} {}", article.headline, article.url, article.publication_date);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Terms of use
//!
//! API content must link back to the original NYTIMES.COM page wherever it is
//! shown, must not be altered in meaning, and must not be cached or archived
//! for more than 24 hours after use. This crate never stores what it fetches;
//! [`Article::is_expired`] helps callers that do hold results to drop them in
//! time.

pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod request;
pub mod response;
pub mod scrapers;
pub mod utils;

pub use config::{MalformedPolicy, PacingMode, ScraperConfig};
pub use error::ScrapeError;
pub use fetch::{Fetch, HttpFetcher};
pub use models::{Article, Document, Failure, FailureStage, SearchReport};
pub use pipeline::ArticleSearch;
pub use request::{SearchQuery, SearchRequest};
pub use scrapers::StorySelector;
