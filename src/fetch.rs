//! HTTP fetching behind a small trait.
//!
//! The pipeline only needs "GET this URL and give me the body text", so that
//! is all [`Fetch`] asks for. [`HttpFetcher`] implements it with `reqwest`;
//! tests implement it with canned bodies and failures.

use crate::config::HttpConfig;
use crate::error::ScrapeError;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Async GET of a URL's body text.
pub trait Fetch {
    /// Fetch `url` and return its body.
    ///
    /// Implementations report connection problems as
    /// [`ScrapeError::Transport`] and non-2xx answers as
    /// [`ScrapeError::HttpStatus`].
    async fn get_text(&self, url: &str) -> Result<String, ScrapeError>;
}

/// [`Fetch`] over a shared `reqwest` client with explicit timeouts.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher with the configured user agent and timeouts.
    ///
    /// # Returns
    ///
    /// The fetcher, or [`ScrapeError::Client`] if the TLS backend cannot be
    /// initialised.
    pub fn new(config: &HttpConfig) -> Result<Self, ScrapeError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }

    /// Wrap a `reqwest` client the caller already configured, e.g. one with
    /// a proxy. Its own timeouts apply.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl Fetch for HttpFetcher {
    // Only the host is recorded; search URLs carry the api key.
    #[instrument(level = "debug", skip_all, fields(host = %host_of(url)))]
    async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ScrapeError::transport(redact(url), e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Non-success HTTP status");
            return Err(ScrapeError::HttpStatus {
                url: redact(url),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::transport(redact(url), e))?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched"
        );
        Ok(body)
    }
}

fn host_of(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// Strip the `api-key` parameter so URLs can go into errors and logs.
pub fn redact(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };
    if parsed.query().is_none() {
        return url.to_string();
    }
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            if k == "api-key" {
                (k.into_owned(), "REDACTED".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
    parsed.to_string()
}
