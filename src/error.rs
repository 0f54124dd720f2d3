//! Error types for the search and scrape pipeline.
//!
//! Every failure the crate can produce is a [`ScrapeError`]. The variants are
//! split into two classes, reported by [`ScrapeError::is_recoverable`]:
//!
//! | Class | Variants | Pipeline reaction |
//! |-------|----------|-------------------|
//! | Recoverable | [`Transport`](ScrapeError::Transport), [`HttpStatus`](ScrapeError::HttpStatus) | Skip the page or article, record a failure, continue |
//! | Policy-dependent | [`MalformedResponse`](ScrapeError::MalformedResponse), [`MalformedDocument`](ScrapeError::MalformedDocument) | Abort the run, or skip under [`MalformedPolicy::Skip`](crate::config::MalformedPolicy::Skip) |
//! | Fatal | everything else | Returned before any request is issued |

use std::error::Error as StdError;
use std::path::PathBuf;

/// Boxed transport error source, so both `reqwest` and test doubles fit.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors produced while configuring or running an article search.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    /// The request never produced a response (DNS, connect, timeout, body read).
    /// `url` has its api key redacted.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The server answered with a non-success status code.
    #[error("{url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    /// The search response body could not be interpreted at all.
    #[error("malformed search response for page {page}: {reason}")]
    MalformedResponse { page: u32, reason: String },

    /// One document inside an otherwise valid search response is missing a
    /// required field or carries an unparsable date.
    #[error("malformed document {index} on page {page}: {reason}")]
    MalformedDocument {
        page: u32,
        index: usize,
        reason: String,
    },

    #[error("invalid story selector `{css}`: {reason}")]
    InvalidSelector { css: String, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to read config file {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ScrapeError {
    /// Wrap any transport-level failure for `url`.
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Whether the pipeline may skip the affected unit of work and continue.
    ///
    /// Malformed responses and documents report `false` here; whether they end
    /// the run is decided by the configured
    /// [`MalformedPolicy`](crate::config::MalformedPolicy).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::HttpStatus { .. })
    }

    /// Whether this error describes bad data from the search API.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Self::MalformedResponse { .. } | Self::MalformedDocument { .. }
        )
    }
}
