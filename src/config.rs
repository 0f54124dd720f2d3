//! Runtime configuration for the article search pipeline.
//!
//! All knobs that the pipeline consults live in [`ScraperConfig`]. Defaults
//! match the New York Times noncommercial terms (5 requests per second) with a
//! conservative per-run page quota of 100. Configuration can be built in code
//! or loaded from a YAML file; omitted keys fall back to their defaults.
//!
//! ```yaml
//! search_endpoint: https://api.nytimes.com/svc/search/v2/articlesearch.json
//! rate_limit:
//!   max_pages_per_run: 100
//!   requests_per_second: 5
//!   poll_interval_ms: 100
//!   mode: fixed_epoch
//! http:
//!   request_timeout_secs: 30
//!   connect_timeout_secs: 10
//! story_selector:
//!   label: nyt-story-body
//!   css: p.story-body-text.story-content
//! malformed_policy: abort
//! ```

use crate::error::ScrapeError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// Article Search API v2 endpoint.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.nytimes.com/svc/search/v2/articlesearch.json";

/// Field list requested when the caller does not name one.
pub const DEFAULT_FIELDS: &str = "headline,pub_date,web_url";

/// Paragraphs carrying both story-body classes.
pub const DEFAULT_STORY_CSS: &str = "p.story-body-text.story-content";

/// Top-level configuration passed into [`ArticleSearch`](crate::pipeline::ArticleSearch).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Search API endpoint, without query string.
    pub search_endpoint: String,
    pub rate_limit: RateLimitConfig,
    pub http: HttpConfig,
    pub story_selector: StorySelectorConfig,
    pub malformed_policy: MalformedPolicy,
    /// `fl` value sent when a query does not set its own field list.
    /// `None` omits the parameter.
    pub default_fields: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_endpoint: DEFAULT_SEARCH_ENDPOINT.to_string(),
            rate_limit: RateLimitConfig::default(),
            http: HttpConfig::default(),
            story_selector: StorySelectorConfig::default(),
            malformed_policy: MalformedPolicy::default(),
            default_fields: Some(DEFAULT_FIELDS.to_string()),
        }
    }
}

/// Page quota and request pacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Upper bound on search pages fetched in one run. Larger requests are
    /// truncated silently.
    pub max_pages_per_run: u32,
    /// Search requests allowed per one-second window.
    pub requests_per_second: u32,
    /// How often the pacer re-checks the clock while waiting.
    pub poll_interval_ms: u64,
    pub mode: PacingMode,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_pages_per_run: 100,
            requests_per_second: 5,
            poll_interval_ms: 100,
            mode: PacingMode::default(),
        }
    }
}

impl RateLimitConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// How the pacer measures its one-second window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// Every checkpoint compares against the time the run started. After the
    /// first second has passed no further waits occur.
    #[default]
    FixedEpoch,
    /// The window restarts after each checkpoint, so every group of
    /// `requests_per_second` requests spans at least one second.
    Rolling,
}

/// What to do with search results that do not have the expected shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// End the run with the first malformed document or response.
    #[default]
    Abort,
    /// Record the malformed item as a failure and keep going.
    Skip,
}

/// HTTP client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// The markup rule identifying story body text.
///
/// `label` names the rule revision so logs show which one produced a given
/// result when the target site changes its markup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySelectorConfig {
    pub label: String,
    pub css: String,
}

impl Default for StorySelectorConfig {
    fn default() -> Self {
        Self {
            label: "nyt-story-body".to_string(),
            css: DEFAULT_STORY_CSS.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Load and validate a YAML configuration file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScrapeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ScrapeError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&raw)?;
        debug!(?config, "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate YAML configuration text.
    pub fn from_yaml_str(raw: &str) -> Result<Self, ScrapeError> {
        let config: Self = serde_yaml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ScrapeError> {
        let endpoint = Url::parse(&self.search_endpoint).map_err(|e| {
            ScrapeError::Config(format!("search_endpoint `{}`: {e}", self.search_endpoint))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ScrapeError::Config(format!(
                "search_endpoint must be http(s), got `{}`",
                endpoint.scheme()
            )));
        }
        if self.rate_limit.requests_per_second == 0 {
            return Err(ScrapeError::Config(
                "rate_limit.requests_per_second must be at least 1".to_string(),
            ));
        }
        if self.rate_limit.poll_interval_ms == 0 {
            return Err(ScrapeError::Config(
                "rate_limit.poll_interval_ms must be at least 1".to_string(),
            ));
        }
        if self.http.request_timeout_secs == 0 {
            return Err(ScrapeError::Config(
                "http.request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.story_selector.css.trim().is_empty() {
            return Err(ScrapeError::Config("story_selector.css is empty".to_string()));
        }
        Ok(())
    }
}
