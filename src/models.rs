//! Data models for search results, scraped articles and run reports.
//!
//! - [`Document`]: one article's metadata as returned by the search API
//! - [`Article`]: a document joined with the story body scraped from its page
//! - [`SearchReport`]: everything one run produced, including skipped work
//!
//! # Retention
//!
//! The API terms forbid caching or archiving API content for more than 24
//! hours after use. Each [`Article`] carries the instant it was fetched so
//! callers that keep results around can drop them on time with
//! [`Article::is_expired`].

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How long scraped content may be kept after it was fetched.
pub const RETENTION_WINDOW_HOURS: i64 = 24;

/// Article metadata extracted from one search-API document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub headline: String,
    pub url: String,
    pub publication_date: NaiveDate,
}

/// A search result together with its story body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub headline: String,
    pub url: String,
    pub publication_date: NaiveDate,
    /// Concatenated story paragraphs; empty when the page had none.
    pub content: String,
    /// When the article page was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl Article {
    pub fn from_document(document: Document, content: String, fetched_at: DateTime<Utc>) -> Self {
        Self {
            headline: document.headline,
            url: document.url,
            publication_date: document.publication_date,
            content,
            fetched_at,
        }
    }

    /// Last instant at which this article may still be held.
    pub fn retention_deadline(&self) -> DateTime<Utc> {
        self.fetched_at + Duration::hours(RETENTION_WINDOW_HOURS)
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.retention_deadline()
    }
}

/// Where in the pipeline a unit of work was dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum FailureStage {
    /// The search request for a page failed or returned an unusable body.
    SearchPage { page: u32 },
    /// One document in a page could not be read.
    Document { page: u32, index: usize },
    /// The article page could not be fetched.
    ArticlePage { page: u32, url: String },
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::SearchPage { page } => write!(f, "search page {page}"),
            FailureStage::Document { page, index } => write!(f, "document {index} of page {page}"),
            FailureStage::ArticlePage { page, url } => write!(f, "article {url} (page {page})"),
        }
    }
}

/// A skipped page, document or article and why it was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Failure {
    #[serde(flatten)]
    pub stage: FailureStage,
    pub message: String,
}

impl Failure {
    pub fn new(stage: FailureStage, error: &impl fmt::Display) -> Self {
        Self {
            stage,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.stage, self.message)
    }
}

/// Output of one search run.
///
/// `articles` is in page order, and within a page in API response order.
/// Anything that was skipped appears in `failures` instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub articles: Vec<Article>,
    pub failures: Vec<Failure>,
    /// Pages the caller asked for.
    pub pages_requested: u32,
    /// Pages actually requested from the API after applying the quota.
    pub pages_attempted: u32,
}

impl SearchReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Failures that cost a whole search page.
    pub fn failed_pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.failures.iter().filter_map(|f| match f.stage {
            FailureStage::SearchPage { page } => Some(page),
            _ => None,
        })
    }
}
