//! Article page scrapers.
//!
//! The search API returns metadata only, so each result's story body is read
//! from the article page itself.
//!
//! | Module | Method | Notes |
//! |--------|--------|-------|
//! | [`story`] | HTML scraping | Selector comes from configuration; no caching |
//!
//! Article pages are fetched one at a time. A page that cannot be fetched is
//! logged and skipped; it never ends the run.

pub mod story;

pub use story::{StorySelector, scrape_article};
