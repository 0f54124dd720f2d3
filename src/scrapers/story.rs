//! Story body extraction from article pages.
//!
//! The body of an article is every element matching the configured
//! [`StorySelector`], concatenated in document order with nothing inserted
//! between fragments. A page without matches has an empty body.

use crate::config::StorySelectorConfig;
use crate::error::ScrapeError;
use crate::fetch::Fetch;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};

/// Compiled CSS rule for story paragraphs, with the label it was configured
/// under.
#[derive(Debug, Clone)]
pub struct StorySelector {
    label: String,
    css: String,
    selector: Selector,
}

impl StorySelector {
    pub fn new(label: impl Into<String>, css: &str) -> Result<Self, ScrapeError> {
        let selector = Selector::parse(css).map_err(|e| ScrapeError::InvalidSelector {
            css: css.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            label: label.into(),
            css: css.to_string(),
            selector,
        })
    }

    pub fn from_config(config: &StorySelectorConfig) -> Result<Self, ScrapeError> {
        Self::new(config.label.clone(), &config.css)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    /// Concatenated text of all matching elements.
    pub fn extract(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        let mut body = String::new();
        let mut matched = 0usize;
        for element in document.select(&self.selector) {
            body.extend(element.text());
            matched += 1;
        }
        debug!(selector = %self.label, matched, bytes = body.len(), "Extracted story body");
        body
    }
}

/// Fetch an article page and extract its story body.
#[instrument(level = "info", skip_all, fields(%url, selector = %selector.label()))]
pub async fn scrape_article<F: Fetch>(
    fetcher: &F,
    selector: &StorySelector,
    url: &str,
) -> Result<String, ScrapeError> {
    let html = fetcher.get_text(url).await?;
    let content = selector.extract(&html);
    if content.is_empty() {
        info!("No story paragraphs matched");
    }
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_STORY_CSS;
    use std::collections::HashMap;

    struct PageFetcher(HashMap<&'static str, &'static str>);

    impl Fetch for PageFetcher {
        async fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
            match self.0.get(url) {
                Some(body) => Ok(body.to_string()),
                None => Err(ScrapeError::HttpStatus {
                    url: url.to_string(),
                    status: 404,
                }),
            }
        }
    }

    fn default_selector() -> StorySelector {
        StorySelector::new("nyt-story-body", DEFAULT_STORY_CSS).unwrap()
    }

    #[test]
    fn test_concatenates_without_separator() {
        let html = r#"<html><body>
            <p class="story-body-text story-content">Hello </p>
            <p class="other">skipped</p>
            <p class="story-body-text story-content">world.</p>
        </body></html>"#;
        assert_eq!(default_selector().extract(html), "Hello world.");
    }

    #[test]
    fn test_no_matches_is_empty() {
        let html = r#"<html><body><p class="story-body-text">only one class</p></body></html>"#;
        assert_eq!(default_selector().extract(html), "");
        assert_eq!(default_selector().extract(""), "");
    }

    #[test]
    fn test_nested_markup_text_is_kept() {
        let html = r#"<p class="story-content story-body-text">A <a href="/x">link</a> and <em>emphasis</em>.</p>"#;
        assert_eq!(default_selector().extract(html), "A link and emphasis.");
    }

    #[test]
    fn test_custom_selector() {
        let selector = StorySelector::new("section-rule", "section[name=articleBody] p").unwrap();
        let html = r#"<section name="articleBody"><p>One. </p><p>Two.</p></section><p>Outside.</p>"#;
        assert_eq!(selector.extract(html), "One. Two.");
        assert_eq!(selector.label(), "section-rule");
        assert_eq!(selector.css(), "section[name=articleBody] p");
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let err = StorySelector::new("broken", "p[[").unwrap_err();
        assert!(matches!(err, ScrapeError::InvalidSelector { .. }));
    }

    #[tokio::test]
    async fn test_scrape_article_fetches_and_extracts() {
        let fetcher = PageFetcher(HashMap::from([(
            "http://x/a",
            r#"<p class="story-body-text story-content">Body.</p>"#,
        )]));
        let selector = default_selector();
        assert_eq!(
            scrape_article(&fetcher, &selector, "http://x/a").await.unwrap(),
            "Body."
        );
        let err = scrape_article(&fetcher, &selector, "http://x/missing")
            .await
            .unwrap_err();
        assert!(err.is_recoverable());
    }
}
