//! End-to-end runs against a local mock of the search API and article pages.

use mockito::{Matcher, Mock, Server, ServerGuard};
use nyt_article_search::{
    ArticleSearch, FailureStage, MalformedPolicy, ScrapeError, ScraperConfig, SearchQuery,
};
use serde_json::json;

const SEARCH_PATH: &str = "/svc/search/v2/articlesearch.json";

fn config_for(server: &ServerGuard) -> ScraperConfig {
    ScraperConfig {
        search_endpoint: format!("{}{SEARCH_PATH}", server.url()),
        ..Default::default()
    }
}

fn search_body(server: &ServerGuard, page: u32, count: usize) -> String {
    let docs: Vec<_> = (0..count)
        .map(|i| {
            json!({
                "headline": {"main": format!("Headline {page}.{i}")},
                "web_url": format!("{}/articles/{page}/{i}", server.url()),
                "pub_date": format!("2017-03-{:02}T12:00:00+0000", i + 1),
                "snippet": "ignored",
            })
        })
        .collect();
    json!({"status": "OK", "copyright": "ignored", "response": {"docs": docs}}).to_string()
}

async fn mock_search_page(server: &mut ServerGuard, page: u32, body: String) -> Mock {
    server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("api-key".into(), "test-key".into()),
            Matcher::UrlEncoded("q".into(), "climate".into()),
            Matcher::UrlEncoded("page".into(), page.to_string()),
            Matcher::UrlEncoded("fl".into(), "headline,pub_date,web_url".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create_async()
        .await
}

async fn mock_articles(server: &mut ServerGuard, page: u32, count: usize) -> Vec<Mock> {
    let mut mocks = Vec::with_capacity(count);
    for i in 0..count {
        let html = format!(
            r#"<html><body>
                <h1>Headline {page}.{i}</h1>
                <p class="story-body-text story-content">First part {page}.{i}. </p>
                <div class="ad">advert</div>
                <p class="story-body-text story-content">Second part.</p>
            </body></html>"#
        );
        let mock = server
            .mock("GET", format!("/articles/{page}/{i}").as_str())
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(html)
            .create_async()
            .await;
        mocks.push(mock);
    }
    mocks
}

#[tokio::test]
async fn two_pages_with_second_failing_yield_first_page_only() {
    let mut server = Server::new_async().await;
    let body = search_body(&server, 0, 10);
    let page0 = mock_search_page(&mut server, 0, body).await;
    let _articles = mock_articles(&mut server, 0, 10).await;
    let page1 = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    let search = ArticleSearch::new(config_for(&server)).unwrap();
    let report = search
        .search(&SearchQuery::new("test-key", "climate").pages(2))
        .await
        .unwrap();

    page0.assert_async().await;
    page1.assert_async().await;

    assert_eq!(report.articles.len(), 10);
    assert_eq!(report.articles[0].headline, "Headline 0.0");
    assert_eq!(report.articles[0].content, "First part 0.0. Second part.");
    assert_eq!(report.articles[9].publication_date.to_string(), "2017-03-10");

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].stage, FailureStage::SearchPage { page: 1 });
    assert!(report.failures[0].message.contains("503"));
    assert!(!report.failures[0].message.contains("test-key"));
}

#[tokio::test]
async fn missing_article_page_is_skipped() {
    let mut server = Server::new_async().await;
    let body = search_body(&server, 0, 2);
    let _page0 = mock_search_page(&mut server, 0, body).await;
    let _first = server
        .mock("GET", "/articles/0/0")
        .with_status(200)
        .with_body(r#"<p class="story-body-text story-content">Only story.</p>"#)
        .create_async()
        .await;
    let _second = server
        .mock("GET", "/articles/0/1")
        .with_status(404)
        .create_async()
        .await;

    let search = ArticleSearch::new(config_for(&server)).unwrap();
    let report = search
        .search(&SearchQuery::new("test-key", "climate"))
        .await
        .unwrap();

    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].content, "Only story.");
    assert!(matches!(
        &report.failures[0].stage,
        FailureStage::ArticlePage { page: 0, url } if url.ends_with("/articles/0/1")
    ));
}

#[tokio::test]
async fn page_without_story_markup_has_empty_content() {
    let mut server = Server::new_async().await;
    let body = search_body(&server, 0, 1);
    let _page0 = mock_search_page(&mut server, 0, body).await;
    let _article = server
        .mock("GET", "/articles/0/0")
        .with_status(200)
        .with_body("<html><body><p>Redesigned page.</p></body></html>")
        .create_async()
        .await;

    let search = ArticleSearch::new(config_for(&server)).unwrap();
    let report = search
        .search(&SearchQuery::new("test-key", "climate"))
        .await
        .unwrap();

    assert_eq!(report.articles.len(), 1);
    assert_eq!(report.articles[0].content, "");
    assert!(report.is_complete());
}

#[tokio::test]
async fn malformed_document_policy() {
    let mut server = Server::new_async().await;
    let body = json!({"status": "OK", "response": {"docs": [
        {"headline": {"main": "No url"}, "pub_date": "2017-03-01T00:00:00Z"}
    ]}})
    .to_string();
    let _page0 = server
        .mock("GET", SEARCH_PATH)
        .match_query(Matcher::UrlEncoded("page".into(), "0".into()))
        .with_status(200)
        .with_body(body)
        .expect(2)
        .create_async()
        .await;

    let query = SearchQuery::new("test-key", "climate");

    let aborting = ArticleSearch::new(config_for(&server)).unwrap();
    let err = aborting.search(&query).await.unwrap_err();
    assert!(matches!(err, ScrapeError::MalformedDocument { page: 0, index: 0, .. }));

    let skipping = ArticleSearch::new(ScraperConfig {
        malformed_policy: MalformedPolicy::Skip,
        ..config_for(&server)
    })
    .unwrap();
    let report = skipping.search(&query).await.unwrap();
    assert!(report.articles.is_empty());
    assert_eq!(
        report.failures[0].stage,
        FailureStage::Document { page: 0, index: 0 }
    );
}
