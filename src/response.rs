//! Search API response parsing.
//!
//! Only three fields of each document are read: `headline.main`, `web_url`
//! and `pub_date`. Everything else in the response is ignored.
//!
//! A response whose `status` is not `"OK"` yields no documents and no error.
//! Documents that lack one of the three fields are reported as
//! [`ScrapeError::MalformedDocument`]; [`parse_response`] stops at the first
//! one while [`parse_response_lenient`] collects them and keeps the rest.

use crate::error::ScrapeError;
use crate::models::Document;
use crate::utils::truncate_for_log;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

/// `pub_date` date portion, e.g. `2020-01-02` from `2020-01-02T10:00:00Z`.
pub const PUB_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Deserialize)]
struct RawDocument {
    headline: RawHeadline,
    web_url: String,
    pub_date: String,
}

#[derive(Debug, Deserialize)]
struct RawHeadline {
    main: String,
}

/// Decode a response body into JSON.
pub fn decode_body(body: &str, page: u32) -> Result<Value, ScrapeError> {
    serde_json::from_str(body).map_err(|e| ScrapeError::MalformedResponse {
        page,
        reason: format!("{e}; body starts {:?}", truncate_for_log(body, 120)),
    })
}

/// Extract every document of a response, failing on the first malformed one.
pub fn parse_response(content: &Value, page: u32) -> Result<Vec<Document>, ScrapeError> {
    let Some(docs) = ok_docs(content, page)? else {
        return Ok(Vec::new());
    };
    docs.iter()
        .enumerate()
        .map(|(index, doc)| parse_document(doc, page, index))
        .collect()
}

/// Extract the well-formed documents of a response and return the errors for
/// the rest alongside them.
pub fn parse_response_lenient(
    content: &Value,
    page: u32,
) -> Result<(Vec<Document>, Vec<ScrapeError>), ScrapeError> {
    let Some(docs) = ok_docs(content, page)? else {
        return Ok((Vec::new(), Vec::new()));
    };
    let mut documents = Vec::with_capacity(docs.len());
    let mut errors = Vec::new();
    for (index, doc) in docs.iter().enumerate() {
        match parse_document(doc, page, index) {
            Ok(document) => documents.push(document),
            Err(e) => errors.push(e),
        }
    }
    Ok((documents, errors))
}

/// `Ok(None)` when the API reported a non-OK status.
fn ok_docs(content: &Value, page: u32) -> Result<Option<&Vec<Value>>, ScrapeError> {
    let status = content.get("status").and_then(Value::as_str);
    if status != Some("OK") {
        warn!(page, status = ?status, "Search API returned non-OK status; page yields no documents");
        return Ok(None);
    }
    let docs = content
        .pointer("/response/docs")
        .and_then(Value::as_array)
        .ok_or_else(|| ScrapeError::MalformedResponse {
            page,
            reason: "status OK but no `response.docs` list".to_string(),
        })?;
    debug!(page, count = docs.len(), "Search page documents");
    Ok(Some(docs))
}

/// Read one document.
pub fn parse_document(doc: &Value, page: u32, index: usize) -> Result<Document, ScrapeError> {
    let malformed = |reason: String| ScrapeError::MalformedDocument {
        page,
        index,
        reason,
    };
    let raw = RawDocument::deserialize(doc).map_err(|e| malformed(e.to_string()))?;
    let publication_date = parse_pub_date(&raw.pub_date).map_err(malformed)?;
    Ok(Document {
        headline: raw.headline.main,
        url: raw.web_url,
        publication_date,
    })
}

/// Parse the date portion (before `T`) of a `pub_date` timestamp.
pub fn parse_pub_date(pub_date: &str) -> Result<NaiveDate, String> {
    let date_part = pub_date.split('T').next().unwrap_or_default();
    NaiveDate::parse_from_str(date_part, PUB_DATE_FORMAT)
        .map_err(|e| format!("pub_date `{pub_date}`: {e}"))
}
