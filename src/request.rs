//! Search request construction.
//!
//! [`SearchQuery`] describes a whole run (query, page count, date bounds);
//! [`SearchRequest`] is one page of it, rendered to a URL on demand. Query
//! parameters are always emitted in the same order so URLs are stable:
//!
//! ```text
//! <endpoint>?api-key=..&q=..&page=..[&fl=..][&begin_date=YYYYMMDD][&end_date=YYYYMMDD]
//! ```

use chrono::NaiveDate;
use std::fmt;

/// Date format the search API expects for `begin_date` and `end_date`.
pub const API_DATE_FORMAT: &str = "%Y%m%d";

/// Render a date as the API's 8-digit `YYYYMMDD` form.
pub fn format_api_date(date: NaiveDate) -> String {
    date.format(API_DATE_FORMAT).to_string()
}

/// One page of a search, as sent to the API.
///
/// The query text is passed through untouched; an empty query is sent as
/// `q=` and left for the API to reject.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchRequest {
    api_key: String,
    query: String,
    page: u32,
    begin_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    fields: Option<String>,
}

impl SearchRequest {
    /// Create a request for one page with no date bounds or field list.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Developer key sent as `api-key`
    /// * `query` - Search terms sent as `q`, unvalidated
    /// * `page` - Zero-based page index; each page holds ten documents
    pub fn new(api_key: impl Into<String>, query: impl Into<String>, page: u32) -> Self {
        Self {
            api_key: api_key.into(),
            query: query.into(),
            page,
            begin_date: None,
            end_date: None,
            fields: None,
        }
    }

    /// Lower publication-date bound, sent as `begin_date=YYYYMMDD`.
    pub fn with_begin_date(mut self, date: Option<NaiveDate>) -> Self {
        self.begin_date = date;
        self
    }

    /// Upper publication-date bound, sent as `end_date=YYYYMMDD`.
    pub fn with_end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    /// Comma-separated field list, sent as `fl`. `None` omits it.
    pub fn with_fields(mut self, fields: Option<String>) -> Self {
        self.fields = fields;
        self
    }

    /// The search terms, as given.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Zero-based page index.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Query parameters in wire order, values not yet encoded.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("api-key", self.api_key.clone()),
            ("q", self.query.clone()),
            ("page", self.page.to_string()),
        ];
        if let Some(fields) = &self.fields {
            params.push(("fl", fields.clone()));
        }
        if let Some(date) = self.begin_date {
            params.push(("begin_date", format_api_date(date)));
        }
        if let Some(date) = self.end_date {
            params.push(("end_date", format_api_date(date)));
        }
        params
    }

    /// Full request URL against `endpoint`.
    pub fn url(&self, endpoint: &str) -> String {
        let query = self
            .params()
            .into_iter()
            .map(|(key, value)| format!("{key}={}", urlencoding::encode(&value)))
            .collect::<Vec<_>>()
            .join("&");
        format!("{endpoint}?{query}")
    }
}

impl fmt::Debug for SearchRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchRequest")
            .field("api_key", &"<redacted>")
            .field("query", &self.query)
            .field("page", &self.page)
            .field("begin_date", &self.begin_date)
            .field("end_date", &self.end_date)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Everything needed to run a multi-page search.
///
/// ```ignore
/// let query = SearchQuery::new(api_key, "election")
///     .pages(3)
///     .begin_date(NaiveDate::from_ymd_opt(2016, 11, 1));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub api_key: String,
    pub query: String,
    /// Pages to fetch; one page holds ten documents.
    pub num_pages: u32,
    pub begin_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// `fl` override; `None` falls back to the configured default.
    pub fields: Option<String>,
}

impl SearchQuery {
    /// A one-page search for `query` with no date bounds.
    pub fn new(api_key: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            query: query.into(),
            num_pages: 1,
            begin_date: None,
            end_date: None,
            fields: None,
        }
    }

    /// Number of pages to request. Values above the configured per-run
    /// quota are clamped when the search runs.
    pub fn pages(mut self, num_pages: u32) -> Self {
        self.num_pages = num_pages;
        self
    }

    /// Only return articles published on or after `date`.
    pub fn begin_date(mut self, date: Option<NaiveDate>) -> Self {
        self.begin_date = date;
        self
    }

    /// Only return articles published on or before `date`.
    pub fn end_date(mut self, date: Option<NaiveDate>) -> Self {
        self.end_date = date;
        self
    }

    /// Override the configured `fl` field list for this query.
    pub fn fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    /// Request for `page`, using `default_fields` when no override is set.
    pub fn request_for_page(&self, page: u32, default_fields: Option<&str>) -> SearchRequest {
        let fields = self
            .fields
            .clone()
            .or_else(|| default_fields.map(str::to_string));
        SearchRequest::new(self.api_key.clone(), self.query.clone(), page)
            .with_fields(fields)
            .with_begin_date(self.begin_date)
            .with_end_date(self.end_date)
    }
}

impl fmt::Debug for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchQuery")
            .field("api_key", &"<redacted>")
            .field("query", &self.query)
            .field("num_pages", &self.num_pages)
            .field("begin_date", &self.begin_date)
            .field("end_date", &self.end_date)
            .field("fields", &self.fields)
            .finish()
    }
}
