//! Request parameters and request construction.
//!
//! Every operation sends a single GET. The API key is resolved per call
//! (explicit override first, then the client key) and placed either in the
//! `apikey` query parameter or the `apikey` header, never both.

use reqwest::Request;

use crate::client::BankCodeClient;
use crate::error::{BankCodeError, Result};
use crate::masking::mask_url;

/// Largest page size the API accepts.
pub const MAX_LIMIT: i64 = 2000;

const APIKEY: &str = "apikey";

/// Parameters for single-record lookups (bank, branch, version).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetParameter {
    /// API key for this call only. Empty means "use the client key".
    pub api_key: Option<String>,
    /// Fields to return; everything when empty.
    pub fields: Vec<String>,
}

impl GetParameter {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API key for this call.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Restricts the response to the given fields.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

/// Parameters for paged listings (banks, branches of a bank).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParameter {
    /// API key for this call only. Empty means "use the client key".
    pub api_key: Option<String>,
    /// Server-side filter expression, sent verbatim.
    pub filter: Option<String>,
    /// Page size. Only values in `1..=2000` are sent; anything else leaves
    /// the server default in place.
    pub limit: Option<i64>,
    /// Opaque cursor from a previous page, sent verbatim.
    pub cursor: Option<String>,
    /// Fields to return; everything when empty.
    pub fields: Vec<String>,
}

impl ListParameter {
    /// Creates empty parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API key for this call.
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the filter expression.
    #[must_use]
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Sets the page size.
    #[must_use]
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the pagination cursor.
    #[must_use]
    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// Restricts the response to the given fields.
    #[must_use]
    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the limit that will actually be sent, if any.
    #[must_use]
    pub fn effective_limit(&self) -> Option<i64> {
        self.limit.filter(|limit| (1..=MAX_LIMIT).contains(limit))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

impl BankCodeClient {
    /// Builds the GET request for a single-record endpoint.
    ///
    /// `segments` are appended to the base URL path one by one and
    /// percent-encoded, so a code can never add a query or extra path level.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::InvalidUrl`] if the URL or request cannot be built.
    pub fn build_get_request(&self, segments: &[&str], params: &GetParameter) -> Result<Request> {
        let mut query = Vec::new();
        if !params.fields.is_empty() {
            query.push(("fields", params.fields.join(",")));
        }

        self.build_request(segments, params.api_key.as_deref(), query)
    }

    /// Builds the GET request for a paged listing endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`BankCodeError::InvalidUrl`] if the URL or request cannot be built.
    pub fn build_list_request(&self, segments: &[&str], params: &ListParameter) -> Result<Request> {
        let mut query = Vec::new();
        if let Some(filter) = non_empty(params.filter.as_deref()) {
            query.push(("filter", filter.to_string()));
        }
        if let Some(limit) = params.effective_limit() {
            query.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = non_empty(params.cursor.as_deref()) {
            query.push(("cursor", cursor.to_string()));
        }
        if !params.fields.is_empty() {
            query.push(("fields", params.fields.join(",")));
        }

        self.build_request(segments, params.api_key.as_deref(), query)
    }

    fn build_request(
        &self,
        segments: &[&str],
        api_key_override: Option<&str>,
        mut query: Vec<(&str, String)>,
    ) -> Result<Request> {
        let raw = format!(
            "{}/{}",
            self.base_url().as_str().trim_end_matches('/'),
            segments.join("/")
        );
        let invalid = |reason: &str| BankCodeError::InvalidUrl {
            url: mask_url(&raw),
            reason: reason.to_string(),
        };

        if let Some(segment) = segments
            .iter()
            .find(|s| s.is_empty() || **s == "." || **s == "..")
        {
            return Err(invalid(&format!("invalid path segment '{segment}'")));
        }

        let mut url = self.base_url().clone();
        url.path_segments_mut()
            .map_err(|()| invalid("base URL cannot have a path"))?
            .pop_if_empty()
            .extend(segments);

        let api_key = non_empty(api_key_override).or_else(|| self.config().api_key.as_deref());
        let api_key = non_empty(api_key);

        if let Some(key) = api_key
            && !self.config().key_in_header
        {
            query.insert(0, (APIKEY, key.to_string()));
        }
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        }

        let mut builder = self.http_client().get(url);
        if let Some(key) = api_key
            && self.config().key_in_header
        {
            builder = builder.header(APIKEY, key);
        }

        builder.build().map_err(|e| invalid(&e.to_string()))
    }
}
