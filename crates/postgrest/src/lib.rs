//! Read-side PostgREST client for the Emergency Tradesmen directory
//!
//! This crate issues `GET` queries against a Supabase PostgREST endpoint and
//! decodes the JSON rows. It covers what the listing resolver needs:
//!
//! - Column selection, including embedded relations (`*,business_photos(*)`)
//! - Filtering (`eq`, and `or` over `ilike` expressions)
//! - Multi-column ordering and `limit`
//! - Non-public schema selection
//! - Typed API errors

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use url::Url;

/// Error body returned by PostgREST on a failed request
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PostgrestApiErrorDetails {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl fmt::Display for PostgrestApiErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(code) = &self.code {
            parts.push(format!("Code: {}", code));
        }
        if let Some(message) = &self.message {
            parts.push(format!("Message: {}", message));
        }
        if let Some(details) = &self.details {
            parts.push(format!("Details: {}", details));
        }
        if let Some(hint) = &self.hint {
            parts.push(format!("Hint: {}", hint));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// Errors raised while building or executing a query
#[derive(Error, Debug)]
pub enum PostgrestError {
    #[error("API error: {details} (Status: {status})")]
    ApiError {
        details: PostgrestApiErrorDetails,
        status: reqwest::StatusCode,
    },

    #[error("API error (unparsed): {message} (Status: {status})")]
    UnparsedApiError {
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        }
    }
}

/// PostgREST query against a single table
#[derive(Debug, Clone)]
pub struct PostgrestClient {
    base_url: String,
    table: String,
    http_client: Client,
    headers: HeaderMap,
    query_params: HashMap<String, String>,
}

impl PostgrestClient {
    /// Create a query for `table` under `{base_url}/rest/v1`
    pub fn new(base_url: &str, api_key: &str, table: &str, http_client: Client) -> Self {
        let mut headers = HeaderMap::new();
        match HeaderValue::from_str(api_key) {
            Ok(value) => {
                headers.insert("apikey", value);
            }
            Err(_) => log::warn!("API key is not a valid header value; requests will be anonymous"),
        }

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            table: table.to_string(),
            http_client,
            headers,
            query_params: HashMap::new(),
        }
    }

    /// Add a request header
    pub fn with_header(mut self, key: &str, value: &str) -> Result<Self, PostgrestError> {
        let header_value = HeaderValue::from_str(value).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid header value: {}", value))
        })?;

        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid header name: {}", key))
        })?;

        self.headers.insert(header_name, header_value);
        Ok(self)
    }

    /// Send `token` as a bearer credential
    pub fn with_auth(self, token: &str) -> Result<Self, PostgrestError> {
        self.with_header("Authorization", &format!("Bearer {}", token))
    }

    /// Columns to return; relations are embedded with `relation(columns)`
    pub fn select(mut self, columns: &str) -> Self {
        self.query_params
            .insert("select".to_string(), columns.to_string());
        self
    }

    /// Equality filter
    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.query_params
            .insert(column.to_string(), format!("eq.{}", value));
        self
    }

    /// Disjunction of filter expressions such as `name.ilike.*x*`
    pub fn or(mut self, filters: &[&str]) -> Self {
        self.query_params
            .insert("or".to_string(), format!("({})", filters.join(",")));
        self
    }

    /// Order by `column`. Repeated calls add secondary sort keys.
    pub fn order(mut self, column: &str, order: SortOrder) -> Self {
        let term = format!("{}.{}", column, order.as_str());
        self.query_params
            .entry("order".to_string())
            .and_modify(|existing| {
                existing.push(',');
                existing.push_str(&term);
            })
            .or_insert(term);
        self
    }

    /// Cap the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.query_params
            .insert("limit".to_string(), count.to_string());
        self
    }

    /// Read from a schema other than `public`
    pub fn schema(mut self, schema_name: &str) -> Result<Self, PostgrestError> {
        if schema_name == "public" {
            return Ok(self);
        }
        let value = HeaderValue::from_str(schema_name).map_err(|_| {
            PostgrestError::InvalidParameters(format!("Invalid schema name: {}", schema_name))
        })?;
        self.headers
            .insert(HeaderName::from_static("accept-profile"), value);
        Ok(self)
    }

    /// Run the query and decode every row
    pub async fn execute<T: for<'de> Deserialize<'de>>(&self) -> Result<Vec<T>, PostgrestError> {
        let url = self.build_url()?;
        log::debug!("GET {}", url);

        let response = self
            .http_client
            .get(&url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(PostgrestError::NetworkError)?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            if let Ok(details) = serde_json::from_str::<PostgrestApiErrorDetails>(&error_text) {
                return Err(PostgrestError::ApiError { details, status });
            }
            return Err(PostgrestError::UnparsedApiError {
                message: error_text,
                status,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| PostgrestError::DeserializationError(e.to_string()))
    }

    /// Run the query with `limit=1` and return the first row, if any
    pub async fn execute_one<T: for<'de> Deserialize<'de>>(
        self,
    ) -> Result<Option<T>, PostgrestError> {
        let rows = self.limit(1).execute::<T>().await?;
        Ok(rows.into_iter().next())
    }

    fn build_url(&self) -> Result<String, PostgrestError> {
        let mut url = Url::parse(&format!("{}/rest/v1/{}", self.base_url, self.table))?;

        // Sorted so the request line is stable across runs.
        let mut params: Vec<_> = self.query_params.iter().collect();
        params.sort();
        for (key, value) in params {
            url.query_pairs_mut().append_pair(key, value);
        }

        Ok(url.to_string())
    }
}
