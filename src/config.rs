//! Configuration for the directory client

use std::time::Duration;
use url::Url;

use crate::error::{Error, Result};

/// Connection settings for the Supabase project backing the live store
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: Url,

    /// Anonymous API key
    pub anon_key: String,
}

impl DirectoryConfig {
    /// Create a new configuration, validating the URL and key
    pub fn new(url_str: &str, anon_key: &str) -> Result<Self> {
        let url = Url::parse(url_str)?;
        if anon_key.trim().is_empty() {
            return Err(Error::config("anon_key cannot be empty"));
        }
        Ok(Self {
            url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Read `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment
    pub fn from_env() -> Result<Self> {
        let url_str = std::env::var("SUPABASE_URL")
            .map_err(|_| Error::config("SUPABASE_URL environment variable not found"))?;
        let anon_key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| Error::config("SUPABASE_ANON_KEY environment variable not found"))?;
        Self::new(&url_str, &anon_key)
    }

    /// Project URL without a trailing slash
    pub fn base_url(&self) -> String {
        self.url.as_str().trim_end_matches('/').to_string()
    }
}

/// Options controlling how the live store is queried
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The database schema
    pub db_schema: String,

    /// Table holding business rows
    pub businesses_table: String,

    /// Relation embedded for structured photos
    pub photos_relation: String,

    /// Only return rows with `verified = true`
    pub verified_only: bool,

    /// Row cap for free-text searches
    pub search_limit: usize,

    /// Request timeout; `None` keeps the HTTP client default
    pub request_timeout: Option<Duration>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            db_schema: "public".to_string(),
            businesses_table: "businesses".to_string(),
            photos_relation: "business_photos".to_string(),
            verified_only: true,
            search_limit: 20,
            request_timeout: None,
        }
    }
}

impl ClientOptions {
    /// Set the database schema
    pub fn with_db_schema(mut self, value: &str) -> Self {
        self.db_schema = value.to_string();
        self
    }

    /// Set the businesses table name
    pub fn with_businesses_table(mut self, value: &str) -> Self {
        self.businesses_table = value.to_string();
        self
    }

    /// Set the embedded photo relation name
    pub fn with_photos_relation(mut self, value: &str) -> Self {
        self.photos_relation = value.to_string();
        self
    }

    /// Set whether unverified rows are filtered out
    pub fn with_verified_only(mut self, value: bool) -> Self {
        self.verified_only = value;
        self
    }

    /// Set the search row cap
    pub fn with_search_limit(mut self, value: usize) -> Self {
        self.search_limit = value;
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// `select` expression embedding the photo relation as `business_photos`
    pub(crate) fn select_columns(&self) -> String {
        if self.photos_relation == "business_photos" {
            "*,business_photos(*)".to_string()
        } else {
            format!("*,business_photos:{}(*)", self.photos_relation)
        }
    }
}
