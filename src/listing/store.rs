//! Live record store backed by PostgREST

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tradesmen_postgrest::{PostgrestClient, SortOrder};

use crate::config::{ClientOptions, DirectoryConfig};
use crate::error::Result;

/// Remote collection of raw business rows.
///
/// Each method is one round trip. Rows come back unnormalized and in the
/// order the store ranked them.
#[async_trait]
pub trait LiveStore: Send + Sync {
    /// Rows whose `trade` and `city` equal the arguments exactly
    async fn businesses_by_trade_and_city(&self, trade: &str, city: &str) -> Result<Vec<Value>>;

    /// The row with the given id, if any
    async fn business_by_id(&self, id: &str) -> Result<Option<Value>>;

    /// Rows whose name or trade contains `term`
    async fn search_businesses(&self, term: &str, limit: usize) -> Result<Vec<Value>>;

    /// Verified rows, best rated first
    async fn verified_businesses(&self, limit: usize) -> Result<Vec<Value>>;
}

#[async_trait]
impl<T: LiveStore + ?Sized> LiveStore for Arc<T> {
    async fn businesses_by_trade_and_city(&self, trade: &str, city: &str) -> Result<Vec<Value>> {
        (**self).businesses_by_trade_and_city(trade, city).await
    }

    async fn business_by_id(&self, id: &str) -> Result<Option<Value>> {
        (**self).business_by_id(id).await
    }

    async fn search_businesses(&self, term: &str, limit: usize) -> Result<Vec<Value>> {
        (**self).search_businesses(term, limit).await
    }

    async fn verified_businesses(&self, limit: usize) -> Result<Vec<Value>> {
        (**self).verified_businesses(limit).await
    }
}

/// Strip characters PostgREST treats as syntax inside an `or=(...)` filter
pub fn sanitize_search_term(term: &str) -> String {
    term.chars()
        .filter(|c| !matches!(c, ',' | '(' | ')' | '*' | '"' | '\\' | '%'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// [`LiveStore`] over the Supabase `businesses` table
#[derive(Debug, Clone)]
pub struct PostgrestStore {
    base_url: String,
    api_key: String,
    http_client: Client,
    options: ClientOptions,
}

impl PostgrestStore {
    /// Create a store for the configured project
    pub fn new(config: &DirectoryConfig, options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        Ok(Self::with_client(
            &config.base_url(),
            &config.anon_key,
            http_client,
            options,
        ))
    }

    /// Create a store sharing an existing HTTP client
    pub fn with_client(
        base_url: &str,
        api_key: &str,
        http_client: Client,
        options: ClientOptions,
    ) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http_client,
            options,
        }
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Authenticated query on the businesses table with photos embedded
    fn businesses(&self) -> Result<PostgrestClient> {
        let query = PostgrestClient::new(
            &self.base_url,
            &self.api_key,
            &self.options.businesses_table,
            self.http_client.clone(),
        )
        .with_auth(&self.api_key)?
        .schema(&self.options.db_schema)?
        .select(&self.options.select_columns());
        Ok(query)
    }

    fn verified(&self, query: PostgrestClient) -> PostgrestClient {
        if self.options.verified_only {
            query.eq("verified", "true")
        } else {
            query
        }
    }

    fn ranked(query: PostgrestClient) -> PostgrestClient {
        query
            .order("rating", SortOrder::Descending)
            .order("review_count", SortOrder::Descending)
    }
}

#[async_trait]
impl LiveStore for PostgrestStore {
    async fn businesses_by_trade_and_city(&self, trade: &str, city: &str) -> Result<Vec<Value>> {
        let query = self.businesses()?.eq("trade", trade).eq("city", city);
        let rows = Self::ranked(self.verified(query)).execute::<Value>().await?;
        log::debug!("Live store returned {} rows for {}/{}", rows.len(), city, trade);
        Ok(rows)
    }

    async fn business_by_id(&self, id: &str) -> Result<Option<Value>> {
        let row = self.businesses()?.eq("id", id).execute_one::<Value>().await?;
        Ok(row)
    }

    async fn search_businesses(&self, term: &str, limit: usize) -> Result<Vec<Value>> {
        let term = sanitize_search_term(term);
        if term.is_empty() {
            return Ok(Vec::new());
        }

        let name_filter = format!("name.ilike.*{}*", term);
        let trade_filter = format!("trade.ilike.*{}*", term);
        let query = self
            .businesses()?
            .or(&[name_filter.as_str(), trade_filter.as_str()])
            .order("rating", SortOrder::Descending)
            .limit(limit);
        let rows = self.verified(query).execute::<Value>().await?;
        Ok(rows)
    }

    async fn verified_businesses(&self, limit: usize) -> Result<Vec<Value>> {
        let query = self
            .verified(self.businesses()?)
            .order("rating", SortOrder::Descending)
            .limit(limit);
        let rows = query.execute::<Value>().await?;
        Ok(rows)
    }
}
