//! Emergency Tradesmen directory client
//!
//! Resolves business listings for a city and trade. Curated listings bundled
//! with the crate take precedence; otherwise the project's Supabase
//! `businesses` table is queried through PostgREST. Every record, whichever
//! path produced it, goes through [`listing::normalize`] and comes out as a
//! fully-defaulted [`listing::BusinessRecord`].

pub mod config;
pub mod context;
pub mod error;
pub mod listing;

use reqwest::Client;
use tradesmen_postgrest::PostgrestClient;

use crate::config::{ClientOptions, DirectoryConfig};
use crate::error::Result;
use crate::listing::{ListingResolver, PostgrestStore, StaticListings};

/// The main entry point for the directory client
#[derive(Debug, Clone)]
pub struct Directory {
    /// Project connection settings
    pub config: DirectoryConfig,
    /// Query options
    pub options: ClientOptions,
    store: PostgrestStore,
    http_client: Client,
}

impl Directory {
    /// Create a new directory client
    ///
    /// # Arguments
    ///
    /// * `supabase_url` - The base URL for your Supabase project
    /// * `supabase_key` - The anonymous API key for your Supabase project
    ///
    /// # Example
    ///
    /// ```
    /// use tradesmen_directory::Directory;
    ///
    /// let directory = Directory::new("https://your-project-url.supabase.co", "your-anon-key").unwrap();
    /// ```
    pub fn new(supabase_url: &str, supabase_key: &str) -> Result<Self> {
        Self::new_with_options(supabase_url, supabase_key, ClientOptions::default())
    }

    /// Create a new directory client with custom options
    ///
    /// # Example
    ///
    /// ```
    /// use tradesmen_directory::{Directory, config::ClientOptions};
    ///
    /// let options = ClientOptions::default().with_verified_only(false);
    /// let directory = Directory::new_with_options(
    ///     "https://your-project-url.supabase.co",
    ///     "your-anon-key",
    ///     options,
    /// )
    /// .unwrap();
    /// ```
    pub fn new_with_options(
        supabase_url: &str,
        supabase_key: &str,
        options: ClientOptions,
    ) -> Result<Self> {
        Self::from_config(DirectoryConfig::new(supabase_url, supabase_key)?, options)
    }

    /// Create a client from `SUPABASE_URL` and `SUPABASE_ANON_KEY`
    pub fn from_env() -> Result<Self> {
        Self::from_config(DirectoryConfig::from_env()?, ClientOptions::default())
    }

    /// Create a client from an explicit configuration
    pub fn from_config(config: DirectoryConfig, options: ClientOptions) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;
        let store = PostgrestStore::with_client(
            &config.base_url(),
            &config.anon_key,
            http_client.clone(),
            options.clone(),
        );

        Ok(Self {
            config,
            options,
            store,
            http_client,
        })
    }

    /// Resolver over the bundled curated table and this project's live store
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tradesmen_directory::Directory;
    ///
    /// # async fn run() {
    /// let directory = Directory::new("https://your-project-url.supabase.co", "your-anon-key").unwrap();
    /// let listings = directory.listings().resolve_listings("Luton", "electrician").await;
    /// if listings.is_degraded() {
    ///     eprintln!("live listings unavailable");
    /// }
    /// # }
    /// ```
    pub fn listings(&self) -> ListingResolver<'static, PostgrestStore> {
        ListingResolver::new(StaticListings::bundled(), self.store.clone())
            .with_search_limit(self.options.search_limit)
    }

    /// Raw PostgREST query on any table of the project
    pub fn from(&self, table: &str) -> PostgrestClient {
        PostgrestClient::new(
            &self.config.base_url(),
            &self.config.anon_key,
            table,
            self.http_client.clone(),
        )
    }
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::config::{ClientOptions, DirectoryConfig};
    pub use crate::context::SearchContext;
    pub use crate::error::Error;
    pub use crate::listing::{
        normalize, BusinessRecord, ListingResolver, ListingSource, Listings, LiveStore, Photo,
        StaticListings, Tier, Trade,
    };
    pub use crate::Directory;
}
