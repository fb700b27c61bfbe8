//! Two-tier listing lookup: curated table first, live store second

use serde_json::Value;

use super::normalize::{normalize, normalize_all};
use super::record::BusinessRecord;
use super::static_table::StaticListings;
use super::store::LiveStore;
use crate::context::SearchContext;
use crate::error::Error;

/// Where a result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingSource {
    /// The curated table
    Static,
    /// The live store
    Live,
    /// Neither tier produced anything
    None,
}

/// Outcome of a listing query.
///
/// A failed live lookup does not surface as `Err`: `records` holds whatever
/// could still be produced and `error` carries the failure for callers that
/// want to tell the visitor.
#[derive(Debug)]
pub struct Listings {
    pub records: Vec<BusinessRecord>,
    pub source: ListingSource,
    pub error: Option<Error>,
}

impl Listings {
    fn from_static(records: Vec<BusinessRecord>) -> Self {
        Self {
            records,
            source: ListingSource::Static,
            error: None,
        }
    }

    fn from_live(rows: &[Value]) -> Self {
        let records = normalize_all(rows);
        let source = if records.is_empty() {
            ListingSource::None
        } else {
            ListingSource::Live
        };
        Self {
            records,
            source,
            error: None,
        }
    }

    fn empty() -> Self {
        Self {
            records: Vec::new(),
            source: ListingSource::None,
            error: None,
        }
    }

    fn degraded(error: Error) -> Self {
        Self {
            error: Some(error),
            ..Self::empty()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The live store failed while producing this result
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }

    pub fn into_records(self) -> Vec<BusinessRecord> {
        self.records
    }
}

/// Resolves listings for a city and trade.
///
/// Holds no mutable state; concurrent calls are independent.
pub struct ListingResolver<'a, S> {
    table: &'a StaticListings,
    store: S,
    search_limit: usize,
}

impl<'a, S: LiveStore> ListingResolver<'a, S> {
    pub fn new(table: &'a StaticListings, store: S) -> Self {
        Self {
            table,
            store,
            search_limit: 20,
        }
    }

    /// Cap on rows returned by [`search`](Self::search)
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Curated records only. Lookup ignores case and spacing.
    pub fn static_listings(&self, city: &str, trade: &str) -> Option<Vec<BusinessRecord>> {
        self.table.get(city, trade).map(normalize_all)
    }

    /// Listings for `(city, trade)`.
    ///
    /// A non-empty curated entry is returned in curated order without touching
    /// the live store. Otherwise the live store is asked for rows whose trade
    /// and city match the arguments exactly and case-sensitively; unlike the
    /// curated lookup, those values are passed through unnormalized.
    pub async fn resolve_listings(&self, city: &str, trade: &str) -> Listings {
        if let Some(records) = self.static_listings(city, trade) {
            log::debug!("Serving {} curated listings for {}/{}", records.len(), city, trade);
            return Listings::from_static(records);
        }

        match self.store.businesses_by_trade_and_city(trade, city).await {
            Ok(rows) => Listings::from_live(&rows),
            Err(e) => {
                log::warn!("Live listing lookup for {}/{} failed: {}", city, trade, e);
                Listings::degraded(e)
            }
        }
    }

    /// Listings for the selection held in `context`; empty until both parts are set
    pub async fn resolve_context(&self, context: &SearchContext) -> Listings {
        match (context.city(), context.trade()) {
            (Some(city), Some(trade)) => self.resolve_listings(city, trade.as_str()).await,
            _ => Listings::empty(),
        }
    }

    /// One business by id: the live store first, then the curated table.
    ///
    /// A live failure is kept in `error` even when the curated table has the
    /// record.
    pub async fn find_business(&self, id: &str) -> Listings {
        if id.trim().is_empty() {
            return Listings::empty();
        }

        let error = match self.store.business_by_id(id).await {
            Ok(Some(row)) => return Listings::from_live(std::slice::from_ref(&row)),
            Ok(None) => None,
            Err(e) => {
                log::warn!("Live lookup for business {} failed: {}", id, e);
                Some(e)
            }
        };

        let mut found = match self.table.find_by_id(id) {
            Some(raw) => Listings::from_static(vec![normalize(raw)]),
            None => Listings::empty(),
        };
        found.error = error;
        found
    }

    /// Live businesses whose name or trade contains `query`
    pub async fn search(&self, query: &str) -> Listings {
        if query.trim().is_empty() {
            return Listings::empty();
        }

        match self.store.search_businesses(query.trim(), self.search_limit).await {
            Ok(rows) => Listings::from_live(&rows),
            Err(e) => {
                log::warn!("Business search for {:?} failed: {}", query, e);
                Listings::degraded(e)
            }
        }
    }

    /// Verified live businesses, best rated first
    pub async fn verified_listings(&self, limit: usize) -> Listings {
        match self.store.verified_businesses(limit).await {
            Ok(rows) => Listings::from_live(&rows),
            Err(e) => {
                log::warn!("Verified listing fetch failed: {}", e);
                Listings::degraded(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::listing::{Photo, Trade};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    /// Records every call and answers from canned rows
    #[derive(Default)]
    struct SpyStore {
        rows: Vec<Value>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl SpyStore {
        fn returning(rows: Vec<Value>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                ..Self::default()
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                fail: true,
                ..Self::default()
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn answer(&self, call: String) -> Result<Vec<Value>> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                return Err(Error::general("connection refused"));
            }
            Ok(self.rows.clone())
        }
    }

    #[async_trait]
    impl LiveStore for SpyStore {
        async fn businesses_by_trade_and_city(&self, trade: &str, city: &str) -> Result<Vec<Value>> {
            self.answer(format!("trade={} city={}", trade, city))
        }

        async fn business_by_id(&self, id: &str) -> Result<Option<Value>> {
            Ok(self.answer(format!("id={}", id))?.into_iter().next())
        }

        async fn search_businesses(&self, term: &str, limit: usize) -> Result<Vec<Value>> {
            self.answer(format!("search={} limit={}", term, limit))
        }

        async fn verified_businesses(&self, limit: usize) -> Result<Vec<Value>> {
            self.answer(format!("verified limit={}", limit))
        }
    }

    fn london_table() -> StaticListings {
        StaticListings::from_value(json!({
            "london": {
                "plumber": [
                    { "id": "b1", "name": "Acme Plumbing", "photos": ["http://x/1.jpg", "http://x/2.jpg"] },
                    { "id": "b2", "name": "Second Plumbing" }
                ]
            },
            "new-york": {
                "plumber": [{ "id": "ny1", "name": "Hudson Pipes" }]
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_static_hit_skips_live_store() {
        let table = london_table();
        let spy = SpyStore::returning(vec![json!({ "id": "live" })]);
        let resolver = ListingResolver::new(&table, Arc::clone(&spy));

        let listings = resolver.resolve_listings("London", "plumber").await;

        assert_eq!(listings.source, ListingSource::Static);
        let ids: Vec<&str> = listings.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b1", "b2"]);
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_static_photos() {
        let table = london_table();
        let resolver = ListingResolver::new(&table, SpyStore::returning(Vec::new()));

        let listings = resolver.resolve_listings("London", "plumber").await;
        let acme = &listings.records[0];

        assert_eq!(acme.name, "Acme Plumbing");
        assert_eq!(
            acme.photos,
            vec![
                Photo {
                    id: "photo-0".to_string(),
                    url: "http://x/1.jpg".to_string(),
                    is_primary: true,
                    alt_text: None,
                },
                Photo {
                    id: "photo-1".to_string(),
                    url: "http://x/2.jpg".to_string(),
                    is_primary: false,
                    alt_text: None,
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_static_lookup_ignores_case_and_spacing() {
        let table = london_table();
        let spy = SpyStore::returning(Vec::new());
        let resolver = ListingResolver::new(&table, Arc::clone(&spy));

        let spaced = resolver.resolve_listings("New  York", "Plumber").await;
        let slugged = resolver.resolve_listings("new-york", "plumber").await;

        assert_eq!(spaced.records, slugged.records);
        assert_eq!(spaced.records[0].id, "ny1");
        assert!(spy.calls().is_empty());
    }

    #[tokio::test]
    async fn test_static_miss_queries_live_store_once_with_raw_values() {
        let table = london_table();
        let spy = SpyStore::returning(vec![json!({ "id": "b9", "name": "Luton Electric", "tier": "paid" })]);
        let resolver = ListingResolver::new(&table, Arc::clone(&spy));

        let listings = resolver.resolve_listings("Luton", "electrician").await;

        assert_eq!(spy.calls(), vec!["trade=electrician city=Luton".to_string()]);
        assert_eq!(listings.source, ListingSource::Live);
        assert_eq!(listings.len(), 1);
        assert!(listings.records[0].is_premium);
        assert!(listings.records[0].photos.is_empty());
        assert!(!listings.is_degraded());
    }

    #[tokio::test]
    async fn test_live_order_preserved() {
        let table = StaticListings::new();
        let spy = SpyStore::returning(vec![
            json!({ "id": "z", "rating": 3.1 }),
            json!({ "id": "a", "rating": 4.9 }),
            json!({ "id": "m" }),
        ]);
        let resolver = ListingResolver::new(&table, spy);

        let ids: Vec<String> = resolver
            .resolve_listings("Leeds", "glazier")
            .await
            .into_records()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["z", "a", "m"]);
    }

    #[tokio::test]
    async fn test_no_match_is_empty_not_error() {
        let table = StaticListings::new();
        let resolver = ListingResolver::new(&table, SpyStore::returning(Vec::new()));

        let listings = resolver.resolve_listings("Hereford", "glazier").await;
        assert!(listings.is_empty());
        assert_eq!(listings.source, ListingSource::None);
        assert!(!listings.is_degraded());
    }

    #[tokio::test]
    async fn test_live_failure_degrades() {
        let table = london_table();
        let resolver = ListingResolver::new(&table, SpyStore::failing());

        let listings = resolver.resolve_listings("Luton", "electrician").await;
        assert!(listings.is_empty());
        assert!(listings.is_degraded());

        // The curated tier is a separate failure domain.
        let curated = resolver.resolve_listings("london", "plumber").await;
        assert_eq!(curated.len(), 2);
        assert!(!curated.is_degraded());
    }

    #[tokio::test]
    async fn test_resolve_context() {
        let table = london_table();
        let spy = SpyStore::returning(Vec::new());
        let resolver = ListingResolver::new(&table, Arc::clone(&spy));

        let mut context = SearchContext::new();
        context.set_trade(Trade::Plumber);
        assert!(resolver.resolve_context(&context).await.is_empty());

        context.set_city("London");
        assert_eq!(resolver.resolve_context(&context).await.len(), 2);

        context.set_trade(Trade::GasEngineer);
        resolver.resolve_context(&context).await;
        assert_eq!(spy.calls(), vec!["trade=gas-engineer city=London".to_string()]);
    }

    #[tokio::test]
    async fn test_find_business_prefers_live_row() {
        let table = london_table();
        let spy = SpyStore::returning(vec![json!({ "id": "b1", "name": "Acme Plumbing Ltd" })]);
        let resolver = ListingResolver::new(&table, Arc::clone(&spy));

        let found = resolver.find_business("b1").await;
        assert_eq!(found.source, ListingSource::Live);
        assert_eq!(found.records[0].name, "Acme Plumbing Ltd");
    }

    #[tokio::test]
    async fn test_find_business_falls_back_to_static() {
        let table = london_table();
        let resolver = ListingResolver::new(&table, SpyStore::returning(Vec::new()));

        let found = resolver.find_business("b2").await;
        assert_eq!(found.source, ListingSource::Static);
        assert_eq!(found.records[0].name, "Second Plumbing");

        let missing = resolver.find_business("nope").await;
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_find_business_keeps_error_on_static_fallback() {
        let table = london_table();
        let resolver = ListingResolver::new(&table, SpyStore::failing());

        let found = resolver.find_business("b1").await;
        assert_eq!(found.len(), 1);
        assert!(found.is_degraded());
    }

    #[tokio::test]
    async fn test_search() {
        let table = StaticListings::new();
        let spy = SpyStore::returning(vec![json!({ "id": "l1", "trade": "locksmith" })]);
        let resolver = ListingResolver::new(&table, Arc::clone(&spy)).with_search_limit(5);

        assert!(resolver.search("   ").await.is_empty());
        assert!(spy.calls().is_empty());

        let results = resolver.search(" lock ").await;
        assert_eq!(results.records[0].trade, Trade::Locksmith);
        assert_eq!(spy.calls(), vec!["search=lock limit=5".to_string()]);
    }

    #[tokio::test]
    async fn test_verified_listings_degrade_on_failure() {
        let table = StaticListings::new();
        let resolver = ListingResolver::new(&table, SpyStore::failing());

        let listings = resolver.verified_listings(100).await;
        assert!(listings.is_empty());
        assert!(matches!(listings.error, Some(Error::General(_))));
    }
}
