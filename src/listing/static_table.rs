//! Curated listings compiled into the binary

use once_cell::sync::Lazy;
use serde_json::Value;
use std::collections::BTreeMap;

use super::record::lookup_key;
use crate::error::Result;

const BUNDLED_LISTINGS: &str = include_str!("../../data/listings.json");

static BUNDLED: Lazy<StaticListings> =
    Lazy::new(|| match StaticListings::from_json(BUNDLED_LISTINGS) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Bundled listing table is malformed, serving none: {}", e);
            StaticListings::new()
        }
    });

/// Editorial listings keyed by city and trade.
///
/// Entries are raw records in any shape [`normalize`](super::normalize)
/// accepts. Keys are stored as [`lookup_key`]s, so lookups ignore case and
/// spacing.
#[derive(Debug, Clone, Default)]
pub struct StaticListings {
    entries: BTreeMap<String, BTreeMap<String, Vec<Value>>>,
}

impl StaticListings {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// The table shipped with the crate, parsed on first use
    pub fn bundled() -> &'static StaticListings {
        &BUNDLED
    }

    /// Parse a `{ city: { trade: [record, ...] } }` JSON document
    pub fn from_json(document: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(document)?;
        Self::from_value(value)
    }

    /// Build a table from a `{ city: { trade: [record, ...] } }` value
    pub fn from_value(value: Value) -> Result<Self> {
        let nested: BTreeMap<String, BTreeMap<String, Vec<Value>>> =
            serde_json::from_value(value)?;

        let mut table = Self::new();
        for (city, trades) in nested {
            for (trade, records) in trades {
                table.insert(&city, &trade, records);
            }
        }
        Ok(table)
    }

    /// Append records under `(city, trade)`
    pub fn insert(&mut self, city: &str, trade: &str, records: Vec<Value>) {
        self.entries
            .entry(lookup_key(city))
            .or_default()
            .entry(lookup_key(trade))
            .or_default()
            .extend(records);
    }

    /// Curated records for `(city, trade)`; `None` when absent or empty
    pub fn get(&self, city: &str, trade: &str) -> Option<&[Value]> {
        self.entries
            .get(&lookup_key(city))?
            .get(&lookup_key(trade))
            .map(Vec::as_slice)
            .filter(|records| !records.is_empty())
    }

    /// Find a record by id anywhere in the table
    pub fn find_by_id(&self, id: &str) -> Option<&Value> {
        self.records().find(|record| match record.get("id") {
            Some(Value::String(s)) => s == id,
            Some(Value::Number(n)) => n.to_string() == id,
            _ => false,
        })
    }

    /// Every record, grouped by city then trade
    pub fn records(&self) -> impl Iterator<Item = &Value> {
        self.entries
            .values()
            .flat_map(|trades| trades.values())
            .flatten()
    }

    /// Total number of records
    pub fn len(&self) -> usize {
        self.records().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
