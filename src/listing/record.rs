//! Canonical listing types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Name shown when the source has no usable business name
pub const PLACEHOLDER_NAME: &str = "Untitled Business";

/// Opening hours shown when the source has none
pub const DEFAULT_HOURS: &str = "24/7 Emergency Service";

/// Rating used when the source has none
pub const NEUTRAL_RATING: f64 = 5.0;

/// Build the lookup key for a city or trade name.
///
/// Lower-cases the input and collapses every whitespace run into a single
/// hyphen, so `"New  York"` and `"new-york"` share a key.
pub fn lookup_key(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase()
}

/// Trade category a business is listed under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Trade {
    Plumber,
    Electrician,
    Locksmith,
    GasEngineer,
    DrainSpecialist,
    Glazier,
    /// Vehicle breakdown and recovery
    Breakdown,
    /// A category outside the fixed set, kept as written in the source
    Other(String),
}

impl Trade {
    /// Every listed trade, in menu order
    pub const ALL: [Trade; 7] = [
        Trade::Plumber,
        Trade::Electrician,
        Trade::Locksmith,
        Trade::GasEngineer,
        Trade::DrainSpecialist,
        Trade::Glazier,
        Trade::Breakdown,
    ];

    /// Parse a trade name; unknown names become [`Trade::Other`]
    pub fn parse(value: &str) -> Self {
        match lookup_key(value).as_str() {
            "plumber" | "plumbers" | "plumbing" => Trade::Plumber,
            "electrician" | "electricians" | "electrical" => Trade::Electrician,
            "locksmith" | "locksmiths" => Trade::Locksmith,
            "gas-engineer" | "gas-engineers" | "gas" => Trade::GasEngineer,
            "drain-specialist" | "drain-specialists" | "drainage-specialist" | "drainage"
            | "drains" => Trade::DrainSpecialist,
            "glazier" | "glaziers" | "glazing" => Trade::Glazier,
            "breakdown" | "vehicle-recovery" | "breakdown-recovery" | "recovery" => {
                Trade::Breakdown
            }
            _ => Trade::Other(value.trim().to_string()),
        }
    }

    /// URL slug, also the value stored in the `trade` column
    pub fn as_str(&self) -> &str {
        match self {
            Trade::Plumber => "plumber",
            Trade::Electrician => "electrician",
            Trade::Locksmith => "locksmith",
            Trade::GasEngineer => "gas-engineer",
            Trade::DrainSpecialist => "drain-specialist",
            Trade::Glazier => "glazier",
            Trade::Breakdown => "breakdown",
            Trade::Other(name) => name,
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &str {
        match self {
            Trade::Plumber => "Plumber",
            Trade::Electrician => "Electrician",
            Trade::Locksmith => "Locksmith",
            Trade::GasEngineer => "Gas Engineer",
            Trade::DrainSpecialist => "Drain Specialist",
            Trade::Glazier => "Glazier",
            Trade::Breakdown => "Vehicle Recovery",
            Trade::Other(name) => name,
        }
    }
}

impl From<String> for Trade {
    fn from(value: String) -> Self {
        Trade::parse(&value)
    }
}

impl From<Trade> for String {
    fn from(trade: Trade) -> Self {
        trade.as_str().to_string()
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Listing tier as recorded by the source
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Paid,
}

/// A business photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: String,
    pub url: String,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_text: Option<String>,
}

/// A business listing in the shape every display path consumes.
///
/// Produced only by [`normalize`](super::normalize); every field has a defined
/// value whatever the source record held.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessRecord {
    pub id: String,
    pub name: String,
    pub trade: Trade,
    /// Normalized locality key, see [`lookup_key`]
    pub city: String,
    pub rating: f64,
    pub review_count: u32,
    pub is_open_24_hours: bool,
    pub is_available_now: bool,
    pub tier: Tier,
    /// Verified partner: explicit premium flag or paid tier
    pub is_premium: bool,
    /// Featured listing: premium or a positive priority score
    pub is_paid: bool,
    pub priority_score: f64,
    pub photos: Vec<Photo>,
    pub logo_url: Option<String>,
    pub premium_description: Option<String>,
    pub services_offered: BTreeSet<String>,
    pub coverage_areas: BTreeSet<String>,
    pub whatsapp_number: Option<String>,
    pub website_url: Option<String>,
    pub owner_user_id: Option<String>,
    pub last_available_ping_timestamp: Option<DateTime<Utc>>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub hours: String,
    pub featured_review: Option<String>,
}

impl BusinessRecord {
    /// The photo flagged primary, or the first one
    pub fn primary_photo(&self) -> Option<&Photo> {
        self.photos
            .iter()
            .find(|photo| photo.is_primary)
            .or_else(|| self.photos.first())
    }

    /// Whether the verified header (logo and photo banner) may be shown
    pub fn shows_verified_header(&self) -> bool {
        self.is_premium
    }
}
