//! Mapping from raw store rows to [`BusinessRecord`]
//!
//! Raw rows arrive in three shapes: snake_case columns from PostgREST,
//! camelCase entries from the bundled static table, and the serialized form of
//! [`BusinessRecord`] itself. Every field is looked up under each of its names
//! and falls back to a default when missing or malformed, so [`normalize`] is
//! total and idempotent.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::record::{
    lookup_key, BusinessRecord, Photo, Tier, Trade, DEFAULT_HOURS, NEUTRAL_RATING,
    PLACEHOLDER_NAME,
};

const PHOTOS: &[&str] = &["photos"];
const PHOTO_RELATION: &[&str] = &["business_photos", "businessPhotos"];
const PREMIUM_FLAG: &[&str] = &["is_premium", "isPremium", "isPremiumFlag", "is_premium_flag"];
const LAST_PING: &[&str] = &[
    "last_available_ping",
    "lastAvailablePing",
    "last_available_ping_timestamp",
    "lastAvailablePingTimestamp",
];

/// Normalize one raw record into a [`BusinessRecord`].
///
/// Never fails: non-object input yields the all-defaults record and each
/// malformed field degrades to its own default.
pub fn normalize(raw: &Value) -> BusinessRecord {
    let empty = Map::new();
    let row = raw.as_object().unwrap_or(&empty);

    let tier = match field(row, &["tier"]) {
        Some(Value::String(tier)) if tier == "paid" => Tier::Paid,
        _ => Tier::Free,
    };
    let priority_score = number(row, &["priority_score", "priorityScore"]).unwrap_or(0.0);
    let is_premium = flag_set(row, PREMIUM_FLAG) || tier == Tier::Paid;
    let is_paid = is_premium || priority_score > 0.0;

    BusinessRecord {
        id: text(row, &["id"]).unwrap_or_default(),
        name: text(row, &["name"]).unwrap_or_else(|| PLACEHOLDER_NAME.to_string()),
        trade: Trade::parse(&text(row, &["trade"]).unwrap_or_default()),
        city: lookup_key(&text(row, &["city"]).unwrap_or_default()),
        rating: number(row, &["rating"])
            .filter(|rating| *rating != 0.0)
            .unwrap_or(NEUTRAL_RATING),
        review_count: number(row, &["review_count", "reviewCount"])
            .map(|count| count.clamp(0.0, u32::MAX as f64) as u32)
            .unwrap_or(0),
        is_open_24_hours: !flag_cleared(row, &["is_open_24_hours", "isOpen24Hours"]),
        is_available_now: !flag_cleared(row, &["is_available_now", "isAvailableNow"]),
        tier,
        is_premium,
        is_paid,
        priority_score,
        photos: photos(row),
        logo_url: text(row, &["logo_url", "logoUrl"]),
        premium_description: text(row, &["premium_description", "premiumDescription"]),
        services_offered: text_set(row, &["services_offered", "servicesOffered"]),
        coverage_areas: text_set(row, &["coverage_areas", "coverageAreas"]),
        whatsapp_number: text(row, &["whatsapp_number", "whatsappNumber"]),
        website_url: text(row, &["website_url", "websiteUrl", "website"]),
        owner_user_id: text(row, &["owner_user_id", "ownerUserId"]),
        last_available_ping_timestamp: timestamp(row, LAST_PING),
        address: text(row, &["address"]),
        phone: text(row, &["phone"]),
        hours: text(row, &["hours"]).unwrap_or_else(|| DEFAULT_HOURS.to_string()),
        featured_review: text(row, &["featured_review", "featuredReview"]),
    }
}

/// Normalize every row, preserving order
pub fn normalize_all<'a, I>(rows: I) -> Vec<BusinessRecord>
where
    I: IntoIterator<Item = &'a Value>,
{
    rows.into_iter().map(normalize).collect()
}

/// First non-null value stored under any of `keys`
fn field<'a>(row: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| row.get(*key))
        .find(|value| !value.is_null())
}

fn text_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(row: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    field(row, keys).and_then(text_value)
}

fn number(row: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let parsed = match field(row, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn flag_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) if s.eq_ignore_ascii_case("true") => Some(true),
        Value::String(s) if s.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// True only when the source explicitly sets the flag
fn flag_set(row: &Map<String, Value>, keys: &[&str]) -> bool {
    field(row, keys).and_then(flag_value) == Some(true)
}

/// True only for an explicit boolean `false`; absence is not false
fn flag_cleared(row: &Map<String, Value>, keys: &[&str]) -> bool {
    matches!(field(row, keys), Some(Value::Bool(false)))
}

fn text_set(row: &Map<String, Value>, keys: &[&str]) -> BTreeSet<String> {
    match field(row, keys) {
        Some(Value::Array(items)) => items.iter().filter_map(text_value).collect(),
        _ => BTreeSet::new(),
    }
}

fn timestamp(row: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    let raw = text(row, keys)?;
    DateTime::parse_from_rfc3339(&raw)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// Resolve the photo list.
///
/// A non-empty `photos` array wins: bare URL strings get synthetic
/// `photo-<index>` ids and the first usable entry is primary, objects are
/// taken as they are.
/// Otherwise the embedded photo relation is used, otherwise nothing.
fn photos(row: &Map<String, Value>) -> Vec<Photo> {
    if let Some(Value::Array(items)) = field(row, PHOTOS) {
        let mut resolved = Vec::new();
        for (index, item) in items.iter().enumerate() {
            if let Some(photo) = photo(index, item, resolved.is_empty()) {
                resolved.push(photo);
            }
        }
        if !resolved.is_empty() {
            return resolved;
        }
    }

    match field(row, PHOTO_RELATION) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(_) => photo(index, item, false),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn photo(index: usize, item: &Value, primary_by_default: bool) -> Option<Photo> {
    match item {
        Value::String(_) => Some(Photo {
            id: format!("photo-{}", index),
            url: text_value(item)?,
            is_primary: primary_by_default,
            alt_text: None,
        }),
        Value::Object(entry) => Some(Photo {
            url: text(entry, &["url"])?,
            id: text(entry, &["id"]).unwrap_or_else(|| format!("photo-{}", index)),
            is_primary: field(entry, &["is_primary", "isPrimary"])
                .and_then(flag_value)
                .unwrap_or(primary_by_default),
            alt_text: text(entry, &["alt_text", "altText"]),
        }),
        _ => None,
    }
}
