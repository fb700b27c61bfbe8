//! Trade and city selection shared by the triage and chat views

use crate::listing::Trade;

/// The trade and city a visitor has picked so far.
///
/// Owned by the view that drives the conversation and passed by reference to
/// whatever needs to read it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchContext {
    trade: Option<Trade>,
    city: Option<String>,
}

impl SearchContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trade(&self) -> Option<&Trade> {
        self.trade.as_ref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn set_trade(&mut self, trade: Trade) {
        self.trade = Some(trade);
    }

    /// Set the city; blank input clears it
    pub fn set_city(&mut self, city: &str) {
        let city = city.trim();
        self.city = (!city.is_empty()).then(|| city.to_string());
    }

    pub fn clear(&mut self) {
        self.trade = None;
        self.city = None;
    }

    /// Both parts selected
    pub fn is_complete(&self) -> bool {
        self.trade.is_some() && self.city.is_some()
    }
}
