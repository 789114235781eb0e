use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known FX table keys.
pub const USD_KEY: &str = "USD";
pub const EUR_KEY: &str = "EUR";
pub const GOLD_KEY: &str = "GOLD";

/// A snapshot of the vendor FX/gold table: rate per key, in the home
/// currency, plus when it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FxTable {
    pub rates: HashMap<String, f64>,
    pub fetched_at: DateTime<Utc>,
}

impl FxTable {
    pub fn new(rates: HashMap<String, f64>, fetched_at: DateTime<Utc>) -> Self {
        Self { rates, fetched_at }
    }

    pub fn rate(&self, key: &str) -> Option<f64> {
        self.rates.get(key).copied()
    }
}

/// Explicit cache of live quotes, owned by the price service.
///
/// Entries older than `ttl_secs` are treated as misses so a refresh cycle
/// re-polls the sources, while repeated lookups within one cycle do not.
#[derive(Debug, Clone)]
pub struct QuoteCache {
    fx: Option<FxTable>,
    instruments: HashMap<String, (f64, DateTime<Utc>)>,
    ttl_secs: i64,
}

impl QuoteCache {
    pub fn new(ttl_secs: i64) -> Self {
        Self {
            fx: None,
            instruments: HashMap::new(),
            ttl_secs,
        }
    }

    /// The cached FX table, if still fresh at `now`.
    pub fn fresh_fx(&self, now: DateTime<Utc>) -> Option<&FxTable> {
        self.fx
            .as_ref()
            .filter(|t| (now - t.fetched_at).num_seconds() < self.ttl_secs)
    }

    pub fn store_fx(&mut self, table: FxTable) {
        self.fx = Some(table);
    }

    /// A cached per-symbol quote, if still fresh at `now`.
    pub fn fresh_instrument(&self, symbol: &str, now: DateTime<Utc>) -> Option<f64> {
        let key = symbol.to_uppercase();
        self.instruments
            .get(&key)
            .filter(|(_, at)| (now - *at).num_seconds() < self.ttl_secs)
            .map(|(price, _)| *price)
    }

    pub fn store_instrument(&mut self, symbol: &str, price: f64, at: DateTime<Utc>) {
        self.instruments.insert(symbol.to_uppercase(), (price, at));
    }

    pub fn clear(&mut self) {
        self.fx = None;
        self.instruments.clear();
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        Self::new(60)
    }
}
