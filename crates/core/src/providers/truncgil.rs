use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use std::collections::HashMap;
use std::time::Duration;

use super::traits::QuoteSource;
use crate::errors::CoreError;
use crate::models::asset::AssetType;
use crate::models::quote::{FxTable, EUR_KEY, GOLD_KEY, USD_KEY};

const BASE_URL: &str = "https://finans.truncgil.com/today.json";

/// Truncgil finance feed: a single JSON document with FX selling rates
/// and gram-gold, quoted in TRY.
///
/// - **Free**: no API key, polled as-is.
/// - **Shape**: one object per instrument, e.g.
///   `"USD": { "Alış": "34,1050", "Satış": "34,2210", ... }` — numbers
///   are Turkish-formatted strings, so everything is parsed dynamically.
pub struct TruncgilProvider {
    client: Client,
}

impl TruncgilProvider {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for TruncgilProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a Turkish-formatted decimal string ("4.100,50" → 4100.50).
pub fn parse_tr_number(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace('.', "").replace(',', ".");
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Pull the selling rate out of one instrument object.
fn selling_rate(entry: &serde_json::Value) -> Option<f64> {
    let raw = entry.get("Satış").or_else(|| entry.get("Satis"))?;
    match raw {
        serde_json::Value::String(s) => parse_tr_number(s),
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
}

#[async_trait]
impl QuoteSource for TruncgilProvider {
    fn name(&self) -> &str {
        "Truncgil"
    }

    fn supported_asset_types(&self) -> Vec<AssetType> {
        vec![AssetType::Currency, AssetType::Gold]
    }

    async fn fetch_fx_table(&self) -> Result<FxTable, CoreError> {
        let body: serde_json::Value = self
            .client
            .get(BASE_URL)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Truncgil".into(),
                message: format!("Failed to parse feed: {e}"),
            })?;

        let mut rates = HashMap::new();
        for (feed_key, table_key) in [
            ("USD", USD_KEY),
            ("EUR", EUR_KEY),
            ("gram-altin", GOLD_KEY),
        ] {
            if let Some(rate) = body.get(feed_key).and_then(selling_rate) {
                rates.insert(table_key.to_string(), rate);
            }
        }

        if rates.is_empty() {
            return Err(CoreError::Api {
                provider: "Truncgil".into(),
                message: "Feed contained no usable rates".into(),
            });
        }

        Ok(FxTable::new(rates, Utc::now()))
    }
}
