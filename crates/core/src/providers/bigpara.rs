use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::QuoteSource;
use crate::errors::CoreError;
use crate::models::asset::AssetType;

const BASE_URL: &str = "https://bigpara.hurriyet.com.tr/api/v1/borsa/hisseyuzeysel";

/// Bigpara stock surface endpoint: per-symbol JSON with the last traded
/// price in TRY. No API key; one request per held symbol.
pub struct BigparaProvider {
    client: Client,
}

impl BigparaProvider {
    pub fn new() -> Self {
        let builder = Client::builder().timeout(Duration::from_secs(30));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for BigparaProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bigpara response types ──────────────────────────────────────────

#[derive(Deserialize)]
struct SurfaceResponse {
    data: Option<SurfaceData>,
}

#[derive(Deserialize)]
struct SurfaceData {
    #[serde(rename = "hisseYuzeysel")]
    surface: Option<Surface>,
}

#[derive(Deserialize)]
struct Surface {
    #[serde(rename = "son")]
    last: Option<f64>,
}

#[async_trait]
impl QuoteSource for BigparaProvider {
    fn name(&self) -> &str {
        "Bigpara"
    }

    fn supported_asset_types(&self) -> Vec<AssetType> {
        vec![AssetType::Stock]
    }

    async fn fetch_instrument_price(&self, symbol: &str) -> Result<Option<f64>, CoreError> {
        let upper = symbol.to_uppercase();
        let url = format!("{BASE_URL}/{upper}");

        let resp: SurfaceResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "Bigpara".into(),
                message: format!("Failed to parse quote for {upper}: {e}"),
            })?;

        let last = resp
            .data
            .and_then(|d| d.surface)
            .and_then(|s| s.last)
            .filter(|p| p.is_finite() && *p > 0.0);

        Ok(last)
    }
}
