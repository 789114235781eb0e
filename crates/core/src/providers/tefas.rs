use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;

use super::traits::QuoteSource;
use super::truncgil::parse_tr_number;
use crate::errors::CoreError;
use crate::models::asset::AssetType;

const BASE_URL: &str = "https://www.tefas.gov.tr/FonAnaliz.aspx";

/// TEFAS, the government fund registry. There is no public API; the
/// latest unit price sits in the fund's analysis page markup, so it is
/// pulled out with a regex over the HTML.
///
/// One request per fund code; the caller's refresh cadence is the rate
/// limit.
pub struct TefasProvider {
    client: Client,
    price_re: Regex,
}

impl TefasProvider {
    pub fn new() -> Result<Self, CoreError> {
        // "Son Fiyat (TL)" label followed by the price span.
        let price_re = Regex::new(r#"Son Fiyat \(TL\)\s*</span>\s*<span[^>]*>([\d.,]+)"#)
            .map_err(|e| CoreError::Api {
                provider: "TEFAS".into(),
                message: format!("Invalid price pattern: {e}"),
            })?;

        let builder = Client::builder().timeout(Duration::from_secs(30));
        Ok(Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            price_re,
        })
    }

    /// Extract the unit price from a fund analysis page body.
    /// Returns `None` when the page carries no price (unknown code,
    /// delisted fund, markup change).
    pub fn extract_price(&self, html: &str) -> Option<f64> {
        let captures = self.price_re.captures(html)?;
        parse_tr_number(captures.get(1)?.as_str())
    }
}

#[async_trait]
impl QuoteSource for TefasProvider {
    fn name(&self) -> &str {
        "TEFAS"
    }

    fn supported_asset_types(&self) -> Vec<AssetType> {
        vec![AssetType::Fund]
    }

    async fn fetch_instrument_price(&self, symbol: &str) -> Result<Option<f64>, CoreError> {
        let code = symbol.to_uppercase();
        let html = self
            .client
            .get(BASE_URL)
            .query(&[("FonKod", code.as_str())])
            .send()
            .await?
            .text()
            .await?;

        Ok(self.extract_price(&html))
    }
}
