use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::asset::AssetType;
use crate::models::quote::FxTable;

/// Trait abstraction for all market quote sources.
///
/// Each scraped site or polled endpoint implements this trait. When a
/// site changes its markup or an endpoint disappears, only that one
/// implementation is touched.
///
/// A source implements the method(s) matching what it serves: table-style
/// sources (FX, gold) override `fetch_fx_table`, per-symbol sources
/// (stocks, funds) override `fetch_instrument_price`. The defaults
/// report the capability as absent.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Human-readable name of this source (for logs/errors).
    fn name(&self) -> &str;

    /// Which asset types this source can quote.
    fn supported_asset_types(&self) -> Vec<AssetType>;

    /// Fetch the FX/gold rate table in the home currency.
    async fn fetch_fx_table(&self) -> Result<FxTable, CoreError> {
        Err(CoreError::Api {
            provider: self.name().to_string(),
            message: "source has no rate table".into(),
        })
    }

    /// Fetch the current unit price of one instrument, or `None` when
    /// the source does not know the symbol.
    async fn fetch_instrument_price(&self, symbol: &str) -> Result<Option<f64>, CoreError> {
        let _ = symbol;
        Err(CoreError::Api {
            provider: self.name().to_string(),
            message: "source has no per-symbol quotes".into(),
        })
    }
}
