use chrono::Utc;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::asset::{Asset, AssetType};
use crate::models::quote::{FxTable, QuoteCache, EUR_KEY, GOLD_KEY, USD_KEY};
use crate::providers::registry::QuoteSourceRegistry;

/// Resolves a current unit price for an asset, polymorphic over its type:
///
/// - Currency — substring match of the asset name against the FX table
///   (`USD`/`DOLAR`, `EUR`/`EURO`).
/// - Gold — the fixed `GOLD` key of the same table.
/// - Stock / Fund — per-symbol lookup against the instrument's source,
///   one request per held instrument.
///
/// A failing fetch resolves to `None` for that instrument only; it never
/// fails a batch. Callers fall back to the last stored lot price.
pub struct PriceService {
    registry: QuoteSourceRegistry,
    cache: QuoteCache,
}

/// Map a currency asset's name onto an FX table key.
pub fn match_fx_key(name: &str) -> Option<&'static str> {
    let upper = name.to_uppercase();
    if upper.contains("USD") || upper.contains("DOLAR") {
        Some(USD_KEY)
    } else if upper.contains("EUR") || upper.contains("EURO") {
        Some(EUR_KEY)
    } else {
        None
    }
}

impl PriceService {
    pub fn new(registry: QuoteSourceRegistry) -> Self {
        Self {
            registry,
            cache: QuoteCache::default(),
        }
    }

    pub fn with_cache(registry: QuoteSourceRegistry, cache: QuoteCache) -> Self {
        Self { registry, cache }
    }

    /// Check if at least one quote source is available for an asset type.
    pub fn has_source_for(&self, asset_type: &AssetType) -> bool {
        self.registry.source_for(asset_type).is_some()
    }

    /// Names of the sources registered for an asset type.
    pub fn source_names(&self, asset_type: &AssetType) -> Vec<String> {
        self.registry
            .sources_for(asset_type)
            .iter()
            .map(|s| s.name().to_string())
            .collect()
    }

    /// Resolve a live unit price for `asset`, or `None` when no source
    /// knows it or the fetch failed. Failures are logged, never raised.
    pub async fn resolve(&mut self, asset: &Asset) -> Option<f64> {
        match self.try_resolve(asset).await {
            Ok(price) => price.filter(|p| *p > 0.0),
            Err(e) => {
                warn!(asset = %asset.name, error = %e, "live price fetch failed");
                None
            }
        }
    }

    async fn try_resolve(&mut self, asset: &Asset) -> Result<Option<f64>, CoreError> {
        match asset.asset_type {
            AssetType::Currency => {
                let key = match match_fx_key(&asset.name) {
                    Some(key) => key,
                    None => return Ok(None),
                };
                Ok(self.fx_table(&AssetType::Currency).await?.rate(key))
            }
            AssetType::Gold => Ok(self.fx_table(&AssetType::Gold).await?.rate(GOLD_KEY)),
            AssetType::Stock | AssetType::Fund => {
                self.instrument_price(&asset.name, &asset.asset_type).await
            }
        }
    }

    /// The FX/gold table, refetched when the cached copy is stale.
    async fn fx_table(&mut self, asset_type: &AssetType) -> Result<FxTable, CoreError> {
        let now = Utc::now();
        if let Some(table) = self.cache.fresh_fx(now) {
            return Ok(table.clone());
        }

        let source = self
            .registry
            .source_for(asset_type)
            .ok_or_else(|| CoreError::NoProvider(asset_type.to_string()))?;
        let table = source.fetch_fx_table().await?;
        self.cache.store_fx(table.clone());
        Ok(table)
    }

    /// A per-symbol quote, served from the cache within its freshness
    /// window, else fetched from the type's source.
    pub async fn instrument_price(
        &mut self,
        symbol: &str,
        asset_type: &AssetType,
    ) -> Result<Option<f64>, CoreError> {
        let now = Utc::now();
        if let Some(price) = self.cache.fresh_instrument(symbol, now) {
            return Ok(Some(price));
        }

        let source = self
            .registry
            .source_for(asset_type)
            .ok_or_else(|| CoreError::NoProvider(asset_type.to_string()))?;
        let price = source.fetch_instrument_price(symbol).await?;
        if let Some(price) = price {
            self.cache.store_instrument(symbol, price, now);
        }
        Ok(price)
    }

    /// Drop all cached quotes so the next resolve re-polls the sources.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }
}
