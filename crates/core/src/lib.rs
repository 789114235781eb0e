pub mod errors;
pub mod migrations;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use errors::CoreError;
use models::asset::{Asset, AssetType};
use models::settings::Settings;
use models::summary::{HoldingSummary, PortfolioSummary};
use providers::registry::QuoteSourceRegistry;
use services::ledger_service::{LedgerService, LotRemoval};
use services::price_service::PriceService;
use services::valuation_service::ValuationService;
use storage::store::{RecordKind, RecordStore};

/// Main entry point for the Finance Tracker core library.
///
/// Holds the explicit operating context — the user id, the record store
/// handle, and the price service — plus the in-memory asset working set.
/// Nothing here is ambient or global: two trackers for two users can
/// coexist in one process.
///
/// Ledger mutations are synchronous against the in-memory assets; the
/// store write is an asynchronous follow-up with no rollback. A write
/// failure is logged and the in-memory state kept (at-most-once
/// persistence, by design). Racing writers are last-write-wins with
/// full-record overwrite.
#[must_use]
pub struct FinanceTracker {
    user_id: Uuid,
    store: Arc<dyn RecordStore>,
    prices: PriceService,
    ledger: LedgerService,
    valuation: ValuationService,
    assets: Vec<Asset>,
    settings: Settings,
}

impl std::fmt::Debug for FinanceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceTracker")
            .field("user_id", &self.user_id)
            .field("assets", &self.assets.len())
            .field("settings", &self.settings)
            .finish()
    }
}

impl FinanceTracker {
    /// Create a tracker with the default quote sources.
    pub fn new(user_id: Uuid, store: Arc<dyn RecordStore>) -> Self {
        Self::with_registry(user_id, store, QuoteSourceRegistry::new_with_defaults())
    }

    /// Create a tracker with a custom quote-source registry (tests,
    /// alternative feeds).
    pub fn with_registry(
        user_id: Uuid,
        store: Arc<dyn RecordStore>,
        registry: QuoteSourceRegistry,
    ) -> Self {
        Self {
            user_id,
            store,
            prices: PriceService::new(registry),
            ledger: LedgerService::new(),
            valuation: ValuationService::new(),
            assets: Vec::new(),
            settings: Settings::default(),
        }
    }

    /// Load the user's assets and settings from the store, upgrading
    /// older record shapes on the way in.
    pub async fn load(&mut self) -> Result<(), CoreError> {
        let raw = self.store.list(self.user_id, RecordKind::Asset).await?;
        let mut assets = Vec::with_capacity(raw.len());
        for value in raw {
            assets.push(migrations::parse_asset(value)?);
        }
        self.assets = assets;

        let settings = self.store.list(self.user_id, RecordKind::Settings).await?;
        self.settings = match settings.into_iter().next() {
            Some(value) => serde_json::from_value(value)?,
            None => Settings::default(),
        };

        Ok(())
    }

    // ── Ledger Operations ───────────────────────────────────────────

    /// Record a purchase. The asset is found by (uppercased name, type)
    /// or created on the spot — its first lot opens its first period.
    /// Returns `(asset_id, lot_id)`.
    pub async fn add_lot(
        &mut self,
        name: &str,
        asset_type: AssetType,
        amount: f64,
        cost: f64,
        price: f64,
        added_at: DateTime<Utc>,
    ) -> Result<(Uuid, Uuid), CoreError> {
        let upper = name.trim().to_uppercase();
        if upper.is_empty() {
            return Err(CoreError::Validation("asset name must not be empty".into()));
        }

        match self
            .assets
            .iter()
            .position(|a| a.name == upper && a.asset_type == asset_type)
        {
            Some(idx) => {
                let lot_id =
                    self.ledger
                        .add_lot(&mut self.assets[idx], amount, cost, price, added_at)?;
                let asset_id = self.assets[idx].id;
                self.persist_asset(&self.assets[idx]).await;
                Ok((asset_id, lot_id))
            }
            None => {
                // Validate against a fresh asset before it joins the
                // working set, so a rejected first lot leaves nothing.
                let mut asset = Asset::new(upper, asset_type);
                let lot_id = self.ledger.add_lot(&mut asset, amount, cost, price, added_at)?;
                let asset_id = asset.id;
                self.persist_asset(&asset).await;
                self.assets.push(asset);
                Ok((asset_id, lot_id))
            }
        }
    }

    /// Edit a purchase in place (same lot id).
    pub async fn edit_lot(
        &mut self,
        asset_id: Uuid,
        lot_id: Uuid,
        amount: f64,
        cost: f64,
        added_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let idx = self.asset_index(asset_id)?;
        self.ledger
            .edit_lot(&mut self.assets[idx], lot_id, amount, cost, added_at)?;
        self.persist_asset(&self.assets[idx]).await;
        Ok(())
    }

    /// Delete a purchase. When the asset's last lot goes, the whole
    /// asset is deleted — from the working set and the store.
    pub async fn delete_lot(
        &mut self,
        asset_id: Uuid,
        lot_id: Uuid,
    ) -> Result<LotRemoval, CoreError> {
        let idx = self.asset_index(asset_id)?;
        let outcome = self.ledger.delete_lot(&mut self.assets[idx], lot_id)?;
        match outcome {
            LotRemoval::AssetEmptied => {
                self.assets.remove(idx);
                if let Err(e) = self
                    .store
                    .delete(self.user_id, RecordKind::Asset, asset_id)
                    .await
                {
                    warn!(asset_id = %asset_id, error = %e, "asset delete not persisted");
                }
            }
            LotRemoval::Removed => self.persist_asset(&self.assets[idx]).await,
        }
        Ok(outcome)
    }

    /// Record a disposal against the asset's active period.
    pub async fn record_sale(
        &mut self,
        asset_id: Uuid,
        amount: f64,
        sale_price: f64,
        sold_at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        let idx = self.asset_index(asset_id)?;
        let sale_id = self
            .ledger
            .record_sale(&mut self.assets[idx], amount, sale_price, sold_at)?;
        self.persist_asset(&self.assets[idx]).await;
        Ok(sale_id)
    }

    /// Edit a disposal; its frozen average cost is left untouched.
    pub async fn edit_sale(
        &mut self,
        asset_id: Uuid,
        sale_id: Uuid,
        amount: f64,
        sale_price: f64,
    ) -> Result<(), CoreError> {
        let idx = self.asset_index(asset_id)?;
        self.ledger
            .edit_sale(&mut self.assets[idx], sale_id, amount, sale_price)?;
        self.persist_asset(&self.assets[idx]).await;
        Ok(())
    }

    /// Remove a disposal, reopening its period when quantity returns.
    pub async fn delete_sale(&mut self, asset_id: Uuid, sale_id: Uuid) -> Result<(), CoreError> {
        let idx = self.asset_index(asset_id)?;
        self.ledger.delete_sale(&mut self.assets[idx], sale_id)?;
        self.persist_asset(&self.assets[idx]).await;
        Ok(())
    }

    // ── Prices ──────────────────────────────────────────────────────

    /// Refresh live prices for all held assets, sequentially (one
    /// request per instrument). Each resolved price is stamped on the
    /// freshest lot of the asset's active period and persisted. A
    /// failing instrument is skipped; the batch never fails. Returns
    /// how many assets got a fresh price.
    pub async fn refresh_prices(&mut self) -> usize {
        let mut updated = 0;
        for idx in 0..self.assets.len() {
            if self.assets[idx].active_period().is_none() {
                continue;
            }
            let price = match self.prices.resolve(&self.assets[idx]).await {
                Some(p) => p,
                None => continue,
            };
            let asset = &mut self.assets[idx];
            if let Some(period) = asset.active_period_mut() {
                if let Some(lot) = period.latest_lot_mut() {
                    lot.price = price;
                }
            }
            asset.sync_legacy_mirror();
            self.persist_asset(&self.assets[idx]).await;
            updated += 1;
        }
        updated
    }

    /// Drop cached quotes so the next refresh re-polls the sources.
    pub fn invalidate_price_cache(&mut self) {
        self.prices.invalidate_cache();
    }

    /// Check if a quote source is registered for an asset type.
    #[must_use]
    pub fn is_source_available(&self, asset_type: &AssetType) -> bool {
        self.prices.has_source_for(asset_type)
    }

    /// Names of the quote sources registered for an asset type.
    #[must_use]
    pub fn source_names(&self, asset_type: &AssetType) -> Vec<String> {
        self.prices.source_names(asset_type)
    }

    // ── Valuation ───────────────────────────────────────────────────

    /// Valuation of one asset, preferring a live price and falling back
    /// to the last stored lot price.
    pub async fn holding_summary(&mut self, asset_id: Uuid) -> Result<HoldingSummary, CoreError> {
        let idx = self.asset_index(asset_id)?;
        let live = self.prices.resolve(&self.assets[idx]).await;
        Ok(self.valuation.summarize(&self.assets[idx], live))
    }

    /// Valuation of one asset without touching the network: the stored
    /// lot price only.
    #[must_use]
    pub fn holding_summary_offline(&self, asset: &Asset) -> HoldingSummary {
        self.valuation.summarize(asset, None)
    }

    /// Portfolio-wide valuation with per-asset rows and totals.
    pub async fn portfolio_summary(&mut self) -> PortfolioSummary {
        let mut rows = Vec::with_capacity(self.assets.len());
        for idx in 0..self.assets.len() {
            let live = self.prices.resolve(&self.assets[idx]).await;
            rows.push(self.valuation.summarize(&self.assets[idx], live));
        }
        self.valuation.summarize_portfolio(rows)
    }

    // ── Assets ──────────────────────────────────────────────────────

    /// The user this tracker operates for.
    #[must_use]
    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// All tracked assets, in load/creation order.
    #[must_use]
    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    /// Get one asset by id.
    #[must_use]
    pub fn get_asset(&self, asset_id: Uuid) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id == asset_id)
    }

    /// Find an asset by (name, type); the name is matched uppercased.
    #[must_use]
    pub fn find_asset(&self, name: &str, asset_type: &AssetType) -> Option<&Asset> {
        let upper = name.to_uppercase();
        self.assets
            .iter()
            .find(|a| a.name == upper && &a.asset_type == asset_type)
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Set the home currency code (3 ASCII letters, e.g. "TRY", "USD").
    pub async fn set_home_currency(&mut self, currency: String) -> Result<(), CoreError> {
        let trimmed = currency.trim().to_uppercase();
        if trimmed.len() != 3 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(CoreError::Validation(format!(
                "Invalid currency code '{currency}': must be exactly 3 ASCII letters"
            )));
        }
        self.settings.home_currency = trimmed;
        self.persist_settings().await;
        Ok(())
    }

    /// Set the caller's price-refresh cadence hint, in seconds.
    pub async fn set_refresh_interval(&mut self, secs: u64) -> Result<(), CoreError> {
        if secs == 0 {
            return Err(CoreError::Validation(
                "refresh interval must be at least one second".into(),
            ));
        }
        self.settings.refresh_interval_secs = secs;
        self.persist_settings().await;
        Ok(())
    }

    // ── Internal ────────────────────────────────────────────────────

    fn asset_index(&self, asset_id: Uuid) -> Result<usize, CoreError> {
        self.assets
            .iter()
            .position(|a| a.id == asset_id)
            .ok_or_else(|| CoreError::AssetNotFound(asset_id.to_string()))
    }

    /// Follow-up store write for an already-applied mutation. Failures
    /// are logged, never surfaced: there is no rollback.
    async fn persist_asset(&self, asset: &Asset) {
        match serde_json::to_value(asset) {
            Ok(value) => {
                if let Err(e) = self
                    .store
                    .put(self.user_id, RecordKind::Asset, asset.id, value)
                    .await
                {
                    warn!(asset = %asset.name, error = %e, "asset write not persisted");
                }
            }
            Err(e) => {
                warn!(asset = %asset.name, error = %e, "asset record serialization failed");
            }
        }
    }

    async fn persist_settings(&self) {
        let id = Uuid::new_v5(&self.user_id, b"settings");
        match serde_json::to_value(&self.settings) {
            Ok(value) => {
                if let Err(e) = self
                    .store
                    .put(self.user_id, RecordKind::Settings, id, value)
                    .await
                {
                    warn!(error = %e, "settings write not persisted");
                }
            }
            Err(e) => {
                warn!(error = %e, "settings serialization failed");
            }
        }
    }
}
