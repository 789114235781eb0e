use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::Asset;
use crate::models::lot::{Lot, Sale};
use crate::models::period::Period;

/// Outcome of a lot deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotRemoval {
    /// The lot was removed; the asset still has at least one lot.
    Removed,
    /// The last lot is gone — the caller must delete the whole asset.
    AssetEmptied,
}

/// Records purchases and disposals against an asset's period history.
///
/// Pure business logic — no I/O. Every operation validates before it
/// mutates: an `Err` return means the asset is untouched. After any
/// successful mutation the legacy `lots`/`sales` mirror is re-synced.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Record a purchase. Opens a new period implicitly when every
    /// existing period is closed (or the asset has none yet).
    pub fn add_lot(
        &self,
        asset: &mut Asset,
        amount: f64,
        cost: f64,
        price: f64,
        added_at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        if amount <= 0.0 {
            return Err(CoreError::Validation(
                "lot amount must be positive".into(),
            ));
        }
        if cost <= 0.0 {
            return Err(CoreError::Validation("lot cost must be positive".into()));
        }

        let lot = Lot::new(amount, cost, price, added_at);
        let id = lot.id;

        match asset.active_period_mut() {
            Some(period) => period.lots.push(lot),
            None => {
                let mut period = Period::open();
                asset.current_period_id = Some(period.id);
                period.lots.push(lot);
                asset.periods.push(period);
            }
        }

        asset.sync_legacy_mirror();
        Ok(id)
    }

    /// Edit a purchase in place (same lot id), wherever it lives.
    ///
    /// Besides positivity, the containing period's sold total must still
    /// fit under its purchased total with the new amount.
    pub fn edit_lot(
        &self,
        asset: &mut Asset,
        lot_id: Uuid,
        amount: f64,
        cost: f64,
        added_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if amount <= 0.0 {
            return Err(CoreError::Validation(
                "lot amount must be positive".into(),
            ));
        }
        if cost <= 0.0 {
            return Err(CoreError::Validation("lot cost must be positive".into()));
        }

        let period = asset
            .periods
            .iter_mut()
            .find(|p| p.lots.iter().any(|l| l.id == lot_id))
            .ok_or_else(|| CoreError::LotNotFound(lot_id.to_string()))?;

        let sold = period.sold_amount();
        let old_amount = period
            .lots
            .iter()
            .find(|l| l.id == lot_id)
            .map(|l| l.amount)
            .unwrap_or(0.0);
        let new_purchased = period.purchased_amount() - old_amount + amount;
        if sold > new_purchased {
            return Err(CoreError::InsufficientQuantity {
                requested: sold,
                available: new_purchased,
            });
        }

        if let Some(lot) = period.lots.iter_mut().find(|l| l.id == lot_id) {
            lot.amount = amount;
            lot.cost = cost;
            lot.added_at = added_at;
        }

        asset.sync_legacy_mirror();
        Ok(())
    }

    /// Delete a purchase. Signals `AssetEmptied` when the asset's last
    /// lot goes — the caller is expected to delete the asset entirely.
    pub fn delete_lot(&self, asset: &mut Asset, lot_id: Uuid) -> Result<LotRemoval, CoreError> {
        let period_idx = asset
            .periods
            .iter()
            .position(|p| p.lots.iter().any(|l| l.id == lot_id))
            .ok_or_else(|| CoreError::LotNotFound(lot_id.to_string()))?;

        {
            let period = &asset.periods[period_idx];
            let lot_amount = period
                .lots
                .iter()
                .find(|l| l.id == lot_id)
                .map(|l| l.amount)
                .unwrap_or(0.0);
            let sold = period.sold_amount();
            let remaining = period.purchased_amount() - lot_amount;
            if sold > remaining {
                return Err(CoreError::InsufficientQuantity {
                    requested: sold,
                    available: remaining,
                });
            }
        }

        let period = &mut asset.periods[period_idx];
        period.lots.retain(|l| l.id != lot_id);
        if period.lots.is_empty() && period.sales.is_empty() {
            asset.periods.remove(period_idx);
        }
        asset.current_period_id = asset.active_period().map(|p| p.id);
        asset.sync_legacy_mirror();

        if asset.lot_count() == 0 {
            Ok(LotRemoval::AssetEmptied)
        } else {
            Ok(LotRemoval::Removed)
        }
    }

    /// Record a disposal against the active period. Freezes the pre-sale
    /// weighted-average cost on the sale and closes the period the
    /// instant net quantity reaches zero.
    pub fn record_sale(
        &self,
        asset: &mut Asset,
        amount: f64,
        sale_price: f64,
        sold_at: DateTime<Utc>,
    ) -> Result<Uuid, CoreError> {
        if amount <= 0.0 {
            return Err(CoreError::Validation(
                "sale amount must be positive".into(),
            ));
        }
        if sale_price <= 0.0 {
            return Err(CoreError::Validation(
                "sale price must be positive".into(),
            ));
        }

        let available = asset.active_period().map(|p| p.net_amount()).unwrap_or(0.0);
        if amount > available {
            return Err(CoreError::InsufficientQuantity {
                requested: amount,
                available,
            });
        }

        // amount > 0 and amount <= available imply an open period here.
        let period = asset
            .active_period_mut()
            .ok_or_else(|| CoreError::InsufficientQuantity {
                requested: amount,
                available: 0.0,
            })?;

        let avg_cost = period.avg_cost();
        let sale = Sale::new(amount, sale_price, avg_cost, sold_at);
        let id = sale.id;
        period.sales.push(sale);

        if period.is_exhausted() {
            period.closed_at = Some(sold_at);
            asset.current_period_id = None;
        }

        asset.sync_legacy_mirror();
        Ok(id)
    }

    /// Remove a disposal. A closed period whose net quantity turns
    /// positive again is reopened.
    pub fn delete_sale(&self, asset: &mut Asset, sale_id: Uuid) -> Result<(), CoreError> {
        let period = asset
            .periods
            .iter_mut()
            .find(|p| p.sales.iter().any(|s| s.id == sale_id))
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        period.sales.retain(|s| s.id != sale_id);
        if period.closed_at.is_some() && !period.is_exhausted() {
            period.closed_at = None;
        }

        self.repair_open_periods(asset);
        asset.sync_legacy_mirror();
        Ok(())
    }

    /// Edit a disposal. `profit` is recomputed from the sale's frozen
    /// `avg_cost` — the average cost itself is never recalculated.
    pub fn edit_sale(
        &self,
        asset: &mut Asset,
        sale_id: Uuid,
        amount: f64,
        sale_price: f64,
    ) -> Result<(), CoreError> {
        if amount <= 0.0 {
            return Err(CoreError::Validation(
                "sale amount must be positive".into(),
            ));
        }
        if sale_price <= 0.0 {
            return Err(CoreError::Validation(
                "sale price must be positive".into(),
            ));
        }

        let period = asset
            .periods
            .iter_mut()
            .find(|p| p.sales.iter().any(|s| s.id == sale_id))
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        let old_amount = period
            .sales
            .iter()
            .find(|s| s.id == sale_id)
            .map(|s| s.amount)
            .unwrap_or(0.0);
        let others_sold = period.sold_amount() - old_amount;
        let purchased = period.purchased_amount();
        if others_sold + amount > purchased {
            return Err(CoreError::InsufficientQuantity {
                requested: amount,
                available: purchased - others_sold,
            });
        }

        let mut closing_stamp = None;
        if let Some(sale) = period.sales.iter_mut().find(|s| s.id == sale_id) {
            sale.amount = amount;
            sale.sale_price = sale_price;
            sale.recompute_profit();
            closing_stamp = Some(sale.sold_at);
        }

        // The edit can flip the period's exhaustion either way.
        if period.is_exhausted() {
            if period.closed_at.is_none() {
                period.closed_at = closing_stamp;
            }
        } else {
            period.closed_at = None;
        }

        self.repair_open_periods(asset);
        asset.sync_legacy_mirror();
        Ok(())
    }

    /// Restore the at-most-one-open-period invariant after a reopen.
    ///
    /// More than one open period cannot arise through normal flows; it
    /// indicates corrupted data (e.g., racing full-record writes). The
    /// breach is reported, then all open periods are merged into a single
    /// new one — correct for quantities and cost, lossy of period
    /// identity.
    fn repair_open_periods(&self, asset: &mut Asset) {
        let open_count = asset.periods.iter().filter(|p| p.closed_at.is_none()).count();
        if open_count > 1 {
            warn!(
                asset = %asset.name,
                open_periods = open_count,
                "multiple open periods detected; merging into one"
            );
            let mut lots = Vec::new();
            let mut sales = Vec::new();
            asset.periods.retain(|p| {
                if p.closed_at.is_none() {
                    lots.extend(p.lots.iter().cloned());
                    sales.extend(p.sales.iter().cloned());
                    false
                } else {
                    true
                }
            });
            lots.sort_by_key(|l: &Lot| l.added_at);
            sales.sort_by_key(|s: &Sale| s.sold_at);
            let mut merged = Period::open();
            merged.lots = lots;
            merged.sales = sales;
            asset.periods.push(merged);
        }
        asset.current_period_id = asset.active_period().map(|p| p.id);
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
