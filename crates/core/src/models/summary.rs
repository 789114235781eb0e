use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::asset::AssetType;

/// Valuation of a single asset, computed from its active period only.
/// All-zero for an asset whose every period is closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub asset_id: Uuid,
    pub name: String,
    pub asset_type: AssetType,

    /// Net quantity held: purchased minus sold in the active period
    pub total_amount: f64,

    /// Quantity-weighted mean unit cost across the active period's lots
    pub avg_cost: f64,

    /// Unit price used for valuation (live when available, else the most
    /// recently added lot's stored price)
    pub current_price: f64,

    /// True when `current_price` came from a live quote source
    pub live_price: bool,

    /// `total_amount * current_price`
    pub total_value: f64,

    /// `total_value - total_amount * avg_cost`
    pub total_profit: f64,

    /// `total_profit / (total_amount * avg_cost) * 100`, 0 when the
    /// denominator is 0
    pub profit_pct: f64,
}

/// Portfolio-wide valuation: one row per asset plus totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub holdings: Vec<HoldingSummary>,

    /// Sum of holding values
    pub total_value: f64,

    /// Sum of holding cost bases (`total_amount * avg_cost` per asset)
    pub total_cost: f64,

    /// `total_value - total_cost`
    pub total_profit: f64,

    /// `total_profit / total_cost * 100`, 0 when `total_cost` is 0
    pub profit_pct: f64,
}
