use crate::models::asset::Asset;
use crate::models::summary::{HoldingSummary, PortfolioSummary};

/// Computes holding metrics from the active period ONLY.
///
/// Closed periods are excluded deliberately: repurchasing after a full
/// exit starts a fresh average cost, unaffected by the prior cycle's
/// gains or losses.
pub struct ValuationService;

impl ValuationService {
    pub fn new() -> Self {
        Self
    }

    /// Valuation of one asset. `live_price` (when positive) overrides the
    /// stored lot price; an asset with no open period yields all zeros.
    pub fn summarize(&self, asset: &Asset, live_price: Option<f64>) -> HoldingSummary {
        let mut summary = HoldingSummary {
            asset_id: asset.id,
            name: asset.name.clone(),
            asset_type: asset.asset_type.clone(),
            total_amount: 0.0,
            avg_cost: 0.0,
            current_price: 0.0,
            live_price: false,
            total_value: 0.0,
            total_profit: 0.0,
            profit_pct: 0.0,
        };

        let period = match asset.active_period() {
            Some(p) => p,
            None => return summary,
        };

        summary.total_amount = period.net_amount();
        summary.avg_cost = period.avg_cost();

        match live_price.filter(|p| *p > 0.0) {
            Some(price) => {
                summary.current_price = price;
                summary.live_price = true;
            }
            None => {
                summary.current_price = period.latest_lot_price().unwrap_or(0.0);
            }
        }

        summary.total_value = summary.total_amount * summary.current_price;
        let cost_basis = summary.total_amount * summary.avg_cost;
        summary.total_profit = summary.total_value - cost_basis;
        summary.profit_pct = if cost_basis != 0.0 {
            summary.total_profit / cost_basis * 100.0
        } else {
            0.0
        };

        summary
    }

    /// Roll per-asset summaries up into portfolio totals.
    pub fn summarize_portfolio(&self, holdings: Vec<HoldingSummary>) -> PortfolioSummary {
        let total_value: f64 = holdings.iter().map(|h| h.total_value).sum();
        let total_cost: f64 = holdings
            .iter()
            .map(|h| h.total_amount * h.avg_cost)
            .sum();
        let total_profit = total_value - total_cost;
        let profit_pct = if total_cost != 0.0 {
            total_profit / total_cost * 100.0
        } else {
            0.0
        };

        PortfolioSummary {
            holdings,
            total_value,
            total_cost,
            total_profit,
            profit_pct,
        }
    }
}

impl Default for ValuationService {
    fn default() -> Self {
        Self::new()
    }
}
