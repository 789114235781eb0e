use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lot::{Lot, Sale};
use super::period::Period;

/// The category of a tracked instrument.
/// Determines which quote source resolves its live price.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetType {
    /// Listed equities (THYAO, AAPL, etc.) — per-symbol quote endpoint
    Stock,
    /// Mutual funds (AFA, TGE, etc.) — fund registry page
    Fund,
    /// Gram gold — fixed key in the FX table
    Gold,
    /// Foreign currency (USD, EUR) — substring match against the FX table
    Currency,
}

impl std::fmt::Display for AssetType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetType::Stock => write!(f, "Stock"),
            AssetType::Fund => write!(f, "Fund"),
            AssetType::Gold => write!(f, "Gold"),
            AssetType::Currency => write!(f, "Currency"),
        }
    }
}

/// One tracked instrument and its full purchase/disposal history,
/// segmented into holding periods.
///
/// `lots` and `sales` are legacy mirrors of the active period's contents,
/// kept for consumers that predate period segmentation. They are re-synced
/// after every ledger mutation and are empty while no period is open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier
    pub id: Uuid,

    /// Ticker / fund code, uppercased (e.g., "THYAO", "AFA", "USD")
    pub name: String,

    /// Asset category — determines the quote source
    #[serde(rename = "type")]
    pub asset_type: AssetType,

    /// Persisted-shape version; see `migrations`
    pub schema_version: u16,

    /// All holding periods, oldest first
    pub periods: Vec<Period>,

    /// Id of the open period, if any
    pub current_period_id: Option<Uuid>,

    /// Legacy mirror of the active period's lots
    #[serde(default)]
    pub lots: Vec<Lot>,

    /// Legacy mirror of the active period's sales
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl Asset {
    /// Create an asset with no history yet. The first `add_lot` opens
    /// the initial period.
    pub fn new(name: impl Into<String>, asset_type: AssetType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into().to_uppercase(),
            asset_type,
            schema_version: crate::migrations::CURRENT_SCHEMA_VERSION,
            periods: Vec::new(),
            current_period_id: None,
            lots: Vec::new(),
            sales: Vec::new(),
        }
    }

    /// The single open period, or None when fully liquidated.
    pub fn active_period(&self) -> Option<&Period> {
        self.periods.iter().find(|p| p.closed_at.is_none())
    }

    pub fn active_period_mut(&mut self) -> Option<&mut Period> {
        self.periods.iter_mut().find(|p| p.closed_at.is_none())
    }

    /// Total number of lots across all periods.
    pub fn lot_count(&self) -> usize {
        self.periods.iter().map(|p| p.lots.len()).sum()
    }

    /// Copy the active period's contents into the legacy `lots`/`sales`
    /// mirrors. Must be called after every mutation of `periods`.
    pub fn sync_legacy_mirror(&mut self) {
        match self.active_period().map(|p| (p.lots.clone(), p.sales.clone())) {
            Some((lots, sales)) => {
                self.lots = lots;
                self.sales = sales;
            }
            None => {
                self.lots.clear();
                self.sales.clear();
            }
        }
    }
}
