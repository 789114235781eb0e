use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::lot::{Lot, Sale};

/// A maximal contiguous ownership span for one asset: opened by the first
/// purchase, closed the instant net quantity reaches zero.
///
/// Closed periods are historical. Their lots and sales are never merged
/// with a later reopening's cost basis — repurchasing after a full exit
/// starts a fresh average cost (cost isolation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier
    pub id: Uuid,

    /// Purchases within this period, oldest first
    pub lots: Vec<Lot>,

    /// Disposals within this period, oldest first
    pub sales: Vec<Sale>,

    /// None while open; the closing sale's timestamp once net quantity
    /// hits zero
    pub closed_at: Option<DateTime<Utc>>,
}

impl Period {
    /// Open a fresh, empty period.
    pub fn open() -> Self {
        Self {
            id: Uuid::new_v4(),
            lots: Vec::new(),
            sales: Vec::new(),
            closed_at: None,
        }
    }

    /// Total quantity purchased within this period.
    pub fn purchased_amount(&self) -> f64 {
        self.lots.iter().map(|l| l.amount).sum()
    }

    /// Total quantity sold within this period.
    pub fn sold_amount(&self) -> f64 {
        self.sales.iter().map(|s| s.amount).sum()
    }

    /// Net quantity still held: purchased minus sold.
    pub fn net_amount(&self) -> f64 {
        self.purchased_amount() - self.sold_amount()
    }

    /// True when the period's net quantity has reached zero (or below)
    /// and it should be closed.
    pub fn is_exhausted(&self) -> bool {
        self.net_amount() <= 0.0
    }

    /// Quantity-weighted mean unit cost across this period's lots,
    /// or 0 with no lots.
    pub fn avg_cost(&self) -> f64 {
        let total_amount = self.purchased_amount();
        if total_amount <= 0.0 {
            return 0.0;
        }
        let total_cost: f64 = self.lots.iter().map(|l| l.amount * l.cost).sum();
        total_cost / total_amount
    }

    /// The `price` field of the most recently added lot; the first lot
    /// wins when timestamps tie. None with no lots.
    pub fn latest_lot_price(&self) -> Option<f64> {
        let mut latest: Option<&Lot> = None;
        for lot in &self.lots {
            match latest {
                Some(best) if lot.added_at > best.added_at => latest = Some(lot),
                Some(_) => {}
                None => latest = Some(lot),
            }
        }
        latest.map(|l| l.price)
    }

    /// The lot most recently added to this period, if any.
    pub fn latest_lot_mut(&mut self) -> Option<&mut Lot> {
        let mut best: Option<usize> = None;
        for (idx, lot) in self.lots.iter().enumerate() {
            match best {
                Some(b) if lot.added_at > self.lots[b].added_at => best = Some(idx),
                Some(_) => {}
                None => best = Some(idx),
            }
        }
        best.map(move |idx| &mut self.lots[idx])
    }
}
