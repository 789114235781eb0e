use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One purchase event: a discrete batch of an asset bought at a single
/// unit cost. Carries its own cost basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    /// Unique identifier
    pub id: Uuid,

    /// Quantity purchased (always positive)
    pub amount: f64,

    /// Unit cost basis in the home currency at purchase time
    pub cost: f64,

    /// Last-known unit market price; updated by price refreshes
    pub price: f64,

    /// Purchase timestamp
    pub added_at: DateTime<Utc>,
}

impl Lot {
    pub fn new(amount: f64, cost: f64, price: f64, added_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            cost,
            price,
            added_at,
        }
    }
}

/// One disposal event.
///
/// `avg_cost` is the weighted-average cost of the position at the moment
/// of sale — frozen then, never recomputed, so historical P/L does not
/// drift when later edits change unrelated lots. `profit` is derived from
/// it once and stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    /// Unique identifier
    pub id: Uuid,

    /// Quantity sold (always positive)
    pub amount: f64,

    /// Unit price realized
    pub sale_price: f64,

    /// Weighted-average unit cost captured at sale time (frozen)
    pub avg_cost: f64,

    /// `amount * sale_price - amount * avg_cost`, computed once
    pub profit: f64,

    /// Disposal timestamp
    pub sold_at: DateTime<Utc>,
}

impl Sale {
    pub fn new(amount: f64, sale_price: f64, avg_cost: f64, sold_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            amount,
            sale_price,
            avg_cost,
            profit: amount * sale_price - amount * avg_cost,
            sold_at,
        }
    }

    /// Recompute `profit` from the current amount/price and the frozen
    /// `avg_cost`. Used after a sale edit.
    pub fn recompute_profit(&mut self) {
        self.profit = self.amount * self.sale_price - self.amount * self.avg_cost;
    }
}
