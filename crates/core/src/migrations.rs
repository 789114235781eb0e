use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::{Asset, AssetType};
use crate::models::lot::{Lot, Sale};
use crate::models::period::Period;

/// Persisted asset-record shape version written by this library.
///
/// - v0 — flat: a single `amount`/`cost`/`price` at the top level.
/// - v1 — lot-based: `lots` and `sales`, no periods.
/// - v2 — period-based (current).
pub const CURRENT_SCHEMA_VERSION: u16 = 2;

/// An asset record as read from the store, permissive enough to hold any
/// shape generation. Records written before versioning existed carry no
/// `schema_version` field and default to 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAssetRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default)]
    pub schema_version: u16,

    // v0 flat fields
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,

    // v1 fields (also the legacy mirror on v2 records)
    #[serde(default)]
    pub lots: Vec<Lot>,
    #[serde(default)]
    pub sales: Vec<Sale>,

    // v2 fields
    #[serde(default)]
    pub periods: Vec<Period>,
    #[serde(default)]
    pub current_period_id: Option<Uuid>,
}

/// Parse a stored JSON document and upgrade it to the current shape.
pub fn parse_asset(value: serde_json::Value) -> Result<Asset, CoreError> {
    upgrade(serde_json::from_value(value)?)
}

/// Upgrade a raw record to a current-shape `Asset`, dispatching on its
/// `schema_version`. Pure and idempotent: upgrading a record produced by
/// serializing the result is a no-op.
pub fn upgrade(record: RawAssetRecord) -> Result<Asset, CoreError> {
    match record.schema_version {
        0 => upgrade_flat(record),
        1 => upgrade_lot_based(record),
        CURRENT_SCHEMA_VERSION => finish(record),
        v => Err(CoreError::UnsupportedSchemaVersion(v)),
    }
}

/// v0 → v1: wrap the flat amount/cost/price into a single lot.
fn upgrade_flat(mut record: RawAssetRecord) -> Result<Asset, CoreError> {
    let amount = record.amount.ok_or_else(|| {
        CoreError::Deserialization(format!("flat asset record {} has no amount", record.id))
    })?;
    let cost = record.cost.unwrap_or(0.0);
    let lot = Lot {
        // Derived from the asset id so repeated upgrades of the same
        // stored record agree on the lot identity.
        id: Uuid::new_v5(&record.id, b"flat-lot"),
        amount,
        cost,
        price: record.price.unwrap_or(cost),
        added_at: record.added_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    };
    record.lots = vec![lot];
    record.sales = Vec::new();
    record.schema_version = 1;
    upgrade_lot_based(record)
}

/// v1 → v2: the entire lot/sale history becomes one implicit period,
/// closed iff its net quantity is already zero.
fn upgrade_lot_based(mut record: RawAssetRecord) -> Result<Asset, CoreError> {
    if record.lots.is_empty() && record.sales.is_empty() {
        record.periods = Vec::new();
    } else {
        let mut period = Period {
            id: Uuid::new_v5(&record.id, b"legacy-period"),
            lots: std::mem::take(&mut record.lots),
            sales: std::mem::take(&mut record.sales),
            closed_at: None,
        };
        if period.is_exhausted() {
            period.closed_at = Some(last_activity(&period));
        }
        record.periods = vec![period];
    }
    record.schema_version = CURRENT_SCHEMA_VERSION;
    finish(record)
}

/// v2: map the record onto `Asset`, recomputing the derived fields
/// (active-period pointer, legacy mirror) rather than trusting them.
fn finish(record: RawAssetRecord) -> Result<Asset, CoreError> {
    let mut asset = Asset {
        id: record.id,
        name: record.name.to_uppercase(),
        asset_type: record.asset_type,
        schema_version: CURRENT_SCHEMA_VERSION,
        periods: record.periods,
        current_period_id: None,
        lots: Vec::new(),
        sales: Vec::new(),
    };
    asset.current_period_id = asset.active_period().map(|p| p.id);
    asset.sync_legacy_mirror();
    Ok(asset)
}

fn last_activity(period: &Period) -> DateTime<Utc> {
    let last_sale = period.sales.iter().map(|s| s.sold_at).max();
    let last_lot = period.lots.iter().map(|l| l.added_at).max();
    last_sale
        .into_iter()
        .chain(last_lot)
        .max()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
