use serde::{Deserialize, Serialize};

/// Per-user settings, persisted alongside the asset records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Home currency code all valuations are expressed in (e.g., "TRY")
    pub home_currency: String,

    /// Cadence hint for the caller's periodic price-refresh timer
    pub refresh_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            home_currency: "TRY".to_string(),
            refresh_interval_secs: 60,
        }
    }
}
