use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CoreError;

/// The kind of a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Tracked instruments with their period histories
    Asset,
    /// Per-user settings
    Settings,
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordKind::Asset => write!(f, "asset"),
            RecordKind::Settings => write!(f, "settings"),
        }
    }
}

/// Per-user document store the core persists through.
///
/// Documents are plain JSON values keyed by (user, kind, id); writes
/// overwrite the full document (last write wins). The core treats store
/// failures as non-fatal: mutations are already applied in memory when
/// the write is issued.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All records of one kind for one user, in stable order.
    async fn list(
        &self,
        user_id: Uuid,
        kind: RecordKind,
    ) -> Result<Vec<serde_json::Value>, CoreError>;

    /// Insert or overwrite one record.
    async fn put(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        id: Uuid,
        record: serde_json::Value,
    ) -> Result<(), CoreError>;

    /// Remove one record. Removing an absent record is not an error.
    async fn delete(&self, user_id: Uuid, kind: RecordKind, id: Uuid) -> Result<(), CoreError>;
}
