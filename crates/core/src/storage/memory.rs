use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use uuid::Uuid;

use super::store::{RecordKind, RecordStore};
use crate::errors::CoreError;

/// In-memory `RecordStore`: tests, previews, and throwaway sessions.
/// Records are kept per (user, kind) in id order.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<(Uuid, RecordKind), BTreeMap<Uuid, serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of records across all users and kinds.
    pub fn len(&self) -> usize {
        self.records
            .read()
            .map(|map| map.values().map(|v| v.len()).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn list(
        &self,
        user_id: Uuid,
        kind: RecordKind,
    ) -> Result<Vec<serde_json::Value>, CoreError> {
        let map = self
            .records
            .read()
            .map_err(|_| CoreError::Persistence("memory store lock poisoned".into()))?;
        Ok(map
            .get(&(user_id, kind))
            .map(|records| records.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn put(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        id: Uuid,
        record: serde_json::Value,
    ) -> Result<(), CoreError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| CoreError::Persistence("memory store lock poisoned".into()))?;
        map.entry((user_id, kind)).or_default().insert(id, record);
        Ok(())
    }

    async fn delete(&self, user_id: Uuid, kind: RecordKind, id: Uuid) -> Result<(), CoreError> {
        let mut map = self
            .records
            .write()
            .map_err(|_| CoreError::Persistence("memory store lock poisoned".into()))?;
        if let Some(records) = map.get_mut(&(user_id, kind)) {
            records.remove(&id);
        }
        Ok(())
    }
}
