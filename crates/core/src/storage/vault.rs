use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::encryption::{self, KdfParams};
use super::format;
use super::store::{RecordKind, RecordStore};
use crate::errors::CoreError;

/// File-backed `RecordStore`: one encrypted vault file per user.
///
/// Flow per write: document map → bincode → AES-256-GCM under an
/// Argon2id key derived from the user's secret passphrase → vault
/// container bytes. Every save uses a fresh salt and nonce.
///
/// Records are stored as JSON text inside the document so the vault
/// payload stays bincode-friendly.
pub struct VaultStore {
    dir: PathBuf,
    passphrase: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultDocument {
    records: HashMap<RecordKind, HashMap<Uuid, String>>,
}

impl VaultStore {
    /// Open a vault store rooted at `dir`. Vault files are created
    /// lazily on first write.
    pub fn new(dir: impl Into<PathBuf>, passphrase: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            passphrase: passphrase.into(),
        }
    }

    fn vault_path(&self, user_id: Uuid) -> PathBuf {
        self.dir.join(format!("{user_id}.vault"))
    }

    fn load_document(&self, path: &Path) -> Result<VaultDocument, CoreError> {
        if !path.exists() {
            return Ok(VaultDocument::default());
        }
        let bytes = std::fs::read(path)?;
        let (header, ciphertext) = format::read_vault(&bytes)?;
        let key = encryption::derive_key(&self.passphrase, &header.salt, &header.kdf_params)?;
        let plaintext = encryption::open(ciphertext, &key, &header.nonce)?;
        let document = bincode::deserialize(&plaintext)
            .map_err(|e| CoreError::Deserialization(format!("Corrupt vault payload: {e}")))?;
        Ok(document)
    }

    fn save_document(&self, path: &Path, document: &VaultDocument) -> Result<(), CoreError> {
        let plaintext = bincode::serialize(document)?;
        let salt = encryption::random_bytes::<16>()?;
        let nonce = encryption::random_bytes::<12>()?;
        let kdf_params = KdfParams::default();
        let key = encryption::derive_key(&self.passphrase, &salt, &kdf_params)?;
        let ciphertext = encryption::seal(&plaintext, &key, &nonce)?;
        let bytes = format::write_vault(&kdf_params, &salt, &nonce, &ciphertext);

        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for VaultStore {
    async fn list(
        &self,
        user_id: Uuid,
        kind: RecordKind,
    ) -> Result<Vec<serde_json::Value>, CoreError> {
        let document = self.load_document(&self.vault_path(user_id))?;
        let mut entries: Vec<(&Uuid, &String)> = document
            .records
            .get(&kind)
            .map(|records| records.iter().collect())
            .unwrap_or_default();
        // Stable id order, matching the memory store.
        entries.sort_by_key(|(id, _)| **id);

        entries
            .into_iter()
            .map(|(_, raw)| serde_json::from_str(raw).map_err(CoreError::from))
            .collect()
    }

    async fn put(
        &self,
        user_id: Uuid,
        kind: RecordKind,
        id: Uuid,
        record: serde_json::Value,
    ) -> Result<(), CoreError> {
        let path = self.vault_path(user_id);
        let mut document = self.load_document(&path)?;
        document
            .records
            .entry(kind)
            .or_default()
            .insert(id, record.to_string());
        self.save_document(&path, &document)
    }

    async fn delete(&self, user_id: Uuid, kind: RecordKind, id: Uuid) -> Result<(), CoreError> {
        let path = self.vault_path(user_id);
        if !path.exists() {
            return Ok(());
        }
        let mut document = self.load_document(&path)?;
        if let Some(records) = document.records.get_mut(&kind) {
            records.remove(&id);
        }
        self.save_document(&path, &document)
    }
}
