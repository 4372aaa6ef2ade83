//! Side channel for game secrets.
//!
//! Public state is broadcast; secrets are not. A vault keeps each room's
//! [`SecretStore`] so a restored game can have its secrets re-injected.

use async_trait::async_trait;
use derive_more::{Display, Error};
use parlor_rules::SecretStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, error, info, instrument};

/// Vault read or write failure.
#[derive(Debug, Clone, Display, Error)]
#[display("Vault error: {} at {}:{}", message, file, line)]
pub struct VaultError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl VaultError {
    /// Creates a new vault error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        error!(error_message = %message, "Vault error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Stores secrets per room.
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Replaces the secrets kept for `room`.
    async fn save(&self, room: &str, secrets: &SecretStore) -> Result<(), VaultError>;

    /// Secrets kept for `room`, if any.
    async fn load(&self, room: &str) -> Result<Option<SecretStore>, VaultError>;

    /// Forgets `room`. Discarding an unknown room is not an error.
    async fn discard(&self, room: &str) -> Result<(), VaultError>;
}

/// Process-local vault. Secrets die with the process.
#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: RwLock<HashMap<String, SecretStore>>,
}

impl MemoryVault {
    /// Empty vault.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SecretVault for MemoryVault {
    async fn save(&self, room: &str, secrets: &SecretStore) -> Result<(), VaultError> {
        self.entries
            .write()
            .await
            .insert(room.to_string(), secrets.clone());
        Ok(())
    }

    async fn load(&self, room: &str) -> Result<Option<SecretStore>, VaultError> {
        Ok(self.entries.read().await.get(room).cloned())
    }

    async fn discard(&self, room: &str) -> Result<(), VaultError> {
        self.entries.write().await.remove(room);
        Ok(())
    }
}

/// One JSON file per room under a directory.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct FileVault {
    dir: PathBuf,
}

impl FileVault {
    /// Vault rooted at `dir`, created if missing.
    #[instrument(skip(dir), fields(dir = %dir.as_ref().display()))]
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, VaultError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| VaultError::new(format!("Failed to create vault dir: {}", e)))?;
        info!("File vault opened");
        Ok(Self { dir })
    }

    /// Path of a room's file. Room ids are restricted so they cannot escape
    /// the vault directory.
    fn path_for(&self, room: &str) -> Result<PathBuf, VaultError> {
        let safe = !room.is_empty()
            && room
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !safe {
            return Err(VaultError::new(format!("Invalid room id {room:?}")));
        }
        Ok(self.dir.join(format!("{room}.json")))
    }
}

#[async_trait]
impl SecretVault for FileVault {
    #[instrument(skip(self, secrets))]
    async fn save(&self, room: &str, secrets: &SecretStore) -> Result<(), VaultError> {
        let path = self.path_for(room)?;
        let json = serde_json::to_vec(secrets)
            .map_err(|e| VaultError::new(format!("Failed to serialize secrets: {}", e)))?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| VaultError::new(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!(path = %path.display(), "Secrets saved");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn load(&self, room: &str) -> Result<Option<SecretStore>, VaultError> {
        let path = self.path_for(room)?;
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No secrets stored for room");
                return Ok(None);
            }
            Err(e) => {
                return Err(VaultError::new(format!(
                    "Failed to read {}: {}",
                    path.display(),
                    e
                )));
            }
        };
        let secrets = serde_json::from_slice(&bytes)
            .map_err(|e| VaultError::new(format!("Failed to parse secrets: {}", e)))?;
        Ok(Some(secrets))
    }

    #[instrument(skip(self))]
    async fn discard(&self, room: &str) -> Result<(), VaultError> {
        let path = self.path_for(room)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(VaultError::new(format!(
                "Failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_rules::games::motus::MotusSecrets;

    fn secrets() -> SecretStore {
        SecretStore::Motus(MotusSecrets {
            target: Some("MAISON".to_string()),
        })
    }

    #[tokio::test]
    async fn test_memory_vault_roundtrip() {
        let vault = MemoryVault::new();
        assert!(vault.load("r1").await.unwrap().is_none());
        vault.save("r1", &secrets()).await.unwrap();
        assert_eq!(vault.load("r1").await.unwrap(), Some(secrets()));
        vault.discard("r1").await.unwrap();
        assert!(vault.load("r1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_vault_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::open(dir.path()).await.unwrap();
        vault.save("room-7", &secrets()).await.unwrap();

        let reopened = FileVault::open(dir.path()).await.unwrap();
        assert_eq!(reopened.load("room-7").await.unwrap(), Some(secrets()));
        reopened.discard("room-7").await.unwrap();
        reopened.discard("room-7").await.unwrap();
        assert!(reopened.load("room-7").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_vault_rejects_path_tricks() {
        let dir = tempfile::tempdir().unwrap();
        let vault = FileVault::open(dir.path()).await.unwrap();
        assert!(vault.save("../escape", &secrets()).await.is_err());
        assert!(vault.load("").await.is_err());
    }
}
