use std::sync::Arc;

use anyhow::Context;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

use crate::auth::reset_codes::ResetCode;
use crate::games::repo_types::GameResult;
use crate::storage::KeyValueStore;
use crate::users::repo_types::User;

pub const USERS_KEY: &str = "tokenquest_users";
pub const CURRENT_USER_KEY: &str = "tokenquest_current_user";
pub const GAME_RESULTS_KEY: &str = "tokenquest_game_results";
pub const RESET_CODES_KEY: &str = "tokenquest_reset_codes";

/// Typed JSON collections on top of a key-value backend.
///
/// Mutating callers take [`Database::lock`] for the whole read-modify-write
/// sequence; plain reads don't need it.
pub struct Database {
    kv: Arc<dyn KeyValueStore>,
    writer: Mutex<()>,
}

impl Database {
    pub async fn open(kv: Arc<dyn KeyValueStore>) -> anyhow::Result<Self> {
        let db = Self {
            kv,
            writer: Mutex::new(()),
        };
        db.init().await?;
        Ok(db)
    }

    /// Makes every collection well-formed, resetting anything missing or corrupt.
    pub async fn init(&self) -> anyhow::Result<()> {
        self.ensure_array::<User>(USERS_KEY).await?;
        self.ensure_array::<GameResult>(GAME_RESULTS_KEY).await?;
        self.ensure_array::<ResetCode>(RESET_CODES_KEY).await?;

        if let Some(raw) = self.kv.get(CURRENT_USER_KEY).await? {
            if serde_json::from_str::<User>(&raw).is_err() {
                warn!(key = CURRENT_USER_KEY, "corrupt session snapshot; clearing");
                self.kv.remove(CURRENT_USER_KEY).await?;
            }
        }
        debug!("database initialized");
        Ok(())
    }

    async fn ensure_array<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<()> {
        let healthy = match self.kv.get(key).await? {
            Some(raw) => {
                let ok = serde_json::from_str::<Vec<T>>(&raw).is_ok();
                if !ok {
                    warn!(key, "corrupt collection; resetting to empty");
                }
                ok
            }
            None => false,
        };
        if !healthy {
            self.kv.set(key, "[]".to_string()).await?;
        }
        Ok(())
    }

    /// Parsed value under `key`, or the empty default when absent or unreadable.
    pub async fn read<T: DeserializeOwned + Default>(&self, key: &str) -> anyhow::Result<T> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(v),
            Err(e) => {
                warn!(key, error = %e, "unreadable collection; using empty default");
                Ok(T::default())
            }
        }
    }

    pub async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value).with_context(|| format!("serialize {}", key))?;
        self.kv.set(key, raw).await
    }

    pub async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.kv.remove(key).await
    }

    /// Single-writer guard for read-modify-write sequences.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Drops every collection and starts over empty.
    pub async fn clear(&self) -> anyhow::Result<()> {
        let _guard = self.lock().await;
        for key in [USERS_KEY, CURRENT_USER_KEY, GAME_RESULTS_KEY, RESET_CODES_KEY] {
            self.kv.remove(key).await?;
        }
        self.init().await?;
        warn!("database cleared and reinitialized");
        Ok(())
    }

    // ---- typed collections ----

    pub async fn users(&self) -> anyhow::Result<Vec<User>> {
        self.read(USERS_KEY).await
    }

    pub async fn save_users(&self, users: &[User]) -> anyhow::Result<()> {
        self.write(USERS_KEY, users).await
    }

    pub async fn game_results(&self) -> anyhow::Result<Vec<GameResult>> {
        self.read(GAME_RESULTS_KEY).await
    }

    pub async fn save_game_results(&self, results: &[GameResult]) -> anyhow::Result<()> {
        self.write(GAME_RESULTS_KEY, results).await
    }

    pub async fn reset_codes(&self) -> anyhow::Result<Vec<ResetCode>> {
        self.read(RESET_CODES_KEY).await
    }

    pub async fn save_reset_codes(&self, codes: &[ResetCode]) -> anyhow::Result<()> {
        self.write(RESET_CODES_KEY, codes).await
    }

    pub async fn current_user(&self) -> anyhow::Result<Option<User>> {
        self.read(CURRENT_USER_KEY).await
    }

    pub async fn set_current_user(&self, user: Option<&User>) -> anyhow::Result<()> {
        match user {
            Some(u) => self.write(CURRENT_USER_KEY, u).await,
            None => self.remove(CURRENT_USER_KEY).await,
        }
    }
}

#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};

    #[tokio::test]
    async fn open_creates_empty_collections() {
        let kv = Arc::new(MemoryStore::new());
        let db = Database::open(kv.clone()).await.unwrap();

        assert_eq!(kv.get(USERS_KEY).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.get(GAME_RESULTS_KEY).await.unwrap().as_deref(), Some("[]"));
        assert!(db.users().await.unwrap().is_empty());
        assert!(db.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn open_repairs_corrupt_collections() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(USERS_KEY, "{not json".into()).await.unwrap();
        kv.set(GAME_RESULTS_KEY, "{\"an\":\"object\"}".into()).await.unwrap();
        kv.set(CURRENT_USER_KEY, "42".into()).await.unwrap();

        let db = Database::open(kv.clone()).await.unwrap();

        assert_eq!(kv.get(USERS_KEY).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.get(GAME_RESULTS_KEY).await.unwrap().as_deref(), Some("[]"));
        assert_eq!(kv.get(CURRENT_USER_KEY).await.unwrap(), None);
        assert!(db.game_results().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_falls_back_to_default_on_garbage() {
        let kv = Arc::new(MemoryStore::new());
        let db = Database::open(kv.clone()).await.unwrap();
        kv.set(RESET_CODES_KEY, "garbage".into()).await.unwrap();
        assert!(db.reset_codes().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let kv = Arc::new(MemoryStore::new());
        let db = Database::open(kv.clone()).await.unwrap();
        kv.set(USERS_KEY, "[]".into()).await.unwrap();
        kv.set(CURRENT_USER_KEY, "{}".into()).await.unwrap();

        db.clear().await.unwrap();

        assert_eq!(kv.get(CURRENT_USER_KEY).await.unwrap(), None);
        assert_eq!(kv.get(USERS_KEY).await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn file_backed_collections_persist() {
        let dir = tempfile::tempdir().unwrap();
        {
            let kv = Arc::new(FileStore::new(dir.path()).await.unwrap());
            let db = Database::open(kv).await.unwrap();
            db.write(GAME_RESULTS_KEY, &Vec::<GameResult>::new()).await.unwrap();
        }
        assert!(dir.path().join(format!("{}.json", USERS_KEY)).exists());
        assert!(dir.path().join(format!("{}.json", GAME_RESULTS_KEY)).exists());
    }
}
