//! Persisted client state.
//!
//! `StorageBackend` is the raw string key-value seam (memory, directory, Redis).
//! `ClientStore` sits on top and is what the rest of the client uses: JSON in,
//! JSON out, and every failure is logged and turned into a cache miss.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::StorageTarget;

pub mod file;
pub mod memory;
pub mod redis;

pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use self::redis::RedisBackend;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

#[async_trait]
pub trait StorageBackend: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// The entities the client persists per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Preferences,
    CareerPath,
    Resume,
    Dashboard,
    Recommendations,
}

/// Keys dropped on logout. Preferences and resume survive across sessions.
pub const SESSION_KEYS: &[StorageKey] = &[
    StorageKey::CareerPath,
    StorageKey::Dashboard,
    StorageKey::Recommendations,
];

impl StorageKey {
    pub fn prefix(&self) -> &'static str {
        match self {
            StorageKey::Preferences => "userPreferences",
            StorageKey::CareerPath => "selectedCareerPath",
            StorageKey::Resume => "userResume",
            StorageKey::Dashboard => "userDashboard",
            StorageKey::Recommendations => "careerRecommendations",
        }
    }

    /// `userDashboard_<userId>` and friends.
    pub fn for_user(&self, user_id: &str) -> String {
        format!("{}_{}", self.prefix(), user_id)
    }
}

/// JSON-serializing wrapper over a [`StorageBackend`].
#[derive(Clone)]
pub struct ClientStore {
    backend: Arc<dyn StorageBackend>,
}

impl ClientStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::default()))
    }

    /// Builds the backend named by the configuration.
    pub async fn open(target: &StorageTarget) -> Result<Self, StorageError> {
        let backend: Arc<dyn StorageBackend> = match target {
            StorageTarget::Memory => Arc::new(MemoryBackend::default()),
            StorageTarget::Directory(dir) => Arc::new(FileBackend::open(dir).await?),
            StorageTarget::Redis(url) => Arc::new(RedisBackend::connect(url).await?),
        };
        Ok(Self::new(backend))
    }

    /// Serializes and writes `value`, reporting any failure to the caller.
    pub async fn try_set_item<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, json).await?;
        debug!("Stored '{key}'");
        Ok(())
    }

    /// Like [`ClientStore::try_set_item`], but logs the failure and returns `false`.
    pub async fn set_item<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        match self.try_set_item(key, value).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to store '{key}': {e}");
                false
            }
        }
    }

    /// Reads and parses `key`. Missing keys, backend errors and parse errors
    /// all come back as `None`.
    pub async fn get_item<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Failed to read '{key}': {e}");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Failed to parse stored value for '{key}': {e}");
                None
            }
        }
    }

    pub async fn remove_item(&self, key: &str) {
        if let Err(e) = self.backend.remove(key).await {
            warn!("Failed to remove '{key}': {e}");
        }
    }

    /// True when `key` holds a parseable, non-null value.
    pub async fn has_item(&self, key: &str) -> bool {
        self.get_item::<Value>(key)
            .await
            .map(|v| !v.is_null())
            .unwrap_or(false)
    }

    pub async fn get_for<T: DeserializeOwned>(&self, key: StorageKey, user_id: &str) -> Option<T> {
        self.get_item(&key.for_user(user_id)).await
    }

    pub async fn try_set_for<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        user_id: &str,
        value: &T,
    ) -> Result<(), StorageError> {
        self.try_set_item(&key.for_user(user_id), value).await
    }

    pub async fn set_for<T: Serialize + ?Sized>(
        &self,
        key: StorageKey,
        user_id: &str,
        value: &T,
    ) -> bool {
        self.set_item(&key.for_user(user_id), value).await
    }

    pub async fn remove_for(&self, key: StorageKey, user_id: &str) {
        self.remove_item(&key.for_user(user_id)).await
    }

    pub async fn has_for(&self, key: StorageKey, user_id: &str) -> bool {
        self.has_item(&key.for_user(user_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserPreferences;

    /// Backend whose every call fails.
    struct BrokenBackend;

    #[async_trait]
    impl StorageBackend for BrokenBackend {
        async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
        async fn set(&self, key: &str, _value: String) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
        async fn remove(&self, key: &str) -> Result<(), StorageError> {
            Err(StorageError::InvalidKey(key.to_string()))
        }
    }

    #[test]
    fn test_key_namespacing() {
        assert_eq!(StorageKey::Dashboard.for_user("abc"), "userDashboard_abc");
        assert_eq!(
            StorageKey::Preferences.for_user("abc"),
            "userPreferences_abc"
        );
    }

    #[tokio::test]
    async fn test_set_then_get_typed_value() {
        let store = ClientStore::in_memory();
        let prefs = UserPreferences {
            path_type: "explore".to_string(),
            career_stage: "student".to_string(),
            primary_goal: "first job".to_string(),
        };
        assert!(store.set_for(StorageKey::Preferences, "u1", &prefs).await);
        let loaded: Option<UserPreferences> = store.get_for(StorageKey::Preferences, "u1").await;
        assert_eq!(loaded, Some(prefs));
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let store = ClientStore::in_memory();
        assert!(store.get_item::<Value>("nope").await.is_none());
        assert!(!store.has_item("nope").await);
    }

    #[tokio::test]
    async fn test_unparseable_value_is_cache_miss() {
        let backend = Arc::new(MemoryBackend::default());
        backend.set("k", "{not json".to_string()).await.unwrap();
        let store = ClientStore::new(backend);
        assert!(store.get_item::<Value>("k").await.is_none());
        assert!(!store.has_item("k").await);
    }

    #[tokio::test]
    async fn test_null_is_not_present() {
        let store = ClientStore::in_memory();
        store.set_item("k", &Value::Null).await;
        assert!(!store.has_item("k").await);
    }

    #[tokio::test]
    async fn test_remove_item() {
        let store = ClientStore::in_memory();
        store.set_item("k", &42).await;
        assert!(store.has_item("k").await);
        store.remove_item("k").await;
        assert!(!store.has_item("k").await);
    }

    #[tokio::test]
    async fn test_file_store_accepts_email_and_spaced_user_ids() {
        let dir = tempfile::tempdir().unwrap();
        let target = StorageTarget::Directory(dir.path().to_string_lossy().into_owned());
        let store = ClientStore::open(&target).await.unwrap();
        let prefs = UserPreferences {
            path_type: "explore".to_string(),
            career_stage: "student".to_string(),
            primary_goal: "first job".to_string(),
        };

        for user_id in ["ada+test@example.com", "Ada Lovelace"] {
            assert!(store.set_for(StorageKey::Preferences, user_id, &prefs).await);
            assert!(store.has_for(StorageKey::Preferences, user_id).await);
        }

        let reopened = ClientStore::open(&target).await.unwrap();
        let loaded: Option<UserPreferences> = reopened
            .get_for(StorageKey::Preferences, "ada+test@example.com")
            .await;
        assert_eq!(loaded, Some(prefs));
    }

    #[tokio::test]
    async fn test_try_set_reports_failures() {
        let store = ClientStore::in_memory();
        let bad_keys = std::collections::HashMap::from([((1, 2), 3)]);
        assert!(matches!(
            store.try_set_item("k", &bad_keys).await,
            Err(StorageError::Serde(_))
        ));
        assert!(!store.set_item("k", &bad_keys).await);

        let broken = ClientStore::new(Arc::new(BrokenBackend));
        assert!(matches!(
            broken.try_set_for(StorageKey::Preferences, "u1", &1).await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_backend_errors_are_swallowed() {
        let store = ClientStore::new(Arc::new(BrokenBackend));
        assert!(!store.set_item("k", &1).await);
        assert!(store.get_item::<i32>("k").await.is_none());
        store.remove_item("k").await;
    }
}
