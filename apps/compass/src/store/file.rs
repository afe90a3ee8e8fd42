use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use tracing::info;
use uuid::Uuid;

use crate::store::{StorageBackend, StorageError};

/// One JSON file per key inside a directory.
///
/// File names are the URL-safe base64 of the key, so any key string maps to
/// a flat, portable name. Each write goes to its own temp file and is renamed
/// into place; concurrent writers to one key end with the last rename.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        info!("File storage at {}", dir.display());
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self
            .dir
            .join(format!("{}.json", URL_SAFE_NO_PAD.encode(key.as_bytes()))))
    }
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = self.dir.join(format!(".{}.tmp", Uuid::new_v4()));
        tokio::fs::write(&tmp, value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
