use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::info;

use crate::store::{StorageBackend, StorageError};

const KEY_NAMESPACE: &str = "compass";

/// Shared backend for clients that resume on more than one machine.
#[derive(Clone)]
pub struct RedisBackend {
    conn: MultiplexedConnection,
}

impl RedisBackend {
    pub async fn connect(url: &str) -> Result<Self, StorageError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis storage connected");
        Ok(Self { conn })
    }
}

fn namespaced(key: &str) -> String {
    format!("{KEY_NAMESPACE}:{key}")
}

#[async_trait]
impl StorageBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(namespaced(key)).await?)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(namespaced(key), value).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(namespaced(key)).await?;
        Ok(())
    }
}
