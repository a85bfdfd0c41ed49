use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tracing::{debug, info};

use crate::kv::{KvError, KvItem, KvStore};

/// Key-value store backed by Redis. Values are plain strings (JSON documents).
#[derive(Clone)]
pub struct RedisKv {
    conn: MultiplexedConnection,
}

impl RedisKv {
    pub async fn connect(redis_url: &str) -> Result<Self, KvError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis connection established");
        Ok(Self { conn })
    }
}

#[async_trait]
impl KvStore for RedisKv {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn.clone();
        Ok(conn.get::<_, Option<String>>(key).await?)
    }

    async fn set(&self, key: &str, value: &str) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(true)
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        // EX takes whole seconds and rejects 0.
        let seconds = ttl.as_secs().max(1);
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(seconds)
            .query_async(&mut conn)
            .await?;
        debug!("Stored {key} with a {seconds}s expiry");
        Ok(true)
    }

    async fn list(&self, pattern: &str) -> Result<Vec<KvItem>, KvError> {
        let mut conn = self.conn.clone();

        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn.scan_match::<_, String>(pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        keys.sort();
        keys.dedup();

        // MGET keeps order; keys deleted between SCAN and MGET come back nil.
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&keys)
            .query_async(&mut conn)
            .await?;

        let items: Vec<KvItem> = keys
            .into_iter()
            .zip(values)
            .filter_map(|(key, value)| value.map(|value| KvItem { key, value }))
            .collect();

        debug!("Listed {} keys matching {pattern}", items.len());
        Ok(items)
    }

    async fn delete(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn.del(key).await?;
        Ok(removed > 0)
    }
}
