use crate::{database::Database, redis_client::RedisClient};
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

pub mod availability;
pub mod marquees;

/// Read-through JSON cache in front of the catalog and availability queries.
/// Without Redis every read goes straight to the database.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    db: Database,
    ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: Option<RedisClient>, db: Database, ttl_seconds: u64) -> Self {
        Self { redis, db, ttl_seconds }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    // Warm the public catalog on startup
    pub async fn warmup_cache(&self) {
        if self.redis.is_none() {
            return;
        }
        info!("Starting cache warmup...");
        match self.get_active_marquees().await {
            Ok(marquees) => info!("Cached {} active marquees", marquees.len()),
            Err(e) => warn!("Cache warmup failed: {:?}", e),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();
        let data: Option<String> = match conn.get(key).await {
            Ok(data) => data,
            Err(e) => {
                warn!("Cache read failed for {}: {:?}", key, e);
                return None;
            }
        };
        data.and_then(|raw| serde_json::from_str(&raw).ok())
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let Ok(data) = serde_json::to_string(value) else {
            return;
        };
        let mut conn = redis.conn.clone();
        if let Err(e) = conn.set_ex::<_, _, ()>(key, data, self.ttl_seconds).await {
            warn!("Cache write failed for {}: {:?}", key, e);
        }
    }

    async fn delete_keys(&self, keys: Vec<String>) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        if keys.is_empty() {
            return;
        }
        let mut conn = redis.conn.clone();
        let _: Result<(), _> = conn.del(keys).await;
    }

    async fn delete_pattern(&self, pattern: &str) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut conn)
            .await
            .unwrap_or_default();
        self.delete_keys(keys).await;
    }
}
