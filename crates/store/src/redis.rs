//! Redis-backed status store (optional, `redis` feature).
//!
//! Each record is a JSON string written with `SETEX`, so Redis owns the
//! expiry. Listing uses `KEYS` and is meant for diagnostics only.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use crunch_core::job::{job_key, JobStatus};
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::{StatusStore, StoreError};

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Unavailable(err.to_string())
    }
}

/// Status store backed by a multiplexed Redis connection.
#[derive(Clone)]
pub struct RedisStatusStore {
    conn: MultiplexedConnection,
}

impl RedisStatusStore {
    /// Open a client for `redis_url` and establish the shared connection.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl StatusStore for RedisStatusStore {
    async fn put(
        &self,
        job_id: &str,
        record: &JobStatus,
        ttl: Duration,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(record)?;
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(job_key(job_id), payload, ttl.as_secs().max(1))
            .await?;
        Ok(())
    }

    async fn get(&self, job_id: &str) -> Result<Option<JobStatus>, StoreError> {
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(job_key(job_id)).await?;
        match payload {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn list(&self, prefix: &str) -> Result<BTreeMap<String, JobStatus>, StoreError> {
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(format!("{prefix}*")).await?;

        let mut records = BTreeMap::new();
        for key in keys {
            // A key can expire between KEYS and GET.
            let payload: Option<String> = conn.get(&key).await?;
            if let Some(text) = payload {
                records.insert(key, serde_json::from_str(&text)?);
            }
        }
        Ok(records)
    }
}
