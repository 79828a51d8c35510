//! Bounded in-process session store.
//!
//! Records live in a `moka` cache. Each entry expires at its record's
//! `expiry_date`, and past `max_capacity` the cache evicts entries it
//! considers least useful, so anonymous traffic cannot grow memory without
//! bound.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tower_sessions::cookie::time::OffsetDateTime;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore};

/// Default upper bound on live sessions.
pub const DEFAULT_MAX_SESSIONS: u64 = 100_000;

/// Expires each cache entry when its session record does.
struct RecordExpiry;

impl Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(&self, _id: &Id, record: &Record, _created_at: Instant) -> Option<Duration> {
        Some(time_left(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(time_left(record))
    }
}

/// Time until `record` expires; zero once it has.
fn time_left(record: &Record) -> Duration {
    Duration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or(Duration::ZERO)
}

/// Session store over a size- and time-bounded `moka` cache.
#[derive(Debug, Clone)]
pub struct CacheSessionStore {
    cache: Cache<Id, Record>,
}

impl Default for CacheSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl CacheSessionStore {
    /// Create a store holding at most `max_sessions` records.
    #[must_use]
    pub fn new(max_sessions: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_sessions)
                .expire_after(RecordExpiry)
                .build(),
        }
    }
}

#[async_trait]
impl SessionStore for CacheSessionStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        while self.cache.contains_key(&record.id) {
            record.id = Id::default();
        }
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        self.cache.insert(record.id, record.clone()).await;
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        Ok(self
            .cache
            .get(session_id)
            .await
            .filter(|record| record.expiry_date > OffsetDateTime::now_utc()))
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.cache.invalidate(session_id).await;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tower_sessions::cookie::time::Duration as CookieDuration;

    use super::*;

    fn record(expires_in: CookieDuration) -> Record {
        Record {
            id: Id::default(),
            data: std::collections::HashMap::default(),
            expiry_date: OffsetDateTime::now_utc() + expires_in,
        }
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let store = CacheSessionStore::default();
        let record = record(CookieDuration::minutes(15));
        store.save(&record).await.unwrap();

        let loaded = store.load(&record.id).await.unwrap().unwrap();
        assert_eq!(loaded.id, record.id);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = CacheSessionStore::default();
        let record = record(CookieDuration::minutes(15));
        store.save(&record).await.unwrap();
        store.delete(&record.id).await.unwrap();

        assert!(store.load(&record.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_expired_session_is_evicted() {
        let store = CacheSessionStore::default();
        let record = record(CookieDuration::milliseconds(200));
        store.save(&record).await.unwrap();
        assert!(store.load(&record.id).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        store.cache.run_pending_tasks().await;

        assert!(store.load(&record.id).await.unwrap().is_none());
        assert_eq!(store.cache.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_capacity_is_bounded() {
        let store = CacheSessionStore::new(8);
        for _ in 0..64 {
            let mut record = record(CookieDuration::days(7));
            store.create(&mut record).await.unwrap();
        }
        store.cache.run_pending_tasks().await;

        assert!(store.cache.entry_count() <= 8);
    }
}
