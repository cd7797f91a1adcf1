//! Session middleware configuration.
//!
//! Sessions live in process memory: carts and logins are lost on restart.
//! Each record is evicted once its expiry date passes, whether or not the
//! visitor ever comes back.

use std::time::{Duration as StdDuration, Instant};

use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use tower_sessions::{
    Expiry as SessionExpiry, SessionManagerLayer, SessionStore,
    cookie::{
        SameSite,
        time::{Duration, OffsetDateTime},
    },
    session::{Id, Record},
    session_store,
};

use crate::config::StorefrontConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sf_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Upper bound on live sessions kept in memory.
const MAX_SESSIONS: u64 = 100_000;

/// In-memory session store backed by a `moka` cache.
///
/// Records expire at their own `expiry_date`; the cache drops them during
/// its regular housekeeping.
#[derive(Debug, Clone)]
pub struct MokaSessionStore {
    cache: Cache<Id, Record>,
}

impl MokaSessionStore {
    /// Create a store holding at most `max_capacity` sessions.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            cache: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(RecordExpiry)
                .build(),
        }
    }
}

impl Default for MokaSessionStore {
    fn default() -> Self {
        Self::new(MAX_SESSIONS)
    }
}

#[async_trait]
impl SessionStore for MokaSessionStore {
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

/// Expires each cached record at the record's own expiry date.
struct RecordExpiry;

impl RecordExpiry {
    fn remaining(record: &Record) -> StdDuration {
        StdDuration::try_from(record.expiry_date - OffsetDateTime::now_utc()).unwrap_or_default()
    }
}

impl Expiry<Id, Record> for RecordExpiry {
    fn expire_after_create(
        &self,
        _id: &Id,
        record: &Record,
        _created_at: Instant,
    ) -> Option<StdDuration> {
        Some(Self::remaining(record))
    }

    fn expire_after_update(
        &self,
        _id: &Id,
        record: &Record,
        _updated_at: Instant,
        _duration_until_expiry: Option<StdDuration>,
    ) -> Option<StdDuration> {
        Some(Self::remaining(record))
    }
}

/// Create the session layer backed by an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MokaSessionStore> {
    SessionManagerLayer::new(MokaSessionStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(SessionExpiry::OnInactivity(Duration::seconds(SESSION_EXPIRY_SECONDS)))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
