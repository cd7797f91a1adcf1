//! One request at a time per session.
//!
//! The session layer loads a visitor's whole record when a request starts
//! and writes it back when the response is ready. Two overlapping requests
//! on the same cookie would each write their own copy, and the later write
//! would drop the earlier change (two quick "Add to cart" clicks counting
//! once). This layer runs outside the session layer and holds a per-cookie
//! lock until the record has been saved.

use std::{sync::Arc, time::Duration};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::COOKIE},
    middleware::Next,
    response::Response,
};
use moka::future::Cache;
use tokio::sync::Mutex;
use tower_sessions::cookie::Cookie;

use super::session::SESSION_COOKIE_NAME;
use crate::state::AppState;

/// How long an unused lock is kept around.
const LOCK_IDLE_SECONDS: u64 = 10 * 60;

/// Per-session request locks, keyed by session cookie value.
#[derive(Clone)]
pub struct SessionLocks {
    locks: Cache<String, Arc<Mutex<()>>>,
}

impl Default for SessionLocks {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLocks {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locks: Cache::builder()
                .time_to_idle(Duration::from_secs(LOCK_IDLE_SECONDS))
                .build(),
        }
    }

    /// The lock for a session cookie value, created on first use.
    pub async fn lock_for(&self, session_key: &str) -> Arc<Mutex<()>> {
        self.locks
            .get_with_by_ref(session_key, async { Arc::new(Mutex::new(())) })
            .await
    }
}

/// Value of the session cookie, if the request carries one.
fn session_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}

/// Serialize requests that share a session cookie.
///
/// Requests without a session cookie start a fresh session and run freely.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(key) = session_key(request.headers()) else {
        return next.run(request).await;
    };

    let lock = state.session_locks().lock_for(&key).await;
    let _guard = lock.lock().await;
    next.run(request).await
}
