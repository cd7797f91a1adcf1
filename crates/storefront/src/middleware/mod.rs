//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span and Sentry scope)
//! 4. Security headers (CSP, framing, isolation)
//! 5. Session lock (one request per session cookie at a time)
//! 6. Session layer (tower-sessions, moka-backed store)
//! 7. Rate limiting on `/auth/*` (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_lock;

pub use auth::{OptionalUser, RequireUser, clear_current_user, set_current_user};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::{content_security_policy, security_headers_middleware};
pub use session::create_session_layer;
pub use session_lock::{SessionLocks, session_lock_middleware};
