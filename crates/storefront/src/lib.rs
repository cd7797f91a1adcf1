//! Shopfront storefront library.
//!
//! Server-rendered storefront: catalog listing, session cart, login through
//! an external identity provider, a gated order history and a privacy page.
//! The binary in `main.rs` wires configuration, logging and Sentry around
//! [`app`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod content;
pub mod error;
pub mod filters;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
    routing::get,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::middleware::{
    auth_rate_limiter, create_session_layer, request_id_middleware, security_headers_middleware,
    session_lock_middleware,
};
use crate::state::AppState;

/// Build the complete storefront router.
///
/// Serve it with `into_make_service_with_connect_info::<SocketAddr>()` so
/// the `/auth` rate limiter can fall back to the peer address.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());
    let static_files = ServeDir::new(&state.config().static_dir);

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/health/ready", get(routes::health::ready))
        .merge(routes::routes())
        .nest("/auth", routes::auth_routes().layer(auth_rate_limiter()))
        .nest_service("/static", static_files)
        .layer(session_layer)
        .layer(from_fn_with_state(state.clone(), session_lock_middleware))
        .layer(from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
            )
        }))
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
        .layer(sentry_tower::NewSentryLayer::new_from_top())
}
