//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog and cart
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (catalog settled)
//!
//! # Cart (form posts, redirect back to /)
//! POST /cart/add               - Add one unit of a product
//! POST /cart/remove            - Remove one unit of a product
//!
//! # Account (requires auth)
//! GET  /order-history          - Order history
//!
//! # Pages
//! GET  /privacy-policy         - Privacy policy
//!
//! # Auth (identity provider)
//! GET  /auth/login             - Redirect to the identity provider
//! GET  /auth/callback          - Handle the login callback
//! POST /auth/logout            - Logout
//! ```

pub mod auth;
pub mod cart;
pub mod health;
pub mod home;
pub mod orders;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};
use tower_sessions::Session;

use shopfront_core::Cart;

use crate::error::Result;
use crate::models::CurrentUser;
use crate::state::AppState;

/// Navbar data shared by every page.
#[derive(Clone)]
pub struct NavView {
    /// Display name of the logged-in visitor.
    pub user_name: Option<String>,
    /// Units in the cart.
    pub cart_count: u32,
}

impl NavView {
    /// Build the navbar from a cart the handler already holds.
    #[must_use]
    pub fn new(user: Option<&CurrentUser>, cart: &Cart) -> Self {
        Self {
            user_name: user.map(|u| u.display_name.clone()),
            cart_count: cart.item_count(),
        }
    }

    /// Build the navbar for the current visitor, reading the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session, user: Option<&CurrentUser>) -> Result<Self> {
        let cart = cart::load_cart(session).await?;
        Ok(Self::new(user, &cart))
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/logout", post(auth::logout))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/remove", post(cart::remove))
}

/// Create all page routes for the storefront.
///
/// Auth routes are mounted separately so they can be rate limited.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .nest("/cart", cart_routes())
        .route("/order-history", get(orders::history))
        .route("/privacy-policy", get(pages::privacy_policy))
}
