//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Each mutation reads the cart,
//! applies one [`Cart`] operation, writes it back and redirects to the
//! catalog page, which renders the new contents and total.

use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;
use shopfront_core::{Cart, CartLine, ProductId, format_money};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::models::session_keys;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub unit_price: String,
    pub line_price: String,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub total: String,
    pub item_count: u32,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        let product = line.product();
        Self {
            product_id: product.id.to_string(),
            name: product.name.clone(),
            image: product.image.clone(),
            quantity: line.quantity(),
            unit_price: product.price.to_string(),
            line_price: format_money(line.subtotal()),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            total: format_money(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

/// Form data naming a product.
#[derive(Debug, Deserialize)]
pub struct CartForm {
    pub product_id: String,
}

// =============================================================================
// Session Storage
// =============================================================================

/// Read the visitor's cart, or an empty cart if none is stored.
///
/// A stored cart that no longer deserializes is discarded.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn load_cart(session: &Session) -> Result<Cart> {
    match session.get::<Cart>(session_keys::CART).await {
        Ok(cart) => Ok(cart.unwrap_or_default()),
        Err(tower_sessions::session::Error::SerdeJson(e)) => {
            tracing::warn!(error = %e, "Discarding unreadable cart");
            Ok(Cart::new())
        }
        Err(e) => Err(AppError::from(e)),
    }
}

/// Write the visitor's cart back to the session.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session.insert(session_keys::CART, cart).await?;
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Add one unit of a catalog product to the cart.
///
/// # Route
///
/// `POST /cart/add`
///
/// # Errors
///
/// Returns 404 if the catalog is not loaded or does not contain the product.
#[instrument(skip(state, session), fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CartForm>,
) -> Result<Redirect> {
    let id = ProductId::from(form.product_id);
    let product = state
        .catalog()
        .find(&id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let mut cart = load_cart(&session).await?;
    cart.add(&product);
    save_cart(&session, &cart).await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));
    tracing::debug!(quantity = cart.quantity_of(&id), "Cart updated");

    Ok(Redirect::to("/"))
}

/// Remove one unit of a product from the cart.
///
/// Removing a product that is not in the cart changes nothing.
///
/// # Route
///
/// `POST /cart/remove`
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(session), fields(product_id = %form.product_id))]
pub async fn remove(session: Session, Form(form): Form<CartForm>) -> Result<Redirect> {
    let id = ProductId::from(form.product_id);

    let mut cart = load_cart(&session).await?;
    cart.remove(&id);
    save_cart(&session, &cart).await?;

    add_breadcrumb(
        "cart",
        "Removed from cart",
        Some(&[("product_id", id.as_str())]),
    );
    tracing::debug!(quantity = cart.quantity_of(&id), "Cart updated");

    Ok(Redirect::to("/"))
}
