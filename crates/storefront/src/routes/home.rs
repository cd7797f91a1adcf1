//! Catalog and cart page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use shopfront_core::Product;
use tower_sessions::Session;
use tracing::instrument;

use super::NavView;
use super::cart::{CartView, load_cart};
use crate::catalog::CatalogStatus;
use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            image: product.image.clone(),
        }
    }
}

/// Query parameters accepted by the home page.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    /// Set by the login callback when login fails.
    pub auth_error: Option<String>,
}

/// Catalog and cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub nav: NavView,
    pub loading: bool,
    pub error: Option<String>,
    pub products: Vec<ProductView>,
    pub cart: CartView,
    pub auth_error: bool,
}

impl HomeTemplate {
    fn new(nav: NavView, status: CatalogStatus, cart: CartView, auth_error: bool) -> Self {
        let (loading, error, products) = match status {
            CatalogStatus::Loading => (true, None, Vec::new()),
            CatalogStatus::Failed(message) => (false, Some(message), Vec::new()),
            CatalogStatus::Loaded(products) => (
                false,
                None,
                products.iter().map(ProductView::from).collect(),
            ),
        };

        Self {
            nav,
            loading,
            error,
            products,
            cart,
            auth_error,
        }
    }
}

/// Display the catalog and the visitor's cart.
///
/// # Route
///
/// `GET /`
///
/// # Errors
///
/// Returns an error if the session store fails.
#[instrument(skip(state, session, user))]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Query(query): Query<HomeQuery>,
) -> Result<HomeTemplate> {
    let cart = load_cart(&session).await?;
    let nav = NavView::new(user.as_ref(), &cart);

    Ok(HomeTemplate::new(
        nav,
        state.catalog().status(),
        CartView::from(&cart),
        query.auth_error.is_some(),
    ))
}
