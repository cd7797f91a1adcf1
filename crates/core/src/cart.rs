//! Shopping cart state.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s, one per product. The only
//! ways to change it are [`Cart::add`] and [`Cart::remove`]; totals are
//! derived on every read.
//!
//! # Example
//!
//! ```
//! use rust_decimal::Decimal;
//! use shopfront_core::{Cart, Price, Product, ProductId};
//!
//! let mug = Product {
//!     id: ProductId::from("mug"),
//!     name: "Mug".to_string(),
//!     price: Price::new(Decimal::new(1000, 2)).unwrap(),
//!     image: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add(&mug);
//! cart.add(&mug);
//! assert_eq!(cart.lines().len(), 1);
//! assert_eq!(cart.total(), Decimal::new(2000, 2));
//!
//! cart.remove(&mug.id);
//! cart.remove(&mug.id);
//! assert!(cart.is_empty());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Product, ProductId, round_for_display};

/// Errors raised when a stored cart violates its invariants.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The same product appears on more than one line.
    #[error("product {0} appears on more than one cart line")]
    DuplicateLine(ProductId),
    /// A line has a quantity of zero.
    #[error("cart line for product {0} has zero quantity")]
    EmptyLine(ProductId),
}

/// One product's entry in the cart.
///
/// Holds a snapshot of the product taken when it was first added, so the
/// cart can be shown and totalled without consulting the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    product: Product,
    quantity: u32,
}

impl CartLine {
    /// The product on this line.
    #[must_use]
    pub const fn product(&self) -> &Product {
        &self.product
    }

    /// The product identifier.
    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product.id
    }

    /// Number of units; always at least 1.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Unit price times quantity, unrounded.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price.times(self.quantity)
    }
}

/// The visitor's shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartLine>", into = "Vec<CartLine>")]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line for this product, or appends a new line
    /// with quantity 1.
    pub fn add(&mut self, product: &Product) {
        match self.line_mut(&product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                product: product.clone(),
                quantity: 1,
            }),
        }
    }

    /// Remove one unit of the product with `id`.
    ///
    /// The line disappears when its quantity reaches zero. Unknown ids are
    /// ignored.
    pub fn remove(&mut self, id: &ProductId) {
        let Some(index) = self.lines.iter().position(|line| line.product_id() == id) else {
            return;
        };

        if let Some(line) = self.lines.get_mut(index) {
            line.quantity -= 1;
            if line.quantity == 0 {
                self.lines.remove(index);
            }
        }
    }

    /// Cart lines in the order products were first added.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Quantity of the product with `id`, or 0 if it is not in the cart.
    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.product_id() == id)
            .map_or(0, CartLine::quantity)
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0_u32, |count, line| count.saturating_add(line.quantity))
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of every line's subtotal, rounded to two decimal places.
    #[must_use]
    pub fn total(&self) -> Decimal {
        round_for_display(
            self.lines
                .iter()
                .map(CartLine::subtotal)
                .fold(Decimal::ZERO, Decimal::saturating_add),
        )
    }

    fn line_mut(&mut self, id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.product_id() == id)
    }
}

impl TryFrom<Vec<CartLine>> for Cart {
    type Error = CartError;

    fn try_from(lines: Vec<CartLine>) -> Result<Self, Self::Error> {
        for (index, line) in lines.iter().enumerate() {
            if line.quantity == 0 {
                return Err(CartError::EmptyLine(line.product_id().clone()));
            }
            if lines
                .iter()
                .skip(index + 1)
                .any(|other| other.product_id() == line.product_id())
            {
                return Err(CartError::DuplicateLine(line.product_id().clone()));
            }
        }
        Ok(Self { lines })
    }
}

impl From<Cart> for Vec<CartLine> {
    fn from(cart: Cart) -> Self {
        cart.lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Price;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
            image: None,
        }
    }

    #[test]
    fn test_adding_same_product_twice_accumulates() {
        let a = product("a", 1000);
        let mut cart = Cart::new();
        cart.add(&a);
        cart.add(&a);

        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.quantity_of(&a.id), 2);
    }

    #[test]
    fn test_new_products_are_appended_in_order() {
        let mut cart = Cart::new();
        cart.add(&product("b", 100));
        cart.add(&product("a", 100));
        cart.add(&product("b", 100));

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id().as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn test_removing_last_unit_drops_line() {
        let a = product("a", 1000);
        let mut cart = Cart::new();
        cart.add(&a);
        cart.remove(&a.id);

        assert!(cart.is_empty());
        assert_eq!(cart.quantity_of(&a.id), 0);
    }

    #[test]
    fn test_remove_decrements_without_dropping() {
        let a = product("a", 1000);
        let mut cart = Cart::new();
        cart.add(&a);
        cart.add(&a);
        cart.add(&a);
        cart.remove(&a.id);

        assert_eq!(cart.quantity_of(&a.id), 2);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_remove_unknown_product_is_noop() {
        let mut cart = Cart::new();
        cart.add(&product("a", 1000));
        let before = cart.clone();

        cart.remove(&ProductId::from("missing"));
        assert_eq!(cart, before);

        let mut empty = Cart::new();
        empty.remove(&ProductId::from("missing"));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_remove_keeps_order_of_remaining_lines() {
        let mut cart = Cart::new();
        cart.add(&product("a", 100));
        cart.add(&product("b", 100));
        cart.add(&product("c", 100));
        cart.remove(&ProductId::from("b"));

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id().as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn test_total() {
        let a = product("a", 1000);
        let b = product("b", 550);
        let mut cart = Cart::new();
        cart.add(&a);
        cart.add(&a);
        cart.add(&b);

        assert_eq!(cart.total(), Decimal::new(2550, 2));
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_total_rounds_to_cents() {
        let mut cart = Cart::new();
        cart.add(&Product {
            price: Price::new(Decimal::new(3335, 3)).unwrap(),
            ..product("a", 0)
        });

        assert_eq!(cart.total(), Decimal::new(334, 2));
    }

    #[test]
    fn test_total_of_most_expensive_products() {
        let mut cart = Cart::new();
        for id in ["a", "b", "c"] {
            let pricey = Product {
                price: Price::MAX,
                ..product(id, 0)
            };
            cart.add(&pricey);
            cart.add(&pricey);
        }

        assert_eq!(cart.total(), Decimal::from(6_000_000_000_u64));
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_line_keeps_first_snapshot() {
        let original = product("a", 1000);
        let repriced = product("a", 9900);
        let mut cart = Cart::new();
        cart.add(&original);
        cart.add(&repriced);

        assert_eq!(cart.lines().first().unwrap().product(), &original);
        assert_eq!(cart.total(), Decimal::new(2000, 2));
    }

    #[test]
    fn test_serde_round_trip() {
        let mut cart = Cart::new();
        cart.add(&product("a", 1000));
        cart.add(&product("b", 550));
        cart.add(&product("a", 1000));

        let json = serde_json::to_value(&cart).unwrap();
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_deserialize_rejects_duplicate_lines() {
        let json = serde_json::json!([
            {"product": {"_id": "a", "name": "A", "price": "1"}, "quantity": 1},
            {"product": {"_id": "a", "name": "A", "price": "1"}, "quantity": 2},
        ]);
        let err = serde_json::from_value::<Cart>(json).unwrap_err();
        assert!(err.to_string().contains("more than one cart line"));
    }

    #[test]
    fn test_deserialize_rejects_zero_quantity() {
        let json = serde_json::json!([
            {"product": {"_id": "a", "name": "A", "price": "1"}, "quantity": 0},
        ]);
        assert!(serde_json::from_value::<Cart>(json).is_err());
    }
}
