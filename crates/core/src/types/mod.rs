//! Catalog types for Shopfront.
//!
//! This module provides type-safe wrappers for product data.

pub mod id;
pub mod price;
pub mod product;

pub use id::ProductId;
pub use price::{Price, PriceError, format_money, round_for_display};
pub use product::Product;
