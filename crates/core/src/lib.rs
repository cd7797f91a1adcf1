//! Shopfront Core - Shared catalog and cart types.
//!
//! This crate provides the types used by the Shopfront components:
//! - `storefront` - Public-facing web storefront
//! - `integration-tests` - End-to-end tests against the storefront router
//!
//! # Architecture
//!
//! The core crate contains only types and state transitions - no I/O, no
//! HTTP clients, no sessions. This keeps the cart logic testable on its own.
//!
//! # Modules
//!
//! - [`types`] - Product identifiers, prices and catalog products
//! - [`cart`] - The shopping cart and its add/remove operations

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartError, CartLine};
pub use types::*;
