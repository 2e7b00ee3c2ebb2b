//! Core types for oshop.
//!
//! This module provides type-safe wrappers for the storefront's domain concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod phone;
pub mod price;

pub use cart::{Cart, CartItem, CartLine, Quantity, QuantityError};
pub use catalog::{Product, Review};
pub use id::*;
pub use phone::{PhoneError, PhoneNumber, format_phone, normalize_digits, validate_phone};
pub use price::{Price, PriceError};
