//! oshop Core - Shared types library.
//!
//! This crate provides common types used across all oshop components:
//! - `storefront` - Client-side storefront state, flows, and the remote API client
//! - `cli` - The `oshop` command-line front end
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs, prices, quantities, phone
//!   numbers, and the cart collection

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
