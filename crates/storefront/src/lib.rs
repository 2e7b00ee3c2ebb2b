//! oshop storefront client library.
//!
//! Holds everything a storefront front end needs: the remote store API
//! client, the persisted cart, phone entry and order submission, the
//! paginated product listing, and sanitized reviews. [`session::Session`]
//! wires them together.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod reviews;
pub mod session;
pub mod storage;

pub use error::{Result, StorefrontError};
