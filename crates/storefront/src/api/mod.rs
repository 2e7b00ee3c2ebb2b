//! Remote store API client.
//!
//! # Endpoints
//!
//! - `GET /reviews` - review snippets
//! - `GET /products?page=<n>&page_size=<n>` - one page of products
//! - `POST /order` - submit phone and cart
//!
//! # Failure Policy
//!
//! [`StoreApi`] methods never fail: transport errors, non-2xx statuses, and
//! malformed bodies are logged and replaced by an empty value (or a failed
//! [`OrderResponse`]). The fallible variants live on [`ApiClient`] as
//! `try_*` methods for callers that want the error.
//!
//! # Example
//!
//! ```rust,ignore
//! use oshop_storefront::api::{ApiClient, StoreApi};
//!
//! let client = ApiClient::new(&config)?;
//! let page = client.fetch_products(1, 20).await;
//! for product in &page.items {
//!     println!("{} {}", product.title, product.price);
//! }
//! ```

mod client;
pub mod types;

use std::future::Future;

pub use client::ApiClient;
pub use types::{OrderRequest, OrderResponse, ProductsPage};

use oshop_core::Review;
use thiserror::Error;

/// Errors that can occur when talking to the store API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {body}")]
    Status { status: u16, body: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Best-effort access to the store.
///
/// Implemented by [`ApiClient`] and by in-memory fakes in tests.
pub trait StoreApi: Send + Sync {
    /// All reviews, or an empty list on failure.
    fn fetch_reviews(&self) -> impl Future<Output = Vec<Review>> + Send;

    /// One page of products, or [`ProductsPage::empty`] on failure.
    fn fetch_products(&self, page: u32, page_size: u32) -> impl Future<Output = ProductsPage> + Send;

    /// Submit an order, or [`OrderResponse::failed`] on failure.
    fn submit_order(&self, request: &OrderRequest) -> impl Future<Output = OrderResponse> + Send;
}
