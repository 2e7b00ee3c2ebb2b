//! Integration tests for oshop.
//!
//! The tests run the real [`ApiClient`] and [`Session`] against a
//! `mockito` server standing in for the store API, with state kept in a
//! temporary [`FileStorage`] file. No network access is needed.
//!
//! ```bash
//! cargo test -p oshop-integration-tests
//! ```
//!
//! This library holds the shared fixtures.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use oshop_storefront::api::ApiClient;
use oshop_storefront::session::Session;
use oshop_storefront::storage::FileStorage;
use serde_json::{Value, json};
use tempfile::TempDir;
use url::Url;

/// Session type exercised by the end-to-end tests.
pub type TestSession = Session<ApiClient, FileStorage>;

/// A product as the store API serializes it.
#[must_use]
pub fn product_json(id: i64, title: &str, price: u64) -> Value {
    json!({
        "id": id,
        "image_url": format!("https://cdn.example.com/{id}.png"),
        "title": title,
        "description": format!("{title} description"),
        "price": price,
    })
}

/// A `GET /products` body holding products `ids`, each priced `id * 100`.
#[must_use]
pub fn products_page_json(page: u32, amount: u32, total: u32, ids: &[i64]) -> String {
    let items: Vec<Value> = ids
        .iter()
        .map(|&id| product_json(id, &format!("Product {id}"), u64::try_from(id).unwrap_or(0) * 100))
        .collect();

    json!({ "page": page, "amount": amount, "total": total, "items": items }).to_string()
}

/// Client pointed at the mock server.
#[must_use]
pub fn client_for(server: &mockito::Server) -> ApiClient {
    let url = Url::parse(&server.url()).expect("mock server URL is valid");
    ApiClient::with_base_url(url).expect("Failed to create HTTP client")
}

/// A state file inside a fresh temporary directory.
///
/// The directory is deleted when the returned guard drops.
#[must_use]
pub fn temp_state() -> (TempDir, Arc<FileStorage>) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let storage = Arc::new(FileStorage::new(dir.path().join("state.json")));
    (dir, storage)
}

/// Session against the mock server backed by `storage`.
#[must_use]
pub fn open_session(server: &mockito::Server, storage: Arc<FileStorage>, page_size: u32) -> TestSession {
    Session::open(client_for(server), storage, page_size).expect("Failed to open session")
}
