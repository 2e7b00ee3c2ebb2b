//! Catalog entities fetched from the remote store.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReviewId};
use super::price::Price;

/// A product as listed by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Price,
    #[serde(default)]
    pub image_url: String,
}

/// A customer review. `text` is untrusted HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub text: String,
}
