//! `reqwest`-based implementation of [`StoreApi`].

use std::sync::Arc;

use oshop_core::Review;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{ApiError, OrderRequest, OrderResponse, ProductsPage, StoreApi};
use crate::config::StorefrontConfig;

/// Longest response body excerpt kept in logs and errors.
const BODY_EXCERPT: usize = 500;

/// Client for the remote store API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the API configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::with_base_url(config.api_url.clone())
    }

    /// Create a client for the API rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn with_base_url(mut base_url: Url) -> Result<Self, ApiError> {
        // Url::join replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner { client, base_url }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Check the status and decode a JSON body.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: excerpt(&text),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            debug!(error = %e, body = %excerpt(&text), "Failed to parse store API response");
            ApiError::Parse(e)
        })
    }

    /// Fetch all reviews.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not a review list.
    #[instrument(skip(self))]
    pub async fn try_fetch_reviews(&self) -> Result<Vec<Review>, ApiError> {
        let url = self.endpoint("reviews")?;
        let response = self.inner.client.get(url).send().await?;
        Self::decode(response).await
    }

    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not a product page.
    #[instrument(skip(self))]
    pub async fn try_fetch_products(&self, page: u32, page_size: u32) -> Result<ProductsPage, ApiError> {
        let mut url = self.endpoint("products")?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());

        let response = self.inner.client.get(url).send().await?;
        let page: ProductsPage = Self::decode(response).await?;
        debug!(items = page.items.len(), total = page.total, "Fetched products page");
        Ok(page)
    }

    /// Submit an order.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the status is not 2xx, or the
    /// body is not an order response.
    #[instrument(skip(self, request), fields(lines = request.cart.len()))]
    pub async fn try_submit_order(&self, request: &OrderRequest) -> Result<OrderResponse, ApiError> {
        let url = self.endpoint("order")?;
        let response = self.inner.client.post(url).json(request).send().await?;
        Self::decode(response).await
    }
}

impl StoreApi for ApiClient {
    async fn fetch_reviews(&self) -> Vec<Review> {
        self.try_fetch_reviews().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to fetch reviews");
            Vec::new()
        })
    }

    async fn fetch_products(&self, page: u32, page_size: u32) -> ProductsPage {
        self.try_fetch_products(page, page_size)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, page, "Failed to fetch products");
                ProductsPage::empty()
            })
    }

    async fn submit_order(&self, request: &OrderRequest) -> OrderResponse {
        self.try_submit_order(request).await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to submit order");
            OrderResponse::failed()
        })
    }
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT).collect()
}
