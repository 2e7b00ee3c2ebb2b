//! Unified error handling with Sentry breadcrumbs.
//!
//! Provides a unified `StorefrontError` for the fallible parts of the client:
//! loading configuration, building the HTTP client, and durable storage. The
//! remote calls themselves are best-effort and do not surface here.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront client.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Store API client could not be built.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A cart operation referenced a product that is not in the cart.
    #[error("Not in cart: product {0}")]
    NotInCart(oshop_core::ProductId),
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error. Without an initialized Sentry client this is a no-op.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added product", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use oshop_core::ProductId;

    use super::*;

    #[test]
    fn test_storefront_error_display() {
        let err = StorefrontError::NotInCart(ProductId::new(12));
        assert_eq!(err.to_string(), "Not in cart: product 12");

        let err = StorefrontError::from(ConfigError::InvalidEnvVar(
            "OSHOP_PAGE_SIZE".to_string(),
            "zero".to_string(),
        ));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid environment variable OSHOP_PAGE_SIZE: zero"
        );
    }

    #[test]
    fn test_breadcrumb_without_client_is_noop() {
        add_breadcrumb("cart", "Added product", Some(&[("product_id", "1")]));
        add_breadcrumb("order", "Submitted", None);
    }
}
