//! Subcommand implementations.

pub mod browse;
pub mod cart;
pub mod order;

use std::sync::Arc;

use oshop_core::PhoneError;
use oshop_storefront::StorefrontError;
use oshop_storefront::api::ApiClient;
use oshop_storefront::config::StorefrontConfig;
use oshop_storefront::session::Session;
use oshop_storefront::storage::FileStorage;
use thiserror::Error;

/// Session type used by every command.
pub type CliSession = Session<ApiClient, FileStorage>;

/// Errors that end a command with a non-zero exit.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Storefront(#[from] StorefrontError),

    #[error("Invalid phone: {0}")]
    Phone(#[from] PhoneError),

    #[error("Cart is empty")]
    EmptyCart,

    #[error("Order not placed: {0}")]
    OrderFailed(String),
}

/// Build a session against the configured API and state file.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built or the state file
/// cannot be read.
pub fn open_session(config: &StorefrontConfig) -> Result<CliSession, CommandError> {
    let api = ApiClient::new(config).map_err(StorefrontError::from)?;
    let storage = Arc::new(FileStorage::new(&config.state_file));
    tracing::debug!(api = %api.base_url(), state = %config.state_file.display(), "Opening session");

    Ok(Session::open(api, storage, config.page_size.get())?)
}
