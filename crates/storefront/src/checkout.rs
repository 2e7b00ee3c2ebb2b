//! Phone entry and order submission.
//!
//! # States
//!
//! ```text
//! Idle ──submit──▶ Submitting ──success──▶ Succeeded ──dismiss──▶ Idle
//!                       │
//!                       └──failure──▶ Failed ──submit / dismiss──▶ …
//! ```
//!
//! `Failed` accepts a new submission just like `Idle`; the cart is never
//! touched on failure. Leaving `Submitting` is guaranteed even if the
//! submitting future is dropped before the response arrives.

use std::sync::Arc;

use oshop_core::{Cart, PhoneError, PhoneNumber, format_phone, normalize_digits, validate_phone};
use tracing::{info, warn};

use crate::api::{OrderRequest, StoreApi};
use crate::error::add_breadcrumb;
use crate::storage::{Storage, StorageError, keys};

/// Where the checkout form is in the submission lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Submitting,
    /// The order was accepted; the success notice is showing.
    Succeeded,
    /// The last attempt failed; `message` is shown to the visitor.
    Failed { message: String },
}

impl CheckoutState {
    /// Whether a request is in flight.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// Result of a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The phone failed validation; nothing was sent.
    InvalidPhone(PhoneError),
    /// The cart is empty; nothing was sent.
    EmptyCart,
    /// Another submission is still in flight; nothing was sent.
    Busy,
    /// The server accepted the order.
    Placed,
    /// The server rejected the order or could not be reached.
    Failed { message: String },
}

/// Phone field and submission state.
pub struct Checkout<S> {
    phone: String,
    field_error: Option<PhoneError>,
    state: CheckoutState,
    storage: Arc<S>,
}

impl<S: Storage> Checkout<S> {
    /// Restore the phone digits typed in an earlier run.
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn load(storage: Arc<S>) -> Result<Self, StorageError> {
        let phone = storage
            .get(keys::PHONE)?
            .map(|raw| normalize_digits(&raw))
            .unwrap_or_default();

        Ok(Self {
            phone,
            field_error: None,
            state: CheckoutState::Idle,
            storage,
        })
    }

    /// Replace the phone input with `raw`, keeping at most 11 digits.
    ///
    /// Clears any error shown from a previous submit attempt.
    ///
    /// # Errors
    ///
    /// Returns an error if the digits cannot be persisted.
    pub fn set_phone(&mut self, raw: &str) -> Result<(), StorageError> {
        self.phone = normalize_digits(raw);
        self.field_error = None;

        if self.phone.is_empty() {
            self.storage.remove(keys::PHONE)
        } else {
            self.storage.set(keys::PHONE, &self.phone)
        }
    }

    /// Bare digits entered so far.
    #[must_use]
    pub fn phone_digits(&self) -> &str {
        &self.phone
    }

    /// Digits in `+7 (AAA) BBB-CC-DD` form, as far as they go.
    #[must_use]
    pub fn phone_display(&self) -> String {
        format_phone(&self.phone)
    }

    /// Validate the current input.
    ///
    /// # Errors
    ///
    /// Returns the first failing phone rule.
    pub fn validate(&self) -> Result<PhoneNumber, PhoneError> {
        PhoneNumber::parse(&self.phone)
    }

    /// Error to show next to the field after a rejected submit.
    #[must_use]
    pub const fn field_error(&self) -> Option<PhoneError> {
        self.field_error
    }

    /// Current submission state.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Whether the submit action should be enabled.
    #[must_use]
    pub fn can_submit(&self, cart: &Cart) -> bool {
        !self.state.is_submitting() && !cart.is_empty() && validate_phone(&self.phone).is_ok()
    }

    /// Validate and send the order.
    ///
    /// The cart is only read; clearing it after success is the caller's job.
    pub async fn submit<A: StoreApi>(&mut self, api: &A, cart: &Cart) -> SubmitOutcome {
        if self.state.is_submitting() {
            return SubmitOutcome::Busy;
        }

        let phone = match self.validate() {
            Ok(phone) => phone,
            Err(e) => {
                self.field_error = Some(e);
                return SubmitOutcome::InvalidPhone(e);
            }
        };

        if cart.is_empty() {
            return SubmitOutcome::EmptyCart;
        }

        let request = OrderRequest::new(phone, cart);
        add_breadcrumb("order", "Submitting order", None);

        self.state = CheckoutState::Submitting;
        let mut state = scopeguard::guard(&mut self.state, |state| {
            if state.is_submitting() {
                *state = CheckoutState::Idle;
            }
        });

        let response = api.submit_order(&request).await;

        if response.success {
            info!(lines = request.cart.len(), "Order placed");
            **state = CheckoutState::Succeeded;
            SubmitOutcome::Placed
        } else {
            let message = response.error_message().to_string();
            warn!(error = %message, "Order rejected");
            **state = CheckoutState::Failed {
                message: message.clone(),
            };
            SubmitOutcome::Failed { message }
        }
    }

    /// Close the success or failure notice.
    pub fn dismiss(&mut self) {
        if !self.state.is_submitting() {
            self.state = CheckoutState::Idle;
        }
    }

    /// Forget the phone after a completed order.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved phone cannot be removed.
    pub fn forget_phone(&mut self) -> Result<(), StorageError> {
        self.phone.clear();
        self.field_error = None;
        self.storage.remove(keys::PHONE)
    }
}
