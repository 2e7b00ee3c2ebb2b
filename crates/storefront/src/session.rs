//! One visitor's storefront session.
//!
//! [`Session`] owns every piece of page state and applies the cross-cutting
//! rules between them:
//!
//! - an emptied cart sends the product listing back to page 1
//! - a placed order clears the cart and the saved phone, then reloads page 1
//! - cart totals are priced against every product loaded so far

use std::sync::Arc;

use oshop_core::{Cart, CartItem, CartLine, Price, ProductId, Quantity};
use tracing::{info, instrument};

use crate::api::StoreApi;
use crate::cart::CartStore;
use crate::catalog::Catalog;
use crate::checkout::{Checkout, SubmitOutcome};
use crate::error::{Result, add_breadcrumb};
use crate::reviews::Reviews;
use crate::storage::Storage;

/// Page state for one visitor, backed by `storage` and talking to `api`.
pub struct Session<A, S> {
    api: A,
    cart: CartStore<S>,
    catalog: Catalog,
    checkout: Checkout<S>,
    reviews: Reviews,
}

impl<A: StoreApi, S: Storage> Session<A, S> {
    /// Restore saved cart and phone. Nothing is fetched until [`Self::load`].
    ///
    /// # Errors
    ///
    /// Returns an error if storage cannot be read.
    pub fn open(api: A, storage: Arc<S>, page_size: u32) -> Result<Self> {
        Ok(Self {
            api,
            cart: CartStore::load(Arc::clone(&storage))?,
            catalog: Catalog::new(page_size),
            checkout: Checkout::load(storage)?,
            reviews: Reviews::new(),
        })
    }

    /// Fetch reviews and the first product page.
    #[instrument(skip(self))]
    pub async fn load(&mut self) {
        self.reviews.load(&self.api).await;
        self.catalog.reset(&self.api).await;
    }

    /// Fetch only the reviews.
    pub async fn load_reviews(&mut self) {
        self.reviews.load(&self.api).await;
    }

    /// Append the next product page, if any. Returns whether a page was applied.
    pub async fn load_more_products(&mut self) -> bool {
        self.catalog.load_next(&self.api).await
    }

    /// Fetch a specific page. Page 1 replaces the listing; later pages append.
    pub async fn load_products_page(&mut self, page: u32) -> bool {
        self.catalog.load_page(&self.api, page).await
    }

    /// Load pages until every cart entry resolves to a product or the
    /// listing is exhausted.
    pub async fn load_products_for_cart(&mut self) {
        if self.catalog.page() == 0 {
            self.catalog.reset(&self.api).await;
        }
        while self.unresolved_cart_items().next().is_some() {
            if !self.catalog.load_next(&self.api).await {
                break;
            }
        }
    }

    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        self.cart.cart()
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn checkout(&self) -> &Checkout<S> {
        &self.checkout
    }

    #[must_use]
    pub const fn reviews(&self) -> &Reviews {
        &self.reviews
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Add a product or overwrite its quantity.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn add_to_cart(&mut self, id: ProductId, quantity: Quantity) -> Result<()> {
        add_breadcrumb("cart", "Added product", Some(&[("product_id", id.to_string().as_str())]));
        self.cart.add(CartItem::new(id, quantity))?;
        Ok(())
    }

    /// Set the quantity of a product already in the cart. Returns `false`
    /// if it is not there.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn update_cart_item(&mut self, id: ProductId, quantity: Quantity) -> Result<bool> {
        Ok(self.cart.update(CartItem::new(id, quantity))?)
    }

    /// Increase a cart entry by one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn increment(&mut self, id: ProductId) -> Result<Option<Quantity>> {
        Ok(self.cart.increment(id)?)
    }

    /// Decrease a cart entry by one, never below one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn decrement(&mut self, id: ProductId) -> Result<Option<Quantity>> {
        Ok(self.cart.decrement(id)?)
    }

    /// Empty the cart and send the listing back to page 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved cart cannot be removed.
    pub async fn clear_cart(&mut self) -> Result<()> {
        let cleared = self.cart.clear();
        self.catalog.reset(&self.api).await;
        Ok(cleared?)
    }

    /// Cart entries matched to loaded products.
    pub fn cart_lines(&self) -> impl Iterator<Item = CartLine<'_>> {
        self.cart.lines(self.catalog.products())
    }

    /// Cart entries whose product has not been loaded yet.
    pub fn unresolved_cart_items(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.cart.cart().unresolved(self.catalog.products())
    }

    /// Total over loaded products.
    #[must_use]
    pub fn total_price(&self) -> Price {
        self.cart.total_price(self.catalog.products())
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Replace the phone input.
    ///
    /// # Errors
    ///
    /// Returns an error if the phone cannot be persisted.
    pub fn set_phone(&mut self, raw: &str) -> Result<()> {
        self.checkout.set_phone(raw)?;
        Ok(())
    }

    /// Whether an order can be submitted right now.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.checkout.can_submit(self.cart.cart())
    }

    /// Submit the order and, on success, reset the page.
    ///
    /// # Errors
    ///
    /// Returns an error only if post-order cleanup cannot update storage; the
    /// order itself has been placed in that case. Every cleanup step still
    /// runs and the first storage error is reported.
    pub async fn submit_order(&mut self) -> Result<SubmitOutcome> {
        let outcome = self.checkout.submit(&self.api, self.cart.cart()).await;

        if outcome == SubmitOutcome::Placed {
            info!("Resetting storefront after order");
            self.catalog.reset(&self.api).await;
            let cart = self.cart.clear();
            let phone = self.checkout.forget_phone();
            cart.and(phone)?;
        }

        Ok(outcome)
    }

    /// Close the order notice.
    pub fn dismiss_success(&mut self) {
        self.checkout.dismiss();
    }
}
