//! Paginated product listing.
//!
//! Pages are requested with a [`PageTicket`]. Only the most recently issued
//! ticket may apply its response, so a slow page-2 reply cannot land on top of
//! a listing that was reset to page 1 while it was in flight.

use oshop_core::{Product, ProductId};
use tracing::debug;

use crate::api::{ProductsPage, StoreApi};

/// Whether a page request is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
}

/// Handle for one page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageTicket {
    seq: u64,
    page: u32,
}

impl PageTicket {
    /// Page this ticket requests.
    #[must_use]
    pub const fn page(self) -> u32 {
        self.page
    }
}

/// Products loaded so far, in listing order.
#[derive(Debug)]
pub struct Catalog {
    products: Vec<Product>,
    page: u32,
    has_more: bool,
    state: LoadState,
    page_size: u32,
    latest: u64,
}

impl Catalog {
    /// An empty listing that will request `page_size` products per page.
    #[must_use]
    pub const fn new(page_size: u32) -> Self {
        Self {
            products: Vec::new(),
            page: 0,
            has_more: true,
            state: LoadState::Idle,
            page_size,
            latest: 0,
        }
    }

    /// Products loaded so far.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a loaded product.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Last page applied, 0 before the first load.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Whether another page may exist.
    #[must_use]
    pub const fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Start a request for `page`, superseding any outstanding one.
    pub fn begin(&mut self, page: u32) -> PageTicket {
        self.latest += 1;
        self.state = LoadState::Loading;
        PageTicket {
            seq: self.latest,
            page,
        }
    }

    /// Apply the response for `ticket`.
    ///
    /// Page 1 replaces the listing; later pages append, skipping products
    /// already listed. Returns `false` if a newer request superseded this one.
    pub fn apply(&mut self, ticket: PageTicket, response: ProductsPage) -> bool {
        if ticket.seq != self.latest {
            debug!(page = ticket.page, "Ignoring superseded products page");
            return false;
        }

        self.has_more = response.has_more();
        if ticket.page <= 1 {
            self.products = response.items;
        } else {
            for product in response.items {
                if self.find(product.id).is_none() {
                    self.products.push(product);
                }
            }
        }
        self.page = ticket.page;
        self.state = LoadState::Idle;

        debug!(page = self.page, loaded = self.products.len(), has_more = self.has_more, "Applied products page");
        true
    }

    /// Fetch and apply `page`.
    ///
    /// If the returned future is dropped before the response arrives, the
    /// listing goes back to [`LoadState::Idle`] so later loads are not blocked.
    pub async fn load_page<A: StoreApi>(&mut self, api: &A, page: u32) -> bool {
        let ticket = self.begin(page);
        let page_size = self.page_size;
        let mut catalog = scopeguard::guard(self, move |catalog| {
            if catalog.latest == ticket.seq && catalog.state == LoadState::Loading {
                debug!(page = ticket.page, "Products request abandoned");
                catalog.state = LoadState::Idle;
            }
        });

        let response = api.fetch_products(ticket.page, page_size).await;
        catalog.apply(ticket, response)
    }

    /// Fetch the page after the last one applied.
    ///
    /// Does nothing and returns `false` when the listing is exhausted or a
    /// request is already outstanding.
    pub async fn load_next<A: StoreApi>(&mut self, api: &A) -> bool {
        if !self.has_more || self.state == LoadState::Loading {
            return false;
        }
        self.load_page(api, self.page + 1).await
    }

    /// Reload from page 1, replacing the listing.
    pub async fn reset<A: StoreApi>(&mut self, api: &A) -> bool {
        self.has_more = true;
        self.load_page(api, 1).await
    }
}
