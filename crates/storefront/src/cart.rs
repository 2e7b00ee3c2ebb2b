//! Cart state mirrored to durable storage.
//!
//! Every mutation rewrites the full cart under [`keys::CART`]. Loading
//! tolerates garbage: a malformed entry is logged and an empty cart is used.

use std::sync::Arc;

use oshop_core::{Cart, CartItem, CartLine, Price, Product, ProductId, Quantity};
use tracing::{debug, warn};

use crate::storage::{Storage, StorageError, keys};

/// The visitor's cart, persisted on every change.
pub struct CartStore<S> {
    cart: Cart,
    storage: Arc<S>,
}

impl<S: Storage> CartStore<S> {
    /// Restore the cart from storage.
    ///
    /// Malformed data is discarded with a warning rather than failing.
    ///
    /// # Errors
    ///
    /// Returns an error only if the storage itself cannot be read.
    pub fn load(storage: Arc<S>) -> Result<Self, StorageError> {
        let cart = match storage.get(keys::CART)? {
            Some(raw) => serde_json::from_str::<Cart>(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Discarding malformed saved cart");
                Cart::new()
            }),
            None => Cart::new(),
        };

        // Saved data may repeat ids; from_items folds them to one entry each
        let cart = Cart::from_items(cart.items().iter().copied());
        debug!(items = cart.len(), "Cart loaded");

        Ok(Self { cart, storage })
    }

    /// Current contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        self.cart.items()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Quantity currently held for `id`.
    #[must_use]
    pub fn quantity_of(&self, id: ProductId) -> Option<Quantity> {
        self.cart.get(id).map(|item| item.quantity)
    }

    /// Add an item or overwrite the quantity of an existing one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted. The in-memory cart
    /// is updated regardless.
    pub fn add(&mut self, item: CartItem) -> Result<(), StorageError> {
        self.cart.add(item);
        self.persist()
    }

    /// Replace the quantity of an existing entry. Returns `false` if the
    /// product is not in the cart, in which case nothing is written.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn update(&mut self, item: CartItem) -> Result<bool, StorageError> {
        if !self.cart.update(item) {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// Increase an entry by one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn increment(&mut self, id: ProductId) -> Result<Option<Quantity>, StorageError> {
        let quantity = self.cart.increment(id);
        if quantity.is_some() {
            self.persist()?;
        }
        Ok(quantity)
    }

    /// Decrease an entry by one, never below one.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be persisted.
    pub fn decrement(&mut self, id: ProductId) -> Result<Option<Quantity>, StorageError> {
        let quantity = self.cart.decrement(id);
        if quantity.is_some() {
            self.persist()?;
        }
        Ok(quantity)
    }

    /// Empty the cart and delete the saved copy.
    ///
    /// # Errors
    ///
    /// Returns an error if the saved copy cannot be removed.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.cart.clear();
        self.storage.remove(keys::CART)
    }

    /// Sum of line totals for entries found in `products`.
    #[must_use]
    pub fn total_price(&self, products: &[Product]) -> Price {
        self.cart.total_price(products)
    }

    /// Entries resolved against `products`, skipping unknown ids.
    pub fn lines<'a>(&'a self, products: &'a [Product]) -> impl Iterator<Item = CartLine<'a>> + 'a {
        self.cart.lines(products)
    }

    fn persist(&self) -> Result<(), StorageError> {
        let json = serde_json::to_string(&self.cart).map_err(|source| StorageError::Serialize {
            key: keys::CART,
            source,
        })?;
        self.storage.set(keys::CART, &json)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use crate::storage::MemoryStorage;

    use super::*;

    fn item(id: i64, n: u32) -> CartItem {
        CartItem::new(ProductId::new(id), Quantity::new(n).unwrap())
    }

    fn saved(storage: &MemoryStorage) -> Option<String> {
        storage.get(keys::CART).unwrap()
    }

    #[test]
    fn test_load_empty_storage() {
        let store = CartStore::load(Arc::new(MemoryStorage::new())).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_saved_cart() {
        let storage = Arc::new(MemoryStorage::with_entries([(
            keys::CART,
            r#"[{"id":2,"quantity":3},{"id":5,"quantity":1}]"#,
        )]));
        let store = CartStore::load(storage).unwrap();
        assert_eq!(store.items(), &[item(2, 3), item(5, 1)]);
    }

    #[test]
    fn test_load_discards_malformed_cart() {
        for raw in ["not json", r#"{"id":1}"#, r#"[{"id":1,"quantity":0}]"#] {
            let storage = Arc::new(MemoryStorage::with_entries([(keys::CART, raw)]));
            let store = CartStore::load(storage).unwrap();
            assert!(store.is_empty(), "expected {raw} to be discarded");
        }
    }

    #[test]
    fn test_load_folds_duplicate_ids() {
        let storage = Arc::new(MemoryStorage::with_entries([(
            keys::CART,
            r#"[{"id":1,"quantity":1},{"id":1,"quantity":4}]"#,
        )]));
        let store = CartStore::load(storage).unwrap();
        assert_eq!(store.items(), &[item(1, 4)]);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::load(Arc::clone(&storage)).unwrap();

        store.add(item(1, 2)).unwrap();
        assert_eq!(saved(&storage).as_deref(), Some(r#"[{"id":1,"quantity":2}]"#));

        assert!(store.update(item(1, 5)).unwrap());
        assert_eq!(saved(&storage).as_deref(), Some(r#"[{"id":1,"quantity":5}]"#));

        store.increment(ProductId::new(1)).unwrap();
        assert_eq!(saved(&storage).as_deref(), Some(r#"[{"id":1,"quantity":6}]"#));

        let reloaded = CartStore::load(Arc::clone(&storage)).unwrap();
        assert_eq!(reloaded.items(), store.items());
    }

    #[test]
    fn test_update_missing_item_writes_nothing() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::load(Arc::clone(&storage)).unwrap();
        assert!(!store.update(item(9, 1)).unwrap());
        assert_eq!(saved(&storage), None);
    }

    #[test]
    fn test_clear_removes_saved_cart() {
        let storage = Arc::new(MemoryStorage::new());
        let mut store = CartStore::load(Arc::clone(&storage)).unwrap();
        store.add(item(1, 1)).unwrap();

        store.clear().unwrap();
        assert!(store.is_empty());
        assert_eq!(saved(&storage), None);
    }

    /// Storage that accepts reads and rejects every write.
    struct ReadOnly;

    impl Storage for ReadOnly {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io {
                path: PathBuf::from("state.json"),
                source: io::Error::other("read-only"),
            })
        }

        fn remove(&self, key: &str) -> Result<(), StorageError> {
            self.set(key, "")
        }
    }

    #[test]
    fn test_write_failure_is_reported() {
        let mut store = CartStore::load(Arc::new(ReadOnly)).unwrap();
        let err = store.add(item(1, 2)).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
        assert_eq!(store.items(), &[item(1, 2)]);
    }
}
