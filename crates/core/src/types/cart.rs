//! Cart collection and its line items.
//!
//! The cart is an ordered list of `(product id, quantity)` pairs with at most
//! one entry per product. Prices are not stored here; totals are derived
//! against whatever products have been loaded.

use core::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::ProductId;
use super::price::Price;

/// Errors that can occur when constructing a [`Quantity`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities must be at least one.
    #[error("quantity must be a positive integer")]
    Zero,
}

/// A positive item count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Quantity(NonZeroU32);

impl Quantity {
    /// A quantity of one.
    pub const ONE: Self = Self(NonZeroU32::MIN);

    /// Create a new quantity.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Zero`] if `value` is zero.
    pub const fn new(value: u32) -> Result<Self, QuantityError> {
        match NonZeroU32::new(value) {
            Some(n) => Ok(Self(n)),
            None => Err(QuantityError::Zero),
        }
    }

    /// Parse a quantity typed by the user.
    ///
    /// Anything that is not a positive integer falls back to one.
    #[must_use]
    pub fn from_input(input: &str) -> Self {
        input
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(|value| Self::new(value).ok())
            .unwrap_or(Self::ONE)
    }

    /// Get the underlying count.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// One more, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }

    /// One less, never going below one.
    #[must_use]
    pub fn decremented(self) -> Self {
        Self::new(self.get() - 1).unwrap_or(self)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Quantity {
    type Error = QuantityError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Quantity> for u32 {
    fn from(quantity: Quantity) -> Self {
        quantity.get()
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One cart entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartItem {
    /// Product this entry refers to.
    pub id: ProductId,
    /// How many units.
    pub quantity: Quantity,
}

impl CartItem {
    /// Create a new cart item.
    #[must_use]
    pub const fn new(id: ProductId, quantity: Quantity) -> Self {
        Self { id, quantity }
    }
}

/// A cart entry resolved against a loaded product, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine<'a> {
    pub product: &'a Product,
    pub quantity: Quantity,
    pub total: Price,
}

/// Ordered cart contents keyed by product id.
///
/// Serializes as a plain JSON array of [`CartItem`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from items, keeping the last quantity seen for each id.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            cart.add(item);
        }
        cart
    }

    /// Add an item. If the product is already in the cart its quantity is
    /// overwritten in place, otherwise the item is appended.
    pub fn add(&mut self, item: CartItem) {
        match self.get_mut(item.id) {
            Some(existing) => existing.quantity = item.quantity,
            None => self.items.push(item),
        }
    }

    /// Replace the quantity of an existing entry.
    ///
    /// Returns `false` and leaves the cart untouched if the product is absent.
    pub fn update(&mut self, item: CartItem) -> bool {
        self.get_mut(item.id).is_some_and(|existing| {
            existing.quantity = item.quantity;
            true
        })
    }

    /// Increase an entry's quantity by one. Returns the new quantity.
    pub fn increment(&mut self, id: ProductId) -> Option<Quantity> {
        let existing = self.get_mut(id)?;
        existing.quantity = existing.quantity.incremented();
        Some(existing.quantity)
    }

    /// Decrease an entry's quantity by one, stopping at one. Returns the new
    /// quantity.
    pub fn decrement(&mut self, id: ProductId) -> Option<Quantity> {
        let existing = self.get_mut(id)?;
        existing.quantity = existing.quantity.decremented();
        Some(existing.quantity)
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Look up the entry for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    fn get_mut(&mut self, id: ProductId) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Entries in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Number of distinct products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entries resolved against `products`; entries without a matching
    /// product are skipped.
    pub fn lines<'a>(&'a self, products: &'a [Product]) -> impl Iterator<Item = CartLine<'a>> + 'a {
        self.items.iter().filter_map(move |item| {
            let product = products.iter().find(|p| p.id == item.id)?;
            Some(CartLine {
                product,
                quantity: item.quantity,
                total: product.price.times(item.quantity),
            })
        })
    }

    /// Sum of `price * quantity` over entries whose product is in `products`.
    #[must_use]
    pub fn total_price(&self, products: &[Product]) -> Price {
        self.lines(products).map(|line| line.total).sum()
    }

    /// Ids present in the cart but not in `products`.
    pub fn unresolved<'a>(&'a self, products: &'a [Product]) -> impl Iterator<Item = ProductId> + 'a {
        self.items
            .iter()
            .map(|item| item.id)
            .filter(move |id| !products.iter().any(|p| p.id == *id))
    }
}

impl FromIterator<CartItem> for Cart {
    fn from_iter<I: IntoIterator<Item = CartItem>>(iter: I) -> Self {
        Self::from_items(iter)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use proptest::prelude::*;

    use super::*;

    fn qty(n: u32) -> Quantity {
        Quantity::new(n).unwrap()
    }

    fn item(id: i64, n: u32) -> CartItem {
        CartItem::new(ProductId::new(id), qty(n))
    }

    fn product(id: i64, rubles: u64) -> Product {
        Product {
            id: ProductId::new(id),
            title: format!("Product {id}"),
            description: String::new(),
            price: Price::from_rubles(rubles),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_quantity_rejects_zero() {
        assert_eq!(Quantity::new(0), Err(QuantityError::Zero));
        assert!(serde_json::from_str::<Quantity>("0").is_err());
        assert_eq!(serde_json::from_str::<Quantity>("3").unwrap(), qty(3));
    }

    #[test]
    fn test_quantity_from_input_falls_back_to_one() {
        assert_eq!(Quantity::from_input("5"), qty(5));
        assert_eq!(Quantity::from_input(" 12 "), qty(12));
        assert_eq!(Quantity::from_input(""), Quantity::ONE);
        assert_eq!(Quantity::from_input("0"), Quantity::ONE);
        assert_eq!(Quantity::from_input("-4"), Quantity::ONE);
        assert_eq!(Quantity::from_input("abc"), Quantity::ONE);
    }

    #[test]
    fn test_decrement_stops_at_one() {
        assert_eq!(qty(2).decremented(), Quantity::ONE);
        assert_eq!(Quantity::ONE.decremented(), Quantity::ONE);
    }

    #[test]
    fn test_add_appends_new_items_in_order() {
        let mut cart = Cart::new();
        cart.add(item(3, 1));
        cart.add(item(1, 2));
        let ids: Vec<i64> = cart.items().iter().map(|i| i.id.as_i64()).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_add_overwrites_existing_quantity_in_place() {
        let mut cart = Cart::new();
        cart.add(item(1, 1));
        cart.add(item(2, 1));
        cart.add(item(1, 5));
        assert_eq!(cart.items(), &[item(1, 5), item(2, 1)]);
    }

    #[test]
    fn test_update_absent_is_noop() {
        let mut cart = Cart::from_items([item(1, 1)]);
        assert!(!cart.update(item(9, 4)));
        assert_eq!(cart.items(), &[item(1, 1)]);
        assert!(cart.update(item(1, 4)));
        assert_eq!(cart.items(), &[item(1, 4)]);
    }

    #[test]
    fn test_increment_and_decrement() {
        let mut cart = Cart::from_items([item(1, 1)]);
        assert_eq!(cart.increment(ProductId::new(1)), Some(qty(2)));
        assert_eq!(cart.decrement(ProductId::new(1)), Some(qty(1)));
        assert_eq!(cart.decrement(ProductId::new(1)), Some(qty(1)));
        assert_eq!(cart.increment(ProductId::new(2)), None);
    }

    #[test]
    fn test_total_price_skips_unknown_products() {
        let cart = Cart::from_items([item(1, 2), item(2, 1), item(99, 10)]);
        let products = [product(1, 100), product(2, 1500)];
        assert_eq!(cart.total_price(&products), Price::from_rubles(1700));
        assert_eq!(cart.lines(&products).count(), 2);
        assert_eq!(cart.unresolved(&products).collect::<Vec<_>>(), vec![ProductId::new(99)]);
    }

    #[test]
    fn test_total_price_of_empty_cart_is_zero() {
        assert_eq!(Cart::new().total_price(&[product(1, 10)]), Price::ZERO);
    }

    #[test]
    fn test_total_price_of_huge_prices_saturates() {
        let mut huge = product(1, 0);
        huge.price = Price::new(rust_decimal::Decimal::from_str_exact("50000000000000000000000000000").unwrap()).unwrap();
        let cart = Cart::from_items([item(1, 2), item(2, 1)]);
        let total = cart.total_price(&[huge, product(2, 10)]);
        assert_eq!(total.amount(), rust_decimal::Decimal::MAX);
    }

    #[test]
    fn test_serializes_as_array() {
        let cart = Cart::from_items([item(1, 2)]);
        let json = serde_json::to_string(&cart).unwrap();
        assert_eq!(json, r#"[{"id":1,"quantity":2}]"#);
        assert_eq!(serde_json::from_str::<Cart>(&json).unwrap(), cart);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i64, u32),
        Update(i64, u32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0i64..6, 1u32..50).prop_map(|(id, n)| Op::Add(id, n)),
            (0i64..6, 1u32..50).prop_map(|(id, n)| Op::Update(id, n)),
        ]
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_id_and_last_value_wins(ops in prop::collection::vec(op(), 0..40)) {
            let mut cart = Cart::new();
            let mut expected: HashMap<i64, u32> = HashMap::new();

            for op in ops {
                match op {
                    Op::Add(id, n) => {
                        cart.add(item(id, n));
                        expected.insert(id, n);
                    }
                    Op::Update(id, n) => {
                        cart.update(item(id, n));
                        if let Some(current) = expected.get_mut(&id) {
                            *current = n;
                        }
                    }
                }
            }

            prop_assert_eq!(cart.len(), expected.len());
            for entry in cart.items() {
                prop_assert_eq!(Some(&entry.quantity.get()), expected.get(&entry.id.as_i64()));
            }
        }

        #[test]
        fn prop_total_matches_manual_sum(
            entries in prop::collection::vec((0i64..8, 1u32..20), 0..10),
            prices in prop::collection::vec(0u64..10_000, 4),
        ) {
            let cart: Cart = entries.iter().map(|&(id, n)| item(id, n)).collect();
            let products: Vec<Product> = prices
                .iter()
                .enumerate()
                .map(|(i, &p)| product(i64::try_from(i).unwrap(), p))
                .collect();

            let mut expected = 0u64;
            for entry in cart.items() {
                if let Some(p) = products.iter().find(|p| p.id == entry.id) {
                    expected += u64::try_from(p.price.amount().mantissa()).unwrap() * u64::from(entry.quantity.get());
                }
            }

            prop_assert_eq!(cart.total_price(&products), Price::from_rubles(expected));
        }
    }
}
