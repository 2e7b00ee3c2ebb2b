//! Wire types for the remote store API.

use oshop_core::{Cart, CartItem, PhoneNumber, Product};
use serde::{Deserialize, Deserializer, Serialize};

/// One page of the product listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductsPage {
    /// Page number the server returned (1-based; 0 for the empty fallback).
    #[serde(default)]
    pub page: u32,
    /// Page size the server applied.
    #[serde(default)]
    pub amount: u32,
    /// Total number of products across all pages.
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub items: Vec<Product>,
}

impl ProductsPage {
    /// The zeroed page substituted when a fetch fails.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether another page can be requested after this one.
    #[must_use]
    pub fn has_more(&self) -> bool {
        !self.items.is_empty() && u64::from(self.page) * u64::from(self.amount) < u64::from(self.total)
    }
}

/// Body of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub phone: PhoneNumber,
    pub cart: Vec<CartItem>,
}

impl OrderRequest {
    /// Build a request from a validated phone and the current cart.
    #[must_use]
    pub fn new(phone: PhoneNumber, cart: &Cart) -> Self {
        Self {
            phone,
            cart: cart.items().to_vec(),
        }
    }
}

/// Response of `POST /order`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderResponse {
    /// Sent as `0`/`1` by the server; booleans are accepted too.
    #[serde(deserialize_with = "deserialize_flag")]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl OrderResponse {
    /// Message used when the order fails without a server-provided reason.
    pub const GENERIC_ERROR: &'static str = "order could not be placed";

    /// A failed response carrying the generic message.
    #[must_use]
    pub fn failed() -> Self {
        Self {
            success: false,
            error: Some(Self::GENERIC_ERROR.to_string()),
        }
    }

    /// The server's error message, or the generic one when absent or blank.
    #[must_use]
    pub fn error_message(&self) -> &str {
        self.error
            .as_deref()
            .map(str::trim)
            .filter(|msg| !msg.is_empty())
            .unwrap_or(Self::GENERIC_ERROR)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

/// Accept `true`/`false` or an integer where non-zero means true.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use oshop_core::{ProductId, Quantity};

    use super::*;

    #[test]
    fn test_has_more() {
        let item = serde_json::from_str::<Product>(r#"{"id":1,"title":"a","price":1}"#).unwrap();
        let page = |page, amount, total, items: Vec<Product>| ProductsPage {
            page,
            amount,
            total,
            items,
        };

        assert!(page(1, 20, 45, vec![item.clone()]).has_more());
        assert!(page(2, 20, 45, vec![item.clone()]).has_more());
        assert!(!page(3, 20, 45, vec![item.clone()]).has_more());
        assert!(!page(2, 20, 40, vec![item]).has_more());
        assert!(!page(1, 20, 45, vec![]).has_more());
        assert!(!ProductsPage::empty().has_more());
    }

    #[test]
    fn test_products_page_from_store_json() {
        let json = r#"{"page":1,"amount":2,"total":3,"items":[
            {"id":1,"image_url":"","title":"A","description":"","price":10},
            {"id":2,"image_url":"","title":"B","description":"","price":20}
        ]}"#;
        let page: ProductsPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.items.len(), 2);
        assert!(page.has_more());
    }

    #[test]
    fn test_order_request_body() {
        let cart = Cart::from_items([CartItem::new(ProductId::new(3), Quantity::new(2).unwrap())]);
        let request = OrderRequest::new(PhoneNumber::parse("+7 (912) 345-67-89").unwrap(), &cart);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"phone": "79123456789", "cart": [{"id": 3, "quantity": 2}]})
        );
    }

    #[test]
    fn test_order_response_accepts_int_and_bool_flags() {
        let ok: OrderResponse = serde_json::from_str(r#"{"success":1}"#).unwrap();
        assert!(ok.success);
        let ok: OrderResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(ok.success);
        let failed: OrderResponse =
            serde_json::from_str(r#"{"success":0,"error":"out of stock"}"#).unwrap();
        assert!(!failed.success);
        assert_eq!(failed.error_message(), "out of stock");
    }

    #[test]
    fn test_order_response_generic_message() {
        let failed: OrderResponse = serde_json::from_str(r#"{"success":0,"error":"  "}"#).unwrap();
        assert_eq!(failed.error_message(), OrderResponse::GENERIC_ERROR);
        assert_eq!(OrderResponse::failed().error_message(), OrderResponse::GENERIC_ERROR);
    }

    #[test]
    fn test_order_response_rejects_missing_flag() {
        assert!(serde_json::from_str::<OrderResponse>(r#"{"error":"x"}"#).is_err());
    }
}
