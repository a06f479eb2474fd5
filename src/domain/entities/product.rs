use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Identifier of a catalog product, serialized as a bare integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl ProductId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ProductId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// A product as returned by the catalog API and stored as a cart line.
///
/// Only `id` and `amount` are interpreted. Every other field (title, price,
/// image, ...) is kept in `extra` and written back untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// Quantity in the cart. Catalog records arrive without one.
    #[serde(default)]
    pub amount: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    pub fn new(id: impl Into<ProductId>) -> Self {
        Self {
            id: id.into(),
            amount: 0,
            extra: Map::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    /// Copy of this product carrying a different amount
    pub fn with_amount(&self, amount: u32) -> Self {
        Self {
            id: self.id,
            amount,
            extra: self.extra.clone(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn title(&self) -> Option<&str> {
        self.field("title").and_then(Value::as_str)
    }

    pub fn price(&self) -> Option<f64> {
        self.field("price").and_then(Value::as_f64)
    }

    /// `price * amount`, when the record has a numeric price
    pub fn subtotal(&self) -> Option<f64> {
        self.price().map(|price| price * f64::from(self.amount))
    }
}

/// Available quantity reported by the stock endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ProductId>,
    pub amount: u32,
}

impl Stock {
    pub fn new(id: impl Into<ProductId>, amount: u32) -> Self {
        Self {
            id: Some(id.into()),
            amount,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount == 0
    }

    pub fn covers(&self, requested: u32) -> bool {
        requested <= self.amount
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_keeps_unknown_fields() {
        let json = r#"{"id":3,"title":"Tênis Adidas","price":219.9,"image":"https://x/y.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId(3));
        assert_eq!(product.amount, 0);
        assert_eq!(product.title(), Some("Tênis Adidas"));
        assert_eq!(product.price(), Some(219.9));

        let back: Value = serde_json::to_value(&product).unwrap();
        assert_eq!(back["image"], "https://x/y.jpg");
        assert_eq!(back["amount"], 0);
    }

    #[test]
    fn test_with_amount_builds_fresh_entry() {
        let original = Product::new(1u64).with_field("title", "Shoe").with_amount(2);
        let updated = original.with_amount(5);

        assert_eq!(original.amount, 2);
        assert_eq!(updated.amount, 5);
        assert_eq!(updated.title(), Some("Shoe"));
    }

    #[test]
    fn test_subtotal() {
        let product = Product::new(1u64).with_field("price", 10.5).with_amount(3);
        assert_eq!(product.subtotal(), Some(31.5));
        assert_eq!(Product::new(2u64).subtotal(), None);
    }

    #[test]
    fn test_stock_parsing_and_checks() {
        let stock: Stock = serde_json::from_str(r#"{"id":1,"amount":3}"#).unwrap();
        assert_eq!(stock, Stock::new(1u64, 3));
        assert!(stock.covers(3));
        assert!(!stock.covers(4));
        assert!(!stock.is_empty());

        let bare: Stock = serde_json::from_str(r#"{"amount":0}"#).unwrap();
        assert!(bare.is_empty());
        assert_eq!(bare.id, None);
    }
}
