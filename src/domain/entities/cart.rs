//! Cart snapshot and its transitions.
//!
//! A `Cart` is never edited in place by the store. Every transition returns a
//! new snapshot built from fresh `Product` values, so the previous snapshot
//! stays valid for comparison and for observers holding a copy.

use serde::{Deserialize, Serialize};

use super::product::{Product, ProductId};

/// Ordered list of cart lines, serialized as a plain JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Product>) -> Self {
        Self { items }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn items(&self) -> &[Product] {
        &self.items
    }

    pub fn into_items(self) -> Vec<Product> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Product> {
        self.items.iter()
    }

    /// Number of distinct products
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line amounts
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|p| u64::from(p.amount)).sum()
    }

    /// Sum of line subtotals; lines without a numeric price count as zero
    pub fn total(&self) -> f64 {
        self.items.iter().filter_map(Product::subtotal).sum()
    }

    pub fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|p| p.id == id)
    }

    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn contains(&self, id: ProductId) -> bool {
        self.position(id).is_some()
    }

    /// Drops lines that break the cart invariants: zero amounts and repeated
    /// ids (the first occurrence wins). Returns the cleaned cart and how many
    /// lines were dropped.
    pub fn sanitized(self) -> (Self, usize) {
        let before = self.items.len();
        let mut items: Vec<Product> = Vec::with_capacity(before);
        for product in self.items {
            if product.amount == 0 || items.iter().any(|p| p.id == product.id) {
                continue;
            }
            items.push(product);
        }
        let dropped = before - items.len();
        (Self { items }, dropped)
    }

    /// New snapshot with `product` appended as a line of amount 1.
    ///
    /// Returns `None` if the id is already present.
    pub fn appended(&self, product: &Product) -> Option<Self> {
        if self.contains(product.id) {
            return None;
        }
        let mut items = self.items.clone();
        items.push(product.with_amount(1));
        Some(Self { items })
    }

    /// New snapshot where the line for `id` carries `amount`, same position.
    ///
    /// Returns `None` if the id is absent.
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        let index = self.position(id)?;
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(i, p)| if i == index { p.with_amount(amount) } else { p.clone() })
            .collect();
        Some(Self { items })
    }

    /// New snapshot without the line for `id`. Returns `None` if absent.
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let items = self.items.iter().filter(|p| p.id != id).cloned().collect();
        Some(Self { items })
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a Product;
    type IntoIter = std::slice::Iter<'a, Product>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: u64, amount: u32) -> Product {
        Product::new(id).with_field("title", format!("Product {}", id)).with_amount(amount)
    }

    fn sample() -> Cart {
        Cart::from_items(vec![line(1, 2), line(2, 1), line(3, 4)])
    }

    #[test]
    fn test_appended_goes_to_the_end() {
        let cart = sample();
        let next = cart.appended(&Product::new(9u64)).unwrap();

        assert_eq!(next.len(), 4);
        assert_eq!(&next.items()[..3], cart.items());
        assert_eq!(next.items()[3].id, ProductId(9));
        assert_eq!(next.items()[3].amount, 1);
    }

    #[test]
    fn test_appended_refuses_duplicates() {
        assert!(sample().appended(&Product::new(2u64)).is_none());
    }

    #[test]
    fn test_with_amount_keeps_position_and_fields() {
        let cart = sample();
        let next = cart.with_amount(ProductId(2), 7).unwrap();

        assert_eq!(next.position(ProductId(2)), Some(1));
        assert_eq!(next.get(ProductId(2)).unwrap().amount, 7);
        assert_eq!(next.get(ProductId(2)).unwrap().title(), Some("Product 2"));
        assert_eq!(next.get(ProductId(1)), cart.get(ProductId(1)));
        assert_eq!(next.get(ProductId(3)), cart.get(ProductId(3)));
        // previous snapshot untouched
        assert_eq!(cart.get(ProductId(2)).unwrap().amount, 1);
    }

    #[test]
    fn test_with_amount_absent() {
        assert!(sample().with_amount(ProductId(42), 1).is_none());
    }

    #[test]
    fn test_without_preserves_order() {
        let next = sample().without(ProductId(2)).unwrap();
        let ids: Vec<u64> = next.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(sample().without(ProductId(42)).is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let cart = sample();
        let json = cart.to_json().unwrap();
        assert!(json.starts_with('['));
        assert_eq!(Cart::from_json(&json).unwrap(), cart);
    }

    #[test]
    fn test_sanitized_drops_invalid_lines() {
        let raw = Cart::from_items(vec![line(1, 2), line(2, 0), line(1, 5), line(3, 1)]);
        let (cart, dropped) = raw.sanitized();

        assert_eq!(dropped, 2);
        let ids: Vec<(u64, u32)> = cart.iter().map(|p| (p.id.get(), p.amount)).collect();
        assert_eq!(ids, vec![(1, 2), (3, 1)]);
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from_items(vec![
            Product::new(1u64).with_field("price", 100.0).with_amount(2),
            Product::new(2u64).with_field("price", 50.0).with_amount(1),
            Product::new(3u64).with_amount(3),
        ]);
        assert_eq!(cart.total_items(), 6);
        assert_eq!(cart.total(), 250.0);
    }
}
