//! Cart store - owns the cart snapshot and drives every mutation

use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::application::errors::{CartError, StorageError};
use crate::application::messages::{failure_message, CartOperation};
use crate::domain::entities::{Cart, Product, ProductId, Stock};
use crate::domain::traits::{KeyValueStore, Notifier, StockClient};

/// Storage key the cart snapshot is written under
pub const CART_STORAGE_KEY: &str = "@RocketShoes:cart";

const EVENT_CAPACITY: usize = 64;

/// Arguments of `CartStore::update_amount`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateProductAmount {
    pub product_id: ProductId,
    pub amount: i64,
}

impl UpdateProductAmount {
    pub fn new(product_id: impl Into<ProductId>, amount: i64) -> Self {
        Self {
            product_id: product_id.into(),
            amount,
        }
    }
}

/// Published after every successful mutation
#[derive(Debug, Clone)]
pub struct CartEvent {
    pub operation: CartOperation,
    pub cart: Cart,
}

/// Shopping cart state container.
///
/// Holds the current snapshot, mirrors each change to the key-value store and
/// reports the outcome of every operation to the notifier. Consumers share it
/// behind an `Arc` and observe changes through [`CartStore::subscribe`].
///
/// Transitions are computed against the snapshot that is current when the
/// change is committed, under the snapshot lock, never against a copy read
/// before a fetch was awaited. Overlapping operations on the same product
/// therefore cannot push an amount past the stock they each observed.
pub struct CartStore {
    client: Arc<dyn StockClient>,
    storage: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    key: String,
    snapshot: RwLock<Cart>,
    events: broadcast::Sender<CartEvent>,
}

impl CartStore {
    pub fn new(
        client: Arc<dyn StockClient>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self::with_storage_key(client, storage, notifier, CART_STORAGE_KEY)
    }

    /// Create a store persisting under a custom key
    pub fn with_storage_key(
        client: Arc<dyn StockClient>,
        storage: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
        key: impl Into<String>,
    ) -> Self {
        let key = key.into();
        let cart = load_cart(storage.as_ref(), &key);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        tracing::debug!(key = %key, lines = cart.len(), "Cart store initialized");

        Self {
            client,
            storage,
            notifier,
            key,
            snapshot: RwLock::new(cart),
            events,
        }
    }

    /// Current cart snapshot
    pub fn cart(&self) -> Cart {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Receive a `CartEvent` for each successful mutation from now on
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    /// Add one unit of a product, appending it if it is not in the cart yet
    pub async fn add(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let result = self.try_add(product_id).await;
        self.finish(CartOperation::Add, product_id, result)
    }

    /// Drop a product line from the cart
    pub fn remove(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let result = self.commit(CartOperation::Remove, |cart| {
            cart.without(product_id)
                .ok_or(CartError::NotFound(product_id))
        });
        self.finish(CartOperation::Remove, product_id, result)
    }

    /// Set the amount of a product already in the cart.
    ///
    /// Non-positive amounts are ignored: nothing is fetched, nothing is shown,
    /// and `CartError::InvalidAmount` is returned.
    pub async fn update_amount(&self, update: UpdateProductAmount) -> Result<Cart, CartError> {
        let UpdateProductAmount { product_id, amount } = update;
        if amount <= 0 {
            tracing::debug!(product = %product_id, amount, "Ignoring non-positive amount");
            return Err(CartError::InvalidAmount(amount));
        }

        let result = self.try_update_amount(product_id, amount).await;
        self.finish(CartOperation::UpdateAmount, product_id, result)
    }

    async fn try_add(&self, product_id: ProductId) -> Result<Cart, CartError> {
        let stock = self.client.stock(product_id).await?;
        tracing::debug!(product = %product_id, available = stock.amount, "Fetched stock");

        if stock.is_empty() {
            return Err(out_of_stock(product_id, 1, &stock));
        }

        let fetched = if self.cart().contains(product_id) {
            None
        } else {
            let product = self.client.product(product_id).await?;
            if product.id != product_id {
                return Err(CartError::ProductMismatch {
                    requested: product_id,
                    received: product.id,
                });
            }
            Some(product)
        };

        self.commit(CartOperation::Add, |cart| {
            increment_or_append(cart, product_id, &stock, fetched.as_ref())
        })
    }

    async fn try_update_amount(&self, product_id: ProductId, amount: i64) -> Result<Cart, CartError> {
        let stock = self.client.stock(product_id).await?;
        tracing::debug!(product = %product_id, available = stock.amount, "Fetched stock");

        let requested = u64::try_from(amount).map_err(|_| CartError::InvalidAmount(amount))?;
        let amount = checked_amount(product_id, requested, &stock)?;

        self.commit(CartOperation::UpdateAmount, |cart| {
            cart.with_amount(product_id, amount)
                .ok_or(CartError::NotFound(product_id))
        })
    }

    /// Apply a transition to the current snapshot, persist it, then publish it.
    ///
    /// The in-memory snapshot is only replaced once the write succeeded.
    fn commit<F>(&self, operation: CartOperation, transition: F) -> Result<Cart, CartError>
    where
        F: FnOnce(&Cart) -> Result<Cart, CartError>,
    {
        let mut current = self.write_snapshot();
        let next = transition(&*current)?;

        let json = next.to_json().map_err(StorageError::from)?;
        if let Err(e) = self.storage.set_item(&self.key, &json) {
            tracing::error!(key = %self.key, "Failed to persist cart: {}", e);
            return Err(e.into());
        }

        *current = next.clone();
        // no receivers is not an error
        let _ = self.events.send(CartEvent {
            operation,
            cart: next.clone(),
        });
        Ok(next)
    }

    fn finish(
        &self,
        operation: CartOperation,
        product_id: ProductId,
        result: Result<Cart, CartError>,
    ) -> Result<Cart, CartError> {
        match &result {
            Ok(cart) => {
                tracing::info!(
                    operation = %operation,
                    product = %product_id,
                    lines = cart.len(),
                    "Cart updated"
                );
                if let Some(message) = operation.success_message() {
                    self.notifier.success(message);
                }
            }
            Err(e) => match failure_message(operation, e) {
                Some(message) => {
                    tracing::warn!(operation = %operation, product = %product_id, "Cart operation failed: {}", e);
                    self.notifier.error(message);
                }
                None => {
                    tracing::debug!(operation = %operation, product = %product_id, "Cart operation skipped: {}", e);
                }
            },
        }
        result
    }

    fn write_snapshot(&self) -> RwLockWriteGuard<'_, Cart> {
        self.snapshot.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn load_cart(storage: &dyn KeyValueStore, key: &str) -> Cart {
    let json = match storage.get_item(key) {
        Ok(Some(json)) => json,
        Ok(None) => return Cart::new(),
        Err(e) => {
            tracing::warn!(key = %key, "Failed to read stored cart, starting empty: {}", e);
            return Cart::new();
        }
    };

    match Cart::from_json(&json) {
        Ok(cart) => {
            let (cart, dropped) = cart.sanitized();
            if dropped > 0 {
                tracing::warn!(key = %key, dropped, "Dropped invalid lines from stored cart");
            }
            cart
        }
        Err(e) => {
            tracing::warn!(key = %key, "Stored cart is not valid JSON, starting empty: {}", e);
            Cart::new()
        }
    }
}

fn increment_or_append(
    cart: &Cart,
    product_id: ProductId,
    stock: &Stock,
    fetched: Option<&Product>,
) -> Result<Cart, CartError> {
    if let Some(existing) = cart.get(product_id) {
        let amount = checked_amount(product_id, u64::from(existing.amount) + 1, stock)?;
        return cart
            .with_amount(product_id, amount)
            .ok_or(CartError::NotFound(product_id));
    }

    // Present when the lookup ran, absent if the line vanished while a fetch was pending
    let product = fetched.ok_or(CartError::NotFound(product_id))?;
    cart.appended(product)
        .ok_or(CartError::NotFound(product_id))
}

fn checked_amount(product_id: ProductId, requested: u64, stock: &Stock) -> Result<u32, CartError> {
    if requested > u64::from(stock.amount) {
        return Err(out_of_stock(product_id, requested, stock));
    }
    u32::try_from(requested).map_err(|_| out_of_stock(product_id, requested, stock))
}

fn out_of_stock(product_id: ProductId, requested: u64, stock: &Stock) -> CartError {
    CartError::OutOfStock {
        product_id,
        requested,
        available: stock.amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::errors::FetchError;
    use crate::application::messages::{ADD_FAILED, OUT_OF_STOCK, PRODUCT_ADDED, UPDATE_FAILED};
    use crate::infrastructure::storage::MemoryStore;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Catalog {
        stock: Mutex<HashMap<u64, u32>>,
        products: HashMap<u64, Product>,
        answer_id: Option<u64>,
    }

    impl Catalog {
        fn with(items: &[(u64, u32)]) -> Self {
            let products = items
                .iter()
                .map(|(id, _)| (*id, Product::new(*id).with_field("title", format!("Tênis {}", id))))
                .collect();
            Self {
                stock: Mutex::new(items.iter().copied().collect()),
                products,
                answer_id: None,
            }
        }
    }

    #[async_trait]
    impl StockClient for Catalog {
        async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
            let stock = self.stock.lock().unwrap();
            stock
                .get(&id.get())
                .map(|amount| Stock::new(id, *amount))
                .ok_or_else(|| FetchError::NotFound(format!("/stock/{}", id)))
        }

        async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
            let mut product = self
                .products
                .get(&id.get())
                .cloned()
                .ok_or_else(|| FetchError::NotFound(format!("/products/{}", id)))?;
            if let Some(other) = self.answer_id {
                product.id = ProductId(other);
            }
            Ok(product)
        }
    }

    #[derive(Default)]
    struct Toasts(Mutex<Vec<(bool, String)>>);

    impl Notifier for Toasts {
        fn success(&self, message: &str) {
            self.0.lock().unwrap().push((true, message.to_string()));
        }

        fn error(&self, message: &str) {
            self.0.lock().unwrap().push((false, message.to_string()));
        }
    }

    impl Toasts {
        fn taken(&self) -> Vec<(bool, String)> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }
    }

    fn store_with(catalog: Catalog) -> (CartStore, Arc<MemoryStore>, Arc<Toasts>) {
        let storage = Arc::new(MemoryStore::new());
        let toasts = Arc::new(Toasts::default());
        let store = CartStore::new(Arc::new(catalog), storage.clone(), toasts.clone());
        (store, storage, toasts)
    }

    #[tokio::test]
    async fn test_add_appends_and_persists() {
        let (store, storage, toasts) = store_with(Catalog::with(&[(1, 5)]));

        let cart = store.add(ProductId(1)).await.unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId(1)).unwrap().amount, 1);
        assert_eq!(store.cart(), cart);
        let persisted = storage.get_item(CART_STORAGE_KEY).unwrap().unwrap();
        assert_eq!(Cart::from_json(&persisted).unwrap(), cart);
        assert_eq!(toasts.taken(), vec![(true, PRODUCT_ADDED.to_string())]);
    }

    #[tokio::test]
    async fn test_add_rejects_mismatched_product() {
        let mut catalog = Catalog::with(&[(1, 5)]);
        catalog.answer_id = Some(2);
        let (store, storage, toasts) = store_with(catalog);

        let err = store.add(ProductId(1)).await.unwrap_err();

        assert!(matches!(err, CartError::ProductMismatch { .. }));
        assert!(store.cart().is_empty());
        assert_eq!(storage.get_item(CART_STORAGE_KEY).unwrap(), None);
        assert_eq!(toasts.taken(), vec![(false, ADD_FAILED.to_string())]);
    }

    #[tokio::test]
    async fn test_add_over_stock() {
        let (store, _, toasts) = store_with(Catalog::with(&[(1, 1)]));

        store.add(ProductId(1)).await.unwrap();
        toasts.taken();
        let err = store.add(ProductId(1)).await.unwrap_err();

        assert!(err.is_out_of_stock());
        assert_eq!(store.cart().get(ProductId(1)).unwrap().amount, 1);
        assert_eq!(toasts.taken(), vec![(false, OUT_OF_STOCK.to_string())]);
    }

    #[tokio::test]
    async fn test_update_amount_missing_line_is_not_found() {
        let (store, _, toasts) = store_with(Catalog::with(&[(1, 5)]));

        let err = store
            .update_amount(UpdateProductAmount::new(1u64, 2))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert_eq!(toasts.taken(), vec![(false, UPDATE_FAILED.to_string())]);
    }

    #[tokio::test]
    async fn test_events_follow_mutations() {
        let (store, _, _) = store_with(Catalog::with(&[(1, 5), (2, 5)]));
        let mut events = store.subscribe();

        store.add(ProductId(1)).await.unwrap();
        store.add(ProductId(2)).await.unwrap();
        store.remove(ProductId(1)).unwrap();

        let first = events.recv().await.unwrap();
        assert_eq!(first.operation, CartOperation::Add);
        assert_eq!(first.cart.len(), 1);
        assert_eq!(events.recv().await.unwrap().cart.len(), 2);
        let last = events.recv().await.unwrap();
        assert_eq!(last.operation, CartOperation::Remove);
        assert_eq!(last.cart.len(), 1);
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_load_sanitizes_stored_cart() {
        let storage = Arc::new(MemoryStore::new());
        storage
            .set_item(
                CART_STORAGE_KEY,
                r#"[{"id":1,"amount":2},{"id":1,"amount":3},{"id":2,"amount":0}]"#,
            )
            .unwrap();

        let store = CartStore::new(
            Arc::new(Catalog::default()),
            storage,
            Arc::new(Toasts::default()),
        );

        let cart = store.cart();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.get(ProductId(1)).unwrap().amount, 2);
    }

    #[test]
    fn test_load_tolerates_garbage() {
        let storage = Arc::new(MemoryStore::new());
        storage.set_item(CART_STORAGE_KEY, "not json").unwrap();

        let store = CartStore::new(
            Arc::new(Catalog::default()),
            storage.clone(),
            Arc::new(Toasts::default()),
        );

        assert!(store.cart().is_empty());
        // left alone until the next successful write
        assert_eq!(
            storage.get_item(CART_STORAGE_KEY).unwrap().as_deref(),
            Some("not json")
        );
    }
}
