//! Persistent cart
//!
//! [`CartStore`] owns the in-memory [`Cart`] and mirrors it to storage
//! after every mutation. Mutations never fail because of persistence:
//! write errors are logged and the in-memory state stays authoritative.

use std::sync::Arc;

use shared::cart::{Cart, CartLine, LineKey, QuantityChange};
use shared::models::Product;
use shared::pricing::OrderTotals;

use crate::error::ClientResult;
use crate::storage::{Storage, load_json, save_json};

pub const CART_KEY: &str = "cart";

/// Cart backed by a [`Storage`]
#[derive(Debug)]
pub struct CartStore {
    cart: Cart,
    storage: Arc<dyn Storage>,
}

impl CartStore {
    /// Restore the persisted cart.
    ///
    /// Lines are restored verbatim; stock is not re-validated here.
    /// An unreadable payload is logged and yields an empty cart.
    pub async fn load(storage: Arc<dyn Storage>) -> Self {
        let cart = match load_json::<Vec<CartLine>>(storage.as_ref(), CART_KEY).await {
            Ok(Some(lines)) => {
                tracing::debug!(lines = lines.len(), "Cart restored");
                Cart::from_lines(lines)
            }
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!("Discarding unreadable cart: {e}");
                Cart::new()
            }
        };
        Self { cart, storage }
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    pub fn total(&self) -> i64 {
        self.cart.total()
    }

    pub fn item_count(&self) -> u32 {
        self.cart.item_count()
    }

    pub fn totals(&self) -> OrderTotals {
        self.cart.totals()
    }

    // ========== Mutations ==========

    /// Add `quantity` of a variant; merges with an existing line
    pub async fn add_item(
        &mut self,
        product: Product,
        size_id: &str,
        color_id: &str,
        quantity: u32,
    ) -> u32 {
        let line = CartLine::new(product, size_id, color_id, quantity);
        let product_id = line.product.id.clone();
        let total = self.cart.add_item(line);
        tracing::debug!(product_id = %product_id, size_id, color_id, quantity = total, "Cart line added");
        self.persist().await;
        total
    }

    pub async fn update_quantity(&mut self, key: &LineKey, delta: i64) -> QuantityChange {
        let change = self.cart.update_quantity(key, delta);
        self.persist_if_changed(change).await;
        change
    }

    /// +1, bounded by the variant's recorded stock
    pub async fn increase_quantity(&mut self, key: &LineKey) -> QuantityChange {
        let change = self.cart.increase_quantity(key);
        if let QuantityChange::OutOfStock { available } = change {
            tracing::debug!(product_id = %key.product_id, available, "Stock ceiling reached");
        }
        self.persist_if_changed(change).await;
        change
    }

    /// -1, removing the line when it would reach zero
    pub async fn decrease_or_remove(&mut self, key: &LineKey) -> QuantityChange {
        let change = self.cart.decrease_or_remove(key);
        self.persist_if_changed(change).await;
        change
    }

    pub async fn remove_item(&mut self, key: &LineKey) -> bool {
        let removed = self.cart.remove_item(key);
        if removed {
            self.persist().await;
        }
        removed
    }

    pub async fn clear(&mut self) {
        self.cart.clear();
        self.persist().await;
    }

    // ========== Persistence ==========

    async fn persist_if_changed(&self, change: QuantityChange) {
        if matches!(
            change,
            QuantityChange::Updated { .. } | QuantityChange::Removed
        ) {
            self.persist().await;
        }
    }

    async fn persist(&self) {
        if let Err(e) = self.save().await {
            tracing::warn!(lines = self.cart.lines().len(), "Failed to persist cart: {e}");
        }
    }

    /// Write the current lines, surfacing storage errors
    pub async fn save(&self) -> ClientResult<()> {
        save_json(self.storage.as_ref(), CART_KEY, self.cart.lines()).await
    }
}
