//! Cart aggregate
//!
//! In-memory line collection keyed by (product, size, color). All
//! mutations are synchronous and never fail: paths that cannot apply
//! (unknown line, stock ceiling reached) come back as a [`QuantityChange`]
//! the caller branches on. Persistence is the client crate's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Product;
use crate::pricing::{OrderTotals, derive_order_totals};

/// Identity of a cart line
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: String,
    pub size_id: String,
    pub color_id: String,
}

impl LineKey {
    pub fn new(
        product_id: impl Into<String>,
        size_id: impl Into<String>,
        color_id: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            size_id: size_id.into(),
            color_id: color_id.into(),
        }
    }
}

/// One purchasable variant selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product snapshot taken when the line was added
    pub product: Product,
    pub size_id: String,
    pub color_id: String,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    pub fn new(
        product: Product,
        size_id: impl Into<String>,
        color_id: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            product,
            size_id: size_id.into(),
            color_id: color_id.into(),
            quantity,
            added_at: Utc::now(),
        }
    }

    pub fn key(&self) -> LineKey {
        LineKey::new(&self.product.id, &self.size_id, &self.color_id)
    }

    fn matches(&self, key: &LineKey) -> bool {
        self.product.id == key.product_id
            && self.size_id == key.size_id
            && self.color_id == key.color_id
    }

    /// Stock ceiling recorded for this line's variant
    pub fn stock_ceiling(&self) -> u32 {
        self.product.stock_for(&self.size_id, &self.color_id)
    }

    /// Unit price x quantity, saturating at the `i64` bounds
    pub fn line_total(&self) -> i64 {
        self.product.price.saturating_mul(i64::from(self.quantity))
    }
}

/// Result of a quantity mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityChange {
    /// Line now holds `quantity`
    Updated { quantity: u32 },
    /// Line was removed
    Removed,
    /// Ceiling reached, quantity unchanged
    OutOfStock { available: u32 },
    /// No line with that key
    NotFound,
}

impl QuantityChange {
    pub fn is_out_of_stock(&self) -> bool {
        matches!(self, Self::OutOfStock { .. })
    }
}

/// Cart contents
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore lines verbatim (no stock re-validation)
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        Self { lines }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.matches(key))
    }

    fn find_mut(&mut self, key: &LineKey) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.matches(key))
    }

    /// Add a line, merging into an existing line with the same key.
    ///
    /// Stock is not checked here; the ceiling applies on increase.
    /// Returns the resulting quantity of the line.
    pub fn add_item(&mut self, line: CartLine) -> u32 {
        let key = line.key();
        if let Some(existing) = self.find_mut(&key) {
            existing.quantity = existing.quantity.saturating_add(line.quantity);
            return existing.quantity;
        }
        if line.quantity == 0 {
            return 0;
        }
        let quantity = line.quantity;
        self.lines.push(line);
        quantity
    }

    /// Apply a signed delta, clamping the result to at least 1
    pub fn update_quantity(&mut self, key: &LineKey, delta: i64) -> QuantityChange {
        let Some(line) = self.find_mut(key) else {
            return QuantityChange::NotFound;
        };
        let next = (i64::from(line.quantity) + delta).clamp(1, i64::from(u32::MAX));
        line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        QuantityChange::Updated {
            quantity: line.quantity,
        }
    }

    /// Increment by one if the variant's stock allows it
    pub fn increase_quantity(&mut self, key: &LineKey) -> QuantityChange {
        let Some(line) = self.find_mut(key) else {
            return QuantityChange::NotFound;
        };
        let available = line.stock_ceiling();
        if line.quantity >= available {
            return QuantityChange::OutOfStock { available };
        }
        line.quantity += 1;
        QuantityChange::Updated {
            quantity: line.quantity,
        }
    }

    /// Decrement by one; a line at 1 is removed instead
    pub fn decrease_or_remove(&mut self, key: &LineKey) -> QuantityChange {
        let Some(idx) = self.lines.iter().position(|l| l.matches(key)) else {
            return QuantityChange::NotFound;
        };
        let Some(line) = self.lines.get_mut(idx) else {
            return QuantityChange::NotFound;
        };
        if line.quantity <= 1 {
            self.lines.remove(idx);
            return QuantityChange::Removed;
        }
        line.quantity -= 1;
        QuantityChange::Updated {
            quantity: line.quantity,
        }
    }

    /// Remove a line; `false` when it was not present
    pub fn remove_item(&mut self, key: &LineKey) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| !l.matches(key));
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of unit price x quantity
    pub fn total(&self) -> i64 {
        self.lines
            .iter()
            .map(CartLine::line_total)
            .fold(0, i64::saturating_add)
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .map(|l| l.quantity)
            .fold(0, u32::saturating_add)
    }

    pub fn totals(&self) -> OrderTotals {
        derive_order_totals(self.total())
    }

    /// Lines whose quantity is above the stock recorded in their snapshot
    pub fn over_stock_lines(&self) -> Vec<&CartLine> {
        self.lines
            .iter()
            .filter(|l| l.quantity > l.stock_ceiling())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Color, InventoryEntry, Size};

    fn product(id: &str, price: i64, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            price,
            category: None,
            description: None,
            images: vec![],
            sizes: vec![Size { id: "s".into(), name: "S".into() }],
            colors: vec![Color { id: "c".into(), name: "Red".into(), hex: None }],
            inventory: vec![InventoryEntry {
                size_id: "s".into(),
                color_id: "c".into(),
                quantity: stock,
            }],
        }
    }

    fn key(id: &str) -> LineKey {
        LineKey::new(id, "s", "c")
    }

    #[test]
    fn test_add_same_key_merges_quantities() {
        let mut cart = Cart::new();
        for qty in [1, 2, 4] {
            cart.add_item(CartLine::new(product("p", 10, 3), "s", "c", qty));
        }
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.find(&key("p")).unwrap().quantity, 7);
    }

    #[test]
    fn test_add_different_variant_appends() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("p", 10, 3), "s", "c", 1));
        cart.add_item(CartLine::new(product("p", 10, 3), "m", "c", 1));
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        assert_eq!(cart.add_item(CartLine::new(product("p", 10, 3), "s", "c", 0)), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_total_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("a", 120_000, 5), "s", "c", 2));
        cart.add_item(CartLine::new(product("b", 75_000, 5), "s", "c", 3));
        assert_eq!(cart.total(), 2 * 120_000 + 3 * 75_000);
        assert_eq!(cart.total(), cart.total());
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_increase_stops_at_ceiling() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("p", 100_000, 3), "s", "c", 1));

        assert_eq!(
            cart.increase_quantity(&key("p")),
            QuantityChange::Updated { quantity: 2 }
        );
        assert_eq!(
            cart.increase_quantity(&key("p")),
            QuantityChange::Updated { quantity: 3 }
        );
        assert_eq!(cart.total(), 300_000);

        let change = cart.increase_quantity(&key("p"));
        assert_eq!(change, QuantityChange::OutOfStock { available: 3 });
        assert_eq!(cart.find(&key("p")).unwrap().quantity, 3);
    }

    #[test]
    fn test_increase_unknown_variant_is_out_of_stock() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("p", 10, 3), "xl", "c", 1));
        let change = cart.increase_quantity(&LineKey::new("p", "xl", "c"));
        assert!(change.is_out_of_stock());
    }

    #[test]
    fn test_update_quantity_clamps_to_one() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("p", 10, 9), "s", "c", 3));
        assert_eq!(
            cart.update_quantity(&key("p"), -10),
            QuantityChange::Updated { quantity: 1 }
        );
        assert_eq!(
            cart.update_quantity(&key("p"), 4),
            QuantityChange::Updated { quantity: 5 }
        );
        assert_eq!(cart.update_quantity(&key("x"), 1), QuantityChange::NotFound);
    }

    #[test]
    fn test_decrease_from_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("p", 10, 9), "s", "c", 2));
        assert_eq!(
            cart.decrease_or_remove(&key("p")),
            QuantityChange::Updated { quantity: 1 }
        );
        assert_eq!(cart.decrease_or_remove(&key("p")), QuantityChange::Removed);
        assert!(cart.is_empty());
        assert_eq!(cart.decrease_or_remove(&key("p")), QuantityChange::NotFound);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("a", 10, 9), "s", "c", 1));
        cart.add_item(CartLine::new(product("b", 10, 9), "s", "c", 1));
        assert!(cart.remove_item(&key("a")));
        assert!(!cart.remove_item(&key("a")));
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_folds_saturate_on_huge_quantities() {
        let mut cart = Cart::new();
        cart.add_item(CartLine::new(product("a", 900_000, 5), "s", "c", 1));
        cart.add_item(CartLine::new(product("b", 900_000, 5), "s", "c", 1));
        for id in ["a", "b"] {
            assert_eq!(
                cart.update_quantity(&key(id), i64::from(u32::MAX)),
                QuantityChange::Updated { quantity: u32::MAX }
            );
        }

        assert_eq!(cart.item_count(), u32::MAX);
        assert_eq!(cart.total(), 2 * 900_000 * i64::from(u32::MAX));

        let line = CartLine::new(product("c", i64::MAX / 2, 5), "s", "c", 3);
        assert_eq!(line.line_total(), i64::MAX);
        cart.add_item(line);
        assert_eq!(cart.total(), i64::MAX);
        assert_eq!(cart.totals().total, i64::MAX);
    }

    #[test]
    fn test_over_stock_lines_after_restore() {
        let line = CartLine::new(product("p", 10, 2), "s", "c", 5);
        let cart = Cart::from_lines(vec![line]);
        assert_eq!(cart.over_stock_lines().len(), 1);
    }
}
