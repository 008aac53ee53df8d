//! Product Model

use serde::{Deserialize, Serialize};

/// Selectable size (S, M, L, 38, 39 ...)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub id: String,
    pub name: String,
}

/// Selectable color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: String,
    pub name: String,
    /// Swatch color, e.g. "#1f2937"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
}

/// Stock recorded for one (size, color) variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryEntry {
    pub size_id: String,
    pub color_id: String,
    pub quantity: u32,
}

/// Product entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Unit price (currency has no minor unit)
    pub price: i64,
    /// Category reference (String ID)
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
}

impl Product {
    /// Stock for a variant, `0` when the pair is not recorded
    pub fn stock_for(&self, size_id: &str, color_id: &str) -> u32 {
        self.inventory
            .iter()
            .find(|e| e.size_id == size_id && e.color_id == color_id)
            .map(|e| e.quantity)
            .unwrap_or(0)
    }

    pub fn has_size(&self, size_id: &str) -> bool {
        self.sizes.iter().any(|s| s.id == size_id)
    }

    pub fn has_color(&self, color_id: &str) -> bool {
        self.colors.iter().any(|c| c.id == color_id)
    }

    /// Sum of stock over every variant
    pub fn total_stock(&self) -> u32 {
        self.inventory.iter().map(|e| e.quantity).sum()
    }
}

/// Create / update product payload (admin)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpsert {
    pub name: String,
    pub price: i64,
    pub category: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<Size>,
    #[serde(default)]
    pub colors: Vec<Color>,
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
}
