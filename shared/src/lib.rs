//! Shared types for the shop client
//!
//! Domain models, the cart aggregate, pricing rules and error vocabulary.
//! Nothing in this crate performs I/O.

pub mod cart;
pub mod error;
pub mod models;
pub mod pricing;
pub mod response;

// Re-exports
pub use http;
pub use serde::{Deserialize, Serialize};

pub use cart::{Cart, CartLine, LineKey, QuantityChange};
pub use pricing::{OrderTotals, derive_order_totals};
pub use response::{Page, PageRequest};
