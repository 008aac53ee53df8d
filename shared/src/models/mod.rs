//! Data models
//!
//! Shared between the client crate and its tests. Wire format is the
//! backend's camelCase JSON.

pub mod admin;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use admin::*;
pub use category::*;
pub use order::*;
pub use product::*;
pub use user::*;
