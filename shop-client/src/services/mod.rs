//! Typed REST services
//!
//! Thin wrappers over [`ApiClient`](crate::api::ApiClient), one per
//! backend resource. Paths are relative to the configured base URL.

pub mod admin;
pub mod auth;
pub mod categories;
pub mod orders;
pub mod products;

pub use admin::AdminService;
pub use auth::AuthService;
pub use categories::CategoryService;
pub use orders::OrderService;
pub use products::ProductService;

use shared::PageRequest;

use crate::api::RequestOptions;

/// Options carrying `page` / `size` query parameters
pub(crate) fn paged(page: PageRequest) -> RequestOptions {
    RequestOptions::new()
        .param("page", page.page)
        .param("size", page.size)
}
