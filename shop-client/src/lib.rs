//! Shop Client - core of the clothing shop apps
//!
//! Request dispatch against the shop REST backend (dedup, retry, token
//! refresh), session and cart persistence, checkout and typed services.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod connectivity;
pub mod context;
pub mod error;
pub mod error_handler;
pub mod http;
pub mod services;
pub mod session;
pub mod storage;

pub use api::{ApiClient, RequestOptions};
pub use cart::CartStore;
pub use checkout::{CheckoutForm, place_order};
pub use config::{ClientConfig, RetryPolicy};
pub use connectivity::Connectivity;
pub use context::ShopContext;
pub use error::{ClientError, ClientResult, ErrorKind};
pub use error_handler::{ErrorHandler, ErrorReport, Severity};
pub use http::{FileUpload, HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
pub use session::{LogoutReason, SessionEvent, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};

// Re-export shared types for convenience
pub use shared::{Cart, CartLine, LineKey, OrderTotals, Page, PageRequest, QuantityChange};
pub use tokio_util::sync::CancellationToken;
