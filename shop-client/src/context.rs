//! Application context
//!
//! Everything the UI needs, built once at startup and passed around:
//! the dispatch client, session, cart and typed services.

use std::sync::Arc;

use shared::models::Order;
use tokio::sync::Mutex;

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::{CheckoutForm, place_order};
use crate::config::ClientConfig;
use crate::connectivity::Connectivity;
use crate::error::ClientResult;
use crate::error_handler::ErrorHandler;
use crate::http::{ReqwestTransport, Transport};
use crate::services::{AdminService, AuthService, CategoryService, OrderService, ProductService};
use crate::session::SessionStore;
use crate::storage::{FileStorage, Storage};

/// Subdirectory of the data dir holding tokens and the user
const SESSION_DIR: &str = "session";

#[derive(Debug)]
pub struct ShopContext {
    api: ApiClient,
    cart: Mutex<CartStore>,
    errors: ErrorHandler,
    auth: AuthService,
    products: ProductService,
    categories: CategoryService,
    orders: OrderService,
    admin: AdminService,
}

impl ShopContext {
    /// Production wiring: reqwest transport, file storage under
    /// `config.data_dir`
    pub async fn open(config: ClientConfig, connectivity: Connectivity) -> ClientResult<Self> {
        let transport: Arc<dyn Transport> = Arc::new(ReqwestTransport::new()?);
        let session_storage: Arc<dyn Storage> =
            Arc::new(FileStorage::new(config.data_dir.join(SESSION_DIR)));
        let cart_storage: Arc<dyn Storage> = Arc::new(FileStorage::new(&config.data_dir));
        tracing::info!(
            base_url = %config.base_url,
            data_dir = %config.data_dir.display(),
            "Opening shop context"
        );
        Ok(Self::with_parts(config, transport, session_storage, cart_storage, connectivity).await)
    }

    /// Assemble from explicit parts
    pub async fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        session_storage: Arc<dyn Storage>,
        cart_storage: Arc<dyn Storage>,
        connectivity: Connectivity,
    ) -> Self {
        let session = SessionStore::new(session_storage);
        let api = ApiClient::new(config, transport, session, connectivity);
        let cart = CartStore::load(cart_storage).await;

        Self {
            cart: Mutex::new(cart),
            errors: ErrorHandler::new(),
            auth: AuthService::new(api.clone()),
            products: ProductService::new(api.clone()),
            categories: CategoryService::new(api.clone()),
            orders: OrderService::new(api.clone()),
            admin: AdminService::new(api.clone()),
            api,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        self.api.session()
    }

    pub fn connectivity(&self) -> &Connectivity {
        self.api.connectivity()
    }

    pub fn cart(&self) -> &Mutex<CartStore> {
        &self.cart
    }

    pub fn errors(&self) -> &ErrorHandler {
        &self.errors
    }

    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    pub fn products(&self) -> &ProductService {
        &self.products
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn admin(&self) -> &AdminService {
        &self.admin
    }

    /// Place an order from the current cart.
    ///
    /// The cart stays locked until the backend answers.
    pub async fn checkout(&self, form: &CheckoutForm) -> ClientResult<Order> {
        let mut cart = self.cart.lock().await;
        place_order(&self.orders, &mut cart, form).await
    }
}
