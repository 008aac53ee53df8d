//! `/products`

use shared::models::{Product, ProductUpsert};
use shared::{Page, PageRequest};

use super::paged;
use crate::api::ApiClient;
use crate::error::ClientResult;

#[derive(Debug, Clone)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, page: PageRequest) -> ClientResult<Page<Product>> {
        self.api.get_with("/products", paged(page)).await
    }

    /// Products of one category
    pub async fn list_by_category(
        &self,
        category_id: &str,
        page: PageRequest,
    ) -> ClientResult<Page<Product>> {
        self.api
            .get_with("/products", paged(page).param("category", category_id))
            .await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Product> {
        self.api.get(&format!("/products/{id}")).await
    }

    pub async fn search(&self, query: &str, page: PageRequest) -> ClientResult<Page<Product>> {
        self.api
            .get_with("/products/search", paged(page).param("q", query.trim()))
            .await
    }

    pub async fn create(&self, payload: &ProductUpsert) -> ClientResult<Product> {
        self.api.post("/products", payload).await
    }
}
