//! `/categories`

use shared::models::{Category, CategoryCreate};

use crate::api::ApiClient;
use crate::error::ClientResult;

#[derive(Debug, Clone)]
pub struct CategoryService {
    api: ApiClient,
}

impl CategoryService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> ClientResult<Vec<Category>> {
        self.api.get("/categories").await
    }

    pub async fn create(&self, payload: &CategoryCreate) -> ClientResult<Category> {
        self.api.post("/categories", payload).await
    }
}
