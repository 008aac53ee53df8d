//! `/orders`

use shared::models::{Order, OrderDraft, OrderTracking};
use shared::{Page, PageRequest};

use super::paged;
use crate::api::{ApiClient, RequestOptions};
use crate::error::ClientResult;

#[derive(Debug, Clone)]
pub struct OrderService {
    api: ApiClient,
}

impl OrderService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Orders of the signed-in customer
    pub async fn list(&self, page: PageRequest) -> ClientResult<Page<Order>> {
        self.api.get_with("/orders", paged(page)).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Order> {
        self.api.get(&format!("/orders/{id}")).await
    }

    /// Submit an order. Never retried or coalesced: each submission is
    /// exactly one POST.
    pub async fn create(&self, draft: &OrderDraft) -> ClientResult<Order> {
        self.api
            .post_with(
                "/orders",
                draft,
                RequestOptions::new().skip_retry().skip_dedup(),
            )
            .await
    }

    pub async fn cancel(&self, id: &str) -> ClientResult<Order> {
        self.api
            .put(&format!("/orders/{id}/cancel"), &serde_json::json!({}))
            .await
    }

    pub async fn track(&self, id: &str) -> ClientResult<OrderTracking> {
        self.api.get(&format!("/orders/{id}/track")).await
    }
}
