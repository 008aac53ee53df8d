//! `/admin/*` operations console

use serde::de::IgnoredAny;
use shared::models::{DashboardStats, Order, OrderStatus, OrderStatusUpdate, Product, ProductUpsert, User};
use shared::{Page, PageRequest};

use super::paged;
use crate::api::{ApiClient, RequestOptions};
use crate::error::ClientResult;
use crate::http::FileUpload;

/// Response of an image upload
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct UploadedImage {
    pub url: String,
}

#[derive(Debug, Clone)]
pub struct AdminService {
    api: ApiClient,
}

impl AdminService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn dashboard(&self) -> ClientResult<DashboardStats> {
        self.api.get("/admin/dashboard").await
    }

    // ========== Products ==========

    pub async fn list_products(&self, page: PageRequest) -> ClientResult<Page<Product>> {
        self.api.get_with("/admin/products", paged(page)).await
    }

    pub async fn update_product(&self, id: &str, payload: &ProductUpsert) -> ClientResult<Product> {
        self.api.put(&format!("/admin/products/{id}"), payload).await
    }

    pub async fn delete_product(&self, id: &str) -> ClientResult<()> {
        let _: IgnoredAny = self.api.delete(&format!("/admin/products/{id}")).await?;
        tracing::info!(product_id = id, "Product deleted");
        Ok(())
    }

    /// Upload a product image; returns its public URL
    pub async fn upload_product_image(&self, id: &str, upload: FileUpload) -> ClientResult<String> {
        let uploaded: UploadedImage = self
            .api
            .upload_file(
                &format!("/admin/products/{id}/images"),
                upload,
                RequestOptions::new().skip_dedup(),
            )
            .await?;
        Ok(uploaded.url)
    }

    // ========== Orders ==========

    pub async fn list_orders(
        &self,
        page: PageRequest,
        status: Option<OrderStatus>,
    ) -> ClientResult<Page<Order>> {
        let mut options = paged(page);
        if let Some(status) = status {
            options = options.param("status", status_param(status));
        }
        self.api.get_with("/admin/orders", options).await
    }

    pub async fn update_order_status(&self, id: &str, status: OrderStatus) -> ClientResult<Order> {
        let order: Order = self
            .api
            .put(&format!("/admin/orders/{id}/status"), &OrderStatusUpdate { status })
            .await?;
        tracing::info!(order_id = id, status = ?order.status, "Order status updated");
        Ok(order)
    }

    // ========== Users ==========

    pub async fn list_users(&self, page: PageRequest) -> ClientResult<Page<User>> {
        self.api.get_with("/admin/users", paged(page)).await
    }
}

/// Wire form of a status, as used in query strings
fn status_param(status: OrderStatus) -> String {
    serde_json::to_value(status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}
