//! Admin console DTOs (`/admin/*`)

use serde::{Deserialize, Serialize};

use super::order::OrderStatus;

/// Dashboard headline numbers
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: i64,
    pub total_orders: u64,
    pub total_customers: u64,
    pub total_products: u64,
    #[serde(default)]
    pub pending_orders: u64,
}

/// Order status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}
