//! Order Model
//!
//! Checkout-time projection of the cart (`OrderDraft`) and the server's
//! view of a placed order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::pricing::{OrderTotals, derive_order_totals};

/// Payment method (closed set)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    /// Cash on delivery
    #[default]
    #[serde(rename = "COD")]
    CashOnDelivery,
    /// MoMo e-wallet
    #[serde(rename = "MOMO")]
    Momo,
    /// VNPay gateway
    #[serde(rename = "VNPAY")]
    Vnpay,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashOnDelivery => "COD",
            Self::Momo => "MOMO",
            Self::Vnpay => "VNPAY",
        }
    }

    /// Whether the customer is redirected to a third-party payment page
    pub fn is_online(&self) -> bool {
        !matches!(self, Self::CashOnDelivery)
    }
}

/// Shipping address
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
}

impl ShippingAddress {
    /// Names of required fields that are blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("street", &self.street),
            ("city", &self.city),
            ("state", &self.state),
            ("zip", &self.zip),
            ("country", &self.country),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// One resolved line of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: String,
    pub size_id: String,
    pub color_id: String,
    pub quantity: u32,
    pub unit_price: i64,
    pub line_total: i64,
}

/// Order payload built from the cart at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub totals: OrderTotals,
}

impl OrderDraft {
    /// Project the cart into an order draft, totals derived fresh
    pub fn from_cart(
        cart: &Cart,
        shipping_address: ShippingAddress,
        payment_method: PaymentMethod,
    ) -> Self {
        let items: Vec<OrderLine> = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                product_id: line.product.id.clone(),
                size_id: line.size_id.clone(),
                color_id: line.color_id.clone(),
                quantity: line.quantity,
                unit_price: line.product.price,
                line_total: line.line_total(),
            })
            .collect();
        let subtotal = items.iter().map(|i| i.line_total).sum();

        Self {
            items,
            shipping_address,
            payment_method,
            totals: derive_order_totals(subtotal),
        }
    }
}

/// Order lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Customers may cancel until the parcel leaves the warehouse
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

/// Order entity (server view)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub status: OrderStatus,
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub totals: OrderTotals,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Redirect URL for online payment methods
    #[serde(default)]
    pub payment_url: Option<String>,
}

/// One status transition in the tracking timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: OrderStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /orders/{id}/track` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTracking {
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(default)]
    pub timeline: Vec<TrackingEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::CashOnDelivery).unwrap(),
            "\"COD\""
        );
        let m: PaymentMethod = serde_json::from_str("\"VNPAY\"").unwrap();
        assert_eq!(m, PaymentMethod::Vnpay);
        assert!(m.is_online());
    }

    #[test]
    fn test_missing_address_fields() {
        let addr = ShippingAddress {
            street: "12 Le Loi".into(),
            city: " ".into(),
            state: "HCM".into(),
            zip: String::new(),
            country: "VN".into(),
        };
        assert_eq!(addr.missing_fields(), vec!["city", "zip"]);
    }

    #[test]
    fn test_draft_serializes_flat_totals() {
        let draft = OrderDraft::from_cart(
            &Cart::default(),
            ShippingAddress::default(),
            PaymentMethod::Momo,
        );
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["subtotal"], 0);
        assert_eq!(json["shipping"], 30_000);
        assert_eq!(json["paymentMethod"], "MOMO");
    }
}
