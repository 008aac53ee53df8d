//! Checkout
//!
//! Validation happens locally and never reaches the network. A valid cart
//! is projected into an [`OrderDraft`] (totals derived fresh) and
//! submitted once; the cart is cleared only after the order is accepted.

use shared::cart::Cart;
use shared::error::ErrorCode;
use shared::models::{Order, OrderDraft, PaymentMethod, ShippingAddress};

use crate::cart::CartStore;
use crate::error::{ClientError, ClientResult};
use crate::services::OrderService;

/// Checkout form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    pub address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    pub fn new(address: ShippingAddress, payment_method: PaymentMethod) -> Self {
        Self {
            address,
            payment_method,
        }
    }

    /// Validate against `cart` and build the draft
    pub fn prepare(&self, cart: &Cart) -> ClientResult<OrderDraft> {
        if cart.is_empty() {
            return Err(ClientError::validation_code(
                ErrorCode::CartEmpty,
                ErrorCode::CartEmpty.message(),
            ));
        }

        let missing = self.address.missing_fields();
        if !missing.is_empty() {
            return Err(ClientError::validation(format!(
                "Missing shipping address fields: {}",
                missing.join(", ")
            )));
        }

        if let Some(line) = cart.over_stock_lines().first() {
            return Err(ClientError::validation_code(
                ErrorCode::OutOfStock,
                format!(
                    "Only {} left of {} in the selected size and color",
                    line.stock_ceiling(),
                    line.product.name
                ),
            ));
        }

        Ok(OrderDraft::from_cart(
            cart,
            self.address.clone(),
            self.payment_method,
        ))
    }
}

/// Validate, submit, and clear the cart on success
pub async fn place_order(
    orders: &OrderService,
    cart: &mut CartStore,
    form: &CheckoutForm,
) -> ClientResult<Order> {
    let draft = form.prepare(cart.cart())?;
    let order = match orders.create(&draft).await {
        Ok(order) => order,
        Err(e) => {
            tracing::warn!(total = draft.totals.total, "Order submission failed, cart kept: {e}");
            return Err(e);
        }
    };

    cart.clear().await;
    tracing::info!(
        order_id = %order.id,
        total = order.totals.total,
        payment = order.payment_method.as_str(),
        "Order placed"
    );
    if order.payment_method.is_online() && order.payment_url.is_none() {
        tracing::warn!(order_id = %order.id, "Online payment order without payment URL");
    }
    Ok(order)
}
