//! Order totals
//!
//! The one formula used everywhere totals are shown (cart, checkout,
//! order draft). Amounts are whole currency units; tax goes through
//! `rust_decimal` and is rounded half away from zero.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Tax rate in percent (10 = 10%)
pub const TAX_RATE_PERCENT: i64 = 10;

/// Subtotal from which shipping is free (inclusive)
pub const FREE_SHIPPING_THRESHOLD: i64 = 500_000;

/// Shipping fee below the threshold
pub const FLAT_SHIPPING_FEE: i64 = 30_000;

/// Derived order totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub tax: i64,
    pub shipping: i64,
    pub total: i64,
}

/// Tax for a subtotal at [`TAX_RATE_PERCENT`]
pub fn tax_for(subtotal: i64) -> i64 {
    let rate = Decimal::new(TAX_RATE_PERCENT, 2);
    (Decimal::from(subtotal) * rate)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or(0)
}

/// Shipping fee for a subtotal
pub fn shipping_for(subtotal: i64) -> i64 {
    if subtotal >= FREE_SHIPPING_THRESHOLD {
        0
    } else {
        FLAT_SHIPPING_FEE
    }
}

/// Derive tax, shipping and grand total from a subtotal
pub fn derive_order_totals(subtotal: i64) -> OrderTotals {
    let tax = tax_for(subtotal);
    let shipping = shipping_for(subtotal);
    OrderTotals {
        subtotal,
        tax,
        shipping,
        total: subtotal.saturating_add(tax).saturating_add(shipping),
    }
}

/// Amount still needed to reach free shipping (`0` once reached)
pub fn remaining_for_free_shipping(subtotal: i64) -> i64 {
    FREE_SHIPPING_THRESHOLD.saturating_sub(subtotal).max(0)
}
