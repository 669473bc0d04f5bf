use rust_decimal::Decimal;

use crate::{
    models::{CartItem, CustomerInfo, Order, OrderItem},
    services::cart_service::PriceSummary,
};

/// Snapshots the cart into a new order. Later cart changes never reach the
/// returned value.
pub fn build_order(
    cart: &[CartItem],
    customer: CustomerInfo,
    tip: Decimal,
    special_instructions: Option<String>,
) -> Order {
    let summary = PriceSummary::for_cart(cart, tip);
    let items = cart.iter().map(OrderItem::from).collect();
    Order::new(
        items,
        customer,
        summary.subtotal,
        summary.tax,
        summary.tip,
        special_instructions,
    )
}
