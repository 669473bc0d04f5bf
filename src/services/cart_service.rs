use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::CartItem;

/// Flat 8% sales tax.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub tip: Decimal,
    pub total: Decimal,
}

impl PriceSummary {
    pub fn for_cart(cart: &[CartItem], tip: Decimal) -> Self {
        let subtotal = subtotal(cart);
        let tax = tax(subtotal);
        Self {
            subtotal,
            tax,
            tip,
            total: total(subtotal, tax, tip),
        }
    }
}

/// Merges `item` into a line with the same pizza, size and toppings, or
/// appends it. Merged lines keep their position.
pub fn add_item(cart: &mut Vec<CartItem>, item: CartItem) {
    let key = item.merge_key();
    match cart.iter_mut().find(|existing| existing.merge_key() == key) {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        }
        None => cart.push(item),
    }
}

/// Removes the first line structurally equal to `item`.
pub fn remove_item(cart: &mut Vec<CartItem>, item: &CartItem) -> bool {
    match cart.iter().position(|existing| existing == item) {
        Some(index) => {
            cart.remove(index);
            true
        }
        None => false,
    }
}

/// Sets the quantity of the first line structurally equal to `item`. A
/// quantity of zero or less removes the line.
pub fn update_quantity(cart: &mut Vec<CartItem>, item: &CartItem, new_quantity: i64) -> bool {
    if new_quantity <= 0 {
        return remove_item(cart, item);
    }
    let quantity = u32::try_from(new_quantity).unwrap_or_else(|_| {
        tracing::warn!(requested = new_quantity, "quantity clamped to {}", u32::MAX);
        u32::MAX
    });
    match cart.iter_mut().find(|existing| **existing == *item) {
        Some(existing) => {
            existing.quantity = quantity;
            true
        }
        None => false,
    }
}

pub fn subtotal(cart: &[CartItem]) -> Decimal {
    cart.iter().map(CartItem::line_total).sum()
}

pub fn tax(subtotal: Decimal) -> Decimal {
    subtotal * TAX_RATE
}

pub fn total(subtotal: Decimal, tax: Decimal, tip: Decimal) -> Decimal {
    subtotal + tax + tip
}

/// Number of pizzas in the cart, counting quantities.
pub fn item_count(cart: &[CartItem]) -> u32 {
    cart.iter()
        .fold(0u32, |count, item| count.saturating_add(item.quantity))
}

/// Rounds an amount to cents for display, half away from zero.
pub fn display_amount(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
