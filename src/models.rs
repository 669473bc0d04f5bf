use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ORDER_TYPE: &str = "pickup";
pub const DEFAULT_ORDER_STATUS: &str = "confirmed";
pub const DEFAULT_PAYMENT_STATUS: &str = "pending";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pizza {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub category: String,
    pub sizes: Vec<PizzaSize>,
    #[serde(default)]
    pub toppings: Vec<String>,
    #[serde(rename = "is_available", default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Pizza {
    pub fn size(&self, name: &str) -> Option<&PizzaSize> {
        self.sizes.iter().find(|s| s.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PizzaSize {
    pub name: String,
    pub price: Decimal,
    pub diameter: String,
}

/// A pending line item in the cart.
///
/// Equality is structural over every field. Merging on add uses the narrower
/// [`CartItem::merge_key`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub pizza_id: String,
    pub pizza_name: String,
    pub size: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub toppings: Vec<String>,
    pub special_instructions: Option<String>,
}

/// Identity used to detect duplicate line items: pizza, size and the topping
/// set regardless of order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CartKey {
    pub pizza_id: String,
    pub size: String,
    pub toppings: Vec<String>,
}

impl CartItem {
    pub fn new(pizza: &Pizza, size: &PizzaSize, quantity: u32, toppings: Vec<String>) -> Self {
        Self {
            pizza_id: pizza.id.clone(),
            pizza_name: pizza.name.clone(),
            size: size.name.clone(),
            price: size.price,
            quantity,
            toppings,
            special_instructions: None,
        }
    }

    pub fn merge_key(&self) -> CartKey {
        let mut toppings = self.toppings.clone();
        toppings.sort();
        toppings.dedup();
        CartKey {
            pizza_id: self.pizza_id.clone(),
            size: self.size.clone(),
            toppings,
        }
    }

    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl CustomerInfo {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Checks the fields required before an order may be placed.
    pub fn validate(&self) -> Result<(), String> {
        if self.first_name.trim().is_empty() {
            return Err("First name is required".to_string());
        }
        if self.last_name.trim().is_empty() {
            return Err("Last name is required".to_string());
        }
        if self.phone.trim().is_empty() {
            return Err("Phone number is required".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub pizza_id: String,
    pub pizza_name: String,
    pub size: String,
    pub price: Decimal,
    pub quantity: u32,
    #[serde(default)]
    pub toppings: Vec<String>,
    pub special_instructions: Option<String>,
}

impl From<&CartItem> for OrderItem {
    fn from(item: &CartItem) -> Self {
        Self {
            pizza_id: item.pizza_id.clone(),
            pizza_name: item.pizza_name.clone(),
            size: item.size.clone(),
            price: item.price,
            quantity: item.quantity,
            toppings: item.toppings.clone(),
            special_instructions: item.special_instructions.clone(),
        }
    }
}

/// An order as submitted to, or returned by, the backend.
///
/// `total` is derived: orders decoded from the backend have it recomputed
/// from `subtotal + tax + tip`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "OrderPayload")]
pub struct Order {
    pub id: Option<String>,
    pub unique_order_id: Option<String>,
    pub items: Vec<OrderItem>,
    pub customer_info: CustomerInfo,
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub tip: Decimal,
    total: Decimal,
    pub order_type: String,
    pub status: String,
    pub special_instructions: Option<String>,
    /// Minutes until the order is ready, as estimated by the backend.
    pub estimated_time: Option<u32>,
    pub payment_status: String,
    /// Backend timestamp, kept verbatim. See [`Order::created_at_utc`].
    pub created_at: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderPayload {
    id: Option<String>,
    unique_order_id: Option<String>,
    items: Vec<OrderItem>,
    customer_info: CustomerInfo,
    subtotal: Decimal,
    tax: Decimal,
    #[serde(default)]
    tip: Decimal,
    total: Option<Decimal>,
    #[serde(default = "default_order_type")]
    order_type: String,
    #[serde(default = "default_order_status")]
    status: String,
    special_instructions: Option<String>,
    estimated_time: Option<u32>,
    #[serde(default = "default_payment_status")]
    payment_status: String,
    created_at: Option<String>,
}

impl From<OrderPayload> for Order {
    fn from(payload: OrderPayload) -> Self {
        let total = payload.subtotal + payload.tax + payload.tip;
        if let Some(sent) = payload.total.filter(|sent| *sent != total) {
            tracing::warn!(
                order_id = payload.id.as_deref().unwrap_or_default(),
                %sent,
                %total,
                "order total disagrees with its parts, using recomputed total"
            );
        }
        Self {
            id: payload.id,
            unique_order_id: payload.unique_order_id,
            items: payload.items,
            customer_info: payload.customer_info,
            subtotal: payload.subtotal,
            tax: payload.tax,
            tip: payload.tip,
            total,
            order_type: payload.order_type,
            status: payload.status,
            special_instructions: payload.special_instructions,
            estimated_time: payload.estimated_time,
            payment_status: payload.payment_status,
            created_at: payload.created_at,
        }
    }
}

fn default_order_type() -> String {
    DEFAULT_ORDER_TYPE.to_string()
}

fn default_order_status() -> String {
    DEFAULT_ORDER_STATUS.to_string()
}

fn default_payment_status() -> String {
    DEFAULT_PAYMENT_STATUS.to_string()
}

impl Order {
    /// Builds a new, not yet persisted order. The total is always
    /// `subtotal + tax + tip`.
    pub fn new(
        items: Vec<OrderItem>,
        customer_info: CustomerInfo,
        subtotal: Decimal,
        tax: Decimal,
        tip: Decimal,
        special_instructions: Option<String>,
    ) -> Self {
        Self {
            id: None,
            unique_order_id: None,
            items,
            customer_info,
            subtotal,
            tax,
            tip,
            total: subtotal + tax + tip,
            order_type: default_order_type(),
            status: default_order_status(),
            special_instructions,
            estimated_time: None,
            payment_status: default_payment_status(),
            created_at: None,
        }
    }

    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Parses `created_at` as RFC 3339, or as a naive `YYYY-MM-DD HH:MM:SS`
    /// timestamp taken to be UTC. Other formats give `None`.
    pub fn created_at_utc(&self) -> Option<DateTime<Utc>> {
        let raw = self.created_at.as_deref()?.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|at| at.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|at| at.and_utc())
            })
            .ok()
    }
}
