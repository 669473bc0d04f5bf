use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rust_decimal::Decimal;
use tokio::sync::watch;

use crate::{
    error::RepoResult,
    models::{CartItem, CustomerInfo, Order, Pizza, PizzaSize},
    repository::OrderRepository,
    services::{
        cart_service::{self, PriceSummary},
        order_service,
    },
    state::{MenuState, OrderState},
};

pub const CUSTOMER_REQUIRED: &str = "Customer information is required";
pub const CART_EMPTY: &str = "Cart is empty";
const MENU_FALLBACK_ERROR: &str = "Unknown error";
const ORDER_FALLBACK_ERROR: &str = "Failed to place order";

/// Owns the cart, the customer and the menu/order lifecycle for one ordering
/// session.
///
/// Every mutation happens under a single lock and is published to `watch`
/// subscribers before the lock is released, so readers never observe a
/// half-applied change. Network calls run on spawned tasks and re-enter the
/// same lock when they complete.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct CartController {
    shared: Arc<Shared>,
}

struct Shared {
    repository: Arc<dyn OrderRepository>,
    inner: Mutex<Inner>,
    menu_tx: watch::Sender<MenuState>,
    cart_tx: watch::Sender<Vec<CartItem>>,
    order_tx: watch::Sender<OrderState>,
    customer_tx: watch::Sender<Option<CustomerInfo>>,
}

#[derive(Default)]
struct Inner {
    cart: Vec<CartItem>,
    customer: Option<CustomerInfo>,
    order: OrderState,
    menu_generation: u64,
}

impl CartController {
    /// Creates the controller and starts loading the menu.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        let (menu_tx, _) = watch::channel(MenuState::Loading);
        let (cart_tx, _) = watch::channel(Vec::new());
        let (order_tx, _) = watch::channel(OrderState::Idle);
        let (customer_tx, _) = watch::channel(None);
        let controller = Self {
            shared: Arc::new(Shared {
                repository,
                inner: Mutex::new(Inner::default()),
                menu_tx,
                cart_tx,
                order_tx,
                customer_tx,
            }),
        };
        controller.load_menu();
        controller
    }

    pub fn subscribe_menu(&self) -> watch::Receiver<MenuState> {
        self.shared.menu_tx.subscribe()
    }

    pub fn subscribe_cart(&self) -> watch::Receiver<Vec<CartItem>> {
        self.shared.cart_tx.subscribe()
    }

    pub fn subscribe_order(&self) -> watch::Receiver<OrderState> {
        self.shared.order_tx.subscribe()
    }

    pub fn subscribe_customer(&self) -> watch::Receiver<Option<CustomerInfo>> {
        self.shared.customer_tx.subscribe()
    }

    pub fn menu_state(&self) -> MenuState {
        self.shared.menu_tx.borrow().clone()
    }

    pub fn order_state(&self) -> OrderState {
        self.shared.lock().order.clone()
    }

    pub fn cart_items(&self) -> Vec<CartItem> {
        self.shared.lock().cart.clone()
    }

    pub fn customer_info(&self) -> Option<CustomerInfo> {
        self.shared.lock().customer.clone()
    }

    /// Reloads the menu. A response that arrives after a newer call has been
    /// made is dropped.
    pub fn load_menu(&self) {
        let generation = {
            let mut inner = self.shared.lock();
            inner.menu_generation += 1;
            self.shared.menu_tx.send_replace(MenuState::Loading);
            inner.menu_generation
        };
        tracing::debug!(generation, "menu load started");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = shared.repository.get_menu().await;
            shared.finish_menu_load(generation, result);
        });
    }

    pub fn add_to_cart(&self, pizza: &Pizza, size: &PizzaSize, quantity: u32, toppings: Vec<String>) {
        if quantity == 0 {
            tracing::warn!(pizza_id = %pizza.id, "ignoring add to cart with zero quantity");
            return;
        }
        let item = CartItem::new(pizza, size, quantity, toppings);
        let mut inner = self.shared.lock();
        cart_service::add_item(&mut inner.cart, item);
        self.shared.publish_cart(&inner);
        tracing::debug!(pizza_id = %pizza.id, size = %size.name, quantity, "added to cart");
    }

    pub fn remove_from_cart(&self, item: &CartItem) {
        let mut inner = self.shared.lock();
        if cart_service::remove_item(&mut inner.cart, item) {
            self.shared.publish_cart(&inner);
        }
    }

    pub fn update_cart_item_quantity(&self, item: &CartItem, new_quantity: i64) {
        let mut inner = self.shared.lock();
        if cart_service::update_quantity(&mut inner.cart, item, new_quantity) {
            self.shared.publish_cart(&inner);
        }
    }

    pub fn clear_cart(&self) {
        let mut inner = self.shared.lock();
        inner.cart.clear();
        self.shared.publish_cart(&inner);
    }

    pub fn set_customer_info(&self, info: CustomerInfo) {
        let mut inner = self.shared.lock();
        inner.customer = Some(info);
        self.shared.customer_tx.send_replace(inner.customer.clone());
    }

    pub fn calculate_subtotal(&self) -> Decimal {
        cart_service::subtotal(&self.shared.lock().cart)
    }

    pub fn calculate_tax(subtotal: Decimal) -> Decimal {
        cart_service::tax(subtotal)
    }

    pub fn calculate_total(subtotal: Decimal, tax: Decimal, tip: Decimal) -> Decimal {
        cart_service::total(subtotal, tax, tip)
    }

    pub fn price_summary(&self, tip: Decimal) -> PriceSummary {
        PriceSummary::for_cart(&self.shared.lock().cart, tip)
    }

    pub fn cart_item_count(&self) -> u32 {
        cart_service::item_count(&self.shared.lock().cart)
    }

    /// Submits the current cart as an order.
    ///
    /// Missing customer info, invalid customer info and an empty cart fail
    /// immediately without contacting the backend. While a placement is in
    /// flight further calls are ignored.
    pub fn place_order(&self, tip: Decimal, special_instructions: Option<String>) {
        let order = {
            let mut inner = self.shared.lock();
            if inner.order.is_loading() {
                tracing::warn!("order placement already in progress");
                return;
            }
            let Some(customer) = inner.customer.clone() else {
                self.shared
                    .set_order(&mut inner, OrderState::Error(CUSTOMER_REQUIRED.to_string()));
                return;
            };
            if let Err(message) = customer.validate() {
                self.shared.set_order(&mut inner, OrderState::Error(message));
                return;
            }
            if inner.cart.is_empty() {
                self.shared
                    .set_order(&mut inner, OrderState::Error(CART_EMPTY.to_string()));
                return;
            }
            self.shared.set_order(&mut inner, OrderState::Loading);
            order_service::build_order(&inner.cart, customer, tip, special_instructions)
        };
        tracing::info!(items = order.items.len(), total = %order.total(), "placing order");

        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let result = shared.repository.create_order(&order).await;
            shared.finish_order(result);
        });
    }

    /// Returns a terminal order state to `Idle`. Has no effect while an order
    /// is being placed.
    pub fn reset_order_state(&self) {
        let mut inner = self.shared.lock();
        if inner.order.is_loading() {
            tracing::warn!("cannot reset order state while an order is in flight");
            return;
        }
        self.shared.set_order(&mut inner, OrderState::Idle);
    }
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish_cart(&self, inner: &Inner) {
        self.cart_tx.send_replace(inner.cart.clone());
    }

    fn set_order(&self, inner: &mut Inner, state: OrderState) {
        inner.order = state.clone();
        self.order_tx.send_replace(state);
    }

    fn finish_menu_load(&self, generation: u64, result: RepoResult<Vec<Pizza>>) {
        let inner = self.lock();
        if generation != inner.menu_generation {
            tracing::debug!(
                generation,
                latest = inner.menu_generation,
                "discarding stale menu response"
            );
            return;
        }
        let state = match result {
            Ok(pizzas) => {
                tracing::info!(count = pizzas.len(), "menu loaded");
                MenuState::Success(pizzas)
            }
            Err(err) => {
                tracing::warn!(error = %err, "menu load failed");
                MenuState::Error(message_or(err.to_string(), MENU_FALLBACK_ERROR))
            }
        };
        self.menu_tx.send_replace(state);
    }

    fn finish_order(&self, result: RepoResult<Order>) {
        let mut inner = self.lock();
        match result {
            Ok(order) => {
                let order_id = order
                    .unique_order_id
                    .as_deref()
                    .or(order.id.as_deref())
                    .unwrap_or("-");
                tracing::info!(order_id, "order placed");
                self.set_order(&mut inner, OrderState::Success(order));
                inner.cart.clear();
                self.publish_cart(&inner);
            }
            Err(err) => {
                tracing::warn!(error = %err, "order placement failed");
                let message = message_or(err.to_string(), ORDER_FALLBACK_ERROR);
                self.set_order(&mut inner, OrderState::Error(message));
            }
        }
    }
}

fn message_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
