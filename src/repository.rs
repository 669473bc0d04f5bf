use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::{
    client::ApiClient,
    error::{ApiError, RepoError, RepoResult},
    models::{CustomerInfo, Order, Pizza},
    response::OrderResponse,
};

/// Backend operations used by the controller. Every failure is folded into a
/// [`RepoError`]; nothing escapes as a panic.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_menu(&self) -> RepoResult<Vec<Pizza>>;

    async fn create_order(&self, order: &Order) -> RepoResult<Order>;

    async fn get_order(&self, order_id: &str) -> RepoResult<Order>;

    async fn update_order_status(&self, order_id: &str, status: &str) -> RepoResult<Order>;

    async fn create_customer(
        &self,
        customer: &CustomerInfo,
    ) -> RepoResult<serde_json::Map<String, serde_json::Value>>;

    async fn get_customer_orders(&self, phone: &str) -> RepoResult<Vec<Order>>;
}

#[derive(Debug, Clone)]
pub struct HttpOrderRepository {
    client: ApiClient,
}

impl HttpOrderRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderRepository for HttpOrderRepository {
    async fn get_menu(&self) -> RepoResult<Vec<Pizza>> {
        let response = self.client.fetch_menu().await.map_err(log_failure("get_menu"))?;
        if response.success {
            return Ok(response.pizzas.into_iter().map(drop_negative_prices).collect());
        }
        let message = response
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "Failed to load menu".to_string());
        Err(RepoError::Application(message))
    }

    async fn create_order(&self, order: &Order) -> RepoResult<Order> {
        let response = self
            .client
            .create_order(order)
            .await
            .map_err(log_failure("create_order"))?;
        unwrap_order(response, "Failed to create order")
    }

    async fn get_order(&self, order_id: &str) -> RepoResult<Order> {
        let response = self
            .client
            .fetch_order(order_id)
            .await
            .map_err(log_failure("get_order"))?;
        unwrap_order(response, "Order not found")
    }

    async fn update_order_status(&self, order_id: &str, status: &str) -> RepoResult<Order> {
        let response = self
            .client
            .update_order_status(order_id, status)
            .await
            .map_err(log_failure("update_order_status"))?;
        unwrap_order(response, "Failed to update order")
    }

    async fn create_customer(
        &self,
        customer: &CustomerInfo,
    ) -> RepoResult<serde_json::Map<String, serde_json::Value>> {
        Ok(self
            .client
            .create_customer(customer)
            .await
            .map_err(log_failure("create_customer"))?)
    }

    async fn get_customer_orders(&self, phone: &str) -> RepoResult<Vec<Order>> {
        Ok(self
            .client
            .fetch_customer_orders(phone)
            .await
            .map_err(log_failure("get_customer_orders"))?)
    }
}

fn unwrap_order(response: OrderResponse, fallback: &str) -> RepoResult<Order> {
    match response {
        OrderResponse {
            success: true,
            order: Some(order),
            ..
        } => Ok(order),
        response => {
            let message = response.failure_message().unwrap_or(fallback).to_string();
            Err(RepoError::Application(message))
        }
    }
}

fn drop_negative_prices(mut pizza: Pizza) -> Pizza {
    pizza.sizes.retain(|size| {
        let valid = size.price >= Decimal::ZERO;
        if !valid {
            tracing::warn!(pizza_id = %pizza.id, size = %size.name, price = %size.price, "dropping size with negative price");
        }
        valid
    });
    pizza
}

fn log_failure(operation: &'static str) -> impl Fn(ApiError) -> RepoError {
    move |err| {
        tracing::warn!(operation, error = %err, "backend call failed");
        RepoError::from(err)
    }
}
