use std::time::Duration;

use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::orders::UpdateOrderStatusRequest,
    error::{ApiError, ApiResult},
    models::{CustomerInfo, Order},
    response::{MenuResponse, OrderResponse},
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the ordering backend. Every path is resolved against the
/// base URL given at construction.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> ApiResult<Self> {
        let base_url = normalize_base_url(base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &AppConfig) -> ApiResult<Self> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn fetch_menu(&self) -> ApiResult<MenuResponse> {
        let url = self.endpoint(&["api", "menu"])?;
        self.send(self.http.request(Method::GET, url)).await
    }

    pub async fn create_order(&self, order: &Order) -> ApiResult<OrderResponse> {
        let url = self.endpoint(&["api", "orders"])?;
        self.send(self.http.request(Method::POST, url).json(order))
            .await
    }

    pub async fn fetch_order(&self, order_id: &str) -> ApiResult<OrderResponse> {
        let url = self.endpoint(&["api", "orders", order_id])?;
        self.send(self.http.request(Method::GET, url)).await
    }

    pub async fn update_order_status(
        &self,
        order_id: &str,
        status: &str,
    ) -> ApiResult<OrderResponse> {
        let url = self.endpoint(&["api", "orders", order_id, "status"])?;
        let body = UpdateOrderStatusRequest {
            status: status.to_string(),
        };
        self.send(self.http.request(Method::PUT, url).json(&body))
            .await
    }

    pub async fn create_customer(
        &self,
        customer: &CustomerInfo,
    ) -> ApiResult<serde_json::Map<String, serde_json::Value>> {
        let url = self.endpoint(&["api", "customers"])?;
        self.send(self.http.request(Method::POST, url).json(customer))
            .await
    }

    /// Orders placed with the given phone number. An empty body counts as no
    /// orders.
    pub async fn fetch_customer_orders(&self, phone: &str) -> ApiResult<Vec<Order>> {
        let url = self.endpoint(&["api", "orders", "customer", phone])?;
        let body = self.send_raw(self.http.request(Method::GET, url)).await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_slice::<Option<Vec<Order>>>(&body)?.unwrap_or_default())
    }

    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let body = self.send_raw(request).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_raw(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let request_id = Uuid::new_v4();
        let request = request
            .header(REQUEST_ID_HEADER, request_id.to_string())
            .build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%request_id, %method, %url, "request started");

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(%request_id, %method, %url, error = %err, "request failed");
                return Err(err.into());
            }
        };

        let status = response.status();
        tracing::debug!(%request_id, status = %status, "request finished");
        if !status.is_success() {
            return Err(ApiError::from_status(status));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

fn normalize_base_url(base_url: &str) -> ApiResult<Url> {
    let mut normalized = base_url.trim().to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    let url = Url::parse(&normalized)
        .map_err(|err| ApiError::InvalidUrl(format!("{base_url}: {err}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(base_url.to_string()));
    }
    Ok(url)
}
