use serde::{Deserialize, Serialize};

use crate::models::{Order, Pizza};

/// Envelope returned by `GET /api/menu`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuResponse {
    pub success: bool,
    #[serde(default)]
    pub pizzas: Vec<Pizza>,
    pub message: Option<String>,
}

/// Envelope shared by every order endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub success: bool,
    pub order: Option<Order>,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl OrderResponse {
    /// The most specific failure text the backend gave, if any.
    pub fn failure_message(&self) -> Option<&str> {
        [self.error.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
    }
}
