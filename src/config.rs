use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

use crate::{client::DEFAULT_TIMEOUT, firebase::DEFAULT_CONFIG_FILE};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000/";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub firebase_config_path: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let config = Self::from_lookup(|key| env::var(key).ok());
        reqwest::Url::parse(&config.api_base_url).with_context(|| {
            format!("PIZZA_API_BASE_URL is not a valid URL: {}", config.api_base_url)
        })?;
        Ok(config)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base_url = lookup("PIZZA_API_BASE_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let request_timeout = lookup("PIZZA_API_TIMEOUT_SECS")
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT);
        let firebase_config_path = lookup("FIREBASE_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self {
            api_base_url,
            request_timeout,
            firebase_config_path,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
