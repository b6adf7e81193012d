use dotenv::dotenv;
use std::env;
use tracing::warn;

use crate::api_connection::endpoints::{DEFAULT_BASE_URL, DEFAULT_MODEL};

pub const API_KEY_ENV_VAR: &str = "API_KEY";
pub const MODEL_ENV_VAR: &str = "VITAL_LENS_MODEL";
pub const BASE_URL_ENV_VAR: &str = "VITAL_LENS_BASE_URL";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

impl AppConfig {
    /// Loads `.env` then reads the environment. A missing key is not an
    /// error here; the provider will reject the request.
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup(API_KEY_ENV_VAR).unwrap_or_default();
        if api_key.is_empty() {
            warn!("{} is not set; requests will fail authentication", API_KEY_ENV_VAR);
        }
        let model = lookup(MODEL_ENV_VAR)
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = lookup(BASE_URL_ENV_VAR)
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            api_key,
            model,
            base_url,
        }
    }

    pub fn with_model_override(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }
}
