//! Client for the external search provider (SerpApi-style JSON endpoint).
//!
//! One HTTP call per search, no retries. The API key is appended to the
//! outgoing request only and never appears in logs or errors.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::error::{PlanError, PlanResult};

/// Query parameters of one provider request, without the credential.
pub type SearchParams = Vec<(&'static str, String)>;

pub const DEFAULT_PROVIDER_URL: &str = "https://serpapi.com/search.json";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// Source of raw flight/hotel listings.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, params: &SearchParams) -> PlanResult<Value>;
}

#[derive(Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_PROVIDER_URL.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

pub struct SerpApiProvider {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl SerpApiProvider {
    pub fn new(config: ProviderConfig) -> PlanResult<Self> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| PlanError::Config("SERPAPI_API_KEY is not set".to_string()))?;
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            PlanError::Config(format!("invalid provider url `{}`: {}", config.base_url, e))
        })?;
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("travel-orchestrator/0.1.0")
            .build()
            .map_err(|e| PlanError::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn request_url(&self, params: &SearchParams) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("api_key", &self.api_key);
        }
        url
    }
}

#[async_trait]
impl SearchProvider for SerpApiProvider {
    async fn search(&self, params: &SearchParams) -> PlanResult<Value> {
        let engine = params
            .iter()
            .find(|(k, _)| *k == "engine")
            .map(|(_, v)| v.as_str())
            .unwrap_or("unknown");
        info!(engine, "calling search provider");
        debug!(?params, "provider request params");

        let response = self.client.get(self.request_url(params)).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(300).collect();
            return Err(PlanError::provider(format!("HTTP {}: {}", status, snippet)));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| PlanError::provider(format!("invalid provider response: {}", e.without_url())))?;

        if let Some(message) = value.get("error").and_then(|e| e.as_str()) {
            debug!(engine, message, "provider reported no results");
        }

        Ok(value)
    }
}
