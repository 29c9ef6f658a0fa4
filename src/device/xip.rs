use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use super::ResourceClient;
use crate::error::TransportError;

/// XIP3901 REST API client
pub struct XipClient {
    base_url: String,
    client: Client,
}

impl XipClient {
    pub fn new(host: &str, port: u16, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("http://{}:{}", host.trim(), port),
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl ResourceClient for XipClient {
    async fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        let url = self.api_url(path);
        tracing::debug!("XIP PUT {}", url);

        let resp = self.client.put(&url).json(body).send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(TransportError(format!("XIP API error {}: {}", status, text)));
        }

        // Some endpoints answer with an empty or plain-text body
        Ok(serde_json::from_str(&text).unwrap_or_else(|_| json!({"status": status.as_u16(), "text": text})))
    }
}
