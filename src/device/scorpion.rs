use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use super::ParameterClient;
use crate::error::TransportError;
use crate::models::{ParameterKey, ParameterMap, ParameterReading};

/// Scorpion EV parameter API client
pub struct ScorpionClient {
    base_url: String,
    jwt: Option<String>,
    client: Client,
}

impl ScorpionClient {
    pub fn new(host: &str, port: u16, timeout: Duration, jwt: Option<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("http://{}:{}", host.trim(), port),
            jwt: jwt.filter(|t| !t.is_empty()),
            client,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/v.api/apis/EV/{}", self.base_url, path)
    }

    /// Both reads and writes are GETs on this API; writes carry the
    /// parameters as query pairs
    async fn request(&self, url: String, query: &[(String, String)]) -> Result<Value, TransportError> {
        let mut req = self.client.get(&url).query(query);
        if let Some(token) = &self.jwt {
            req = req.header("jwt", token);
        }

        let resp = req.send().await?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("error").map(|e| e.to_string()))
                .unwrap_or(body);
            return Err(TransportError(format!("Scorpion API error {}: {}", status, detail)));
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl ParameterClient for ScorpionClient {
    async fn get(&self, key: &ParameterKey) -> Result<Option<ParameterReading>, TransportError> {
        let url = self.api_url(&format!("GET/parameter/{}", key));
        let value = self.request(url, &[]).await?;
        tracing::debug!("Scorpion GET {} -> {}", key, value);
        Ok(ParameterReading::from_reply(value))
    }

    async fn post(&self, params: &ParameterMap) -> Result<Value, TransportError> {
        tracing::debug!("Scorpion SET {} parameters on {}", params.len(), self.base_url);
        self.request(self.api_url("SET/parameter"), &params.to_query_pairs()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_urls() {
        let client = ScorpionClient::new("10.169.20.70", 80, Duration::from_secs(2), None).unwrap();
        assert_eq!(
            client.api_url("GET/parameter/6501.0.0"),
            "http://10.169.20.70:80/v.api/apis/EV/GET/parameter/6501.0.0"
        );
        assert_eq!(client.api_url("SET/parameter"), "http://10.169.20.70:80/v.api/apis/EV/SET/parameter");
    }

    #[test]
    fn test_empty_token_is_ignored() {
        let client = ScorpionClient::new("10.0.0.1", 80, Duration::from_secs(2), Some(String::new())).unwrap();
        assert!(client.jwt.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_device_is_transport_error() {
        // Port 9 on localhost is not listening
        let client = ScorpionClient::new("127.0.0.1", 9, Duration::from_millis(200), None).unwrap();
        let result = client.post(&ParameterMap::new()).await;
        assert!(result.is_err());
    }
}
