pub mod inventory;
pub mod scorpions;
pub mod xips;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::future::Future;

use crate::error::ProvisionError;

/// Error response - `{"error": "message"}`
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error type
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }

    pub fn bad_gateway(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.into(),
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse::new(self.message)),
        )
            .into_response()
    }
}

impl From<ProvisionError> for ApiError {
    fn from(err: ProvisionError) -> Self {
        if err.is_caller_error() {
            return Self::bad_request(err.to_string());
        }
        match err {
            ProvisionError::Transport(_) => Self::bad_gateway(err.to_string()),
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        if let Some(provision) = err.downcast_ref::<ProvisionError>() {
            if provision.is_caller_error() {
                return Self::bad_request(provision.to_string());
            }
        }
        Self::internal(err.to_string())
    }
}

/// Body shared by the multi-device apply endpoints
#[derive(Debug, Deserialize)]
pub struct TargetsRequest {
    pub targets: Vec<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// Optional control-port override for single-device endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PortQuery {
    #[serde(default)]
    pub port: Option<u16>,
}

/// Trim and de-duplicate target hosts, keeping request order
pub fn validate_targets(targets: &[String]) -> Result<Vec<String>, ApiError> {
    let mut hosts: Vec<String> = Vec::new();
    for host in targets.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !hosts.iter().any(|h| h == host) {
            hosts.push(host.to_string());
        }
    }
    if hosts.is_empty() {
        return Err(ApiError::bad_request("at least one target host is required"));
    }
    Ok(hosts)
}

/// Inventory name of the unit at `host`, or the host itself
pub fn unit_name(units: &IndexMap<String, String>, host: &str) -> String {
    units
        .iter()
        .find(|(_, h)| h.as_str() == host)
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| host.to_string())
}

/// Run `apply` for every target concurrently. One device's failure never
/// affects another; each result is keyed by host in request order.
pub async fn fan_out<F, Fut, T>(targets: &[String], apply: F) -> IndexMap<String, Value>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, ProvisionError>>,
    T: Serialize,
{
    let results = join_all(targets.iter().map(|host| apply(host.clone()))).await;

    targets
        .iter()
        .cloned()
        .zip(results)
        .map(|(host, result)| {
            let value = match result {
                Ok(report) => serde_json::to_value(report).unwrap_or_else(|e| json!({"error": e.to_string()})),
                Err(e) => {
                    tracing::warn!("Device {} failed: {}", host, e);
                    json!({"error": e.to_string()})
                }
            };
            (host, value)
        })
        .collect()
}

/// Healthcheck endpoint - returns 200 OK with status
pub async fn healthcheck() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ipmedia-control",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
