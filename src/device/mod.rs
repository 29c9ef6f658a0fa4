//! Device control clients.
//!
//! Router-class units (Scorpion) expose a flat parameter API; gateway-class
//! units (XIP3901) expose a REST resource tree. Orchestrators only see the
//! traits so tests can substitute a recording mock.

pub mod scorpion;
pub mod xip;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TransportError;
use crate::models::{ParameterKey, ParameterMap, ParameterReading};

pub use scorpion::ScorpionClient;
pub use xip::XipClient;

/// Flat parameter access on a router-class device
#[async_trait]
pub trait ParameterClient: Send + Sync {
    /// Read one parameter; `None` when the device answered with something
    /// other than a JSON object
    async fn get(&self, key: &ParameterKey) -> Result<Option<ParameterReading>, TransportError>;

    /// Set every parameter in `params` in one request, returning the raw reply
    async fn post(&self, params: &ParameterMap) -> Result<Value, TransportError>;
}

/// REST resource access on a gateway-class device
#[async_trait]
pub trait ResourceClient: Send + Sync {
    async fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError>;
}
