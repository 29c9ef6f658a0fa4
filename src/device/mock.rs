//! Recording fake for both client traits

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::{ParameterClient, ResourceClient};
use crate::error::TransportError;
use crate::models::{ParameterKey, ParameterMap, ParameterReading};

/// Records every call in order. Unscripted posts echo one success item per
/// parameter, unscripted puts echo the body, unscripted gets read back the
/// key with value `"live"`.
#[derive(Default)]
pub struct MockDevice {
    pub posts: Mutex<Vec<ParameterMap>>,
    pub gets: Mutex<Vec<ParameterKey>>,
    pub puts: Mutex<Vec<(String, Value)>>,
    post_script: Mutex<VecDeque<Result<Value, TransportError>>>,
    put_script: Mutex<HashMap<String, Result<Value, TransportError>>>,
    fail_get_at: Mutex<Option<usize>>,
    get_script: Mutex<VecDeque<Value>>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the reply for the next unanswered post
    pub fn script_post(&self, reply: Result<Value, TransportError>) -> &Self {
        self.post_script.lock().unwrap().push_back(reply);
        self
    }

    /// Answer every put to `path` with `reply`
    pub fn script_put(&self, path: &str, reply: Result<Value, TransportError>) -> &Self {
        self.put_script.lock().unwrap().insert(path.to_string(), reply);
        self
    }

    /// Queue the raw reply for the next unanswered get
    pub fn script_get(&self, reply: Value) -> &Self {
        self.get_script.lock().unwrap().push_back(reply);
        self
    }

    /// Fail the get with this zero-based call index
    pub fn fail_get_at(&self, index: usize) -> &Self {
        *self.fail_get_at.lock().unwrap() = Some(index);
        self
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn posted(&self) -> Vec<ParameterMap> {
        self.posts.lock().unwrap().clone()
    }

    /// Every posted key in send order
    pub fn posted_keys(&self) -> Vec<String> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .flat_map(|m| m.keys().map(|k| k.to_string()).collect::<Vec<_>>())
            .collect()
    }

    pub fn put_paths(&self) -> Vec<String> {
        self.puts.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn put_body(&self, path: &str) -> Option<Value> {
        self.puts
            .lock()
            .unwrap()
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, b)| b.clone())
    }
}

#[async_trait]
impl ParameterClient for MockDevice {
    async fn get(&self, key: &ParameterKey) -> Result<Option<ParameterReading>, TransportError> {
        let index = {
            let mut gets = self.gets.lock().unwrap();
            gets.push(key.clone());
            gets.len() - 1
        };
        if *self.fail_get_at.lock().unwrap() == Some(index) {
            return Err(TransportError("connection timed out".to_string()));
        }
        if let Some(reply) = self.get_script.lock().unwrap().pop_front() {
            return Ok(ParameterReading::from_reply(reply));
        }
        Ok(Some(ParameterReading {
            id: Some(json!(key.to_string())),
            name: Some(format!("param {}", key)),
            value: Some(json!("live")),
        }))
    }

    async fn post(&self, params: &ParameterMap) -> Result<Value, TransportError> {
        self.posts.lock().unwrap().push(params.clone());
        if let Some(reply) = self.post_script.lock().unwrap().pop_front() {
            return reply;
        }
        Ok(Value::Array(
            params.iter().map(|(k, v)| json!({"id": k.to_string(), "value": v})).collect(),
        ))
    }
}

#[async_trait]
impl ResourceClient for MockDevice {
    async fn put(&self, path: &str, body: &Value) -> Result<Value, TransportError> {
        self.puts.lock().unwrap().push((path.to_string(), body.clone()));
        match self.put_script.lock().unwrap().get(path) {
            Some(reply) => reply.clone(),
            None => Ok(body.clone()),
        }
    }
}
