pub mod panel;
pub mod xip;

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::batch::BatchOutcome;
use crate::error::{ProvisionError, TransportError};

pub use panel::{InterfaceConfig, PanelConfig, RangeSpec, TrunkSide};
pub use xip::XipReference;

/// Canonical router-class parameter roots outside the media grid
pub mod param_root {
    pub const NAME_ALIAS: u32 = 55;
    pub const NMOS_LABEL: u32 = 5204;
    pub const CROSSPOINT: u32 = 3009;
    pub const TRUNK_IP: u32 = 6000;
    pub const TRUNK_MASK: u32 = 6001;
    pub const TRUNK_GATEWAY: u32 = 6002;
    pub const TRUNK_DHCP: u32 = 6022;

    pub const TRUNK_NETWORK: &[u32] = &[TRUNK_IP, TRUNK_MASK, TRUNK_GATEWAY, TRUNK_DHCP];

    pub fn is_trunk_network(root: u32) -> bool {
        TRUNK_NETWORK.contains(&root)
    }
}

/// Dotted parameter identifier such as `6501.3.0` or `6551.2.1.0`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParameterKey {
    root: u32,
    indices: Vec<u32>,
}

impl ParameterKey {
    pub fn new(root: u32, indices: impl Into<Vec<u32>>) -> Self {
        Self {
            root,
            indices: indices.into(),
        }
    }

    /// Bare family-wide key with no index components
    pub fn root(root: u32) -> Self {
        Self::new(root, Vec::new())
    }

    /// Return a copy of this key qualified by one more index
    pub fn child(&self, index: u32) -> Self {
        let mut indices = self.indices.clone();
        indices.push(index);
        Self::new(self.root, indices)
    }

    pub fn root_code(&self) -> u32 {
        self.root
    }

}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for index in &self.indices {
            write!(f, ".{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for ParameterKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let root = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| format!("invalid parameter key {:?}", s))?;
        let indices = parts
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| format!("invalid parameter key {:?}", s))?;
        Ok(Self { root, indices })
    }
}

impl Serialize for ParameterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ParameterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Insertion-ordered parameter key/value map.
/// Order is preserved end to end because devices apply settings sequentially.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterMap(IndexMap<ParameterKey, String>);

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from a JSON object, normalizing scalar values to strings.
    /// Booleans become `"1"`/`"0"`; nulls, arrays and objects are rejected.
    pub fn from_json(doc: &Value) -> Result<Self, String> {
        let object = doc
            .as_object()
            .ok_or_else(|| "expected a JSON object of parameters".to_string())?;

        let mut map = Self::new();
        for (raw_key, raw_value) in object {
            let key: ParameterKey = raw_key.parse()?;
            let value = match raw_value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
                other => {
                    return Err(format!("parameter {} has non-scalar value {}", raw_key, other));
                }
            };
            map.insert(key, value);
        }
        Ok(map)
    }

    pub fn insert(&mut self, key: ParameterKey, value: impl Into<String>) -> Option<String> {
        self.0.insert(key, value.into())
    }

    pub fn get(&self, key: &ParameterKey) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &ParameterKey) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterKey, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    #[cfg(test)]
    pub fn keys(&self) -> impl Iterator<Item = &ParameterKey> {
        self.0.keys()
    }

    /// Split into consecutive maps of at most `size` entries, keeping order
    pub fn chunks(&self, size: usize) -> Vec<ParameterMap> {
        let size = size.max(1);
        let entries: Vec<_> = self.0.iter().collect();
        entries
            .chunks(size)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|(k, v)| ((*k).clone(), (*v).clone()))
                    .collect()
            })
            .collect()
    }

    /// Entries whose key satisfies `pred`, in original order
    pub fn filter(&self, pred: impl Fn(&ParameterKey) -> bool) -> ParameterMap {
        self.0
            .iter()
            .filter(|(k, _)| pred(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Wire form: `(dotted key, value)` pairs in order
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }
}

impl FromIterator<(ParameterKey, String)> for ParameterMap {
    fn from_iter<I: IntoIterator<Item = (ParameterKey, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<(ParameterKey, String)> for ParameterMap {
    fn extend<I: IntoIterator<Item = (ParameterKey, String)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.0.insert(k, v);
        }
    }
}

/// A device addressed by its control host. The host's last IPv4 octet is the
/// unit number that multicast suffixes and hostnames are derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceIdentity {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub unit: u32,
}

impl DeviceIdentity {
    pub fn new(name: impl Into<String>, host: &str, port: u16) -> Result<Self, ProvisionError> {
        let host = host.trim();
        let unit = crate::utils::unit_from_host(host)?;
        Ok(Self {
            name: name.into(),
            host: host.to_string(),
            port,
            unit,
        })
    }

    /// `{prefix}{unit:03}`, e.g. `SC_070`
    pub fn label(&self, prefix: &str) -> String {
        format!("{}{:03}", prefix, self.unit)
    }
}

/// Addressing mode of one control-network trunk side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrunkMode {
    Dhcp,
    Static,
}

impl TrunkMode {
    /// Config labels read like "Auto (DHCP)" or "Static"
    pub fn from_label(label: &str) -> Self {
        if label.trim().to_lowercase().starts_with("auto") {
            Self::Dhcp
        } else {
            Self::Static
        }
    }
}

/// Resolved trunk side settings with defaults applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrunkConfig {
    pub mode: TrunkMode,
    pub prefix: String,
    pub suffix: String,
    pub subnet_mask: String,
    pub gateway: String,
}

/// One GET readback from a router-class device
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ParameterReading {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl ParameterReading {
    /// Fields of an object reply; `None` for any other JSON value.
    /// Missing or null fields stay `None`.
    pub fn from_reply(reply: Value) -> Option<Self> {
        match reply {
            Value::Object(_) => Some(serde_json::from_value(reply).unwrap_or_default()),
            _ => None,
        }
    }
}

/// Normalized device reply item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeviceReply {
    Success { value: Value },
    LogicalError { error: String, value: Value },
    Transport { error: String },
}

impl DeviceReply {
    /// Classify one reply item: an object carrying an `error` key is a logical error
    pub fn classify(value: Value) -> Self {
        let error = value.as_object().and_then(|obj| obj.get("error")).map(|e| match e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        match error {
            Some(error) => Self::LogicalError { error, value },
            None => Self::Success { value },
        }
    }

    /// Normalize a whole response body; list bodies are flattened item by item
    pub fn normalize(response: Value) -> Vec<Self> {
        match response {
            Value::Array(items) => items.into_iter().map(Self::classify).collect(),
            other => vec![Self::classify(other)],
        }
    }

    pub fn transport(err: &TransportError) -> Self {
        Self::Transport {
            error: err.to_string(),
        }
    }

    /// Outcome of a single REST call
    pub fn from_result(result: Result<Value, TransportError>) -> Self {
        match result {
            Ok(value) => Self::classify(value),
            Err(e) => Self::transport(&e),
        }
    }

    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::Success { .. })
    }
}

/// Overall status of one apply unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplyStatus {
    Success,
    PartialFailure,
    FailedToClear,
    FailedToSetRoutes,
    Error,
}

/// Result of one reportable apply unit, returned to the caller for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplyResult {
    pub status: ApplyStatus,
    pub responses: Vec<DeviceReply>,
    pub fails: Vec<DeviceReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApplyResult {
    /// Success when nothing failed, error when the transport broke,
    /// partial failure when the device rejected some items
    pub fn from_outcome(outcome: BatchOutcome) -> Self {
        let status = if outcome.fails.is_empty() {
            ApplyStatus::Success
        } else if outcome.aborted() {
            ApplyStatus::Error
        } else {
            ApplyStatus::PartialFailure
        };
        Self {
            status,
            responses: outcome.responses,
            fails: outcome.fails,
            message: None,
        }
    }

    pub fn with_status(mut self, status: ApplyStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ApplyStatus::Error,
            responses: Vec::new(),
            fails: Vec::new(),
            message: Some(message.into()),
        }
    }

    #[cfg(test)]
    pub fn is_success(&self) -> bool {
        self.status == ApplyStatus::Success
    }
}

/// Lenient scalar deserializers for hand-edited config documents
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;
    use std::str::FromStr;

    /// Accept a number or numeric string; empty strings and nulls read as None
    pub fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: FromStr,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        let text = match raw {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => {
                return Err(serde::de::Error::custom(format!("expected a number, got {}", other)));
            }
        };
        text.parse::<T>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number {:?}", text)))
    }

    /// Accept a string or a number, rendered as text
    pub fn text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        })
    }

    /// Accept a bool, 0/1, or "true"/"false"
    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::Bool(b)) => b,
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0) != 0,
            Some(Value::String(s)) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
            _ => false,
        })
    }
}
