/// Failure talking to a device: connect/timeout errors and non-2xx statuses.
/// Device-reported logical errors are not transport errors; they travel
/// in-band as `DeviceReply::LogicalError`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.to_string())
    }
}

/// Errors raised while expanding or applying device defaults
#[derive(Debug, thiserror::Error)]
pub enum ProvisionError {
    #[error("malformed range {0:?}: expected \"A-B\" with A <= B or a comma list")]
    MalformedRange(String),

    #[error("failed to load default parameters from {path}: {reason}")]
    DefaultsLoad { path: String, reason: String },

    #[error("invalid control host {0:?}: expected a dotted-quad IPv4 address")]
    InvalidHost(String),

    #[error("device transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("config error: {0}")]
    Config(String),

    #[error("reference document error: {0}")]
    Reference(String),
}

impl ProvisionError {
    /// True when the error comes from caller input rather than a device or file
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::MalformedRange(_) | Self::InvalidHost(_))
    }
}
