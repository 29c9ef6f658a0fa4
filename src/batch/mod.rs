use serde::Serialize;

use crate::device::ParameterClient;
use crate::models::{DeviceReply, ParameterMap};

/// Largest number of parameters a router-class device accepts per SET request
pub const MAX_ITEMS_PER_REQUEST: usize = 10;

/// Accumulated replies of one batched send
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub responses: Vec<DeviceReply>,
    pub fails: Vec<DeviceReply>,
}

impl BatchOutcome {
    pub fn is_clean(&self) -> bool {
        self.fails.is_empty()
    }

    /// True when the send was cut short by a transport failure
    pub fn aborted(&self) -> bool {
        self.fails.iter().any(|f| matches!(f, DeviceReply::Transport { .. }))
    }
}

/// Send `params` in ordered chunks of at most [`MAX_ITEMS_PER_REQUEST`].
///
/// A transport error stops the send at once: the outcome then holds no
/// responses and a single transport failure, and later chunks are not sent.
/// Logical errors reported by the device are collected without stopping.
pub async fn send_params<C>(client: &C, params: &ParameterMap) -> BatchOutcome
where
    C: ParameterClient + ?Sized,
{
    let mut outcome = BatchOutcome::default();
    let chunks = params.chunks(MAX_ITEMS_PER_REQUEST);
    let total = chunks.len();

    for (i, chunk) in chunks.iter().enumerate() {
        tracing::debug!("Sending chunk {}/{} ({} parameters)", i + 1, total, chunk.len());
        match client.post(chunk).await {
            Ok(reply) => outcome.responses.extend(DeviceReply::normalize(reply)),
            Err(e) => {
                tracing::warn!("Batch send aborted at chunk {}/{}: {}", i + 1, total, e);
                return BatchOutcome {
                    responses: Vec::new(),
                    fails: vec![DeviceReply::transport(&e)],
                };
            }
        }
    }

    outcome.fails = outcome.responses.iter().filter(|r| r.is_failure()).cloned().collect();
    if !outcome.fails.is_empty() {
        tracing::warn!("Device rejected {} of {} parameters", outcome.fails.len(), params.len());
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;
    use crate::error::TransportError;
    use crate::models::ParameterKey;
    use serde_json::json;

    fn params(n: u32) -> ParameterMap {
        (0..n)
            .map(|i| (ParameterKey::new(6501, vec![i, 0]), format!("232.20.55.{}", i)))
            .collect()
    }

    #[tokio::test]
    async fn test_chunks_of_ten_in_order() {
        let device = MockDevice::new();
        let input = params(25);
        let outcome = send_params(&device, &input).await;

        let sizes: Vec<usize> = device.posted().iter().map(|c| c.len()).collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        let sent = device.posted_keys();
        let expected: Vec<String> = input.keys().map(|k| k.to_string()).collect();
        assert_eq!(sent, expected);

        assert_eq!(outcome.responses.len(), 25);
        assert!(outcome.is_clean());
    }

    #[tokio::test]
    async fn test_transport_error_fails_fast() {
        let device = MockDevice::new();
        device
            .script_post(Ok(json!([{"id": "ok"}])))
            .script_post(Err(TransportError("read timed out".to_string())));

        let outcome = send_params(&device, &params(25)).await;

        assert_eq!(device.post_count(), 2);
        assert!(outcome.responses.is_empty());
        assert_eq!(
            outcome.fails,
            vec![DeviceReply::Transport {
                error: "read timed out".to_string()
            }]
        );
        assert!(outcome.aborted());
    }

    #[tokio::test]
    async fn test_logical_errors_do_not_abort() {
        let device = MockDevice::new();
        device
            .script_post(Ok(json!([{"id": "6501.0.0"}, {"error": "out of range"}])))
            .script_post(Ok(json!("ok")));

        let outcome = send_params(&device, &params(15)).await;

        assert_eq!(device.post_count(), 2);
        assert_eq!(outcome.responses.len(), 3);
        assert_eq!(outcome.fails.len(), 1);
        assert!(!outcome.aborted());
    }

    #[tokio::test]
    async fn test_empty_map_sends_nothing() {
        let device = MockDevice::new();
        let outcome = send_params(&device, &ParameterMap::new()).await;
        assert_eq!(device.post_count(), 0);
        assert!(outcome.responses.is_empty());
        assert!(outcome.is_clean());
    }
}
