use axum::{
    extract::{Path, State},
    Json,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::defaults::{gateway_preview, GatewayDefaults, GatewayPreview, XipStage};
use crate::device::XipClient;
use crate::error::ProvisionError;
use crate::inventory::xip_units;
use crate::models::{DeviceIdentity, PanelConfig};
use crate::AppState;

use super::{fan_out, unit_name, validate_targets, ApiError};

#[derive(Debug, Deserialize)]
pub struct XipApplyRequest {
    pub targets: Vec<String>,
    #[serde(default)]
    pub port: Option<u16>,
    /// Stages to run; all of them when omitted
    #[serde(default)]
    pub stages: Option<Vec<XipStage>>,
}

fn identity(cfg: &PanelConfig, host: &str, port: u16) -> Result<DeviceIdentity, ProvisionError> {
    let units = xip_units(cfg).unwrap_or_default();
    DeviceIdentity::new(unit_name(&units, host), host, port)
}

/// Multicast and UDP plan for one gateway
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(host): Path<String>,
) -> Result<Json<GatewayPreview>, ApiError> {
    let cfg = state.store.load_config()?;
    let reference = state.store.load_xip_reference()?;
    let device = identity(&cfg, &host, cfg.xip_control_port())?;
    Ok(Json(gateway_preview(&cfg, &reference, &device)?))
}

/// Run the selected default stages on every target
pub async fn apply(
    State(state): State<Arc<AppState>>,
    Json(req): Json<XipApplyRequest>,
) -> Result<Json<IndexMap<String, Value>>, ApiError> {
    let targets = validate_targets(&req.targets)?;
    let cfg = Arc::new(state.store.load_config()?);
    let reference = Arc::new(state.store.load_xip_reference()?);
    let port = req.port.unwrap_or_else(|| cfg.xip_control_port());
    let stages: Vec<XipStage> = match req.stages {
        Some(stages) if !stages.is_empty() => stages,
        _ => XipStage::ALL.to_vec(),
    };
    tracing::info!("Applying XIP3901 stages {:?} to {} unit(s)", stages, targets.len());

    let results = fan_out(&targets, |host| {
        let cfg = cfg.clone();
        let reference = reference.clone();
        let stages = stages.clone();
        let timeout = state.config.xip_timeout();
        async move {
            let device = identity(&cfg, &host, port)?;
            let client = XipClient::new(&device.host, device.port, timeout)?;
            let gateway = GatewayDefaults::new(&client, &cfg, &reference, device)?;
            Ok::<_, ProvisionError>(gateway.apply_stages(&stages).await)
        }
    })
    .await;
    Ok(Json(results))
}
