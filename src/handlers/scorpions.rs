use axum::{
    extract::{Path, Query, State},
    Json,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::defaults::{prepare_grid, Readback, RouterDefaults};
use crate::device::ScorpionClient;
use crate::error::ProvisionError;
use crate::inventory::scorpion_units;
use crate::models::{DeviceIdentity, PanelConfig, ParameterMap};
use crate::routing::RouteMode;
use crate::AppState;

use super::{fan_out, unit_name, validate_targets, ApiError, PortQuery, TargetsRequest};

const DEFAULT_PORT: u16 = 80;

#[derive(Debug, Deserialize)]
pub struct RoutesRequest {
    pub targets: Vec<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub test: bool,
}

fn identity(cfg: &PanelConfig, host: &str, port: u16) -> Result<DeviceIdentity, ProvisionError> {
    let units = scorpion_units(cfg).unwrap_or_default();
    DeviceIdentity::new(unit_name(&units, host), host, port)
}

fn client_for(state: &AppState, cfg: &PanelConfig, device: &DeviceIdentity) -> Result<ScorpionClient, ProvisionError> {
    let token = if cfg.jwt_enabled {
        cfg.scorpion_token.clone()
    } else {
        None
    };
    Ok(ScorpionClient::new(
        &device.host,
        device.port,
        state.config.scorpion_timeout(),
        token,
    )?)
}

/// Expanded default grid for one unit
pub async fn preview(
    State(state): State<Arc<AppState>>,
    Path(host): Path<String>,
) -> Result<Json<ParameterMap>, ApiError> {
    let cfg = state.store.load_config()?;
    let device = identity(&cfg, &host, DEFAULT_PORT)?;
    let grid = prepare_grid(&state.store, &cfg, &device)?;
    Ok(Json(grid))
}

/// Live values of every expected default
pub async fn current(
    State(state): State<Arc<AppState>>,
    Path(host): Path<String>,
    Query(query): Query<PortQuery>,
) -> Result<Json<Readback>, ApiError> {
    let cfg = state.store.load_config()?;
    let device = identity(&cfg, &host, query.port.unwrap_or(DEFAULT_PORT))?;
    let client = client_for(&state, &cfg, &device)?;
    let readback = RouterDefaults::new(&client, &cfg, device).current(&state.store).await?;
    Ok(Json(readback))
}

/// Full default sequence on every target
pub async fn apply_defaults(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TargetsRequest>,
) -> Result<Json<IndexMap<String, Value>>, ApiError> {
    let targets = validate_targets(&req.targets)?;
    let cfg = Arc::new(state.store.load_config()?);
    let port = req.port.unwrap_or(DEFAULT_PORT);
    tracing::info!("Applying Scorpion defaults to {} unit(s)", targets.len());

    let results = fan_out(&targets, |host| {
        let state = state.clone();
        let cfg = cfg.clone();
        async move {
            let device = identity(&cfg, &host, port)?;
            let client = client_for(&state, &cfg, &device)?;
            Ok::<_, ProvisionError>(RouterDefaults::new(&client, &cfg, device).apply_all(&state.store).await)
        }
    })
    .await;
    Ok(Json(results))
}

/// Crosspoint clear-then-set on every target
pub async fn apply_routes(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RoutesRequest>,
) -> Result<Json<IndexMap<String, Value>>, ApiError> {
    let targets = validate_targets(&req.targets)?;
    let cfg = Arc::new(state.store.load_config()?);
    let port = req.port.unwrap_or(DEFAULT_PORT);
    let mode = if req.test {
        RouteMode::TestPattern
    } else {
        RouteMode::Default
    };

    let results = fan_out(&targets, |host| {
        let state = state.clone();
        let cfg = cfg.clone();
        async move {
            let device = identity(&cfg, &host, port)?;
            let client = client_for(&state, &cfg, &device)?;
            Ok::<_, ProvisionError>(RouterDefaults::new(&client, &cfg, device).set_default_routes(mode).await)
        }
    })
    .await;
    Ok(Json(results))
}

/// Trunk A/B addressing on every target
pub async fn apply_trunks(
    State(state): State<Arc<AppState>>,
    Json(req): Json<TargetsRequest>,
) -> Result<Json<IndexMap<String, Value>>, ApiError> {
    let targets = validate_targets(&req.targets)?;
    let cfg = Arc::new(state.store.load_config()?);
    let port = req.port.unwrap_or(DEFAULT_PORT);

    let results = fan_out(&targets, |host| {
        let state = state.clone();
        let cfg = cfg.clone();
        async move {
            let device = identity(&cfg, &host, port)?;
            let client = client_for(&state, &cfg, &device)?;
            Ok::<_, ProvisionError>(RouterDefaults::new(&client, &cfg, device).apply_trunks().await)
        }
    })
    .await;
    Ok(Json(results))
}
