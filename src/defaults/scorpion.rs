use serde::Serialize;
use serde_json::Value;

use super::DefaultsSource;
use crate::batch::send_params;
use crate::device::ParameterClient;
use crate::error::ProvisionError;
use crate::grid::{build_router_grid, is_media_key};
use crate::models::{param_root, ApplyResult, ApplyStatus, DeviceIdentity, PanelConfig, ParameterMap};
use crate::routing::{build_trunk_params, clear_routes, routes_for, RouteMode};

/// Per-stage results of a full router-class apply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouterApplyReport {
    pub routes: ApplyResult,
    pub trunks: ApplyResult,
    pub ip_outputs: ApplyResult,
    pub default_params: ApplyResult,
}

/// Live values next to expected defaults, as parallel lists
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readback {
    pub name: Vec<Option<String>>,
    pub code: Vec<Value>,
    pub value: Vec<Value>,
    pub default: Vec<String>,
}

/// Expanded default grid for `device` without talking to it
pub fn prepare_grid(
    source: &dyn DefaultsSource,
    config: &PanelConfig,
    device: &DeviceIdentity,
) -> Result<ParameterMap, ProvisionError> {
    let defaults = source.load_defaults()?;
    if defaults.is_empty() {
        return Err(ProvisionError::DefaultsLoad {
            path: "default parameters".to_string(),
            reason: "document holds no parameters".to_string(),
        });
    }
    build_router_grid(defaults, config, device)
}

/// Default-configuration sequence for one router-class (Scorpion) unit
pub struct RouterDefaults<'a, C: ParameterClient + ?Sized> {
    client: &'a C,
    config: &'a PanelConfig,
    device: DeviceIdentity,
}

impl<'a, C: ParameterClient + ?Sized> RouterDefaults<'a, C> {
    pub fn new(client: &'a C, config: &'a PanelConfig, device: DeviceIdentity) -> Self {
        Self { client, config, device }
    }

    /// Load the base defaults and expand them into this unit's full grid
    pub fn prepare(&self, source: &dyn DefaultsSource) -> Result<ParameterMap, ProvisionError> {
        prepare_grid(source, self.config, &self.device)
    }

    /// Clear every crosspoint, then set the mapping for `mode`.
    /// Any failure while clearing stops here with `failed_to_clear`.
    pub async fn set_default_routes(&self, mode: RouteMode) -> ApplyResult {
        tracing::info!("Clearing crosspoint routes on {}", self.device.host);
        let cleared = send_params(self.client, &clear_routes()).await;
        if !cleared.is_clean() {
            tracing::warn!("Route clear failed on {}; routes left untouched", self.device.host);
            return ApplyResult::from_outcome(cleared).with_status(ApplyStatus::FailedToClear);
        }

        let set = send_params(self.client, &routes_for(mode)).await;
        if !set.is_clean() {
            tracing::warn!("Setting {:?} routes failed on {}", mode, self.device.host);
            return ApplyResult::from_outcome(set).with_status(ApplyStatus::FailedToSetRoutes);
        }

        let message = match mode {
            RouteMode::Default => "routes set",
            RouteMode::TestPattern => "cleared and set destinations 16-23 to source 31",
        };
        ApplyResult::from_outcome(set).with_message(message)
    }

    /// Push trunk A/B addressing from config
    pub async fn apply_trunks(&self) -> ApplyResult {
        tracing::info!("Applying trunk addressing on {}", self.device.host);
        ApplyResult::from_outcome(send_params(self.client, &build_trunk_params(self.config)).await)
    }

    /// Routes, trunks, media grid, then the remaining defaults.
    /// Each stage reports on its own; a failed stage does not stop the next.
    pub async fn apply_all(&self, source: &dyn DefaultsSource) -> RouterApplyReport {
        tracing::info!("Applying all defaults to {} ({})", self.device.name, self.device.host);
        let routes = self.set_default_routes(RouteMode::Default).await;
        let trunks = self.apply_trunks().await;

        let grid = match self.prepare(source) {
            Ok(grid) => grid,
            Err(e) => {
                tracing::warn!("Could not prepare defaults for {}: {}", self.device.host, e);
                let failed = ApplyResult::error(format!("failed to prepare defaults: {}", e));
                return RouterApplyReport {
                    routes,
                    trunks,
                    ip_outputs: failed.clone(),
                    default_params: failed,
                };
            }
        };

        let ip_outputs = grid.filter(is_media_key);
        let other = grid.filter(|k| !is_media_key(k) && !param_root::is_trunk_network(k.root_code()));

        let ip_outputs = ApplyResult::from_outcome(send_params(self.client, &ip_outputs).await);
        let default_params = if other.is_empty() {
            ApplyResult::from_outcome(Default::default()).with_message("No additional defaults to apply.")
        } else {
            ApplyResult::from_outcome(send_params(self.client, &other).await)
        };

        tracing::info!(
            "Finished defaults on {}: routes={:?} trunks={:?} ip_outputs={:?} default_params={:?}",
            self.device.host,
            routes.status,
            trunks.status,
            ip_outputs.status,
            default_params.status
        );
        RouterApplyReport {
            routes,
            trunks,
            ip_outputs,
            default_params,
        }
    }

    /// Read every expected default back from the device, in grid order.
    /// The first failed read aborts the whole readback. Fields missing from
    /// an object reply read as null; a non-object reply shows the key and
    /// the expected default.
    pub async fn current(&self, source: &dyn DefaultsSource) -> Result<Readback, ProvisionError> {
        let grid = self.prepare(source)?;
        let mut readback = Readback::default();

        for (key, default) in grid.iter() {
            match self.client.get(key).await? {
                Some(reading) => {
                    readback.name.push(reading.name);
                    readback.code.push(reading.id.unwrap_or(Value::Null));
                    readback.value.push(reading.value.unwrap_or(Value::Null));
                }
                None => {
                    readback.name.push(None);
                    readback.code.push(Value::String(key.to_string()));
                    readback.value.push(Value::String(default.to_string()));
                }
            }
            readback.default.push(default.to_string());
        }
        Ok(readback)
    }
}
