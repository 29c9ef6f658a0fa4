use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::defaults::DefaultsSource;
use crate::error::ProvisionError;
use crate::models::{PanelConfig, ParameterMap, XipReference};

/// Read-only access to the panel's JSON documents.
///
/// Every load re-reads the file so a request always sees the latest edit;
/// callers keep the returned snapshot for the rest of the request.
#[derive(Debug, Clone)]
pub struct Store {
    panel_config: PathBuf,
    default_params: PathBuf,
    xip_reference: PathBuf,
}

impl Store {
    pub fn new(
        panel_config: impl Into<PathBuf>,
        default_params: impl Into<PathBuf>,
        xip_reference: impl Into<PathBuf>,
    ) -> Self {
        Self {
            panel_config: panel_config.into(),
            default_params: default_params.into(),
            xip_reference: xip_reference.into(),
        }
    }

    pub fn from_config(cfg: &Config) -> Self {
        Self::new(&cfg.panel_config, &cfg.default_params, &cfg.xip_reference)
    }

    /// Deployment config (`config.json`)
    pub fn load_config(&self) -> Result<PanelConfig, ProvisionError> {
        read_document(&self.panel_config)
            .map_err(|e| ProvisionError::Config(format!("{}: {}", self.panel_config.display(), e)))
    }

    /// Gateway parameter reference (`xip3901_parameters_reference.json`)
    pub fn load_xip_reference(&self) -> Result<XipReference, ProvisionError> {
        read_document(&self.xip_reference)
            .map_err(|e| ProvisionError::Reference(format!("{}: {}", self.xip_reference.display(), e)))
    }
}

impl DefaultsSource for Store {
    /// Router base defaults (`default_params.json`); keys must be dotted
    /// integers and values scalars
    fn load_defaults(&self) -> Result<ParameterMap, ProvisionError> {
        let load_error = |reason: String| ProvisionError::DefaultsLoad {
            path: self.default_params.display().to_string(),
            reason,
        };
        let doc: Value = read_document(&self.default_params).map_err(load_error)?;
        let params = ParameterMap::from_json(&doc).map_err(load_error)?;
        if params.is_empty() {
            return Err(load_error("document holds no parameters".to_string()));
        }
        tracing::debug!("Loaded {} default parameters from {}", params.len(), self.default_params.display());
        Ok(params)
    }
}

fn read_document<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let raw = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&raw).map_err(|e| e.to_string())
}
