pub mod scorpion;
pub mod xip;

use crate::error::ProvisionError;
use crate::models::ParameterMap;

pub use scorpion::{prepare_grid, Readback, RouterDefaults};
pub use xip::{preview as gateway_preview, GatewayDefaults, GatewayPreview, XipStage};

/// Source of a router-class unit's base default parameters
pub trait DefaultsSource: Send + Sync {
    fn load_defaults(&self) -> Result<ParameterMap, ProvisionError>;
}

impl DefaultsSource for ParameterMap {
    fn load_defaults(&self) -> Result<ParameterMap, ProvisionError> {
        Ok(self.clone())
    }
}
