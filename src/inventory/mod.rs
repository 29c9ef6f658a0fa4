use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ProvisionError;
use crate::grid::expand_range;
use crate::models::{PanelConfig, RangeSpec};

/// Unit name -> control host, in display order
pub type UnitList = IndexMap<String, String>;

/// Every device list the panel knows about
#[derive(Debug, Clone, Serialize)]
pub struct Inventory {
    pub scorpions: UnitList,
    pub xips: UnitList,
    pub mcms: UnitList,
    pub switches: UnitList,
    pub aristas: UnitList,
}

impl Inventory {
    pub fn from_config(cfg: &PanelConfig) -> Result<Self, ProvisionError> {
        Ok(Self {
            scorpions: scorpion_units(cfg)?,
            xips: xip_units(cfg)?,
            mcms: static_list(&cfg.mcm_list),
            switches: static_list(&cfg.switch_list),
            aristas: static_list(&cfg.arista_list),
        })
    }
}

fn configured(range: Option<&RangeSpec>) -> Option<&RangeSpec> {
    range.filter(|r| !matches!(r, RangeSpec::Text(t) if t.trim().is_empty()))
}

/// Entries with an empty host are UI placeholders
fn static_list(list: &IndexMap<String, String>) -> UnitList {
    list.iter()
        .filter(|(_, host)| !host.trim().is_empty())
        .map(|(name, host)| (name.clone(), host.trim().to_string()))
        .collect()
}

fn range_units(range: &RangeSpec, name_prefix: &str, control_net: &str) -> Result<UnitList, ProvisionError> {
    Ok(expand_range(range)?
        .into_iter()
        .map(|i| (format!("{}{:03}", name_prefix, i), format!("{}.{}", control_net, i)))
        .collect())
}

/// Router-class units: `SCORPION_RANGE` expanded over `CONTROL_PREFIX`,
/// falling back to the static `SCORPION_LIST`
pub fn scorpion_units(cfg: &PanelConfig) -> Result<UnitList, ProvisionError> {
    let Some(range) = configured(cfg.scorpion_range.as_ref()) else {
        return Ok(static_list(&cfg.scorpion_list));
    };
    let control_net = cfg
        .control_prefix
        .as_deref()
        .map(|p| p.trim().trim_end_matches('.'))
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ProvisionError::Config("SCORPION_RANGE is set but CONTROL_PREFIX is missing".to_string()))?;
    range_units(range, cfg.scorpion_name_prefix(), control_net)
}

/// Gateway-class units: `XIP3901_RANGE` expanded over
/// `XIP3901_CONTROL_PREFIX`, falling back to the static `XIP3901_LIST`
pub fn xip_units(cfg: &PanelConfig) -> Result<UnitList, ProvisionError> {
    let Some(range) = configured(cfg.xip_range.as_ref()) else {
        return Ok(static_list(&cfg.xip_list));
    };
    // Listing names default to the 3911 frame prefix used on site
    let name_prefix = cfg.xip_name_prefix.as_deref().unwrap_or("XIP3911-");
    range_units(range, name_prefix, &cfg.xip_control_net())
}
