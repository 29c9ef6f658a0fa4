use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::lenient;

/// Range as written in config: `"101-108"`, `"1,3,5"`, `7`, or `[1, 3, 5]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    List(Vec<u32>),
    Single(u32),
    Text(String),
}

impl From<&str> for RangeSpec {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

/// One side (A or B) of the router-class control trunks, as written in config
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrunkSide {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub prefix: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub suffix: Option<String>,
    #[serde(default, rename = "subnetMask", deserialize_with = "lenient::text")]
    pub subnet_mask: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub gateway: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrunkPair {
    #[serde(default, rename = "A")]
    pub a: Option<TrunkSide>,
    #[serde(default, rename = "B")]
    pub b: Option<TrunkSide>,
}

/// Gateway-class network interface override
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default, rename = "ipAddress")]
    pub ip_address: Option<String>,
    #[serde(default, rename = "subnetMask")]
    pub subnet_mask: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
}

/// The panel's deployment configuration document (`config.json`).
///
/// Loaded once per top-level operation and then only read. Every field is
/// optional; accessors below supply the documented fallbacks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PanelConfig {
    // --- 2110 multicast plan ---
    #[serde(default, rename = "2110_Red")]
    pub red_prefix: Option<String>,
    #[serde(default, rename = "2110_Blue")]
    pub blue_prefix: Option<String>,
    #[serde(default, rename = "2110_VIDEO_RANGE")]
    pub video_range: Option<RangeSpec>,
    #[serde(default, rename = "2110_AUDIO_RANGE")]
    pub audio_range: Option<RangeSpec>,
    #[serde(default, rename = "2110_META_RANGE")]
    pub meta_range: Option<RangeSpec>,
    #[serde(default, rename = "2110_AUDIO_STREAMS", deserialize_with = "lenient::number")]
    pub audio_streams: Option<i64>,
    #[serde(default, rename = "2110_VIDEO_UDP", deserialize_with = "lenient::number")]
    pub video_udp: Option<u16>,
    #[serde(default, rename = "2110_AUDIO_UDP", deserialize_with = "lenient::number")]
    pub audio_udp: Option<u16>,
    #[serde(default, rename = "2110_META_UDP", deserialize_with = "lenient::number")]
    pub meta_udp: Option<u16>,

    // --- Scorpion (router class) ---
    #[serde(default, rename = "CONTROL_PREFIX")]
    pub control_prefix: Option<String>,
    #[serde(default, rename = "SCORPION_RANGE")]
    pub scorpion_range: Option<RangeSpec>,
    #[serde(default, rename = "SCORPION_RANGE_NAME_PFIX")]
    pub scorpion_name_prefix: Option<String>,
    #[serde(default, rename = "SCORPION_LIST")]
    pub scorpion_list: IndexMap<String, String>,
    #[serde(default, rename = "SCORPION_TRUNKS")]
    pub scorpion_trunks: TrunkPair,
    #[serde(default, rename = "SCORPION_TOKEN")]
    pub scorpion_token: Option<String>,
    #[serde(default, rename = "JWT_ENABLED", deserialize_with = "lenient::flag")]
    pub jwt_enabled: bool,

    // --- XIP3901 (gateway class) ---
    #[serde(default, rename = "XIP3901_CONTROL_PREFIX")]
    pub xip_control_prefix: Option<String>,
    #[serde(default, rename = "XIP3901_NETMASK")]
    pub xip_netmask: Option<String>,
    #[serde(default, rename = "XIP3901_GATEWAY")]
    pub xip_gateway: Option<String>,
    #[serde(default, rename = "XIP3901_RANGE")]
    pub xip_range: Option<RangeSpec>,
    #[serde(default, rename = "XIP3901_RANGE_NAME_PFIX")]
    pub xip_name_prefix: Option<String>,
    #[serde(default, rename = "XIP3901_CONTROL_PORT", deserialize_with = "lenient::number")]
    pub xip_control_port: Option<u16>,
    #[serde(default, rename = "XIP3901_LIST")]
    pub xip_list: IndexMap<String, String>,
    #[serde(default, rename = "XIP3901_INTERFACES")]
    pub xip_interfaces: Option<IndexMap<String, InterfaceConfig>>,

    // --- Other inventory and links ---
    #[serde(default, rename = "LINKS")]
    pub links: IndexMap<String, String>,
    #[serde(default, rename = "MCM_LIST")]
    pub mcm_list: IndexMap<String, String>,
    #[serde(default, rename = "SWITCH_LIST")]
    pub switch_list: IndexMap<String, String>,
    #[serde(default, rename = "ARISTA_LIST")]
    pub arista_list: IndexMap<String, String>,
}

impl PanelConfig {
    pub fn scorpion_name_prefix(&self) -> &str {
        self.scorpion_name_prefix.as_deref().unwrap_or("SC_")
    }

    pub fn xip_name_prefix(&self) -> &str {
        self.xip_name_prefix.as_deref().unwrap_or("XIP3901-")
    }

    /// XIP control network without a trailing dot, e.g. `10.169.60`
    pub fn xip_control_net(&self) -> String {
        let net = self
            .xip_control_prefix
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or("10.169.60");
        net.trim_end_matches('.').to_string()
    }

    pub fn xip_netmask(&self) -> String {
        self.xip_netmask
            .clone()
            .unwrap_or_else(|| "255.255.0.0".to_string())
    }

    pub fn xip_gateway(&self) -> String {
        self.xip_gateway
            .clone()
            .unwrap_or_else(|| format!("{}.1", self.xip_control_net()))
    }

    pub fn xip_control_port(&self) -> u16 {
        self.xip_control_port.unwrap_or(80)
    }

    /// Host part of the `LINKS.hi` URL, used as the NMOS registry address
    pub fn registry_host(&self) -> String {
        crate::utils::host_only(self.links.get("hi").map(String::as_str).unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_panel_config_parses_field_names() {
        let cfg: PanelConfig = serde_json::from_value(json!({
            "2110_Red": "232.20.",
            "2110_VIDEO_RANGE": "101-108",
            "2110_AUDIO_RANGE": [201, 202],
            "2110_AUDIO_STREAMS": "4",
            "SCORPION_RANGE": "51-70",
            "SCORPION_TRUNKS": {"A": {"mode": "Static", "suffix": "34.10"}},
            "XIP3901_CONTROL_PORT": "8080",
            "JWT_ENABLED": true,
            "LINKS": {"hi": "http://10.0.0.5:8010/ui"},
            "UNRELATED_KEY": {"ignored": true}
        }))
        .unwrap();

        assert_eq!(cfg.red_prefix.as_deref(), Some("232.20."));
        assert_eq!(cfg.video_range, Some(RangeSpec::Text("101-108".into())));
        assert_eq!(cfg.audio_range, Some(RangeSpec::List(vec![201, 202])));
        assert_eq!(cfg.audio_streams, Some(4));
        assert_eq!(cfg.xip_control_port(), 8080);
        assert!(cfg.jwt_enabled);
        assert_eq!(cfg.scorpion_trunks.a.as_ref().unwrap().suffix.as_deref(), Some("34.10"));
        assert!(cfg.scorpion_trunks.b.is_none());
        assert_eq!(cfg.registry_host(), "10.0.0.5");
    }

    #[test]
    fn test_panel_config_fallbacks() {
        let cfg = PanelConfig::default();
        assert_eq!(cfg.scorpion_name_prefix(), "SC_");
        assert_eq!(cfg.xip_name_prefix(), "XIP3901-");
        assert_eq!(cfg.xip_control_net(), "10.169.60");
        assert_eq!(cfg.xip_gateway(), "10.169.60.1");
        assert_eq!(cfg.xip_netmask(), "255.255.0.0");
        assert_eq!(cfg.registry_host(), "");

        let cfg = PanelConfig {
            xip_control_prefix: Some("10.169.61.".into()),
            ..Default::default()
        };
        assert_eq!(cfg.xip_control_net(), "10.169.61");
    }
}
