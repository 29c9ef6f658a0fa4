use serde::Deserialize;
use serde_json::Value;

use super::lenient;

/// REST resource path entry, `{"path": "..."}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathRef {
    #[serde(default)]
    pub path: Option<String>,
}

impl PathRef {
    pub fn path_or(&self, fallback: &str) -> String {
        self.path.clone().unwrap_or_else(|| fallback.to_string())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UdpPorts {
    #[serde(default, deserialize_with = "lenient::number")]
    pub video: Option<u16>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub audio: Option<u16>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub meta: Option<u16>,
}

/// `defaults` section of the gateway reference document
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceDefaults {
    #[serde(default, deserialize_with = "lenient::number")]
    pub video_udp: Option<u16>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub audio_udp: Option<u16>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub meta_udp: Option<u16>,
    #[serde(default)]
    pub udp_ports: UdpPorts,
    #[serde(default)]
    pub audio_type: Option<String>,
    #[serde(default)]
    pub audio_profile: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub audio_streams_per_output: Option<u32>,
    #[serde(default)]
    pub nmos_mode: Option<String>,
    #[serde(default)]
    pub registry_mode: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub registry_port: Option<u16>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub query_port: Option<u16>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ptp_domain: Option<u8>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub ptp_announce_interval: Option<String>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ptp_announce_timeout: Option<u8>,
    #[serde(default, deserialize_with = "lenient::number")]
    pub ptp_dscp: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NetworkingRefs {
    #[serde(default)]
    pub host: PathRef,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NmosRefs {
    #[serde(default)]
    pub global: PathRef,
    #[serde(default)]
    pub registry: PathRef,
}

/// Sender endpoint template; `{channelId}` in the path is the 1-based output
#[derive(Debug, Clone, Deserialize)]
pub struct SenderRef {
    pub path_template: String,
    pub body_template: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SenderRefs {
    pub video: SenderRef,
    pub audio: SenderRef,
    pub meta: SenderRef,
}

/// DSCP / payload-type entry for one media family
#[derive(Debug, Clone, Deserialize)]
pub struct QosRef {
    pub path: String,
    pub dscp: Value,
    #[serde(rename = "payloadType")]
    pub payload_type: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalQosRef {
    pub path: String,
    #[serde(default, rename = "minimumProcessingDelayEnable")]
    pub minimum_processing_delay_enable: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdvancedRefs {
    #[serde(default)]
    pub video: Option<QosRef>,
    #[serde(default)]
    pub audio30: Option<QosRef>,
    #[serde(default)]
    pub audio31: Option<QosRef>,
    #[serde(default)]
    pub meta: Option<QosRef>,
    #[serde(default)]
    pub global: Option<GlobalQosRef>,
}

/// Gateway-class parameter reference document
/// (`xip3901_parameters_reference.json`): UDP/NMOS/PTP defaults, REST paths,
/// and sender body templates.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct XipReference {
    #[serde(default)]
    pub defaults: ReferenceDefaults,
    #[serde(default)]
    pub networking: NetworkingRefs,
    #[serde(default)]
    pub nmos: NmosRefs,
    #[serde(default)]
    pub ptp: PathRef,
    #[serde(default)]
    pub senders: Option<SenderRefs>,
    #[serde(default)]
    pub advanced: AdvancedRefs,
}

impl XipReference {
    // flat `*_udp` wins over the nested `udp_ports` block
    pub fn video_udp(&self) -> u16 {
        let d = &self.defaults;
        d.video_udp.or(d.udp_ports.video).unwrap_or(50100)
    }

    pub fn audio_udp(&self) -> u16 {
        let d = &self.defaults;
        d.audio_udp.or(d.udp_ports.audio).unwrap_or(50200)
    }

    pub fn meta_udp(&self) -> u16 {
        let d = &self.defaults;
        d.meta_udp.or(d.udp_ports.meta).unwrap_or(50300)
    }

    pub fn audio_type(&self) -> &str {
        self.defaults.audio_type.as_deref().unwrap_or("SMPTE ST 2110-30")
    }

    pub fn audio_profile(&self) -> &str {
        self.defaults.audio_profile.as_deref().unwrap_or("125 usec, 16ch")
    }

    pub fn audio_streams_per_output(&self) -> u32 {
        self.defaults.audio_streams_per_output.unwrap_or(1).max(1)
    }

    pub fn nmos_mode(&self) -> &str {
        self.defaults.nmos_mode.as_deref().unwrap_or("IS-04 & IS-05")
    }

    pub fn registry_mode(&self) -> &str {
        self.defaults.registry_mode.as_deref().unwrap_or("Static")
    }

    pub fn registry_port(&self) -> u16 {
        self.defaults.registry_port.unwrap_or(3020)
    }

    pub fn query_port(&self) -> u16 {
        self.defaults.query_port.unwrap_or(3021)
    }

    pub fn ptp_domain(&self) -> u8 {
        self.defaults.ptp_domain.unwrap_or(127)
    }

    pub fn ptp_announce_interval(&self) -> String {
        self.defaults
            .ptp_announce_interval
            .clone()
            .unwrap_or_else(|| "1".to_string())
    }

    pub fn ptp_announce_timeout(&self) -> u8 {
        self.defaults.ptp_announce_timeout.unwrap_or(3)
    }

    pub fn ptp_dscp(&self) -> u8 {
        self.defaults.ptp_dscp.unwrap_or(46)
    }

    pub fn host_path(&self) -> String {
        self.networking.host.path_or("networking/host")
    }

    pub fn nmos_global_path(&self) -> String {
        self.nmos.global.path_or("nmos/global")
    }

    pub fn nmos_registry_path(&self) -> String {
        self.nmos.registry.path_or("nmos/registry")
    }

    pub fn ptp_path(&self) -> String {
        self.ptp.path_or("reference/ptp")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reference_udp_port_precedence() {
        let reference: XipReference = serde_json::from_value(json!({
            "defaults": {
                "video_udp": "",
                "audio_udp": 51200,
                "udp_ports": {"video": "51100", "audio": 1, "meta": 51300}
            }
        }))
        .unwrap();
        assert_eq!(reference.video_udp(), 51100);
        assert_eq!(reference.audio_udp(), 51200);
        assert_eq!(reference.meta_udp(), 51300);
    }

    #[test]
    fn test_reference_fallbacks() {
        let reference = XipReference::default();
        assert_eq!(reference.video_udp(), 50100);
        assert_eq!(reference.audio_streams_per_output(), 1);
        assert_eq!(reference.ptp_announce_interval(), "1");
        assert_eq!(reference.host_path(), "networking/host");
        assert_eq!(reference.ptp_path(), "reference/ptp");
        assert!(reference.senders.is_none());
    }
}
