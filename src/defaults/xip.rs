use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::device::ResourceClient;
use crate::error::ProvisionError;
use crate::grid::{GridSettings, MediaFamily, Trunk};
use crate::models::{DeviceIdentity, DeviceReply, InterfaceConfig, PanelConfig, XipReference};

/// Pause after each NMOS reconfiguration step; the gateway restarts its
/// NMOS node between them
pub const NMOS_STEP_DELAY: Duration = Duration::from_millis(600);

const INTERFACES: [&str; 4] = ["eth1", "eth2", "eth3", "frame"];

/// Outcome of one REST step. `Skipped` covers steps that could not be built
/// because the reference document lacks the entry they need.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepOutcome {
    Device(DeviceReply),
    Skipped { error: String },
}

impl StepOutcome {
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Device(reply) => reply.is_failure(),
            Self::Skipped { .. } => true,
        }
    }
}

/// Step outcomes keyed by step label, in execution order
pub type StepReplies = IndexMap<String, StepOutcome>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum XipStage {
    Hostname,
    Interfaces,
    NmosPtp,
    Senders,
    AdvancedQos,
}

impl XipStage {
    pub const ALL: [XipStage; 5] = [
        XipStage::Hostname,
        XipStage::Interfaces,
        XipStage::NmosPtp,
        XipStage::Senders,
        XipStage::AdvancedQos,
    ];
}

/// Per-stage results; stages that were not requested are omitted
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GatewayApplyReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<StepReplies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interfaces: Option<StepReplies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nmos_ptp: Option<StepReplies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub senders: Option<StepReplies>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advanced_qos: Option<StepReplies>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrunkAddresses {
    pub trunk1: String,
    pub trunk2: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UdpPlan {
    pub video: u16,
    pub audio: u16,
    pub meta: u16,
}

/// Multicast/UDP plan of one gateway, keyed `out1..out8`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayPreview {
    pub unit: String,
    pub host: String,
    pub udp_ports: UdpPlan,
    pub video: IndexMap<String, TrunkAddresses>,
    pub audio: IndexMap<String, IndexMap<String, TrunkAddresses>>,
    pub meta: IndexMap<String, TrunkAddresses>,
}

/// Build the sender/multicast summary without touching the device
pub fn preview(
    config: &PanelConfig,
    reference: &XipReference,
    device: &DeviceIdentity,
) -> Result<GatewayPreview, ProvisionError> {
    let settings = GridSettings::gateway(config, reference)?;
    let unit = device.unit;
    let addresses = |family: MediaFamily, output: u32, stream: u32| TrunkAddresses {
        trunk1: settings.multicast(family, output, stream, Trunk::Red, unit),
        trunk2: settings.multicast(family, output, stream, Trunk::Blue, unit),
    };

    let outputs = 0..settings.outputs as u32;
    let video: IndexMap<String, TrunkAddresses> = outputs
        .clone()
        .map(|o| (format!("out{}", o + 1), addresses(MediaFamily::Video, o, 0)))
        .collect();
    let meta: IndexMap<String, TrunkAddresses> = outputs
        .clone()
        .map(|o| (format!("out{}", o + 1), addresses(MediaFamily::Meta, o, 0)))
        .collect();
    let audio: IndexMap<String, IndexMap<String, TrunkAddresses>> = outputs
        .map(|o| {
            let streams: IndexMap<String, TrunkAddresses> = (0..settings.streams(MediaFamily::Audio))
                .map(|s| (format!("stream{}", s + 1), addresses(MediaFamily::Audio, o, s)))
                .collect();
            (format!("out{}", o + 1), streams)
        })
        .collect();

    Ok(GatewayPreview {
        unit: device.name.clone(),
        host: device.host.clone(),
        udp_ports: UdpPlan {
            video: settings.video_udp,
            audio: settings.audio_udp,
            meta: settings.meta_udp,
        },
        video,
        audio,
        meta,
    })
}

/// Copy a sender body template, filling red/blue stream addresses and ports
fn fill_rtp_body(
    template: &Value,
    red: String,
    blue: String,
    port: u16,
    audio: Option<(&str, &str)>,
) -> Result<Value, ProvisionError> {
    let invalid = || ProvisionError::Reference("sender body template needs two rtp objects".to_string());
    let mut body = template.clone();

    let rtp = body
        .get_mut("rtp")
        .and_then(Value::as_array_mut)
        .filter(|entries| entries.len() >= 2)
        .ok_or_else(invalid)?;
    for (entry, address) in rtp.iter_mut().zip([red, blue]) {
        let entry = entry.as_object_mut().ok_or_else(invalid)?;
        entry.insert("txStreamAddress".to_string(), json!(address));
        entry.insert("txStreamPort".to_string(), json!(port));
    }

    if let Some((smpte_type, profile)) = audio {
        if let Some(obj) = body.as_object_mut() {
            obj.insert("smpteType".to_string(), json!(smpte_type));
            obj.insert("profile".to_string(), json!(profile));
        }
    }
    Ok(body)
}

/// Default-configuration sequence for one gateway-class (XIP3901) unit
pub struct GatewayDefaults<'a, C: ResourceClient + ?Sized> {
    client: &'a C,
    config: &'a PanelConfig,
    reference: &'a XipReference,
    device: DeviceIdentity,
    settings: GridSettings,
    step_delay: Duration,
}

impl<'a, C: ResourceClient + ?Sized> GatewayDefaults<'a, C> {
    pub fn new(
        client: &'a C,
        config: &'a PanelConfig,
        reference: &'a XipReference,
        device: DeviceIdentity,
    ) -> Result<Self, ProvisionError> {
        let settings = GridSettings::gateway(config, reference)?;
        Ok(Self {
            client,
            config,
            reference,
            device,
            settings,
            step_delay: NMOS_STEP_DELAY,
        })
    }

    #[cfg(test)]
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = delay;
        self
    }

    /// `{XIP3901_RANGE_NAME_PFIX}{unit:03}`
    pub fn hostname(&self) -> String {
        self.device.label(self.config.xip_name_prefix())
    }

    async fn put_step(&self, replies: &mut StepReplies, label: &str, path: &str, body: Value) {
        let reply = DeviceReply::from_result(self.client.put(path, &body).await);
        if reply.is_failure() {
            tracing::warn!("XIP {} step {} failed: {:?}", self.device.host, label, reply);
        }
        replies.insert(label.to_string(), StepOutcome::Device(reply));
    }

    pub async fn apply_hostname(&self) -> StepReplies {
        let mut replies = StepReplies::new();
        let hostname = self.hostname();
        tracing::info!("Setting hostname {} on {}", hostname, self.device.host);
        self.put_step(&mut replies, "hostname", &self.reference.host_path(), json!({"hostname": hostname}))
            .await;
        replies
    }

    /// Interface bodies in eth1, eth2, eth3, frame order
    pub fn interface_bodies(&self) -> Vec<(&'static str, Value)> {
        let body = |mode: &str, ip: &str, mask: &str, gateway: &str| {
            json!({"mode": mode, "ipAddress": ip, "subnetMask": mask, "gateway": gateway})
        };

        if let Some(configured) = self
            .config
            .xip_interfaces
            .as_ref()
            .filter(|ifaces| INTERFACES.iter().all(|id| ifaces.contains_key(*id)))
        {
            return INTERFACES
                .iter()
                .map(|id| {
                    let default_iface = InterfaceConfig::default();
                    let c = configured.get(*id).unwrap_or(&default_iface);
                    let body = body(
                        c.mode.as_deref().unwrap_or("Auto (DHCP)"),
                        c.ip_address.as_deref().unwrap_or("0.0.0.0"),
                        c.subnet_mask.as_deref().unwrap_or("0.0.0.0"),
                        c.gateway.as_deref().unwrap_or("0.0.0.0"),
                    );
                    (*id, body)
                })
                .collect();
        }

        let control_ip = format!("{}.{}", self.config.xip_control_net(), self.device.unit);
        vec![
            ("eth1", body("Auto (DHCP)", "0.0.0.0", "0.0.0.0", "0.0.0.0")),
            ("eth2", body("Auto (DHCP)", "0.0.0.0", "0.0.0.0", "0.0.0.0")),
            (
                "eth3",
                body("Static", &control_ip, &self.config.xip_netmask(), &self.config.xip_gateway()),
            ),
            ("frame", body("Off", "0.0.0.0", "0.0.0.0", "0.0.0.0")),
        ]
    }

    pub async fn apply_interfaces(&self) -> StepReplies {
        let mut replies = StepReplies::new();
        tracing::info!("Configuring interfaces on {}", self.device.host);
        for (id, body) in self.interface_bodies() {
            self.put_step(&mut replies, id, &format!("networking/interfaces/{}", id), body)
                .await;
        }
        replies
    }

    /// NMOS off, registry, NMOS on, then PTP, pausing after each NMOS step
    pub async fn apply_nmos_ptp(&self) -> StepReplies {
        let mut replies = StepReplies::new();
        let reference = self.reference;
        let hostname = self.hostname();
        let global_path = reference.nmos_global_path();
        tracing::info!("Configuring NMOS and PTP on {}", self.device.host);

        self.put_step(&mut replies, "nmos_global_off", &global_path, json!({"mode": "OFF", "label": hostname}))
            .await;
        tokio::time::sleep(self.step_delay).await;

        let registry = json!({
            "registryMode": reference.registry_mode(),
            "httpAddress": self.config.registry_host(),
            "registrationPort": reference.registry_port(),
            "queryPort": reference.query_port(),
        });
        self.put_step(&mut replies, "nmos_registry", &reference.nmos_registry_path(), registry)
            .await;
        tokio::time::sleep(self.step_delay).await;

        self.put_step(
            &mut replies,
            "nmos_global_on",
            &global_path,
            json!({"mode": reference.nmos_mode(), "label": hostname}),
        )
        .await;
        tokio::time::sleep(self.step_delay).await;

        let ptp = json!({
            "domainNumber": reference.ptp_domain(),
            "announceInterval": reference.ptp_announce_interval(),
            "announceReceiptTimeoutCount": reference.ptp_announce_timeout(),
            "dscp": reference.ptp_dscp(),
        });
        self.put_step(&mut replies, "ptp", &reference.ptp_path(), ptp).await;
        replies
    }

    /// Eight senders per family from the reference templates
    pub async fn apply_senders(&self) -> StepReplies {
        let mut replies = StepReplies::new();
        let Some(senders) = &self.reference.senders else {
            replies.insert(
                "senders".to_string(),
                StepOutcome::Skipped {
                    error: "reference document has no senders section".to_string(),
                },
            );
            return replies;
        };
        tracing::info!("Configuring senders on {}", self.device.host);

        let unit = self.device.unit;
        let audio_fields = (self.reference.audio_type(), self.reference.audio_profile());
        let families = [
            (MediaFamily::Video, &senders.video),
            (MediaFamily::Audio, &senders.audio),
            (MediaFamily::Meta, &senders.meta),
        ];

        for (family, sender) in families {
            for output in 0..self.settings.outputs as u32 {
                let label = format!("{}/out{}", family.name(), output + 1);
                let body = fill_rtp_body(
                    &sender.body_template,
                    self.settings.multicast(family, output, 0, Trunk::Red, unit),
                    self.settings.multicast(family, output, 0, Trunk::Blue, unit),
                    self.settings.udp_port(family),
                    (family == MediaFamily::Audio).then_some(audio_fields),
                );
                match body {
                    Ok(body) => {
                        let path = sender.path_template.replace("{channelId}", &(output + 1).to_string());
                        self.put_step(&mut replies, &label, &path, body).await;
                    }
                    Err(e) => {
                        replies.insert(label, StepOutcome::Skipped { error: e.to_string() });
                    }
                }
            }
        }
        replies
    }

    /// Per-family DSCP/payload type, then the optional global entry
    pub async fn apply_advanced_qos(&self) -> StepReplies {
        let mut replies = StepReplies::new();
        let advanced = &self.reference.advanced;
        tracing::info!("Configuring QoS on {}", self.device.host);

        let entries = [
            ("video", &advanced.video),
            ("audio30", &advanced.audio30),
            ("audio31", &advanced.audio31),
            ("meta", &advanced.meta),
        ];
        for (label, entry) in entries {
            match entry {
                Some(qos) => {
                    let body = json!({"dscp": qos.dscp, "payloadType": qos.payload_type});
                    self.put_step(&mut replies, label, &qos.path, body).await;
                }
                None => {
                    replies.insert(
                        label.to_string(),
                        StepOutcome::Skipped {
                            error: format!("reference document has no advanced.{} entry", label),
                        },
                    );
                }
            }
        }

        if let Some(global) = &advanced.global {
            if let Some(enable) = &global.minimum_processing_delay_enable {
                let body = json!({"minimumProcessingDelayEnable": enable});
                self.put_step(&mut replies, "global", &global.path, body).await;
            }
        }
        replies
    }

    /// Run `stages` in their canonical order
    pub async fn apply_stages(&self, stages: &[XipStage]) -> GatewayApplyReport {
        let mut report = GatewayApplyReport::default();
        for stage in XipStage::ALL.into_iter().filter(|s| stages.contains(s)) {
            match stage {
                XipStage::Hostname => report.hostname = Some(self.apply_hostname().await),
                XipStage::Interfaces => report.interfaces = Some(self.apply_interfaces().await),
                XipStage::NmosPtp => report.nmos_ptp = Some(self.apply_nmos_ptp().await),
                XipStage::Senders => report.senders = Some(self.apply_senders().await),
                XipStage::AdvancedQos => report.advanced_qos = Some(self.apply_advanced_qos().await),
            }
        }

        let failed = [&report.hostname, &report.interfaces, &report.nmos_ptp, &report.senders, &report.advanced_qos]
            .into_iter()
            .flatten()
            .flat_map(|replies| replies.values())
            .filter(|outcome| outcome.is_failure())
            .count();
        tracing::info!("Finished {} XIP stage(s) on {}: {} failed step(s)", stages.len(), self.device.host, failed);
        report
    }

    pub async fn apply_all(&self) -> GatewayApplyReport {
        tracing::info!("Applying all defaults to {} ({})", self.device.name, self.device.host);
        self.apply_stages(&XipStage::ALL).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::mock::MockDevice;
    use crate::error::TransportError;

    fn device() -> DeviceIdentity {
        DeviceIdentity::new("XIP3911-007", "10.169.60.7", 80).unwrap()
    }

    fn config() -> PanelConfig {
        serde_json::from_value(json!({
            "2110_Red": "232.20",
            "2110_Blue": "232.120.",
            "XIP3901_RANGE_NAME_PFIX": "XIP3911-",
            "LINKS": {"hi": "http://10.169.0.20:8010/"}
        }))
        .unwrap()
    }

    fn rtp_template() -> Value {
        json!({"rtp": [{"txStreamAddress": "", "txStreamPort": 0}, {"txStreamAddress": "", "txStreamPort": 0}], "enable": true})
    }

    fn reference() -> XipReference {
        serde_json::from_value(json!({
            "defaults": {"ptp_domain": 127, "registry_port": 3020},
            "senders": {
                "video": {"path_template": "video/senders/{channelId}", "body_template": rtp_template()},
                "audio": {"path_template": "audio/senders/{channelId}", "body_template": rtp_template()},
                "meta": {"path_template": "meta/senders/{channelId}", "body_template": rtp_template()}
            },
            "advanced": {
                "video": {"path": "advanced/video", "dscp": 34, "payloadType": 96},
                "audio30": {"path": "advanced/audio30", "dscp": 46, "payloadType": 97},
                "audio31": {"path": "advanced/audio31", "dscp": 46, "payloadType": 98},
                "meta": {"path": "advanced/meta", "dscp": 34, "payloadType": 100},
                "global": {"path": "advanced/global", "minimumProcessingDelayEnable": true}
            }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_apply_all_step_order() {
        let client = MockDevice::new();
        let (cfg, reference) = (config(), reference());
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device())
            .unwrap()
            .with_step_delay(Duration::ZERO);

        let report = gateway.apply_all().await;

        let paths = client.put_paths();
        assert_eq!(paths[0], "networking/host");
        assert_eq!(
            &paths[1..5],
            &[
                "networking/interfaces/eth1",
                "networking/interfaces/eth2",
                "networking/interfaces/eth3",
                "networking/interfaces/frame"
            ]
        );
        assert_eq!(&paths[5..9], &["nmos/global", "nmos/registry", "nmos/global", "reference/ptp"]);
        assert_eq!(paths[9], "video/senders/1");
        assert_eq!(paths[33], "advanced/video");
        assert_eq!(paths.len(), 1 + 4 + 4 + 24 + 5);

        assert_eq!(report.senders.as_ref().unwrap().len(), 24);
        assert!(report.hostname.unwrap().values().all(|r| !r.is_failure()));
    }

    #[tokio::test]
    async fn test_hostname_and_default_interfaces() {
        let client = MockDevice::new();
        let (cfg, reference) = (config(), reference());
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();

        assert_eq!(gateway.hostname(), "XIP3911-007");
        gateway.apply_interfaces().await;

        assert_eq!(
            client.put_body("networking/interfaces/eth3").unwrap(),
            json!({"mode": "Static", "ipAddress": "10.169.60.7", "subnetMask": "255.255.0.0", "gateway": "10.169.60.1"})
        );
        assert_eq!(client.put_body("networking/interfaces/frame").unwrap()["mode"], "Off");
        assert_eq!(client.put_body("networking/interfaces/eth1").unwrap()["mode"], "Auto (DHCP)");
    }

    #[tokio::test]
    async fn test_configured_interfaces_need_all_four() {
        let client = MockDevice::new();
        let reference = reference();
        let mut cfg = config();
        cfg.xip_interfaces = serde_json::from_value(json!({
            "eth1": {"mode": "Static", "ipAddress": "10.1.1.7"},
            "eth2": {},
            "eth3": {"mode": "Static"},
            "frame": {"mode": "Off"}
        }))
        .unwrap();
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();

        let bodies = gateway.interface_bodies();
        assert_eq!(bodies[0].1["ipAddress"], "10.1.1.7");
        assert_eq!(bodies[0].1["subnetMask"], "0.0.0.0");
        assert_eq!(bodies[1].1["mode"], "Auto (DHCP)");

        cfg.xip_interfaces.as_mut().unwrap().shift_remove("frame");
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();
        assert_eq!(gateway.interface_bodies()[2].1["ipAddress"], "10.169.60.7");
    }

    #[tokio::test]
    async fn test_nmos_sequence_bodies() {
        let client = MockDevice::new();
        let (cfg, reference) = (config(), reference());
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device())
            .unwrap()
            .with_step_delay(Duration::ZERO);

        let replies = gateway.apply_nmos_ptp().await;

        let keys: Vec<&str> = replies.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["nmos_global_off", "nmos_registry", "nmos_global_on", "ptp"]);
        let puts = client.puts.lock().unwrap().clone();
        assert_eq!(puts[0].1, json!({"mode": "OFF", "label": "XIP3911-007"}));
        assert_eq!(puts[1].1["httpAddress"], "10.169.0.20");
        assert_eq!(puts[2].1, json!({"mode": "IS-04 & IS-05", "label": "XIP3911-007"}));
        assert_eq!(
            puts[3].1,
            json!({"domainNumber": 127, "announceInterval": "1", "announceReceiptTimeoutCount": 3, "dscp": 46})
        );
    }

    #[tokio::test]
    async fn test_sender_bodies() {
        let client = MockDevice::new();
        let (cfg, reference) = (config(), reference());
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();

        gateway.apply_senders().await;

        let video = client.put_body("video/senders/1").unwrap();
        assert_eq!(video["rtp"][0]["txStreamAddress"], "232.20.7.101");
        assert_eq!(video["rtp"][1]["txStreamAddress"], "232.120.7.101");
        assert_eq!(video["rtp"][0]["txStreamPort"], 50100);
        assert_eq!(video["enable"], true);
        assert!(video.get("smpteType").is_none());

        let audio = client.put_body("audio/senders/3").unwrap();
        assert_eq!(audio["rtp"][1]["txStreamAddress"], "232.120.7.203");
        assert_eq!(audio["smpteType"], "SMPTE ST 2110-30");
        assert_eq!(audio["profile"], "125 usec, 16ch");

        let meta = client.put_body("meta/senders/8").unwrap();
        assert_eq!(meta["rtp"][0]["txStreamAddress"], "232.20.7.8");
        assert_eq!(meta["rtp"][0]["txStreamPort"], 50300);
    }

    #[tokio::test]
    async fn test_step_errors_are_isolated() {
        let client = MockDevice::new();
        client.script_put("networking/interfaces/eth2", Err(TransportError("timed out".into())));
        client.script_put("networking/interfaces/eth3", Ok(json!({"error": "invalid mask"})));
        let (cfg, reference) = (config(), reference());
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();

        let replies = gateway.apply_interfaces().await;

        assert!(!replies["eth1"].is_failure());
        assert!(matches!(replies["eth2"], StepOutcome::Device(DeviceReply::Transport { .. })));
        assert!(matches!(replies["eth3"], StepOutcome::Device(DeviceReply::LogicalError { .. })));
        assert!(!replies["frame"].is_failure());
        assert_eq!(client.put_paths().len(), 4);
    }

    #[tokio::test]
    async fn test_missing_reference_sections_are_skipped() {
        let client = MockDevice::new();
        let cfg = config();
        let reference = XipReference::default();
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();

        let senders = gateway.apply_senders().await;
        let qos = gateway.apply_advanced_qos().await;

        assert!(matches!(senders["senders"], StepOutcome::Skipped { .. }));
        assert_eq!(qos.len(), 4);
        assert!(qos.values().all(StepOutcome::is_failure));
        assert!(client.put_paths().is_empty());
    }

    #[tokio::test]
    async fn test_selected_stages_only() {
        let client = MockDevice::new();
        let (cfg, reference) = (config(), reference());
        let gateway = GatewayDefaults::new(&client, &cfg, &reference, device()).unwrap();

        let report = gateway.apply_stages(&[XipStage::AdvancedQos, XipStage::Hostname]).await;

        assert!(report.hostname.is_some());
        assert!(report.advanced_qos.is_some());
        assert!(report.senders.is_none());
        assert_eq!(client.put_paths()[0], "networking/host");
        let serialized = serde_json::to_value(&report).unwrap();
        assert!(serialized.get("interfaces").is_none());
    }

    #[test]
    fn test_preview_plan() {
        let (cfg, reference) = (config(), reference());
        let plan = preview(&cfg, &reference, &device()).unwrap();

        assert_eq!(plan.unit, "XIP3911-007");
        assert_eq!(plan.video["out1"].trunk1, "232.20.7.101");
        assert_eq!(plan.video["out8"].trunk2, "232.120.7.108");
        assert_eq!(plan.audio["out2"]["stream1"].trunk1, "232.20.7.202");
        assert_eq!(plan.meta["out4"].trunk1, "232.20.7.4");
        assert_eq!(plan.udp_ports, UdpPlan { video: 50100, audio: 50200, meta: 50300 });
    }

    #[test]
    fn test_oversized_stream_count_is_rejected() {
        let cfg = config();
        let reference: XipReference =
            serde_json::from_value(json!({"defaults": {"audio_streams_per_output": 1_000_000_000u32}})).unwrap();

        assert!(matches!(preview(&cfg, &reference, &device()), Err(ProvisionError::Reference(_))));
        let client = MockDevice::new();
        assert!(GatewayDefaults::new(&client, &cfg, &reference, device()).is_err());
    }

    #[test]
    fn test_fill_rtp_body_rejects_short_template() {
        let err = fill_rtp_body(&json!({"rtp": [{}]}), "a".into(), "b".into(), 1, None).unwrap_err();
        assert!(matches!(err, ProvisionError::Reference(_)));
    }
}
