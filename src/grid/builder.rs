use crate::error::ProvisionError;
use crate::models::{param_root, DeviceIdentity, PanelConfig, ParameterKey, ParameterMap, RangeSpec, XipReference};
use crate::utils::{ensure_dot_suffix, multicast_address};

use super::family::{GridKey, MediaFamily, MediaField, Trunk};
use super::range::{expand_range, pad_to, OUTPUTS};

/// Audio streams per output on router-class units unless config overrides it
pub const ROUTER_AUDIO_STREAMS: u32 = 4;

const MAX_OCTET: u32 = 255;

/// Resolved multicast plan for one device class.
///
/// Built once from the config snapshot; expansion reads it and nothing else,
/// so the same inputs always give the same grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridSettings {
    pub outputs: usize,
    pub red_prefix: String,
    pub blue_prefix: String,
    /// Per-output suffixes, padded to `outputs`
    pub video_suffixes: Vec<u32>,
    pub meta_suffixes: Vec<u32>,
    /// First audio suffix; the rest are assigned linearly over output x stream
    pub audio_start: u32,
    pub audio_streams: u32,
    pub video_udp: u16,
    pub audio_udp: u16,
    pub meta_udp: u16,
}

impl GridSettings {
    /// Plan for router-class (Scorpion) units
    pub fn router(cfg: &PanelConfig) -> Result<Self, ProvisionError> {
        let streams = cfg
            .audio_streams
            .unwrap_or(i64::from(ROUTER_AUDIO_STREAMS))
            .clamp(1, i64::from(MAX_OCTET)) as u32;
        Self::from_config(
            cfg,
            streams,
            [
                cfg.video_udp.unwrap_or(MediaFamily::Video.default_udp()),
                cfg.audio_udp.unwrap_or(MediaFamily::Audio.default_udp()),
                cfg.meta_udp.unwrap_or(MediaFamily::Meta.default_udp()),
            ],
            ProvisionError::Config,
        )
    }

    /// Plan for gateway-class (XIP3901) units; ports and stream count come
    /// from the reference document
    pub fn gateway(cfg: &PanelConfig, reference: &XipReference) -> Result<Self, ProvisionError> {
        Self::from_config(
            cfg,
            reference.audio_streams_per_output(),
            [reference.video_udp(), reference.audio_udp(), reference.meta_udp()],
            ProvisionError::Reference,
        )
    }

    /// `stream_error` builds the error raised when the audio stream count
    /// pushes generated suffixes past the last octet
    fn from_config(
        cfg: &PanelConfig,
        audio_streams: u32,
        ports: [u16; 3],
        stream_error: fn(String) -> ProvisionError,
    ) -> Result<Self, ProvisionError> {
        let video = configured_range(cfg.video_range.as_ref(), "101-108")?;
        let meta = configured_range(cfg.meta_range.as_ref(), "1-8")?;
        let audio = configured_range(cfg.audio_range.as_ref(), "201-232")?;

        let audio_start = audio.first().copied().unwrap_or(201);
        let audio_streams = audio_streams.max(1);
        if audio_start > MAX_OCTET {
            return Err(out_of_octet(cfg.audio_range.as_ref()));
        }
        // one past the last generated audio suffix
        let audio_end = (OUTPUTS as u32)
            .checked_mul(audio_streams)
            .and_then(|n| n.checked_add(audio_start));
        if !audio_end.is_some_and(|end| end <= MAX_OCTET + 1) {
            return Err(stream_error(format!(
                "{} audio streams per output starting at suffix {} exceed the last multicast octet",
                audio_streams, audio_start
            )));
        }

        Ok(Self {
            outputs: OUTPUTS,
            red_prefix: ensure_dot_suffix(cfg.red_prefix.as_deref().unwrap_or("232.20.")),
            blue_prefix: ensure_dot_suffix(cfg.blue_prefix.as_deref().unwrap_or("232.120.")),
            video_suffixes: octets(pad_to(video, OUTPUTS, 101), cfg.video_range.as_ref())?,
            meta_suffixes: octets(pad_to(meta, OUTPUTS, 1), cfg.meta_range.as_ref())?,
            audio_start,
            audio_streams,
            video_udp: ports[0],
            audio_udp: ports[1],
            meta_udp: ports[2],
        })
    }

    pub fn prefix(&self, trunk: Trunk) -> &str {
        match trunk {
            Trunk::Red => &self.red_prefix,
            Trunk::Blue => &self.blue_prefix,
        }
    }

    pub fn udp_port(&self, family: MediaFamily) -> u16 {
        match family {
            MediaFamily::Video => self.video_udp,
            MediaFamily::Audio => self.audio_udp,
            MediaFamily::Meta => self.meta_udp,
        }
    }

    pub fn streams(&self, family: MediaFamily) -> u32 {
        if family.has_streams() {
            self.audio_streams
        } else {
            1
        }
    }

    /// Multicast suffix (last octet) for one output/stream.
    /// Audio numbers every output x stream pair linearly so no two collide.
    pub fn suffix(&self, family: MediaFamily, output: u32, stream: u32) -> u32 {
        let idx = output as usize;
        match family {
            MediaFamily::Video => self.video_suffixes[idx.min(self.video_suffixes.len() - 1)],
            MediaFamily::Meta => self.meta_suffixes[idx.min(self.meta_suffixes.len() - 1)],
            MediaFamily::Audio => self
                .audio_start
                .saturating_add(output.saturating_mul(self.audio_streams))
                .saturating_add(stream),
        }
    }

    pub fn multicast(&self, family: MediaFamily, output: u32, stream: u32, trunk: Trunk, unit: u32) -> String {
        multicast_address(self.prefix(trunk), unit, self.suffix(family, output, stream))
    }
}

/// Suffixes must fit the last octet of a multicast address
fn octets(values: Vec<u32>, spec: Option<&RangeSpec>) -> Result<Vec<u32>, ProvisionError> {
    if values.iter().any(|v| *v > MAX_OCTET) {
        return Err(out_of_octet(spec));
    }
    Ok(values)
}

fn out_of_octet(spec: Option<&RangeSpec>) -> ProvisionError {
    let text = match spec {
        Some(RangeSpec::Text(text)) => text.clone(),
        Some(RangeSpec::Single(value)) => value.to_string(),
        Some(RangeSpec::List(values)) => format!("{:?}", values),
        None => String::new(),
    };
    ProvisionError::MalformedRange(text)
}

fn configured_range(spec: Option<&RangeSpec>, fallback: &str) -> Result<Vec<u32>, ProvisionError> {
    match spec {
        Some(RangeSpec::Text(text)) if text.trim().is_empty() => expand_range(&RangeSpec::from(fallback)),
        Some(spec) => expand_range(spec),
        None => expand_range(&RangeSpec::from(fallback)),
    }
}

/// Where an expanded value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Explicit(ParameterKey),
    Generated,
}

/// Resolve one grid leaf: the first key of its precedence chain present in
/// `base` wins verbatim, otherwise a value is generated
pub fn resolve(base: &ParameterMap, key: &GridKey, settings: &GridSettings, unit: u32) -> (String, ValueSource) {
    for candidate in key.precedence_chain() {
        if let Some(value) = base.get(&candidate) {
            return (value.to_string(), ValueSource::Explicit(candidate));
        }
    }

    let generated = match key.field {
        MediaField::Ip => settings.multicast(key.family, key.output, key.stream.unwrap_or(0), key.trunk, unit),
        MediaField::Udp | MediaField::SrcUdp => settings.udp_port(key.family).to_string(),
        MediaField::Enable => "1".to_string(),
    };
    (generated, ValueSource::Generated)
}

/// Every leaf of the grid in generation order
pub fn grid_keys(settings: &GridSettings) -> Vec<GridKey> {
    let mut keys = Vec::new();
    for family in MediaFamily::ALL {
        for output in 0..settings.outputs as u32 {
            for stream in 0..settings.streams(family) {
                for trunk in Trunk::ALL {
                    for field in MediaField::ALL {
                        keys.push(GridKey {
                            family,
                            field,
                            output,
                            stream: family.has_streams().then_some(stream),
                            trunk,
                        });
                    }
                }
            }
        }
    }
    keys
}

/// Expand a sparse base map into the full media grid.
///
/// The result holds every base entry (in base order) followed by one entry
/// per grid leaf not already fully qualified in the base map.
pub fn expand_grid(base: &ParameterMap, settings: &GridSettings, unit: u32) -> ParameterMap {
    let mut expanded = base.clone();
    for key in grid_keys(settings) {
        let wire = key.to_key();
        if base.contains_key(&wire) {
            continue;
        }
        let (value, source) = resolve(base, &key, settings, unit);
        if let ValueSource::Explicit(from) = &source {
            tracing::trace!("{} taken from {}", wire, from);
        }
        expanded.insert(wire, value);
    }
    expanded
}

/// Write the unit's name into the NMOS alias and label fields.
/// Trunk-network fields are deliberately left alone.
pub fn seed_identity(base: &mut ParameterMap, label: &str) {
    base.insert(ParameterKey::root(param_root::NAME_ALIAS), label);
    base.insert(ParameterKey::root(param_root::NMOS_LABEL), label);
}

/// Complete default grid for a router-class unit
pub fn build_router_grid(
    mut defaults: ParameterMap,
    cfg: &PanelConfig,
    device: &DeviceIdentity,
) -> Result<ParameterMap, ProvisionError> {
    let settings = GridSettings::router(cfg)?;
    seed_identity(&mut defaults, &device.label(cfg.scorpion_name_prefix()));
    let grid = expand_grid(&defaults, &settings, device.unit);
    tracing::debug!(
        "Expanded {} default parameters into {} for {}",
        defaults.len(),
        grid.len(),
        device.host
    );
    Ok(grid)
}
