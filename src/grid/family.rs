use serde::Serialize;

use crate::models::ParameterKey;

/// Media essence family of the 2110 output grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFamily {
    Video,
    Audio,
    Meta,
}

impl MediaFamily {
    /// Generation order of the expanded grid
    pub const ALL: [MediaFamily; 3] = [MediaFamily::Video, MediaFamily::Meta, MediaFamily::Audio];

    /// Root of the family's `enable` parameter; the other fields follow it
    pub fn base_root(self) -> u32 {
        match self {
            Self::Video => 6500,
            Self::Audio => 6550,
            Self::Meta => 6600,
        }
    }

    pub fn root(self, field: MediaField) -> u32 {
        self.base_root() + field.offset()
    }

    /// Port used when neither config nor base map names one
    pub fn default_udp(self) -> u16 {
        match self {
            Self::Video => 50100,
            Self::Audio => 50200,
            Self::Meta => 50300,
        }
    }

    /// Audio keys carry a stream index between output and trunk
    pub fn has_streams(self) -> bool {
        matches!(self, Self::Audio)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Meta => "meta",
        }
    }

    /// Family and field owning a root code, if it is a media-grid root
    pub fn classify_root(root: u32) -> Option<(MediaFamily, MediaField)> {
        Self::ALL.into_iter().find_map(|family| {
            MediaField::ALL
                .into_iter()
                .find(|field| family.root(*field) == root)
                .map(|field| (family, field))
        })
    }
}

/// Per-output parameter of a media family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaField {
    Enable,
    Ip,
    Udp,
    SrcUdp,
}

impl MediaField {
    /// Generation order within one output/trunk
    pub const ALL: [MediaField; 4] = [MediaField::Ip, MediaField::Udp, MediaField::SrcUdp, MediaField::Enable];

    pub fn offset(self) -> u32 {
        match self {
            Self::Enable => 0,
            Self::Ip => 1,
            Self::Udp => 2,
            Self::SrcUdp => 3,
        }
    }
}

/// Redundant media path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trunk {
    Red,
    Blue,
}

impl Trunk {
    pub const ALL: [Trunk; 2] = [Trunk::Red, Trunk::Blue];

    pub fn index(self) -> u32 {
        match self {
            Self::Red => 0,
            Self::Blue => 1,
        }
    }
}

/// Structured address of one leaf in the expanded grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub family: MediaFamily,
    pub field: MediaField,
    pub output: u32,
    pub stream: Option<u32>,
    pub trunk: Trunk,
}

impl GridKey {
    /// Fully-qualified wire key: `root.output.trunk` or `root.output.stream.trunk`
    pub fn to_key(&self) -> ParameterKey {
        let mut key = ParameterKey::root(self.family.root(self.field)).child(self.output);
        if let Some(stream) = self.stream {
            key = key.child(stream);
        }
        key.child(self.trunk.index())
    }

    /// Keys consulted for an explicit value, most specific first.
    /// Generation is the implicit last step when none of them is present.
    pub fn precedence_chain(&self) -> Vec<ParameterKey> {
        let bare = ParameterKey::root(self.family.root(self.field));
        let per_output = bare.child(self.output);
        let mut chain = vec![self.to_key()];
        if let Some(stream) = self.stream {
            chain.push(per_output.child(stream));
        }
        chain.push(per_output);
        chain.push(bare);
        chain
    }
}

/// True for keys under any media-family root (6500-6503, 6550-6553, 6600-6603)
pub fn is_media_key(key: &ParameterKey) -> bool {
    MediaFamily::classify_root(key.root_code()).is_some()
}
