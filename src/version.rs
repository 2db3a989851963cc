//! Bolt protocol versions and the handshake byte layout.

use std::fmt;

/// Bolt magic preamble bytes.
pub const BOLT_MAGIC: [u8; 4] = [0x60, 0x60, 0xB0, 0x17];

/// The "no version" response sent when negotiation fails.
pub const NO_VERSION: [u8; 4] = [0, 0, 0, 0];

/// A negotiated Bolt protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub const V1: Self = Self::new(1, 0);
    pub const V2: Self = Self::new(2, 0);
    pub const V3: Self = Self::new(3, 0);
    pub const V4_4: Self = Self::new(4, 4);
    pub const V5_0: Self = Self::new(5, 0);
    pub const V5_4: Self = Self::new(5, 4);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Whether LOGON carries credentials instead of HELLO (5.1+).
    pub fn has_logon(self) -> bool {
        self >= Self::new(5, 1)
    }

    /// Whether HELLO must carry a `bolt_agent` dict (5.3+).
    pub fn has_bolt_agent(self) -> bool {
        self >= Self::new(5, 3)
    }

    /// Whether graph entities carry element ids (5.0+).
    pub fn has_element_ids(self) -> bool {
        self.major >= 5
    }

    /// Encodes a version as the 4-byte handshake response.
    pub fn to_bytes(self) -> [u8; 4] {
        [0, 0, self.minor, self.major]
    }

    /// Parses a 4-byte handshake response; `None` if the server refused.
    pub fn from_bytes(bytes: [u8; 4]) -> Option<Self> {
        match bytes {
            NO_VERSION => None,
            [_, _, minor, major] => Some(Self::new(major, minor)),
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// A proposal slot: `version` plus `range` earlier minor versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proposal {
    pub version: Version,
    pub range: u8,
}

impl Proposal {
    /// Whether `v` falls inside this proposal's minor range.
    pub fn accepts(self, v: Version) -> bool {
        v.major == self.version.major
            && v.minor <= self.version.minor
            && v.minor >= self.version.minor.saturating_sub(self.range)
    }
}

/// Versions this client proposes, in preference order.
pub const CLIENT_PROPOSALS: [Proposal; 3] = [
    Proposal {
        version: Version::V5_4,
        range: 4,
    },
    Proposal {
        version: Version::V4_4,
        range: 3,
    },
    Proposal {
        version: Version::new(4, 0),
        range: 0,
    },
];

/// Encodes up to four proposals into the 16 handshake bytes.
///
/// Each proposal is a 4-byte big-endian value:
/// - byte 0: padding (reserved)
/// - byte 1: range (count of prior minor versions also accepted)
/// - byte 2: minor version
/// - byte 3: major version
pub fn encode_proposals(proposals: &[Proposal]) -> [u8; 16] {
    let mut out = [0u8; 16];
    for (slot, p) in out.chunks_exact_mut(4).zip(proposals) {
        slot.copy_from_slice(&[0, p.range, p.version.minor, p.version.major]);
    }
    out
}

/// Picks the first proposed version found in `supported`, scanning the
/// proposals in order and `supported` in preference order.
pub fn negotiate(proposals: &[u8; 16], supported: &[Version]) -> Option<Version> {
    for chunk in proposals.chunks_exact(4) {
        let proposal = Proposal {
            version: Version::new(chunk[3], chunk[2]),
            range: chunk[1],
        };
        if proposal.version == Version::new(0, 0) {
            // Placeholder (unused proposal slot).
            continue;
        }
        if let Some(v) = supported.iter().copied().find(|v| proposal.accepts(*v)) {
            return Some(v);
        }
    }
    None
}
