//! Hydration: converting between PackStream [`Value`]s and application
//! [`BoltValue`]s.
//!
//! Which structure tags mean what depends on the negotiated protocol
//! version. A [`Hydrator`] holds the tag table for one version; it is built
//! once at connection setup and never changes afterwards.
//!
//! [`Value`]: crate::packstream::Value
//! [`BoltValue`]: crate::types::BoltValue

mod dehydrate;
mod hydrate;

use std::fmt;

use crate::types::tag;
use crate::version::Version;

/// The structure kinds the hydration layer knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StructKind {
    Node,
    Relationship,
    UnboundRelationship,
    Path,
    Date,
    Time,
    LocalTime,
    DateTime,
    DateTimeZoneId,
    LocalDateTime,
    Duration,
    Point2D,
    Point3D,
}

impl StructKind {
    /// Number of fields the structure carries under `version`.
    fn arity(self, version: Version) -> usize {
        let ids = version.has_element_ids();
        match self {
            Self::Node => if ids { 4 } else { 3 },
            Self::Relationship => if ids { 8 } else { 5 },
            Self::UnboundRelationship => if ids { 4 } else { 3 },
            Self::Path => 3,
            Self::Date => 1,
            Self::Time => 2,
            Self::LocalTime => 1,
            Self::DateTime => 3,
            Self::DateTimeZoneId => 3,
            Self::LocalDateTime => 2,
            Self::Duration => 4,
            Self::Point2D => 3,
            Self::Point3D => 4,
        }
    }
}

impl fmt::Display for StructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

const GRAPH_TAGS: [(u8, StructKind); 4] = [
    (tag::NODE, StructKind::Node),
    (tag::RELATIONSHIP, StructKind::Relationship),
    (tag::UNBOUND_RELATIONSHIP, StructKind::UnboundRelationship),
    (tag::PATH, StructKind::Path),
];

const TEMPORAL_SPATIAL_TAGS: [(u8, StructKind); 7] = [
    (tag::DATE, StructKind::Date),
    (tag::TIME, StructKind::Time),
    (tag::LOCAL_TIME, StructKind::LocalTime),
    (tag::LOCAL_DATE_TIME, StructKind::LocalDateTime),
    (tag::DURATION, StructKind::Duration),
    (tag::POINT_2D, StructKind::Point2D),
    (tag::POINT_3D, StructKind::Point3D),
];

/// Converts values in both directions using the tag table for one
/// protocol version.
#[derive(Clone)]
pub struct Hydrator {
    version: Version,
    kinds: [Option<StructKind>; 256],
}

impl Hydrator {
    /// Builds the tag table for `version`.
    ///
    /// Bolt 1 knows graph structures only. Bolt 2 adds temporal and spatial
    /// types. Bolt 5 switches date-times to UTC tags and adds element ids.
    pub fn for_version(version: Version) -> Self {
        let mut kinds = [None; 256];
        let mut register = |entries: &[(u8, StructKind)]| {
            for &(t, kind) in entries {
                kinds[usize::from(t)] = Some(kind);
            }
        };

        register(&GRAPH_TAGS);
        if version >= Version::V2 {
            register(&TEMPORAL_SPATIAL_TAGS);
            if version.major >= 5 {
                register(&[
                    (tag::DATE_TIME, StructKind::DateTime),
                    (tag::DATE_TIME_ZONE_ID, StructKind::DateTimeZoneId),
                ]);
            } else {
                register(&[
                    (tag::LEGACY_DATE_TIME, StructKind::DateTime),
                    (tag::LEGACY_DATE_TIME_ZONE_ID, StructKind::DateTimeZoneId),
                ]);
            }
        }

        tracing::debug!(%version, "built hydration table");
        Self { version, kinds }
    }

    pub fn version(&self) -> Version {
        self.version
    }

    /// The structure kind registered for `tag`, if any.
    pub fn kind_of(&self, tag: u8) -> Option<StructKind> {
        self.kinds[usize::from(tag)]
    }

    /// The tag registered for `kind`, if this version supports it.
    pub fn tag_of(&self, kind: StructKind) -> Option<u8> {
        (0..=u8::MAX).find(|&t| self.kinds[usize::from(t)] == Some(kind))
    }
}

impl Default for Hydrator {
    fn default() -> Self {
        Self::for_version(Version::V5_4)
    }
}

impl fmt::Debug for Hydrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hydrator")
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
