//! Application-level Bolt values: graph entities, temporal and spatial types.
//!
//! These are what callers see. The hydration layer converts them to and
//! from PackStream structures.

mod value;

pub use value::{
    BoltDate, BoltDateTime, BoltDateTimeZoneId, BoltDict, BoltDuration, BoltLocalDateTime,
    BoltLocalTime, BoltNode, BoltPath, BoltPoint, BoltRelationship, BoltTime,
    BoltUnboundRelationship, BoltValue,
};

/// PackStream structure tag bytes for graph and temporal types.
pub mod tag {
    pub const NODE: u8 = b'N';
    pub const RELATIONSHIP: u8 = b'R';
    pub const UNBOUND_RELATIONSHIP: u8 = b'r';
    pub const PATH: u8 = b'P';
    pub const DATE: u8 = b'D';
    pub const TIME: u8 = b'T';
    pub const LOCAL_TIME: u8 = b't';
    pub const DATE_TIME: u8 = b'I';
    pub const DATE_TIME_ZONE_ID: u8 = b'i';
    /// DateTime with offset before Bolt 5 (seconds are local).
    pub const LEGACY_DATE_TIME: u8 = b'F';
    /// DateTime with zone id before Bolt 5 (seconds are local).
    pub const LEGACY_DATE_TIME_ZONE_ID: u8 = b'f';
    pub const LOCAL_DATE_TIME: u8 = b'd';
    pub const DURATION: u8 = b'E';
    pub const POINT_2D: u8 = b'X';
    pub const POINT_3D: u8 = b'Y';
}
