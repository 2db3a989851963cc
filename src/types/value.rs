//! The hydrated value model.

use std::fmt;

use indexmap::IndexMap;

use crate::packstream::Structure;

/// String-keyed map of hydrated values.
pub type BoltDict = IndexMap<String, BoltValue>;

/// A hydrated value: PackStream primitives plus the structures the
/// negotiated protocol version knows about.
#[derive(Debug, Clone, PartialEq)]
pub enum BoltValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<BoltValue>),
    Dict(BoltDict),
    // graph
    Node(BoltNode),
    Relationship(BoltRelationship),
    UnboundRelationship(BoltUnboundRelationship),
    Path(BoltPath),
    // temporal
    Date(BoltDate),
    Time(BoltTime),
    LocalTime(BoltLocalTime),
    DateTime(BoltDateTime),
    DateTimeZoneId(BoltDateTimeZoneId),
    LocalDateTime(BoltLocalDateTime),
    Duration(BoltDuration),
    // spatial
    Point(BoltPoint),
    /// A structure whose tag has no hydration mapping, kept as received.
    Structure(Structure),
}

impl BoltValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&BoltNode> {
        match self {
            Self::Node(n) => Some(n),
            _ => None,
        }
    }

    /// Name of the value kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Float(_) => "Float",
            Self::String(_) => "String",
            Self::Bytes(_) => "Bytes",
            Self::List(_) => "List",
            Self::Dict(_) => "Dict",
            Self::Node(_) => "Node",
            Self::Relationship(_) => "Relationship",
            Self::UnboundRelationship(_) => "UnboundRelationship",
            Self::Path(_) => "Path",
            Self::Date(_) => "Date",
            Self::Time(_) => "Time",
            Self::LocalTime(_) => "LocalTime",
            Self::DateTime(_) => "DateTime",
            Self::DateTimeZoneId(_) => "DateTimeZoneId",
            Self::LocalDateTime(_) => "LocalDateTime",
            Self::Duration(_) => "Duration",
            Self::Point(_) => "Point",
            Self::Structure(_) => "Structure",
        }
    }
}

/// A node. Before Bolt 5 the element id is the decimal form of `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltNode {
    pub id: i64,
    pub element_id: String,
    pub labels: Vec<String>,
    pub properties: BoltDict,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltRelationship {
    pub id: i64,
    pub element_id: String,
    pub start_node_id: i64,
    pub start_node_element_id: String,
    pub end_node_id: i64,
    pub end_node_element_id: String,
    pub rel_type: String,
    pub properties: BoltDict,
}

/// A relationship inside a path, whose endpoints come from the path itself.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltUnboundRelationship {
    pub id: i64,
    pub element_id: String,
    pub rel_type: String,
    pub properties: BoltDict,
}

/// A path as sent on the wire.
///
/// `sequence` alternates relationship and node indices. A relationship index
/// `i > 0` means `relationships[i - 1]` traversed forwards, `i < 0` means
/// `relationships[-i - 1]` traversed backwards.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltPath {
    pub nodes: Vec<BoltNode>,
    pub relationships: Vec<BoltUnboundRelationship>,
    pub sequence: Vec<i64>,
}

impl BoltPath {
    /// Number of relationships traversed.
    pub fn len(&self) -> usize {
        self.sequence.len() / 2
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Start node of the path, if it has any nodes.
    pub fn start(&self) -> Option<&BoltNode> {
        self.nodes.first()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltDate {
    /// Days since 1970-01-01.
    pub days: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltTime {
    /// Nanoseconds since midnight.
    pub nanoseconds: i64,
    /// Timezone offset in seconds.
    pub tz_offset_seconds: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltLocalTime {
    /// Nanoseconds since midnight.
    pub nanoseconds: i64,
}

/// Date-time with a fixed offset. `seconds` are as sent under the
/// negotiated version: UTC from Bolt 5, local before.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltDateTime {
    pub seconds: i64,
    /// Nanoseconds within the second.
    pub nanoseconds: i64,
    pub tz_offset_seconds: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltDateTimeZoneId {
    pub seconds: i64,
    pub nanoseconds: i64,
    /// Zone name, e.g. `Europe/Stockholm`.
    pub tz_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltLocalDateTime {
    pub seconds: i64,
    pub nanoseconds: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoltDuration {
    pub months: i64,
    pub days: i64,
    pub seconds: i64,
    pub nanoseconds: i64,
}

/// A 2D or 3D point in the given coordinate reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct BoltPoint {
    pub srid: i64,
    pub x: f64,
    pub y: f64,
    pub z: Option<f64>,
}

macro_rules! bolt_value_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for BoltValue {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

bolt_value_from! {
    bool => Boolean,
    i64 => Integer,
    f64 => Float,
    String => String,
    Vec<u8> => Bytes,
    Vec<BoltValue> => List,
    BoltDict => Dict,
    BoltNode => Node,
    BoltRelationship => Relationship,
    BoltPath => Path,
    BoltDate => Date,
    BoltDateTime => DateTime,
    BoltDuration => Duration,
    BoltPoint => Point,
    Structure => Structure,
}

impl From<i32> for BoltValue {
    fn from(v: i32) -> Self {
        Self::Integer(v.into())
    }
}

impl From<&str> for BoltValue {
    fn from(v: &str) -> Self {
        Self::String(v.into())
    }
}

impl fmt::Display for BoltValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(v) => fmt::Display::fmt(v, f),
            Self::Integer(v) => fmt::Display::fmt(v, f),
            Self::Float(v) => fmt::Display::fmt(v, f),
            Self::String(v) => write!(f, "{v:?}"),
            Self::Bytes(v) => write!(f, "bytes[{}]", v.len()),
            Self::List(items) => {
                f.write_str("[")?;
                write_separated(f, items.iter())?;
                f.write_str("]")
            }
            Self::Dict(dict) => {
                f.write_str("{")?;
                write_separated(f, dict.iter().map(|(k, v)| format!("{k}: {v}")))?;
                f.write_str("}")
            }
            Self::Node(n) => {
                write!(f, "(_{}", n.id)?;
                for label in &n.labels {
                    write!(f, ":{label}")?;
                }
                write!(f, ")")
            }
            Self::Relationship(r) => {
                write!(f, "(_{})-[:{}]->(_{})", r.start_node_id, r.rel_type, r.end_node_id)
            }
            Self::UnboundRelationship(r) => write!(f, "-[_{}:{}]-", r.id, r.rel_type),
            Self::Path(p) => write!(f, "<path of {} hops>", p.len()),
            Self::Date(d) => write!(f, "date(+{}d)", d.days),
            Self::Time(t) => write!(f, "time({}, {})", t.nanoseconds, t.tz_offset_seconds),
            Self::LocalTime(t) => write!(f, "localtime({}ns)", t.nanoseconds),
            Self::DateTime(dt) => {
                write!(f, "datetime({}.{:09}, {})", dt.seconds, dt.nanoseconds, dt.tz_offset_seconds)
            }
            Self::DateTimeZoneId(dt) => {
                write!(f, "datetime({}.{:09}, {})", dt.seconds, dt.nanoseconds, dt.tz_id)
            }
            Self::LocalDateTime(dt) => {
                write!(f, "localdatetime({}.{:09})", dt.seconds, dt.nanoseconds)
            }
            Self::Duration(d) => write!(
                f,
                "duration({}m {}d {}.{:09}s)",
                d.months, d.days, d.seconds, d.nanoseconds
            ),
            Self::Point(p) => match p.z {
                Some(z) => write!(f, "point({}, {}, {}, {})", p.srid, p.x, p.y, z),
                None => write!(f, "point({}, {}, {})", p.srid, p.x, p.y),
            },
            Self::Structure(s) => write!(f, "<structure 0x{:02X} with {} fields>", s.tag, s.fields.len()),
        }
    }
}

fn write_separated<T: fmt::Display>(
    f: &mut fmt::Formatter<'_>,
    items: impl Iterator<Item = T>,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_length_counts_hops() {
        let path = BoltPath {
            nodes: vec![],
            relationships: vec![],
            sequence: vec![1, 1, -1, 0],
        };
        assert_eq!(path.len(), 2);
        assert!(!path.is_empty());
    }

    #[test]
    fn display_node_and_point() {
        let node = BoltValue::Node(BoltNode {
            id: 7,
            element_id: "7".into(),
            labels: vec!["Person".into(), "Actor".into()],
            properties: BoltDict::new(),
        });
        assert_eq!(node.to_string(), "(_7:Person:Actor)");

        let point = BoltValue::Point(BoltPoint {
            srid: 7203,
            x: 1.5,
            y: 2.0,
            z: None,
        });
        assert_eq!(point.to_string(), "point(7203, 1.5, 2)");
    }
}
