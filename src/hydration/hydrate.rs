//! PackStream `Value` → `BoltValue`.

use super::{Hydrator, StructKind};
use crate::error::BoltError;
use crate::packstream::{Structure, Value};
use crate::types::{
    BoltDate, BoltDateTime, BoltDateTimeZoneId, BoltDict, BoltDuration, BoltLocalDateTime,
    BoltLocalTime, BoltNode, BoltPath, BoltPoint, BoltRelationship, BoltTime,
    BoltUnboundRelationship, BoltValue,
};

impl Hydrator {
    /// Hydrates a received value.
    ///
    /// Structures with a registered tag become typed values after their
    /// fields are hydrated. Structures with an unknown tag are returned
    /// unchanged as `BoltValue::Structure`.
    pub fn hydrate(&self, value: Value) -> Result<BoltValue, BoltError> {
        Ok(match value {
            Value::Null => BoltValue::Null,
            Value::Boolean(b) => BoltValue::Boolean(b),
            Value::Integer(i) => BoltValue::Integer(i),
            Value::Float(f) => BoltValue::Float(f),
            Value::String(s) => BoltValue::String(s),
            Value::Bytes(b) => BoltValue::Bytes(b),
            Value::List(items) => BoltValue::List(self.hydrate_list(items)?),
            Value::Dict(dict) => BoltValue::Dict(self.hydrate_dict(dict)?),
            Value::Structure(s) => match self.kind_of(s.tag) {
                Some(kind) => self.hydrate_structure(kind, s)?,
                None => {
                    tracing::trace!(tag = s.tag, "passing through unknown structure");
                    BoltValue::Structure(s)
                }
            },
        })
    }

    /// Hydrates a value into an existing slot.
    ///
    /// When `existing` holds a node or relationship and the value hydrates
    /// to the same kind of entity, the ids must match and the entity is
    /// updated in place. Anything else is overwritten.
    pub fn hydrate_into(&self, value: Value, existing: &mut BoltValue) -> Result<(), BoltError> {
        let fresh = self.hydrate(value)?;
        match (&mut *existing, fresh) {
            (BoltValue::Node(old), BoltValue::Node(new)) => {
                ensure_same_entity("node", old.id, new.id)?;
                old.element_id = new.element_id;
                old.labels = new.labels;
                old.properties = new.properties;
            }
            (BoltValue::Relationship(old), BoltValue::Relationship(new)) => {
                ensure_same_entity("relationship", old.id, new.id)?;
                *old = new;
            }
            (slot, fresh) => *slot = fresh,
        }
        Ok(())
    }

    pub fn hydrate_list(&self, items: Vec<Value>) -> Result<Vec<BoltValue>, BoltError> {
        items.into_iter().map(|v| self.hydrate(v)).collect()
    }

    pub fn hydrate_dict(&self, dict: crate::packstream::Dict) -> Result<BoltDict, BoltError> {
        dict.into_iter()
            .map(|(k, v)| Ok((k, self.hydrate(v)?)))
            .collect()
    }

    fn hydrate_structure(&self, kind: StructKind, s: Structure) -> Result<BoltValue, BoltError> {
        let expected = kind.arity(self.version);
        if s.fields.len() != expected {
            return Err(BoltError::Protocol(format!(
                "{kind} structure needs {expected} fields under Bolt {}, got {}",
                self.version,
                s.fields.len()
            )));
        }
        let fields = self.hydrate_list(s.fields)?;
        let mut f = FieldReader::new(kind, fields);
        let element_ids = self.version.has_element_ids();

        Ok(match kind {
            StructKind::Node => {
                let id = f.int()?;
                let labels = f.string_list()?;
                let properties = f.dict()?;
                let element_id = if element_ids { f.string()? } else { id.to_string() };
                BoltValue::Node(BoltNode {
                    id,
                    element_id,
                    labels,
                    properties,
                })
            }
            StructKind::Relationship => {
                let id = f.int()?;
                let start_node_id = f.int()?;
                let end_node_id = f.int()?;
                let rel_type = f.string()?;
                let properties = f.dict()?;
                let (element_id, start_node_element_id, end_node_element_id) = if element_ids {
                    (f.string()?, f.string()?, f.string()?)
                } else {
                    (id.to_string(), start_node_id.to_string(), end_node_id.to_string())
                };
                BoltValue::Relationship(BoltRelationship {
                    id,
                    element_id,
                    start_node_id,
                    start_node_element_id,
                    end_node_id,
                    end_node_element_id,
                    rel_type,
                    properties,
                })
            }
            StructKind::UnboundRelationship => {
                let id = f.int()?;
                let rel_type = f.string()?;
                let properties = f.dict()?;
                let element_id = if element_ids { f.string()? } else { id.to_string() };
                BoltValue::UnboundRelationship(BoltUnboundRelationship {
                    id,
                    element_id,
                    rel_type,
                    properties,
                })
            }
            StructKind::Path => hydrate_path(&mut f)?,
            StructKind::Date => BoltValue::Date(BoltDate { days: f.int()? }),
            StructKind::Time => BoltValue::Time(BoltTime {
                nanoseconds: f.int()?,
                tz_offset_seconds: f.int()?,
            }),
            StructKind::LocalTime => BoltValue::LocalTime(BoltLocalTime {
                nanoseconds: f.int()?,
            }),
            StructKind::DateTime => BoltValue::DateTime(BoltDateTime {
                seconds: f.int()?,
                nanoseconds: f.int()?,
                tz_offset_seconds: f.int()?,
            }),
            StructKind::DateTimeZoneId => BoltValue::DateTimeZoneId(BoltDateTimeZoneId {
                seconds: f.int()?,
                nanoseconds: f.int()?,
                tz_id: f.string()?,
            }),
            StructKind::LocalDateTime => BoltValue::LocalDateTime(BoltLocalDateTime {
                seconds: f.int()?,
                nanoseconds: f.int()?,
            }),
            StructKind::Duration => BoltValue::Duration(BoltDuration {
                months: f.int()?,
                days: f.int()?,
                seconds: f.int()?,
                nanoseconds: f.int()?,
            }),
            StructKind::Point2D => BoltValue::Point(BoltPoint {
                srid: f.int()?,
                x: f.float()?,
                y: f.float()?,
                z: None,
            }),
            StructKind::Point3D => BoltValue::Point(BoltPoint {
                srid: f.int()?,
                x: f.float()?,
                y: f.float()?,
                z: Some(f.float()?),
            }),
        })
    }
}

fn hydrate_path(f: &mut FieldReader) -> Result<BoltValue, BoltError> {
    let nodes = f
        .list()?
        .into_iter()
        .map(|v| match v {
            BoltValue::Node(n) => Ok(n),
            other => Err(f.mismatch("node", &other)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let relationships = f
        .list()?
        .into_iter()
        .map(|v| match v {
            BoltValue::UnboundRelationship(r) => Ok(r),
            other => Err(f.mismatch("unbound relationship", &other)),
        })
        .collect::<Result<Vec<_>, _>>()?;
    let sequence = f
        .list()?
        .into_iter()
        .map(|v| v.as_int().ok_or_else(|| f.mismatch("integer", &v)))
        .collect::<Result<Vec<_>, _>>()?;

    if sequence.len() % 2 != 0 {
        return Err(BoltError::Protocol(format!(
            "path sequence must have even length, got {}",
            sequence.len()
        )));
    }
    for pair in sequence.chunks_exact(2) {
        let rel_ok = usize::try_from(pair[0].unsigned_abs())
            .is_ok_and(|rel| rel != 0 && rel <= relationships.len());
        let node_ok = usize::try_from(pair[1]).is_ok_and(|node| node < nodes.len());
        if !rel_ok || !node_ok {
            return Err(BoltError::Protocol(format!(
                "path sequence entry ({}, {}) is out of range",
                pair[0], pair[1]
            )));
        }
    }

    Ok(BoltValue::Path(BoltPath {
        nodes,
        relationships,
        sequence,
    }))
}

fn ensure_same_entity(what: &str, old: i64, new: i64) -> Result<(), BoltError> {
    if old == new {
        Ok(())
    } else {
        Err(BoltError::Protocol(format!(
            "cannot update {what} {old} with data for {what} {new}"
        )))
    }
}

/// Takes hydrated structure fields in order, checking each one's type.
struct FieldReader {
    kind: StructKind,
    fields: std::vec::IntoIter<BoltValue>,
}

impl FieldReader {
    fn new(kind: StructKind, fields: Vec<BoltValue>) -> Self {
        Self {
            kind,
            fields: fields.into_iter(),
        }
    }

    fn field(&mut self) -> Result<BoltValue, BoltError> {
        self.fields
            .next()
            .ok_or_else(|| BoltError::Protocol(format!("{} structure is missing a field", self.kind)))
    }

    fn mismatch(&self, expected: &str, got: &BoltValue) -> BoltError {
        BoltError::Protocol(format!(
            "{} field: expected {expected}, got {}",
            self.kind,
            got.kind()
        ))
    }

    fn int(&mut self) -> Result<i64, BoltError> {
        match self.field()? {
            BoltValue::Integer(i) => Ok(i),
            other => Err(self.mismatch("integer", &other)),
        }
    }

    fn float(&mut self) -> Result<f64, BoltError> {
        match self.field()? {
            BoltValue::Float(v) => Ok(v),
            other => Err(self.mismatch("float", &other)),
        }
    }

    fn string(&mut self) -> Result<String, BoltError> {
        match self.field()? {
            BoltValue::String(s) => Ok(s),
            other => Err(self.mismatch("string", &other)),
        }
    }

    fn dict(&mut self) -> Result<BoltDict, BoltError> {
        match self.field()? {
            BoltValue::Dict(d) => Ok(d),
            other => Err(self.mismatch("dict", &other)),
        }
    }

    fn list(&mut self) -> Result<Vec<BoltValue>, BoltError> {
        match self.field()? {
            BoltValue::List(items) => Ok(items),
            other => Err(self.mismatch("list", &other)),
        }
    }

    fn string_list(&mut self) -> Result<Vec<String>, BoltError> {
        self.list()?
            .into_iter()
            .map(|v| match v {
                BoltValue::String(s) => Ok(s),
                other => Err(self.mismatch("string", &other)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packstream::Dict;
    use crate::types::tag;
    use crate::version::Version;

    fn node_v5(id: i64, name: &str) -> Value {
        Value::Structure(Structure::new(
            tag::NODE,
            vec![
                Value::Integer(id),
                Value::List(vec![Value::from("Person")]),
                Value::Dict(Dict::from([("name".to_string(), Value::from(name))])),
                Value::String(format!("4:db:{id}")),
            ],
        ))
    }

    #[test]
    fn primitives_pass_through() {
        let h = Hydrator::default();
        assert_eq!(h.hydrate(Value::Integer(5)).unwrap(), BoltValue::Integer(5));
        assert_eq!(
            h.hydrate(Value::List(vec![Value::Null, Value::from("x")])).unwrap(),
            BoltValue::List(vec![BoltValue::Null, BoltValue::from("x")])
        );
    }

    #[test]
    fn hydrates_node_with_element_id() {
        let h = Hydrator::for_version(Version::V5_4);
        match h.hydrate(node_v5(42, "Alice")).unwrap() {
            BoltValue::Node(n) => {
                assert_eq!(n.id, 42);
                assert_eq!(n.element_id, "4:db:42");
                assert_eq!(n.labels, vec!["Person".to_string()]);
                assert_eq!(n.properties.get("name"), Some(&BoltValue::from("Alice")));
            }
            other => panic!("expected node, got {other}"),
        }
    }

    #[test]
    fn legacy_node_derives_element_id() {
        let h = Hydrator::for_version(Version::V4_4);
        let raw = Value::Structure(Structure::new(
            tag::NODE,
            vec![Value::Integer(3), Value::List(vec![]), Value::Dict(Dict::new())],
        ));
        let node = h.hydrate(raw).unwrap();
        assert_eq!(node.as_node().map(|n| n.element_id.as_str()), Some("3"));
    }

    #[test]
    fn field_count_mismatch_fails() {
        // A v5 node under a v4 table has one field too many.
        let h = Hydrator::for_version(Version::V4_4);
        assert!(matches!(h.hydrate(node_v5(1, "a")), Err(BoltError::Protocol(_))));
    }

    #[test]
    fn unknown_tag_passes_through_unchanged() {
        let h = Hydrator::default();
        let raw = Structure::new(0x7A, vec![Value::Integer(1), Value::from("x")]);
        assert_eq!(
            h.hydrate(Value::Structure(raw.clone())).unwrap(),
            BoltValue::Structure(raw)
        );
    }

    #[test]
    fn temporal_tag_unknown_to_bolt1_passes_through() {
        let h = Hydrator::for_version(Version::V1);
        let raw = Structure::new(tag::DATE, vec![Value::Integer(19000)]);
        assert_eq!(
            h.hydrate(Value::Structure(raw.clone())).unwrap(),
            BoltValue::Structure(raw)
        );
    }

    #[test]
    fn hydrates_nested_in_containers() {
        let h = Hydrator::default();
        let value = Value::Dict(Dict::from([(
            "when".to_string(),
            Value::Structure(Structure::new(tag::DATE, vec![Value::Integer(19000)])),
        )]));
        assert_eq!(
            h.hydrate(value).unwrap(),
            BoltValue::Dict(BoltDict::from([(
                "when".to_string(),
                BoltValue::Date(BoltDate { days: 19000 })
            )]))
        );
    }

    #[test]
    fn hydrates_path() {
        let h = Hydrator::default();
        let rel = Value::Structure(Structure::new(
            tag::UNBOUND_RELATIONSHIP,
            vec![
                Value::Integer(9),
                Value::from("KNOWS"),
                Value::Dict(Dict::new()),
                Value::from("5:db:9"),
            ],
        ));
        let path = Value::Structure(Structure::new(
            tag::PATH,
            vec![
                Value::List(vec![node_v5(1, "a"), node_v5(2, "b")]),
                Value::List(vec![rel]),
                Value::List(vec![Value::Integer(1), Value::Integer(1)]),
            ],
        ));
        match h.hydrate(path).unwrap() {
            BoltValue::Path(p) => {
                assert_eq!(p.len(), 1);
                assert_eq!(p.start().map(|n| n.id), Some(1));
                assert_eq!(p.relationships[0].rel_type, "KNOWS");
            }
            other => panic!("expected path, got {other}"),
        }
    }

    #[test]
    fn path_with_bad_sequence_fails() {
        let h = Hydrator::default();
        let path = Value::Structure(Structure::new(
            tag::PATH,
            vec![
                Value::List(vec![node_v5(1, "a")]),
                Value::List(vec![]),
                Value::List(vec![Value::Integer(1), Value::Integer(0)]),
            ],
        ));
        assert!(matches!(h.hydrate(path), Err(BoltError::Protocol(_))));
    }

    #[test]
    fn path_with_huge_sequence_index_fails() {
        let h = Hydrator::default();
        let rel = Value::Structure(Structure::new(
            tag::UNBOUND_RELATIONSHIP,
            vec![
                Value::Integer(9),
                Value::from("KNOWS"),
                Value::Dict(Dict::new()),
                Value::from("5:db:9"),
            ],
        ));
        // Indices that wrap to a valid slot when truncated to 32 bits.
        for (rel_index, node_index) in [((1i64 << 32) + 1, 1), (1, (1i64 << 32) + 1), (i64::MIN, 1)] {
            let path = Value::Structure(Structure::new(
                tag::PATH,
                vec![
                    Value::List(vec![node_v5(1, "a"), node_v5(2, "b")]),
                    Value::List(vec![rel.clone()]),
                    Value::List(vec![Value::Integer(rel_index), Value::Integer(node_index)]),
                ],
            ));
            assert!(matches!(h.hydrate(path), Err(BoltError::Protocol(_))));
        }
    }

    #[test]
    fn hydrate_into_updates_same_node() {
        let h = Hydrator::default();
        let mut slot = h.hydrate(node_v5(42, "Alice")).unwrap();
        h.hydrate_into(node_v5(42, "Alicia"), &mut slot).unwrap();
        assert_eq!(
            slot.as_node().and_then(|n| n.properties.get("name")),
            Some(&BoltValue::from("Alicia"))
        );

        assert!(h.hydrate_into(node_v5(43, "Bob"), &mut slot).is_err());
    }

    #[test]
    fn hydrate_into_replaces_other_kinds() {
        let h = Hydrator::default();
        let mut slot = BoltValue::Null;
        h.hydrate_into(Value::Integer(7), &mut slot).unwrap();
        assert_eq!(slot, BoltValue::Integer(7));
    }

    #[test]
    fn point_with_wrong_coordinate_type_fails() {
        let h = Hydrator::default();
        let raw = Value::Structure(Structure::new(
            tag::POINT_2D,
            vec![Value::Integer(7203), Value::Integer(1), Value::Float(2.0)],
        ));
        assert!(matches!(h.hydrate(raw), Err(BoltError::Protocol(_))));
    }
}
