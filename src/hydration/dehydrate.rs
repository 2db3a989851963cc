//! `BoltValue` → PackStream `Value`.

use super::{Hydrator, StructKind};
use crate::error::BoltError;
use crate::packstream::{Dict, Structure, Value};
use crate::types::{BoltDict, BoltNode, BoltUnboundRelationship, BoltValue};

impl Hydrator {
    /// Converts a value for sending under this hydrator's version.
    ///
    /// Fails with [`BoltError::Unsupported`] when the value needs a
    /// structure the version has no tag for, such as a date under Bolt 1.
    pub fn dehydrate(&self, value: &BoltValue) -> Result<Value, BoltError> {
        let ids = self.version.has_element_ids();
        Ok(match value {
            BoltValue::Null => Value::Null,
            BoltValue::Boolean(b) => Value::Boolean(*b),
            BoltValue::Integer(i) => Value::Integer(*i),
            BoltValue::Float(f) => Value::Float(*f),
            BoltValue::String(s) => Value::String(s.clone()),
            BoltValue::Bytes(b) => Value::Bytes(b.clone()),
            BoltValue::List(items) => Value::List(
                items
                    .iter()
                    .map(|v| self.dehydrate(v))
                    .collect::<Result<_, _>>()?,
            ),
            BoltValue::Dict(dict) => Value::Dict(self.dehydrate_dict(dict)?),
            BoltValue::Node(n) => self.structure(StructKind::Node, self.node_fields(n)?)?,
            BoltValue::Relationship(r) => {
                let mut fields = vec![
                    Value::Integer(r.id),
                    Value::Integer(r.start_node_id),
                    Value::Integer(r.end_node_id),
                    Value::String(r.rel_type.clone()),
                    Value::Dict(self.dehydrate_dict(&r.properties)?),
                ];
                if ids {
                    fields.extend([
                        Value::String(r.element_id.clone()),
                        Value::String(r.start_node_element_id.clone()),
                        Value::String(r.end_node_element_id.clone()),
                    ]);
                }
                self.structure(StructKind::Relationship, fields)?
            }
            BoltValue::UnboundRelationship(r) => {
                self.structure(StructKind::UnboundRelationship, self.unbound_fields(r)?)?
            }
            BoltValue::Path(p) => {
                let nodes = p
                    .nodes
                    .iter()
                    .map(|n| self.structure(StructKind::Node, self.node_fields(n)?))
                    .collect::<Result<_, _>>()?;
                let rels = p
                    .relationships
                    .iter()
                    .map(|r| self.structure(StructKind::UnboundRelationship, self.unbound_fields(r)?))
                    .collect::<Result<_, _>>()?;
                let sequence = p.sequence.iter().copied().map(Value::Integer).collect();
                self.structure(
                    StructKind::Path,
                    vec![Value::List(nodes), Value::List(rels), Value::List(sequence)],
                )?
            }
            BoltValue::Date(d) => self.structure(StructKind::Date, vec![Value::Integer(d.days)])?,
            BoltValue::Time(t) => self.structure(
                StructKind::Time,
                vec![
                    Value::Integer(t.nanoseconds),
                    Value::Integer(t.tz_offset_seconds),
                ],
            )?,
            BoltValue::LocalTime(t) => {
                self.structure(StructKind::LocalTime, vec![Value::Integer(t.nanoseconds)])?
            }
            BoltValue::DateTime(dt) => self.structure(
                StructKind::DateTime,
                vec![
                    Value::Integer(dt.seconds),
                    Value::Integer(dt.nanoseconds),
                    Value::Integer(dt.tz_offset_seconds),
                ],
            )?,
            BoltValue::DateTimeZoneId(dt) => self.structure(
                StructKind::DateTimeZoneId,
                vec![
                    Value::Integer(dt.seconds),
                    Value::Integer(dt.nanoseconds),
                    Value::String(dt.tz_id.clone()),
                ],
            )?,
            BoltValue::LocalDateTime(dt) => self.structure(
                StructKind::LocalDateTime,
                vec![Value::Integer(dt.seconds), Value::Integer(dt.nanoseconds)],
            )?,
            BoltValue::Duration(d) => self.structure(
                StructKind::Duration,
                vec![
                    Value::Integer(d.months),
                    Value::Integer(d.days),
                    Value::Integer(d.seconds),
                    Value::Integer(d.nanoseconds),
                ],
            )?,
            BoltValue::Point(p) => {
                let mut fields = vec![Value::Integer(p.srid), Value::Float(p.x), Value::Float(p.y)];
                let kind = match p.z {
                    Some(z) => {
                        fields.push(Value::Float(z));
                        StructKind::Point3D
                    }
                    None => StructKind::Point2D,
                };
                self.structure(kind, fields)?
            }
            BoltValue::Structure(s) => Value::Structure(s.clone()),
        })
    }

    /// Dehydrates every entry of a dict, e.g. query parameters.
    pub fn dehydrate_dict(&self, dict: &BoltDict) -> Result<Dict, BoltError> {
        dict.iter()
            .map(|(k, v)| Ok((k.clone(), self.dehydrate(v)?)))
            .collect()
    }

    fn structure(&self, kind: StructKind, fields: Vec<Value>) -> Result<Value, BoltError> {
        let tag = self.tag_of(kind).ok_or_else(|| {
            BoltError::Unsupported(format!("{kind} is not supported by Bolt {}", self.version))
        })?;
        Ok(Value::Structure(Structure::new(tag, fields)))
    }

    fn node_fields(&self, n: &BoltNode) -> Result<Vec<Value>, BoltError> {
        let mut fields = vec![
            Value::Integer(n.id),
            Value::List(n.labels.iter().cloned().map(Value::String).collect()),
            Value::Dict(self.dehydrate_dict(&n.properties)?),
        ];
        if self.version.has_element_ids() {
            fields.push(Value::String(n.element_id.clone()));
        }
        Ok(fields)
    }

    fn unbound_fields(&self, r: &BoltUnboundRelationship) -> Result<Vec<Value>, BoltError> {
        let mut fields = vec![
            Value::Integer(r.id),
            Value::String(r.rel_type.clone()),
            Value::Dict(self.dehydrate_dict(&r.properties)?),
        ];
        if self.version.has_element_ids() {
            fields.push(Value::String(r.element_id.clone()));
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BoltDate, BoltDateTime, BoltPoint, BoltRelationship, tag};
    use crate::version::Version;

    fn alice() -> BoltNode {
        BoltNode {
            id: 42,
            element_id: "4:db:42".into(),
            labels: vec!["Person".into()],
            properties: BoltDict::from([("name".to_string(), BoltValue::from("Alice"))]),
        }
    }

    #[test]
    fn date_under_bolt1_is_unsupported() {
        let h = Hydrator::for_version(Version::V1);
        let err = h
            .dehydrate(&BoltValue::Date(BoltDate { days: 1 }))
            .unwrap_err();
        assert!(matches!(err, BoltError::Unsupported(_)));
        assert_eq!(err.to_string(), "unsupported value: Date is not supported by Bolt 1.0");
    }

    #[test]
    fn node_fields_follow_version() {
        let node = BoltValue::Node(alice());

        let v5 = Hydrator::for_version(Version::V5_4).dehydrate(&node).unwrap();
        let v4 = Hydrator::for_version(Version::V4_4).dehydrate(&node).unwrap();
        match (v5, v4) {
            (Value::Structure(a), Value::Structure(b)) => {
                assert_eq!(a.tag, tag::NODE);
                assert_eq!(a.fields.len(), 4);
                assert_eq!(a.fields[3], Value::from("4:db:42"));
                assert_eq!(b.fields.len(), 3);
            }
            other => panic!("expected structures, got {other:?}"),
        }
    }

    #[test]
    fn datetime_tag_follows_version() {
        let dt = BoltValue::DateTime(BoltDateTime {
            seconds: 1_700_000_000,
            nanoseconds: 5,
            tz_offset_seconds: 3600,
        });
        let tag_for = |v| match Hydrator::for_version(v).dehydrate(&dt).unwrap() {
            Value::Structure(s) => s.tag,
            other => panic!("expected structure, got {other:?}"),
        };
        assert_eq!(tag_for(Version::V4_4), tag::LEGACY_DATE_TIME);
        assert_eq!(tag_for(Version::V5_0), tag::DATE_TIME);
    }

    #[test]
    fn point_dimension_picks_tag() {
        let h = Hydrator::default();
        let p3 = BoltValue::Point(BoltPoint {
            srid: 9157,
            x: 1.0,
            y: 2.0,
            z: Some(3.0),
        });
        match h.dehydrate(&p3).unwrap() {
            Value::Structure(s) => {
                assert_eq!(s.tag, tag::POINT_3D);
                assert_eq!(s.fields.len(), 4);
            }
            other => panic!("expected structure, got {other:?}"),
        }
    }

    #[test]
    fn round_trips_through_hydrate() {
        for version in [Version::V3, Version::V4_4, Version::V5_4] {
            let h = Hydrator::for_version(version);
            let mut node = alice();
            if !version.has_element_ids() {
                node.element_id = node.id.to_string();
            }
            let rel = BoltRelationship {
                id: 7,
                element_id: "7".into(),
                start_node_id: 42,
                start_node_element_id: "42".into(),
                end_node_id: 43,
                end_node_element_id: "43".into(),
                rel_type: "KNOWS".into(),
                properties: BoltDict::new(),
            };
            let original = BoltValue::List(vec![
                BoltValue::Node(node),
                BoltValue::Relationship(rel),
                BoltValue::Date(BoltDate { days: 19000 }),
            ]);
            let wire = h.dehydrate(&original).unwrap();
            assert_eq!(h.hydrate(wire).unwrap(), original, "Bolt {version}");
        }
    }

    #[test]
    fn raw_structure_passes_through() {
        let raw = Structure::new(0x7A, vec![Value::Integer(1)]);
        assert_eq!(
            Hydrator::default()
                .dehydrate(&BoltValue::Structure(raw.clone()))
                .unwrap(),
            Value::Structure(raw)
        );
    }
}
