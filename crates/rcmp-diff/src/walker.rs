//! Enumeration of the comparable members of a value.

use rcmp_types::{IntrospectionError, Segment, Value};

/// Name used for the content of an optional wrapper.
pub const OPTIONAL_VALUE_FIELD: &str = "value";

/// A child of a value together with the segment leading to it.
#[derive(Clone, Debug)]
pub struct Member {
    pub segment: Segment,
    pub value: Value,
}

/// The members of `value` in traversal order: object fields in declaration
/// order, collection elements by index, map entries by key, and the content
/// of a non-empty optional. Other values have no members.
pub fn members(value: &Value) -> Result<Vec<Member>, IntrospectionError> {
    let members = match value {
        Value::Object(obj) => obj
            .read_all()?
            .into_iter()
            .map(|(name, value)| Member {
                segment: Segment::Field(name),
                value,
            })
            .collect(),
        Value::Seq(seq) => seq
            .items()
            .iter()
            .enumerate()
            .map(|(i, value)| Member {
                segment: Segment::Index(i),
                value: value.clone(),
            })
            .collect(),
        Value::Map(map) => map
            .entries()
            .iter()
            .map(|(key, value)| Member {
                segment: Segment::Key(key.clone()),
                value: value.clone(),
            })
            .collect(),
        Value::Optional(Some(inner)) => vec![Member {
            segment: Segment::Field(OPTIONAL_VALUE_FIELD.to_string()),
            value: (**inner).clone(),
        }],
        _ => Vec::new(),
    };
    Ok(members)
}

/// The member of `value` reached through `segment`, if any.
pub fn member(value: &Value, segment: &Segment) -> Result<Option<Value>, IntrospectionError> {
    let found = match (value, segment) {
        (Value::Object(obj), Segment::Field(name)) => obj.read(name)?,
        (Value::Seq(seq), Segment::Index(i)) => seq.items().get(*i).cloned(),
        (Value::Map(map), Segment::Key(key)) => map.get(key).cloned(),
        (Value::Optional(Some(inner)), Segment::Field(name)) if name == OPTIONAL_VALUE_FIELD => {
            Some((**inner).clone())
        }
        _ => None,
    };
    Ok(found)
}
