//! The dynamic value graph compared by the engine.
//!
//! [`Value`] is a cheap-to-clone handle. Composite nodes (sequences, maps,
//! objects) and atomic platform values live behind `Rc`, which gives them a
//! reference identity used for the identity fast path and cycle detection.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::object::Object;
use crate::type_info::TypeName;

/// Composite values nested deeper than this render as `...`.
pub const MAX_RENDER_DEPTH: usize = 32;

/// Drops values one composite at a time, so that dropping a deeply nested
/// graph does not use one stack frame per level. Nodes still shared
/// elsewhere are left alone.
pub(crate) fn release(mut pending: Vec<Value>) {
    while let Some(value) = pending.pop() {
        match value {
            Value::Optional(Some(inner)) => pending.push(*inner),
            Value::Seq(seq) => {
                if let Ok(mut seq) = Rc::try_unwrap(seq) {
                    pending.append(&mut seq.items);
                }
            }
            Value::Map(map) => {
                if let Ok(mut map) = Rc::try_unwrap(map) {
                    pending.extend(std::mem::take(&mut map.entries).into_values());
                }
            }
            Value::Object(obj) => {
                if let Ok(mut obj) = Rc::try_unwrap(obj) {
                    pending.extend(obj.take_stored_values());
                }
            }
            _ => {}
        }
    }
}

/// An opaque leaf compared with its own equality (durations, timestamps,
/// identifiers, ...).
///
/// Implemented for every `PartialEq + Debug + 'static` type; two atomic
/// values of different Rust types are never equal.
pub trait Atomic: fmt::Debug {
    /// Runtime type of the wrapped value.
    fn atomic_type(&self) -> TypeName;

    /// Upcast for downcasting in [`Atomic::atomic_eq`].
    fn as_any(&self) -> &dyn Any;

    /// Equality against another atomic value of any type.
    fn atomic_eq(&self, other: &dyn Atomic) -> bool;
}

impl<T: PartialEq + fmt::Debug + 'static> Atomic for T {
    fn atomic_type(&self) -> TypeName {
        TypeName::of::<T>()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn atomic_eq(&self, other: &dyn Atomic) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }
}

/// A unit enum variant, compared by variant name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumValue {
    /// The enum type.
    pub type_name: TypeName,
    /// The variant name.
    pub variant: String,
}

/// An ordered sequence or an unordered collection.
#[derive(Debug)]
pub struct Sequence {
    type_name: TypeName,
    ordered: bool,
    items: Vec<Value>,
}

impl Sequence {
    /// An ordered sequence (`Vec`, slice, array, deque).
    pub fn ordered(type_name: impl Into<TypeName>, items: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            ordered: true,
            items,
        }
    }

    /// An unordered collection (`HashSet`, bag).
    pub fn unordered(type_name: impl Into<TypeName>, items: Vec<Value>) -> Self {
        Self {
            type_name: type_name.into(),
            ordered: false,
            items,
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    /// Returns `true` if element positions are significant.
    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Drop for Sequence {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            release(std::mem::take(&mut self.items));
        }
    }
}

/// A key-value container with string keys, iterated in key order.
#[derive(Debug)]
pub struct MapValue {
    type_name: TypeName,
    entries: BTreeMap<String, Value>,
}

impl MapValue {
    pub fn new(type_name: impl Into<TypeName>, entries: BTreeMap<String, Value>) -> Self {
        Self {
            type_name: type_name.into(),
            entries,
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.type_name
    }

    pub fn entries(&self) -> &BTreeMap<String, Value> {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for MapValue {
    fn drop(&mut self) {
        if !self.entries.is_empty() {
            release(std::mem::take(&mut self.entries).into_values().collect());
        }
    }
}

/// Coarse shape of a value. Values of different categories are never
/// compared structurally.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Category {
    Null,
    Leaf,
    Optional,
    Sequence,
    Map,
    Object,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Null => "null",
            Self::Leaf => "a leaf value",
            Self::Optional => "an optional",
            Self::Sequence => "a collection",
            Self::Map => "a map",
            Self::Object => "an object",
        };
        f.write_str(text)
    }
}

/// A node of a compared value graph.
#[derive(Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Char(char),
    Str(String),
    Enum(EnumValue),
    Atomic(Rc<dyn Atomic>),
    /// Optional-like wrapper, distinct from `Null`.
    Optional(Option<Box<Value>>),
    Seq(Rc<Sequence>),
    Map(Rc<MapValue>),
    Object(Rc<Object>),
}

impl Value {
    /// A string value.
    pub fn str(text: impl Into<String>) -> Self {
        Self::Str(text.into())
    }

    /// An atomic value compared with its own `PartialEq`.
    pub fn atomic<T: PartialEq + fmt::Debug + 'static>(value: T) -> Self {
        Self::Atomic(Rc::new(value))
    }

    /// An optional-like wrapper.
    pub fn optional(inner: Option<Value>) -> Self {
        Self::Optional(inner.map(Box::new))
    }

    /// An ordered list.
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Seq(Rc::new(Sequence::ordered(
            "List",
            items.into_iter().collect(),
        )))
    }

    /// An unordered collection.
    pub fn set(items: impl IntoIterator<Item = Value>) -> Self {
        Self::Seq(Rc::new(Sequence::unordered(
            "Set",
            items.into_iter().collect(),
        )))
    }

    /// A string-keyed map.
    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        let entries = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self::Map(Rc::new(MapValue::new("Map", entries)))
    }

    /// A unit enum variant.
    pub fn enum_variant(type_name: impl Into<TypeName>, variant: impl Into<String>) -> Self {
        Self::Enum(EnumValue {
            type_name: type_name.into(),
            variant: variant.into(),
        })
    }

    /// Wrap an object.
    pub fn object(object: Object) -> Self {
        Self::Object(Rc::new(object))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for an optional-like wrapper holding nothing.
    pub fn is_empty_optional(&self) -> bool {
        matches!(self, Self::Optional(None))
    }

    pub fn category(&self) -> Category {
        match self {
            Self::Null => Category::Null,
            Self::Bool(_)
            | Self::Int(_)
            | Self::UInt(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::Str(_)
            | Self::Enum(_)
            | Self::Atomic(_) => Category::Leaf,
            Self::Optional(_) => Category::Optional,
            Self::Seq(_) => Category::Sequence,
            Self::Map(_) => Category::Map,
            Self::Object(_) => Category::Object,
        }
    }

    /// Runtime type name, `None` for `Null`.
    pub fn type_name(&self) -> Option<TypeName> {
        let name = match self {
            Self::Null => return None,
            Self::Bool(_) => TypeName::new("bool"),
            Self::Int(_) => TypeName::new("i64"),
            Self::UInt(_) => TypeName::new("u64"),
            Self::Float(_) => TypeName::new("f64"),
            Self::Char(_) => TypeName::new("char"),
            Self::Str(_) => TypeName::of::<String>(),
            Self::Enum(e) => e.type_name.clone(),
            Self::Atomic(a) => a.atomic_type(),
            Self::Optional(_) => TypeName::new("Optional"),
            Self::Seq(seq) => seq.type_name.clone(),
            Self::Map(map) => map.type_name.clone(),
            Self::Object(obj) => obj.type_info().name.clone(),
        };
        Some(name)
    }

    /// Short type description for messages (`null` for `Null`).
    pub fn type_description(&self) -> String {
        self.type_name()
            .map(|name| name.short().to_string())
            .unwrap_or_else(|| "null".to_string())
    }

    /// Reference identity of shared nodes; scalars have none.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Self::Atomic(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            Self::Seq(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            Self::Map(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            Self::Object(rc) => Some(Rc::as_ptr(rc) as *const () as usize),
            _ => None,
        }
    }

    /// Returns `true` if both handles point at the same node, or both are
    /// `Null`.
    pub fn same_ref(a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Self::Null, Self::Null) => true,
            _ => matches!((a.identity(), b.identity()), (Some(x), Some(y)) if x == y),
        }
    }

    /// Native equality of leaf values.
    ///
    /// Signed and unsigned integers compare numerically, NaN equals NaN, and
    /// atomic values defer to their own `PartialEq`. Values of any other
    /// category are never leaf-equal.
    pub fn leaf_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Int(a), Self::UInt(b)) | (Self::UInt(b), Self::Int(a)) => {
                u64::try_from(*a).is_ok_and(|a| a == *b)
            }
            (Self::Float(a), Self::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Atomic(a), Self::Atomic(b)) => a.atomic_eq(&**b),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::UInt(u) => i64::try_from(*u).ok(),
            _ => None,
        }
    }

    /// Numeric view of any number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::UInt(u) => Some(*u as f64),
            Self::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Rc<Object>> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&Rc<Sequence>> {
        match self {
            Self::Seq(seq) => Some(seq),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Rc<MapValue>> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Renders `self`, cutting composites nested deeper than
    /// [`MAX_RENDER_DEPTH`] and objects already being rendered.
    fn render(&self, f: &mut fmt::Formatter<'_>, active: &mut Vec<usize>, depth: usize) -> fmt::Result {
        let composite = matches!(
            self,
            Self::Optional(Some(_)) | Self::Seq(_) | Self::Map(_) | Self::Object(_)
        );
        if composite && depth >= MAX_RENDER_DEPTH {
            return f.write_str("...");
        }
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::UInt(u) => write!(f, "{u}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Char(c) => write!(f, "'{c}'"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Enum(e) => write!(f, "{}::{}", e.type_name.short(), e.variant),
            Self::Atomic(a) => write!(f, "{a:?}"),
            Self::Optional(None) => f.write_str("Optional.empty"),
            Self::Optional(Some(inner)) => {
                f.write_str("Optional[")?;
                inner.render(f, active, depth + 1)?;
                f.write_str("]")
            }
            Self::Seq(seq) => {
                let (open, close) = if seq.ordered { ("[", "]") } else { ("{", "}") };
                f.write_str(open)?;
                for (i, item) in seq.items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.render(f, active, depth + 1)?;
                }
                f.write_str(close)
            }
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}=")?;
                    value.render(f, active, depth + 1)?;
                }
                f.write_str("}")
            }
            Self::Object(obj) => {
                let id = Rc::as_ptr(obj) as *const () as usize;
                if active.contains(&id) {
                    return f.write_str("(cycle)");
                }
                active.push(id);
                write!(f, "{}(", obj.type_info().name.short())?;
                for (i, name) in obj.field_names().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}=")?;
                    match obj.read(name) {
                        Ok(Some(value)) => value.render(f, active, depth + 1)?,
                        Ok(None) => f.write_str("?")?,
                        Err(_) => f.write_str("<unreadable>")?,
                    }
                }
                active.pop();
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, &mut Vec::new(), 0)
    }
}

// Derived Debug would recurse forever on cyclic graphs.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_info::TypeInfo;
    use std::time::Duration;

    #[test]
    fn integers_compare_numerically_across_signedness() {
        assert!(Value::Int(3).leaf_eq(&Value::UInt(3)));
        assert!(Value::UInt(3).leaf_eq(&Value::Int(3)));
        assert!(!Value::Int(-1).leaf_eq(&Value::UInt(u64::MAX)));
    }

    #[test]
    fn floats_are_not_equal_to_integers() {
        assert!(!Value::Float(1.0).leaf_eq(&Value::Int(1)));
    }

    #[test]
    fn nan_equals_nan() {
        assert!(Value::Float(f64::NAN).leaf_eq(&Value::Float(f64::NAN)));
    }

    #[test]
    fn atomic_values_use_their_own_equality() {
        let a = Value::atomic(Duration::from_secs(5));
        let b = Value::atomic(Duration::from_secs(5));
        let c = Value::atomic(Duration::from_secs(6));
        assert!(a.leaf_eq(&b));
        assert!(!a.leaf_eq(&c));
    }

    #[test]
    fn atomic_values_of_different_types_differ() {
        let a = Value::atomic(5u8);
        let b = Value::atomic(5u16);
        assert!(!a.leaf_eq(&b));
        assert_ne!(a.type_name(), b.type_name());
    }

    #[test]
    fn identity_is_shared_by_clones_only() {
        let list = Value::list([Value::Int(1)]);
        let clone = list.clone();
        let other = Value::list([Value::Int(1)]);
        assert!(Value::same_ref(&list, &clone));
        assert!(!Value::same_ref(&list, &other));
        assert!(Value::same_ref(&Value::Null, &Value::Null));
        assert!(!Value::same_ref(&Value::Int(1), &Value::Int(1)));
    }

    #[test]
    fn categories() {
        assert_eq!(Value::Null.category(), Category::Null);
        assert_eq!(Value::str("x").category(), Category::Leaf);
        assert_eq!(Value::optional(None).category(), Category::Optional);
        assert_eq!(Value::set([]).category(), Category::Sequence);
        assert_eq!(Value::map::<&str>([]).category(), Category::Map);
    }

    #[test]
    fn display_renders_nested_values() {
        let value = Value::map([
            ("names", Value::list([Value::str("a"), Value::str("b")])),
            ("maybe", Value::optional(Some(Value::Int(1)))),
        ]);
        assert_eq!(value.to_string(), r#"{maybe=Optional[1], names=["a", "b"]}"#);
    }

    #[test]
    fn display_cuts_deep_nesting() {
        let mut value = Value::Int(7);
        for _ in 0..MAX_RENDER_DEPTH {
            value = Value::list([value]);
        }
        let rendered = value.to_string();
        assert!(rendered.contains("[7]"));
        assert!(!rendered.contains("..."));

        let deeper = Value::optional(Some(value)).to_string();
        assert!(deeper.starts_with("Optional[[["));
        assert!(deeper.contains("[...]"));
        assert!(!deeper.contains('7'));
    }

    #[test]
    fn very_deep_graphs_render_and_drop() {
        let mut value = Value::Int(0);
        for i in 0..100_000 {
            value = match i % 3 {
                0 => Value::list([value]),
                1 => Value::map([("next", value)]),
                _ => Object::new(TypeInfo::new("Link")).with_field("next", value).into_value(),
            };
        }
        assert!(value.to_string().contains("..."));
        drop(value);
    }

    #[test]
    fn dropping_a_shared_node_keeps_other_owners_intact() {
        let shared = Value::list([Value::str("kept")]);
        let outer = Value::list([shared.clone(), Value::map([("again", shared.clone())])]);
        drop(outer);
        assert_eq!(shared.to_string(), r#"["kept"]"#);
    }

    #[test]
    fn display_stops_at_cycles() {
        let node = Rc::new(Object::new(TypeInfo::new("Node")).with_field("id", Value::Int(1)));
        node.set("next", Value::Object(node.clone()));
        let rendered = Value::Object(node).to_string();
        assert_eq!(rendered, "Node(id=1, next=(cycle))");
    }
}
