//! Conversion of domain values into the dynamic [`Value`] graph.
//!
//! `Option<T>` is the nullable reference: `None` becomes [`Value::Null`].
//! Optional-like wrappers that must stay distinct from null are built
//! explicitly with [`Value::optional`].

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt::Display;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use crate::type_info::TypeName;
use crate::value::{MapValue, Sequence, Value};

/// The capability of being compared recursively.
pub trait Walkable {
    fn to_value(&self) -> Value;
}

impl Walkable for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Walkable for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Walkable for char {
    fn to_value(&self) -> Value {
        Value::Char(*self)
    }
}

impl Walkable for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl Walkable for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

macro_rules! walkable_signed {
    ($($t:ty),*) => {
        $(impl Walkable for $t {
            fn to_value(&self) -> Value {
                Value::Int(i64::from(*self))
            }
        })*
    };
}

macro_rules! walkable_unsigned {
    ($($t:ty),*) => {
        $(impl Walkable for $t {
            fn to_value(&self) -> Value {
                Value::UInt(u64::from(*self))
            }
        })*
    };
}

walkable_signed!(i8, i16, i32, i64);
walkable_unsigned!(u8, u16, u32, u64);

impl Walkable for isize {
    fn to_value(&self) -> Value {
        Value::Int(*self as i64)
    }
}

impl Walkable for usize {
    fn to_value(&self) -> Value {
        Value::UInt(*self as u64)
    }
}

impl Walkable for f32 {
    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }
}

impl Walkable for f64 {
    fn to_value(&self) -> Value {
        Value::Float(*self)
    }
}

impl Walkable for Duration {
    fn to_value(&self) -> Value {
        Value::atomic(*self)
    }
}

impl<T: Walkable + ?Sized> Walkable for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Walkable + ?Sized> Walkable for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Walkable + ?Sized> Walkable for Rc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Walkable + ?Sized> Walkable for Arc<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Walkable> Walkable for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

fn ordered<'a, T: Walkable + 'a>(
    type_name: TypeName,
    items: impl IntoIterator<Item = &'a T>,
) -> Value {
    let items = items.into_iter().map(Walkable::to_value).collect();
    Value::Seq(Rc::new(Sequence::ordered(type_name, items)))
}

fn unordered<'a, T: Walkable + 'a>(
    type_name: TypeName,
    items: impl IntoIterator<Item = &'a T>,
) -> Value {
    let items = items.into_iter().map(Walkable::to_value).collect();
    Value::Seq(Rc::new(Sequence::unordered(type_name, items)))
}

fn keyed<'a, K: Display + 'a, V: Walkable + 'a>(
    type_name: TypeName,
    entries: impl IntoIterator<Item = (&'a K, &'a V)>,
) -> Value {
    let entries: BTreeMap<String, Value> = entries
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_value()))
        .collect();
    Value::Map(Rc::new(MapValue::new(type_name, entries)))
}

impl<T: Walkable> Walkable for [T] {
    fn to_value(&self) -> Value {
        ordered(TypeName::of::<Self>(), self)
    }
}

impl<T: Walkable, const N: usize> Walkable for [T; N] {
    fn to_value(&self) -> Value {
        ordered(TypeName::of::<Self>(), self)
    }
}

impl<T: Walkable> Walkable for Vec<T> {
    fn to_value(&self) -> Value {
        ordered(TypeName::of::<Self>(), self)
    }
}

impl<T: Walkable> Walkable for VecDeque<T> {
    fn to_value(&self) -> Value {
        ordered(TypeName::of::<Self>(), self)
    }
}

impl<T: Walkable, S> Walkable for HashSet<T, S> {
    fn to_value(&self) -> Value {
        unordered(TypeName::of::<HashSet<T>>(), self)
    }
}

// Sorted sets keep their iteration order but element positions carry no
// meaning, so they compare as unordered collections.
impl<T: Walkable> Walkable for BTreeSet<T> {
    fn to_value(&self) -> Value {
        unordered(TypeName::of::<Self>(), self)
    }
}

impl<K: Display, V: Walkable, S> Walkable for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        keyed(TypeName::of::<HashMap<K, V>>(), self)
    }
}

impl<K: Display, V: Walkable> Walkable for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        keyed(TypeName::of::<Self>(), self)
    }
}

impl Walkable for serde_json::Value {
    fn to_value(&self) -> Value {
        use serde_json::Value as Json;
        match self {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Json::String(s) => Value::Str(s.clone()),
            Json::Array(items) => ordered(TypeName::new("JsonArray"), items),
            Json::Object(map) => keyed(TypeName::new("JsonObject"), map),
        }
    }
}

/// Implement [`Walkable`] for a plain struct from its field list.
///
/// ```
/// use rcmp_types::{walkable, Walkable};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Person { name: String, height: f64 }
/// walkable!(Person { name, height });
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Employee { name: String, height: f64, salary: u32 }
/// // Employee is a subtype of Person for strict type checking.
/// walkable!(Employee: Person { name, height, salary });
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Money { cents: i64 }
/// // Money exposes its PartialEq as its own equality.
/// walkable!(Money { cents } eq);
///
/// let value = Person { name: "Sherlock".into(), height: 1.80 }.to_value();
/// assert_eq!(value.to_string(), "Person(name=\"Sherlock\", height=1.8)");
/// ```
#[macro_export]
macro_rules! walkable {
    (@object $self:ident, $ty:ty $(: $($sup:ty),+)? { $($field:ident),* }) => {
        $crate::Object::new(
            $crate::TypeInfo::of::<$ty>()
                $($(.extending($crate::TypeName::of::<$sup>()))+)?
        )
        $(.with_field(stringify!($field), $crate::Walkable::to_value(&$self.$field)))*
    };
    ($ty:ty $(: $($sup:ty),+)? { $($field:ident),* $(,)? } eq) => {
        impl $crate::Walkable for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::walkable!(@object self, $ty $(: $($sup),+)? { $($field),* })
                    .with_own_equality(::std::clone::Clone::clone(self))
                    .into_value()
            }
        }
    };
    ($ty:ty $(: $($sup:ty),+)? { $($field:ident),* $(,)? }) => {
        impl $crate::Walkable for $ty {
            fn to_value(&self) -> $crate::Value {
                $crate::walkable!(@object self, $ty $(: $($sup),+)? { $($field),* })
                    .into_value()
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Category;
    use serde_json::json;

    #[derive(Clone, Debug, PartialEq)]
    struct Address {
        street: String,
    }
    walkable!(Address { street });

    #[derive(Clone, Debug, PartialEq)]
    struct Person {
        name: String,
        address: Option<Address>,
        tags: Vec<String>,
    }
    walkable!(Person { name, address, tags });

    #[derive(Clone, Debug, PartialEq)]
    struct Employee {
        name: String,
    }
    walkable!(Employee: Person { name });

    #[derive(Clone, Debug, PartialEq)]
    struct Money {
        cents: i64,
    }
    walkable!(Money { cents } eq);

    #[test]
    fn macro_builds_objects_with_declared_fields() {
        let person = Person {
            name: "Sherlock".into(),
            address: Some(Address {
                street: "Baker Street".into(),
            }),
            tags: vec!["detective".into()],
        };
        let value = person.to_value();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.field_names(), vec!["name", "address", "tags"]);
        assert_eq!(obj.type_info().name.short(), "Person");
        let address = obj.read("address").unwrap().unwrap();
        assert_eq!(address.category(), Category::Object);
    }

    #[test]
    fn none_becomes_null() {
        let person = Person {
            name: "Moriarty".into(),
            address: None,
            tags: Vec::new(),
        };
        let value = person.to_value();
        let address = value.as_object().unwrap().read("address").unwrap().unwrap();
        assert!(address.is_null());
    }

    #[test]
    fn supertypes_are_recorded() {
        let value = Employee { name: "Lestrade".into() }.to_value();
        let info = value.as_object().unwrap().type_info().clone();
        assert!(info.is_same_or_subtype_of(&TypeName::of::<Person>()));
    }

    #[test]
    fn eq_flag_attaches_own_equality() {
        let a = Money { cents: 5 }.to_value();
        let b = Money { cents: 5 }.to_value();
        let a = a.as_object().unwrap();
        assert!(a.has_own_equality());
        assert_eq!(a.own_eq(b.as_object().unwrap()), Some(true));
    }

    #[test]
    fn collections_keep_their_order_semantics() {
        let list = vec![1, 2, 3].to_value();
        assert!(list.as_seq().unwrap().is_ordered());

        let set: HashSet<i32> = [1, 2, 3].into_iter().collect();
        assert!(!set.to_value().as_seq().unwrap().is_ordered());

        let map: HashMap<&str, i32> = [("a", 1)].into_iter().collect();
        let map = map.to_value();
        assert_eq!(map.as_map().unwrap().get("a").and_then(Value::as_i64), Some(1));
    }

    #[test]
    fn json_documents_become_maps_and_lists() {
        let doc = json!({"name": "Sherlock", "height": 1.8, "friends": ["Watson"], "age": null});
        let value = doc.to_value();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 4);
        assert!(map.get("age").unwrap().is_null());
        assert_eq!(map.get("height").and_then(Value::as_f64), Some(1.8));
        assert_eq!(map.get("friends").unwrap().category(), Category::Sequence);
    }

    #[test]
    fn durations_are_atomic() {
        let value = Duration::from_millis(10).to_value();
        assert!(value.leaf_eq(&Duration::from_millis(10).to_value()));
    }
}
