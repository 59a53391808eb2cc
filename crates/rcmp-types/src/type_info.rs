use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime type identifier of a compared value.
///
/// Values built through [`Walkable`](crate::Walkable) use the fully
/// qualified Rust type name (`std::any::type_name`). Scalars use the names
/// of their canonical representation: `bool`, `i64`, `u64`, `f64`, `char`
/// and `String`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeName(String);

impl TypeName {
    /// Create a type name from a string.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The type name of `T` as reported by `std::any::type_name`.
    pub fn of<T: ?Sized>() -> Self {
        Self(std::any::type_name::<T>().to_string())
    }

    /// The full name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last path component, without module prefix or generic arguments
    /// (`alloc::vec::Vec<i32>` becomes `Vec`).
    pub fn short(&self) -> &str {
        let base = self.0.split('<').next().unwrap_or(&self.0);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl fmt::Debug for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeName({})", self.0)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TypeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for TypeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Runtime type of a structured value together with its ancestors.
///
/// Supertypes are listed nearest first. They are only consulted by strict
/// type checking, which accepts an expected value whose type is the actual
/// value's type or one of its subtypes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeInfo {
    /// The concrete runtime type.
    pub name: TypeName,
    /// Ancestor types, nearest first.
    pub supertypes: Vec<TypeName>,
}

impl TypeInfo {
    /// A type without declared ancestors.
    pub fn new(name: impl Into<TypeName>) -> Self {
        Self {
            name: name.into(),
            supertypes: Vec::new(),
        }
    }

    /// Type info for the Rust type `T`.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(TypeName::of::<T>())
    }

    /// Declare an ancestor type.
    pub fn extending(mut self, supertype: impl Into<TypeName>) -> Self {
        self.supertypes.push(supertype.into());
        self
    }

    /// Returns `true` if this type is `other` or declares it as an ancestor.
    pub fn is_same_or_subtype_of(&self, other: &TypeName) -> bool {
        self.name == *other || self.supertypes.contains(other)
    }
}
