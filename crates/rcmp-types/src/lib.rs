//! Foundation types for the recursive comparison engine.
//!
//! Rust has no runtime reflection, so every value taking part in a
//! comparison is first turned into a [`Value`]: a cheap-to-clone dynamic
//! graph whose composite nodes carry reference identity. Domain types opt in
//! through the [`Walkable`] trait, usually via the [`walkable!`] macro.
//!
//! # Key Types
//!
//! - [`Value`] -- Dynamic value graph node (scalars, containers, objects)
//! - [`Object`] -- Structured value: runtime type plus named fields
//! - [`TypeName`] / [`TypeInfo`] -- Runtime type identity and supertypes
//! - [`FieldPath`] / [`Segment`] -- Location of a node relative to the root
//! - [`Walkable`] -- Conversion of domain values into [`Value`]
//! - [`IntrospectionError`] -- A member could not be read

pub mod error;
pub mod object;
pub mod path;
pub mod type_info;
pub mod value;
pub mod walkable;

pub use error::IntrospectionError;
pub use object::Object;
pub use path::{FieldPath, Segment};
pub use type_info::{TypeInfo, TypeName};
pub use value::{Atomic, Category, EnumValue, MapValue, Sequence, Value};
pub use walkable::Walkable;
