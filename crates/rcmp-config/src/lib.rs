//! Policy object for recursive comparisons.
//!
//! A [`RecursiveComparisonConfiguration`] is built with consuming fluent
//! setters, then read by the difference calculator at every visited node.
//! The plain-data part of a configuration can also be loaded from JSON or
//! TOML through [`ComparisonSettings`].
//!
//! # Key Types
//!
//! - [`RecursiveComparisonConfiguration`] -- Field selection, exclusions, comparators, order and null policies
//! - [`LeafRule`] -- A registered predicate or comparator applied instead of recursing
//! - [`FieldPattern`] -- Whole-string regex matched against rule paths or type names
//! - [`ComparisonSettings`] -- Serializable subset of the configuration

pub mod config;
mod describe;
pub mod error;
pub mod pattern;
pub mod rules;
pub mod settings;

pub use config::RecursiveComparisonConfiguration;
pub use error::{ConfigError, ConfigResult};
pub use pattern::FieldPattern;
pub use rules::{CompareFn, EqualsFn, LeafRule};
pub use settings::ComparisonSettings;
