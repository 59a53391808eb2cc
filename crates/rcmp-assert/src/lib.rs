//! Recursive comparison assertions.
//!
//! Entry point for test code: wrap an actual value with
//! [`using_recursive_comparison`], adjust the comparison through fluent
//! setters, then call [`ComparisonAssert::is_equal_to`] or
//! [`ComparisonAssert::is_not_equal_to`]. A failing assertion returns one
//! [`AssertionError`] carrying every difference found.
//!
//! ```
//! use rcmp_assert::{using_recursive_comparison, walkable};
//!
//! struct Person { name: String, height: f64 }
//! walkable!(Person { name, height });
//!
//! let actual = Person { name: "Sherlock".into(), height: 1.80 };
//! let expected = Person { name: "Sherlock".into(), height: 1.90 };
//!
//! assert!(using_recursive_comparison(&actual).is_equal_to(&expected).is_err());
//! assert!(using_recursive_comparison(&actual)
//!     .ignoring_fields(["height"])
//!     .is_equal_to(&expected)
//!     .is_ok());
//! ```
//!
//! # Key Types
//!
//! - [`ComparisonAssert`] -- Actual value plus the configuration to compare it with
//! - [`ComparisonFailure`] -- Aggregated report of a failed equality assertion
//! - [`AssertionError`] -- Every way an assertion can fail

pub mod assert;
pub mod error;
pub mod report;

pub use assert::{using_recursive_comparison, ComparisonAssert};
pub use error::{AssertResult, AssertionError};
pub use report::ComparisonFailure;

// Re-export key types
pub use rcmp_config::{ComparisonSettings, ConfigError, RecursiveComparisonConfiguration};
pub use rcmp_diff::{ComparisonDifference, DiffError};
pub use rcmp_types::{walkable, FieldPath, Object, TypeInfo, TypeName, Value, Walkable};
