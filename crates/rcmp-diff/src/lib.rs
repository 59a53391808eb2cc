//! Difference calculator for recursive comparisons.
//!
//! Walks an actual and an expected [`Value`](rcmp_types::Value) graph side
//! by side, applying a [`RecursiveComparisonConfiguration`] at every node,
//! and collects every discrepancy as a path-addressed
//! [`ComparisonDifference`].
//!
//! # Key Types
//!
//! - [`DifferenceCalculator`] / [`determine_differences`] -- The traversal itself
//! - [`ComparisonDifference`] / [`CustomMessage`] -- One discrepancy and its rendering
//! - [`CycleGuard`] -- Identity pairs on the active descent path
//! - [`Member`] -- A child reached by the field walker
//!
//! [`RecursiveComparisonConfiguration`]: rcmp_config::RecursiveComparisonConfiguration

pub mod calculator;
pub mod cycle;
pub mod difference;
pub mod error;
pub mod walker;

pub use calculator::{determine_differences, DifferenceCalculator};
pub use cycle::{CycleGuard, Entry};
pub use difference::{ComparisonDifference, CustomMessage};
pub use error::{DiffError, DiffResult};
pub use walker::Member;
