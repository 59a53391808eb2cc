//! Error types for the diff crate.

use rcmp_types::IntrospectionError;

/// Errors that abort a comparison.
///
/// Content mismatches are never errors; they are returned as differences.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    /// A member of a compared value could not be read.
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    /// Fields to compare were given that the actual value does not have.
    #[error("the following compared fields do not exist on the actual value: {}", .0.join(", "))]
    UnknownComparedFields(Vec<String>),
}

/// Convenience alias for diff results.
pub type DiffResult<T> = Result<T, DiffError>;
