use thiserror::Error;

use crate::type_info::TypeName;

/// A member of a value could not be read during traversal.
///
/// This is a tooling failure, distinct from a content mismatch: it aborts
/// the comparison instead of being reported as a difference.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntrospectionError {
    /// The accessor of a field failed; `reason` is its own message.
    #[error("unable to read field '{field}' of {type_name}: {reason}")]
    UnreadableField {
        type_name: TypeName,
        field: String,
        reason: String,
    },
}

impl IntrospectionError {
    /// Create an unreadable-field error.
    pub fn unreadable(
        type_name: TypeName,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnreadableField {
            type_name,
            field: field.into(),
            reason: reason.into(),
        }
    }
}
