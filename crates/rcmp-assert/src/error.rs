use thiserror::Error;

use rcmp_types::Value;

use crate::report::ComparisonFailure;

/// Every way a recursive comparison assertion can fail.
#[derive(Debug, Error)]
pub enum AssertionError {
    /// Expected was null but actual was not.
    #[error("Expecting actual:\n  {actual}\nto be null")]
    ExpectedNull { actual: Value },

    /// Actual was null but expected was not.
    #[error("Expecting actual not to be null, expected:\n  {expected}")]
    ExpectedNonNull { expected: Value },

    /// The values were compared and at least one difference was found.
    #[error("{0}")]
    NotEqual(Box<ComparisonFailure>),

    /// The values were expected to differ but are recursively equal.
    #[error("Expecting actual:\n  {actual}\nnot to be equal to:\n  {other}\nwhen recursively comparing field by field")]
    UnexpectedlyEqual { actual: Value, other: Value },

    /// Actual is recursively equal to none of the given values.
    #[error("Expecting actual:\n  {actual}\nto be in:\n  {values}\nwhen recursively comparing field by field with this configuration:\n{configuration}")]
    NotIn {
        actual: Value,
        values: Value,
        configuration: String,
    },

    /// Actual is recursively equal to one of the values it should not be in.
    #[error("Expecting actual:\n  {actual}\nnot to be in:\n  {values}\nwhen recursively comparing field by field with this configuration:\n{configuration}")]
    UnexpectedlyIn {
        actual: Value,
        values: Value,
        configuration: String,
    },

    /// A membership assertion was given no values to look in.
    #[error("the values to look for actual in must not be empty")]
    NoValues,

    /// The comparison could not be carried out at all.
    #[error("recursive comparison aborted: {0}")]
    Comparison(#[from] rcmp_diff::DiffError),
}

impl AssertionError {
    /// The failure report when the values were compared and differ.
    pub fn failure(&self) -> Option<&ComparisonFailure> {
        match self {
            Self::NotEqual(failure) => Some(failure),
            _ => None,
        }
    }
}

pub type AssertResult<T> = Result<T, AssertionError>;
