use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use rcmp_types::Value;

/// Custom equality predicate: `true` if actual and expected are equal.
pub type EqualsFn = Arc<dyn Fn(&Value, &Value) -> bool + Send + Sync>;

/// Custom comparator: values are equal when it returns [`Ordering::Equal`].
pub type CompareFn = Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>;

/// A registered leaf comparison, applied to a node instead of recursing
/// into its members.
#[derive(Clone)]
pub enum LeafRule {
    Equals(EqualsFn),
    Comparator(CompareFn),
}

impl LeafRule {
    /// Apply the rule to an `(actual, expected)` pair.
    pub fn apply(&self, actual: &Value, expected: &Value) -> bool {
        match self {
            Self::Equals(f) => f(actual, expected),
            Self::Comparator(f) => f(actual, expected) == Ordering::Equal,
        }
    }

    /// Short label used in difference descriptions.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Equals(_) => "equals predicate",
            Self::Comparator(_) => "comparator",
        }
    }
}

impl fmt::Debug for LeafRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafRule({})", self.kind())
    }
}
