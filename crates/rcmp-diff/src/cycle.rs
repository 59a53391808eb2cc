//! Cycle detection on the active descent path.
//!
//! Pairs are keyed by reference identity, never by structural equality:
//! two distinct but equal objects are not a cycle.

use std::collections::HashSet;

use rcmp_types::Value;

/// Outcome of [`CycleGuard::enter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Entry {
    /// The pair was recorded and must be released with [`CycleGuard::exit`].
    Tracked,
    /// At least one side has no identity (scalars, null); nothing recorded.
    Untracked,
    /// The pair is already being compared further up the path.
    Cycle,
}

/// Identity pairs `(actual, expected)` currently being compared.
///
/// Scoped to one top-level comparison; nested comparisons used for
/// unordered matching share the guard of their caller.
#[derive(Debug, Default)]
pub struct CycleGuard {
    active: HashSet<(usize, usize)>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(actual: &Value, expected: &Value) -> Option<(usize, usize)> {
        Some((actual.identity()?, expected.identity()?))
    }

    /// Record the pair as active unless it already is.
    pub fn enter(&mut self, actual: &Value, expected: &Value) -> Entry {
        match Self::key(actual, expected) {
            None => Entry::Untracked,
            Some(key) if self.active.insert(key) => Entry::Tracked,
            Some(_) => Entry::Cycle,
        }
    }

    /// Release a pair recorded by [`enter`](Self::enter).
    pub fn exit(&mut self, actual: &Value, expected: &Value) {
        if let Some(key) = Self::key(actual, expected) {
            self.active.remove(&key);
        }
    }

    /// Number of active pairs.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reentering_an_active_pair_is_a_cycle() {
        let a = Value::list([Value::Int(1)]);
        let b = Value::list([Value::Int(1)]);
        let mut guard = CycleGuard::new();

        assert_eq!(guard.enter(&a, &b), Entry::Tracked);
        assert_eq!(guard.enter(&a, &b), Entry::Cycle);
        assert_eq!(guard.depth(), 1);

        guard.exit(&a, &b);
        assert!(guard.is_empty());
        assert_eq!(guard.enter(&a, &b), Entry::Tracked);
    }

    #[test]
    fn equal_but_distinct_values_are_not_a_cycle() {
        let a = Value::list([Value::Int(1)]);
        let b = Value::list([Value::Int(1)]);
        let c = Value::list([Value::Int(1)]);
        let mut guard = CycleGuard::new();

        assert_eq!(guard.enter(&a, &b), Entry::Tracked);
        assert_eq!(guard.enter(&a, &c), Entry::Tracked);
        assert_eq!(guard.enter(&b, &a), Entry::Tracked);
    }

    #[test]
    fn scalars_are_not_tracked() {
        let mut guard = CycleGuard::new();
        assert_eq!(guard.enter(&Value::Int(1), &Value::Int(1)), Entry::Untracked);
        assert_eq!(guard.enter(&Value::Null, &Value::list([])), Entry::Untracked);
        assert!(guard.is_empty());
    }
}
