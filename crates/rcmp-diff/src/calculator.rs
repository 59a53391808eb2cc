//! The recursive comparison itself.
//!
//! Descent uses an explicit work stack instead of native recursion, so the
//! depth of the compared graphs is not limited by the call stack. Children
//! are pushed in reverse so that differences come out in depth-first
//! pre-order: fields in declaration order, elements by index, entries by key.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use rcmp_config::RecursiveComparisonConfiguration;
use rcmp_types::{Category, FieldPath, IntrospectionError, MapValue, Object, Segment, Sequence, Value};

use crate::cycle::{CycleGuard, Entry};
use crate::difference::{ComparisonDifference, CustomMessage};
use crate::error::{DiffError, DiffResult};
use crate::walker::{self, OPTIONAL_VALUE_FIELD};

struct Node {
    path: FieldPath,
    actual: Value,
    expected: Value,
    /// The node or one of its ancestors is of a compared type.
    within_compared_type: bool,
}

impl Node {
    fn child(&self, path: FieldPath, actual: Value, expected: Value) -> Node {
        Node {
            path,
            actual,
            expected,
            within_compared_type: self.within_compared_type,
        }
    }
}

enum Task {
    Compare(Node),
    /// Releases a cycle guard entry once every child has been compared.
    Exit { actual: Value, expected: Value },
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Collect every difference.
    Collect,
    /// Stop at the first difference; used to match unordered elements.
    FirstDifference,
}

enum Verdict {
    Equal,
    Differ(Option<String>),
}

fn different_size(kind: &str, actual: usize, expected: usize) -> String {
    format!(
        "actual and expected values are {kind} of different size, actual size={actual} when expected size={expected}"
    )
}

fn strict_type_error(actual: &Value, expected: &Value) -> String {
    format!(
        "the compared values are considered different since the recursive comparison enforces strict type checking and the actual value type {} is not equal to the expected value type {}",
        actual.type_description(),
        expected.type_description()
    )
}

fn join<T: AsRef<str>>(items: &[T]) -> String {
    let parts: Vec<&str> = items.iter().map(|item| item.as_ref()).collect();
    parts.join(", ")
}

fn push_children(stack: &mut Vec<Task>, children: Vec<Node>) {
    stack.extend(children.into_iter().rev().map(Task::Compare));
}

/// Computes the differences between two value graphs under a configuration.
///
/// The calculator holds no state between calls: every call gets its own
/// [`CycleGuard`], so one calculator can serve any number of comparisons.
#[derive(Clone, Copy, Debug)]
pub struct DifferenceCalculator<'a> {
    config: &'a RecursiveComparisonConfiguration,
}

impl<'a> DifferenceCalculator<'a> {
    pub fn new(config: &'a RecursiveComparisonConfiguration) -> Self {
        Self { config }
    }

    pub fn configuration(&self) -> &'a RecursiveComparisonConfiguration {
        self.config
    }

    /// Every difference between `actual` and `expected`, in depth-first
    /// pre-order. An empty list means the values are recursively equal.
    ///
    /// Fails if a member cannot be read, or if fields to compare were
    /// configured that `actual` does not have.
    pub fn determine_differences(
        &self,
        actual: &Value,
        expected: &Value,
    ) -> DiffResult<Vec<ComparisonDifference>> {
        if self.config.has_compared_fields() {
            self.check_compared_fields_exist(actual)?;
        }
        let mut guard = CycleGuard::new();
        let root = Node {
            path: FieldPath::root(),
            actual: actual.clone(),
            expected: expected.clone(),
            within_compared_type: false,
        };
        let differences = self.run(root, &mut guard, Mode::Collect)?;
        debug!(
            differences = differences.len(),
            strict = self.config.is_strict_type_checking(),
            "recursive comparison finished"
        );
        Ok(differences)
    }

    fn run(
        &self,
        start: Node,
        guard: &mut CycleGuard,
        mode: Mode,
    ) -> DiffResult<Vec<ComparisonDifference>> {
        let mut stack = vec![Task::Compare(start)];
        let mut differences = Vec::new();
        while let Some(task) = stack.pop() {
            match task {
                Task::Exit { actual, expected } => guard.exit(&actual, &expected),
                // Remaining exits still run so the shared guard stays balanced.
                Task::Compare(_) if mode == Mode::FirstDifference && !differences.is_empty() => {}
                Task::Compare(node) => self.visit(node, guard, &mut stack, &mut differences)?,
            }
        }
        Ok(differences)
    }

    /// Returns `true` if the pair has no difference at all.
    fn is_match(&self, node: Node, guard: &mut CycleGuard) -> DiffResult<bool> {
        Ok(self.run(node, guard, Mode::FirstDifference)?.is_empty())
    }

    fn difference(
        &self,
        path: &FieldPath,
        actual: &Value,
        expected: &Value,
        description: Option<String>,
    ) -> ComparisonDifference {
        let mut difference = ComparisonDifference::new(path.clone(), actual.clone(), expected.clone());
        if let Some(description) = description {
            difference = difference.with_description(description);
        }
        if let Some(template) = self.config.message_for(path, actual, expected) {
            let args = vec![path.to_string(), actual.to_string(), expected.to_string()];
            difference = difference.with_message(CustomMessage::new(template, args));
        }
        difference
    }

    fn visit(
        &self,
        node: Node,
        guard: &mut CycleGuard,
        stack: &mut Vec<Task>,
        out: &mut Vec<ComparisonDifference>,
    ) -> DiffResult<()> {
        let config = self.config;
        if !node.path.is_root()
            && (config.should_ignore_field(&node.path)
                || !config.should_be_compared(&node.path)
                || config.is_ignored_type(&node.actual, &node.expected))
        {
            return Ok(());
        }

        let node = Node {
            within_compared_type: node.within_compared_type
                || config.is_compared_type(&node.actual, &node.expected),
            ..node
        };
        let reported = out.len();
        self.compare_node(&node, guard, stack, out)?;
        if out.len() > reported && !config.reports_differences_at(&node.path, node.within_compared_type) {
            trace!(path = %node.path, "difference outside the compared types dropped");
            out.truncate(reported);
        }
        Ok(())
    }

    fn compare_node(
        &self,
        node: &Node,
        guard: &mut CycleGuard,
        stack: &mut Vec<Task>,
        out: &mut Vec<ComparisonDifference>,
    ) -> DiffResult<()> {
        let config = self.config;
        let Node {
            path,
            actual,
            expected,
            ..
        } = node;
        let is_root = path.is_root();

        if Value::same_ref(actual, expected) {
            return Ok(());
        }

        // An empty actual optional is skipped whatever the expected side holds.
        if !is_root && config.ignores_all_actual_empty_optional_fields() && actual.is_empty_optional() {
            return Ok(());
        }

        // Null-ignoring flags never apply to the compared values themselves.
        if actual.is_null() {
            if is_root || !config.ignores_all_actual_null_fields() {
                out.push(self.difference(path, actual, expected, None));
            }
            return Ok(());
        }
        if expected.is_null() {
            if is_root || !config.ignores_all_expected_null_fields() {
                out.push(self.difference(path, actual, expected, None));
            }
            return Ok(());
        }

        match guard.enter(actual, expected) {
            Entry::Cycle => {
                trace!(path = %path, "cycle detected, pair assumed equal");
                return Ok(());
            }
            Entry::Tracked => stack.push(Task::Exit {
                actual: actual.clone(),
                expected: expected.clone(),
            }),
            Entry::Untracked => {}
        }

        if let Some(rule) = config.leaf_rule(path, actual, expected) {
            if !rule.apply(actual, expected) {
                let description = format!("the values were compared with a registered {}", rule.kind());
                out.push(self.difference(path, actual, expected, Some(description)));
            }
            return Ok(());
        }

        let own_equality = match (actual, expected) {
            (Value::Object(a), Value::Object(e))
                if a.has_own_equality() && config.should_use_own_equality(path, actual) =>
            {
                Some(a.own_eq(e) == Some(true))
            }
            _ => None,
        };
        if let Some(equal) = own_equality {
            if !equal {
                let description = "Actual was compared to expected with its own equality as the recursive comparison was configured to do so.";
                out.push(self.difference(path, actual, expected, Some(description.to_string())));
            }
            return Ok(());
        }

        if let Some(verdict) = self.compare_enums(actual, expected) {
            if let Verdict::Differ(description) = verdict {
                out.push(self.difference(path, actual, expected, description));
            }
            return Ok(());
        }

        let (actual_category, expected_category) = (actual.category(), expected.category());
        if actual_category == Category::Leaf && expected_category == Category::Leaf {
            if let Verdict::Differ(description) = self.compare_leaves(actual, expected) {
                out.push(self.difference(path, actual, expected, description));
            }
            return Ok(());
        }
        if actual_category != expected_category {
            let description = format!(
                "expected field is {expected_category} but actual field is not ({})",
                actual.type_description()
            );
            out.push(self.difference(path, actual, expected, Some(description)));
            return Ok(());
        }

        if config.is_strict_type_checking() && !types_compatible(actual, expected) {
            let description = strict_type_error(actual, expected);
            out.push(self.difference(path, actual, expected, Some(description)));
            return Ok(());
        }

        match (actual, expected) {
            (Value::Seq(a), Value::Seq(e)) => self.compare_sequences(node, a, e, guard, stack, out),
            (Value::Map(a), Value::Map(e)) => {
                self.compare_maps(node, a, e, stack, out);
                Ok(())
            }
            (Value::Optional(a), Value::Optional(e)) => {
                match (a, e) {
                    (Some(a), Some(e)) => stack.push(Task::Compare(node.child(
                        path.field(OPTIONAL_VALUE_FIELD),
                        (**a).clone(),
                        (**e).clone(),
                    ))),
                    (None, None) => {}
                    _ => out.push(self.difference(path, actual, expected, None)),
                }
                Ok(())
            }
            (Value::Object(a), Value::Object(_)) => self.compare_objects(node, a, stack, out),
            _ => Ok(()),
        }
    }

    fn compare_enums(&self, actual: &Value, expected: &Value) -> Option<Verdict> {
        let verdict = match (actual, expected) {
            (Value::Enum(a), Value::Enum(e)) => {
                if self.config.is_strict_type_checking() && a.type_name != e.type_name {
                    Verdict::Differ(Some(strict_type_error(actual, expected)))
                } else if a.variant == e.variant {
                    Verdict::Equal
                } else {
                    Verdict::Differ(None)
                }
            }
            (Value::Enum(variant), Value::Str(text)) | (Value::Str(text), Value::Enum(variant))
                if self.config.allows_enum_string_comparison() =>
            {
                if variant.variant == *text {
                    Verdict::Equal
                } else {
                    Verdict::Differ(None)
                }
            }
            (Value::Enum(_), _) => Verdict::Differ(Some(format!(
                "expected field is a {} but actual field is an enum",
                expected.type_description()
            ))),
            (_, Value::Enum(_)) => Verdict::Differ(Some(format!(
                "expected field is an enum but actual field is not ({})",
                actual.type_description()
            ))),
            _ => return None,
        };
        Some(verdict)
    }

    fn compare_leaves(&self, actual: &Value, expected: &Value) -> Verdict {
        let same_type = actual.type_name() == expected.type_name();
        if self.config.is_strict_type_checking() && !same_type {
            return Verdict::Differ(Some(strict_type_error(actual, expected)));
        }
        if actual.leaf_eq(expected) {
            Verdict::Equal
        } else if same_type {
            Verdict::Differ(None)
        } else {
            Verdict::Differ(Some(format!(
                "actual and expected values are of different types ({} and {}) and were compared with equality",
                actual.type_description(),
                expected.type_description()
            )))
        }
    }

    fn compare_sequences(
        &self,
        node: &Node,
        a: &Sequence,
        e: &Sequence,
        guard: &mut CycleGuard,
        stack: &mut Vec<Task>,
        out: &mut Vec<ComparisonDifference>,
    ) -> DiffResult<()> {
        let (path, actual, expected) = (&node.path, &node.actual, &node.expected);
        if !e.is_ordered() || self.config.ignores_collection_order(path) {
            return self.compare_unordered(node, a, e, guard, out);
        }
        if !a.is_ordered() {
            let description = format!(
                "expected field is an ordered collection but actual field is not ({})",
                actual.type_description()
            );
            out.push(self.difference(path, actual, expected, Some(description)));
            return Ok(());
        }
        if a.len() != e.len() {
            let description = different_size("collections", a.len(), e.len());
            out.push(self.difference(path, actual, expected, Some(description)));
        }
        let children = a
            .items()
            .iter()
            .zip(e.items())
            .enumerate()
            .map(|(i, (x, y))| node.child(path.index(i), x.clone(), y.clone()))
            .collect();
        push_children(stack, children);
        Ok(())
    }

    /// First-fit greedy matching: each actual element, in order, takes the
    /// first not-yet-matched expected element it has no difference with.
    fn compare_unordered(
        &self,
        node: &Node,
        a: &Sequence,
        e: &Sequence,
        guard: &mut CycleGuard,
        out: &mut Vec<ComparisonDifference>,
    ) -> DiffResult<()> {
        let (path, actual, expected) = (&node.path, &node.actual, &node.expected);
        let mut matched = vec![false; e.len()];
        let mut unmatched_actual = Vec::new();
        for (i, item) in a.items().iter().enumerate() {
            let mut found = false;
            for (j, candidate) in e.items().iter().enumerate() {
                if matched[j] {
                    continue;
                }
                let pair = node.child(path.index(i), item.clone(), candidate.clone());
                if self.is_match(pair, guard)? {
                    matched[j] = true;
                    found = true;
                    break;
                }
            }
            if !found {
                unmatched_actual.push(item.clone());
            }
        }
        let unmatched_expected: Vec<Value> = e
            .items()
            .iter()
            .zip(&matched)
            .filter(|(_, matched)| !**matched)
            .map(|(item, _)| item.clone())
            .collect();

        let mut lines = Vec::new();
        if a.len() != e.len() {
            lines.push(different_size("collections", a.len(), e.len()));
        }
        if !unmatched_expected.is_empty() {
            lines.push(format!(
                "The following expected elements were not matched in the actual {}:\n  {}",
                actual.type_description(),
                Value::list(unmatched_expected)
            ));
        }
        if !unmatched_actual.is_empty() {
            lines.push(format!(
                "The following actual elements were not matched in the expected {}:\n  {}",
                expected.type_description(),
                Value::list(unmatched_actual)
            ));
        }
        if !lines.is_empty() {
            out.push(self.difference(path, actual, expected, Some(lines.join("\n"))));
        }
        Ok(())
    }

    fn compare_maps(
        &self,
        node: &Node,
        a: &MapValue,
        e: &MapValue,
        stack: &mut Vec<Task>,
        out: &mut Vec<ComparisonDifference>,
    ) {
        let (path, actual, expected) = (&node.path, &node.actual, &node.expected);
        let keep = |key: &str| {
            let child = path.key(key);
            !self.config.should_ignore_field(&child) && self.config.should_be_compared(&child)
        };
        let actual_keys: BTreeSet<&String> = a.entries().keys().filter(|k| keep(k.as_str())).collect();
        let expected_keys: BTreeSet<&String> = e.entries().keys().filter(|k| keep(k.as_str())).collect();

        let missing: Vec<&String> = expected_keys.difference(&actual_keys).copied().collect();
        let extra: Vec<&String> = actual_keys.difference(&expected_keys).copied().collect();
        if !missing.is_empty() || !extra.is_empty() {
            let mut lines = Vec::new();
            if actual_keys.len() != expected_keys.len() {
                lines.push(different_size("maps", actual_keys.len(), expected_keys.len()));
            }
            if !missing.is_empty() {
                lines.push(format!(
                    "The following keys were not found in the actual map value:\n  [{}]",
                    join(&missing)
                ));
            }
            if !extra.is_empty() {
                lines.push(format!(
                    "The following keys were present in the actual map value, but not in the expected map value:\n  [{}]",
                    join(&extra)
                ));
            }
            out.push(self.difference(path, actual, expected, Some(lines.join("\n"))));
        }

        let children = actual_keys
            .intersection(&expected_keys)
            .filter_map(|key| {
                Some(node.child(
                    path.key(key.as_str()),
                    a.get(key)?.clone(),
                    e.get(key)?.clone(),
                ))
            })
            .collect();
        push_children(stack, children);
    }

    /// Compares the fields of actual only; fields that exist on expected
    /// alone are not compared.
    fn compare_objects(
        &self,
        node: &Node,
        a: &Object,
        stack: &mut Vec<Task>,
        out: &mut Vec<ComparisonDifference>,
    ) -> DiffResult<()> {
        let (path, actual, expected) = (&node.path, &node.actual, &node.expected);
        let mut missing = Vec::new();
        let mut children = Vec::new();
        for member in walker::members(actual)? {
            let Segment::Field(name) = &member.segment else {
                continue;
            };
            let child = path.field(name.as_str());
            if self.config.should_ignore_field(&child) || !self.config.should_be_compared(&child) {
                continue;
            }
            match walker::member(expected, &member.segment)? {
                Some(value) => children.push(node.child(child, member.value, value)),
                None => missing.push(name.clone()),
            }
        }
        if !missing.is_empty() {
            let description = format!(
                "actual value had more fields to compare than expected value, these actual fields could not be found in expected: [{}]",
                join(&missing)
            );
            out.push(self.difference(path, actual, expected, Some(description)));
        }
        trace!(path = %path, type_name = %a.type_info().name, fields = children.len(), "comparing object fields");
        push_children(stack, children);
        Ok(())
    }

    fn check_compared_fields_exist(&self, actual: &Value) -> DiffResult<()> {
        let mut unknown = Vec::new();
        for field in self.config.compared_fields() {
            let segments: Vec<&str> = field.split('.').collect();
            if !resolves(actual, &segments)? {
                unknown.push(field.to_string());
            }
        }
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(DiffError::UnknownComparedFields(unknown))
        }
    }
}

/// Strict typing accepts an expected object whose type is actual's type or
/// one of its subtypes; other values need identical type names.
fn types_compatible(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e.type_info().is_same_or_subtype_of(&a.type_info().name),
        _ => actual.type_name() == expected.type_name(),
    }
}

/// Returns `true` if the dotted field can be reached from `value`.
///
/// Maps, nulls and empty optionals accept any remaining path since their
/// content is not known ahead of the comparison; collections require every
/// element to have it.
fn resolves(value: &Value, segments: &[&str]) -> Result<bool, IntrospectionError> {
    let Some((head, rest)) = segments.split_first() else {
        return Ok(true);
    };
    match value {
        Value::Object(_) | Value::Optional(Some(_)) => {
            match walker::member(value, &Segment::Field(head.to_string()))? {
                Some(child) => resolves(&child, rest),
                None => Ok(false),
            }
        }
        Value::Seq(seq) => {
            for item in seq.items() {
                if !resolves(item, segments)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        Value::Null | Value::Optional(None) | Value::Map(_) => Ok(true),
        _ => Ok(false),
    }
}

/// Shorthand for [`DifferenceCalculator::determine_differences`].
pub fn determine_differences(
    actual: &Value,
    expected: &Value,
    config: &RecursiveComparisonConfiguration,
) -> DiffResult<Vec<ComparisonDifference>> {
    DifferenceCalculator::new(config).determine_differences(actual, expected)
}
