use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use rcmp_types::path::is_same_or_descendant;
use rcmp_types::{FieldPath, TypeName, Value};

use crate::error::{ConfigError, ConfigResult};
use crate::pattern::FieldPattern;
use crate::rules::LeafRule;

/// Policies applied by the difference calculator at every visited node.
///
/// Built with consuming setters and read-only during a comparison. A single
/// configuration can be reused across any number of comparisons.
///
/// Field rules are matched against the node's rule path (field and key
/// names joined with `.`, indices dropped). Type rules are matched against
/// the actual value's runtime type name, or the expected value's when
/// actual is null.
///
/// ```
/// use rcmp_config::RecursiveComparisonConfiguration;
///
/// let config = RecursiveComparisonConfiguration::new()
///     .ignoring_fields(["id", "home.address.street"])
///     .ignoring_collection_order_in_fields(["friends"])
///     .with_strict_type_checking(true);
/// assert!(config.is_strict_type_checking());
/// ```
#[derive(Clone, Default)]
pub struct RecursiveComparisonConfiguration {
    pub(crate) strict_type_checking: bool,
    pub(crate) ignore_all_actual_null_fields: bool,
    pub(crate) ignore_all_expected_null_fields: bool,
    pub(crate) ignore_all_actual_empty_optional_fields: bool,
    pub(crate) compared_fields: BTreeSet<String>,
    pub(crate) compared_types: BTreeSet<TypeName>,
    pub(crate) ignored_fields: BTreeSet<String>,
    pub(crate) ignored_field_patterns: Vec<FieldPattern>,
    pub(crate) ignored_types: BTreeSet<TypeName>,
    pub(crate) ignored_type_patterns: Vec<FieldPattern>,
    pub(crate) use_overridden_equals: bool,
    pub(crate) ignored_overridden_equals_fields: BTreeSet<String>,
    pub(crate) ignored_overridden_equals_types: BTreeSet<TypeName>,
    pub(crate) ignored_overridden_equals_patterns: Vec<FieldPattern>,
    pub(crate) ignore_collection_order: bool,
    pub(crate) ignored_collection_order_fields: BTreeSet<String>,
    pub(crate) ignored_collection_order_patterns: Vec<FieldPattern>,
    pub(crate) field_rules: BTreeMap<String, LeafRule>,
    pub(crate) pattern_equals: Vec<(Vec<FieldPattern>, LeafRule)>,
    pub(crate) type_rules: BTreeMap<TypeName, LeafRule>,
    pub(crate) field_messages: BTreeMap<String, String>,
    pub(crate) type_messages: BTreeMap<TypeName, String>,
    pub(crate) allow_enum_string_comparison: bool,
}

fn field_list<I, S>(fields: I) -> ConfigResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fields
        .into_iter()
        .map(|f| {
            let f = f.into();
            if f.is_empty() {
                Err(ConfigError::EmptyFieldLocation)
            } else {
                Ok(f)
            }
        })
        .collect()
}

fn non_empty_field_list<I, S>(fields: I, rule: &'static str) -> ConfigResult<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let fields = field_list(fields)?;
    if fields.is_empty() {
        return Err(ConfigError::NoFields(rule));
    }
    Ok(fields)
}

impl RecursiveComparisonConfiguration {
    /// The default configuration: lenient typing, order-sensitive
    /// collections, no ignored fields and no own equality.
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Field selection and exclusion
    // ------------------------------------------------------------------

    /// Ignore the given fields (dotted rule paths) and their subtrees.
    pub fn ignoring_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_fields.extend(fields.into_iter().map(Into::into));
        self
    }

    /// Ignore every field whose rule path matches one of the regexes.
    pub fn ignoring_fields_matching_regexes<I, S>(mut self, regexes: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_field_patterns
            .extend(FieldPattern::compile_all(regexes)?);
        Ok(self)
    }

    /// Ignore every field whose runtime type is one of the given types.
    pub fn ignoring_fields_of_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.ignored_types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Ignore every field whose runtime type name matches one of the regexes.
    pub fn ignoring_fields_of_types_matching_regexes<I, S>(mut self, regexes: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_type_patterns
            .extend(FieldPattern::compile_all(regexes)?);
        Ok(self)
    }

    /// Skip fields whose actual value is null.
    pub fn ignoring_actual_null_fields(mut self) -> Self {
        self.ignore_all_actual_null_fields = true;
        self
    }

    /// Skip fields whose expected value is null.
    pub fn ignoring_expected_null_fields(mut self) -> Self {
        self.ignore_all_expected_null_fields = true;
        self
    }

    /// Skip fields whose actual value is an empty optional wrapper.
    pub fn ignoring_actual_empty_optional_fields(mut self) -> Self {
        self.ignore_all_actual_empty_optional_fields = true;
        self
    }

    /// Restrict the comparison to the given fields and their subtrees.
    pub fn comparing_only_fields<I, S>(mut self, fields: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.compared_fields.extend(field_list(fields)?);
        Ok(self)
    }

    /// Restrict the comparison to fields whose runtime type is one of the
    /// given types, together with their subfields.
    ///
    /// Combines with [`comparing_only_fields`](Self::comparing_only_fields)
    /// as a union. The whole graph is still walked, since a field of a
    /// compared type can sit below fields of any type; differences found
    /// outside the selection are dropped.
    pub fn comparing_only_fields_of_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.compared_types.extend(types.into_iter().map(Into::into));
        self
    }

    /// Require expected types to be the actual type or one of its subtypes.
    pub fn with_strict_type_checking(mut self, strict: bool) -> Self {
        self.strict_type_checking = strict;
        self
    }

    // ------------------------------------------------------------------
    // Own equality
    // ------------------------------------------------------------------

    /// Compare values that declare their own equality with it instead of
    /// field by field.
    pub fn using_overridden_equals(mut self) -> Self {
        self.use_overridden_equals = true;
        self
    }

    /// Always compare field by field, even when a type declares its own
    /// equality. This is the default.
    pub fn ignoring_all_overridden_equals(mut self) -> Self {
        self.use_overridden_equals = false;
        self
    }

    /// Compare the given fields field by field even when their type declares
    /// its own equality.
    pub fn ignoring_overridden_equals_for_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_overridden_equals_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Never use the own equality of the given types.
    pub fn ignoring_overridden_equals_for_types<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.ignored_overridden_equals_types
            .extend(types.into_iter().map(Into::into));
        self
    }

    /// Compare field by field every field whose rule path matches one of
    /// the regexes, whatever equality its type declares.
    pub fn ignoring_overridden_equals_for_fields_matching_regexes<I, S>(
        mut self,
        regexes: I,
    ) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_overridden_equals_patterns
            .extend(FieldPattern::compile_all(regexes)?);
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Collection order
    // ------------------------------------------------------------------

    /// Compare every ordered collection as a multiset.
    pub fn ignoring_collection_order(mut self) -> Self {
        self.ignore_collection_order = true;
        self
    }

    /// Compare the collections held by the given fields, and by their
    /// subfields, as multisets.
    pub fn ignoring_collection_order_in_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_collection_order_fields
            .extend(fields.into_iter().map(Into::into));
        self
    }

    /// Compare as multisets the collections of every field whose rule path
    /// matches one of the regexes.
    pub fn ignoring_collection_order_in_fields_matching_regexes<I, S>(
        mut self,
        regexes: I,
    ) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_collection_order_patterns
            .extend(FieldPattern::compile_all(regexes)?);
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Custom comparison rules
    // ------------------------------------------------------------------

    /// Compare the given fields with `comparator`. Replaces any rule already
    /// registered for those fields.
    pub fn with_comparator_for_fields<F, I, S>(mut self, comparator: F, fields: I) -> ConfigResult<Self>
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = non_empty_field_list(fields, "a field comparator")?;
        let rule = LeafRule::Comparator(Arc::new(comparator));
        for field in fields {
            self.field_rules.insert(field, rule.clone());
        }
        Ok(self)
    }

    /// Compare the given fields with `equals`. Replaces any rule already
    /// registered for those fields.
    pub fn with_equals_for_fields<F, I, S>(mut self, equals: F, fields: I) -> ConfigResult<Self>
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields = non_empty_field_list(fields, "a field equals predicate")?;
        let rule = LeafRule::Equals(Arc::new(equals));
        for field in fields {
            self.field_rules.insert(field, rule.clone());
        }
        Ok(self)
    }

    /// Compare every field whose rule path matches one of the regexes with
    /// `equals`. Exact field rules take precedence.
    pub fn with_equals_for_fields_matching_regexes<F, I, S>(
        mut self,
        equals: F,
        regexes: I,
    ) -> ConfigResult<Self>
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = FieldPattern::compile_all(regexes)?;
        if patterns.is_empty() {
            return Err(ConfigError::NoFields("a regex equals predicate"));
        }
        self.pattern_equals
            .push((patterns, LeafRule::Equals(Arc::new(equals))));
        Ok(self)
    }

    /// Compare every value of the given type with `comparator`.
    pub fn with_comparator_for_type<F>(mut self, type_name: impl Into<TypeName>, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.type_rules
            .insert(type_name.into(), LeafRule::Comparator(Arc::new(comparator)));
        self
    }

    /// Compare every value of the given type with `equals`.
    pub fn with_equals_for_type<F>(mut self, type_name: impl Into<TypeName>, equals: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.type_rules
            .insert(type_name.into(), LeafRule::Equals(Arc::new(equals)));
        self
    }

    // ------------------------------------------------------------------
    // Messages and enums
    // ------------------------------------------------------------------

    /// Replace the default rendering of differences found on the given
    /// fields. `{0}`, `{1}` and `{2}` expand to the path, the actual value
    /// and the expected value.
    pub fn with_error_message_for_fields<I, S>(mut self, message: impl Into<String>, fields: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let message = message.into();
        if message.is_empty() {
            return Err(ConfigError::EmptyMessage);
        }
        for field in non_empty_field_list(fields, "an error message")? {
            self.field_messages.insert(field, message.clone());
        }
        Ok(self)
    }

    /// Replace the default rendering of differences found on values of the
    /// given type. Field messages take precedence.
    pub fn with_error_message_for_type(
        mut self,
        message: impl Into<String>,
        type_name: impl Into<TypeName>,
    ) -> ConfigResult<Self> {
        let message = message.into();
        if message.is_empty() {
            return Err(ConfigError::EmptyMessage);
        }
        self.type_messages.insert(type_name.into(), message);
        Ok(self)
    }

    /// Let an enum variant equal a string holding its name.
    pub fn allowing_enum_string_comparison(mut self, allow: bool) -> Self {
        self.allow_enum_string_comparison = allow;
        self
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Returns `true` if expected types must be actual's type or a subtype.
    pub fn is_strict_type_checking(&self) -> bool {
        self.strict_type_checking
    }

    /// Returns `true` if fields with a null actual value are skipped.
    pub fn ignores_all_actual_null_fields(&self) -> bool {
        self.ignore_all_actual_null_fields
    }

    /// Returns `true` if fields with a null expected value are skipped.
    pub fn ignores_all_expected_null_fields(&self) -> bool {
        self.ignore_all_expected_null_fields
    }

    /// Returns `true` if fields holding an empty actual optional are
    /// skipped, whatever the expected value.
    pub fn ignores_all_actual_empty_optional_fields(&self) -> bool {
        self.ignore_all_actual_empty_optional_fields
    }

    /// Returns `true` if own equality is honoured below the root.
    pub fn uses_overridden_equals(&self) -> bool {
        self.use_overridden_equals
    }

    /// Returns `true` if an enum variant may equal a string holding its name.
    pub fn allows_enum_string_comparison(&self) -> bool {
        self.allow_enum_string_comparison
    }

    /// Returns `true` if the comparison is restricted to named fields.
    pub fn has_compared_fields(&self) -> bool {
        !self.compared_fields.is_empty()
    }

    /// Returns `true` if the comparison is restricted to fields of given
    /// types.
    pub fn has_compared_types(&self) -> bool {
        !self.compared_types.is_empty()
    }

    /// The fields the comparison is restricted to, sorted.
    pub fn compared_fields(&self) -> impl Iterator<Item = &str> {
        self.compared_fields.iter().map(String::as_str)
    }

    pub fn compared_types(&self) -> impl Iterator<Item = &TypeName> {
        self.compared_types.iter()
    }

    /// Returns `true` if the node at `path` is excluded by field name or
    /// field regex.
    pub fn should_ignore_field(&self, path: &FieldPath) -> bool {
        if path.is_root() || (self.ignored_fields.is_empty() && self.ignored_field_patterns.is_empty()) {
            return false;
        }
        let rule_path = path.rule_path();
        self.ignored_fields.contains(rule_path)
            || self
                .ignored_field_patterns
                .iter()
                .any(|p| p.matches(rule_path))
    }

    /// Returns `true` if the node's runtime type is excluded.
    ///
    /// The type of a null actual value cannot be known; expected's type is
    /// used instead only under strict type checking, where both types agree.
    pub fn is_ignored_type(&self, actual: &Value, expected: &Value) -> bool {
        if self.ignored_types.is_empty() && self.ignored_type_patterns.is_empty() {
            return false;
        }
        let type_name = match (actual.type_name(), expected.type_name()) {
            (Some(name), _) => name,
            (None, Some(name)) if self.strict_type_checking => name,
            _ => return false,
        };
        self.ignored_types.contains(&type_name)
            || self
                .ignored_type_patterns
                .iter()
                .any(|p| p.matches(type_name.as_str()))
    }

    /// Returns `true` if the node lies on, above or below a compared field.
    /// Always `true` when no compared fields were given, and when compared
    /// types were given: the differences found are then filtered with
    /// [`reports_differences_at`](Self::reports_differences_at).
    pub fn should_be_compared(&self, path: &FieldPath) -> bool {
        if path.is_root() || self.compared_fields.is_empty() || !self.compared_types.is_empty() {
            return true;
        }
        let rule_path = path.rule_path();
        self.compared_fields.iter().any(|field| {
            is_same_or_descendant(rule_path, field) || is_same_or_descendant(field, rule_path)
        })
    }

    /// Returns `true` if the node's runtime type is one of the compared
    /// types. Expected's type stands in for a null actual value.
    pub fn is_compared_type(&self, actual: &Value, expected: &Value) -> bool {
        if self.compared_types.is_empty() {
            return false;
        }
        actual
            .type_name()
            .or_else(|| expected.type_name())
            .is_some_and(|name| self.compared_types.contains(&name))
    }

    /// Returns `true` if differences found at `path` belong in the result.
    ///
    /// `within_compared_type` tells whether the node or one of its
    /// ancestors is of a compared type. Without compared types every
    /// difference is reported; with them, only those within a compared type
    /// or on or below a compared field.
    pub fn reports_differences_at(&self, path: &FieldPath, within_compared_type: bool) -> bool {
        if self.compared_types.is_empty() || within_compared_type {
            return true;
        }
        let rule_path = path.rule_path();
        !path.is_root()
            && self
                .compared_fields
                .iter()
                .any(|field| is_same_or_descendant(rule_path, field))
    }

    /// The leaf rule governing the node, by precedence: exact field rule,
    /// regex field rule, type rule.
    pub fn leaf_rule(&self, path: &FieldPath, actual: &Value, expected: &Value) -> Option<LeafRule> {
        let has_field_rules = !self.field_rules.is_empty() || !self.pattern_equals.is_empty();
        if has_field_rules && !path.is_root() {
            let rule_path = path.rule_path();
            if let Some(rule) = self.field_rules.get(rule_path) {
                return Some(rule.clone());
            }
            let by_pattern = self
                .pattern_equals
                .iter()
                .rev()
                .find(|(patterns, _)| patterns.iter().any(|p| p.matches(rule_path)));
            if let Some((_, rule)) = by_pattern {
                return Some(rule.clone());
            }
        }
        if self.type_rules.is_empty() {
            return None;
        }
        let type_name = actual.type_name().or_else(|| expected.type_name())?;
        self.type_rules.get(&type_name).cloned()
    }

    /// Returns `true` if a value declaring its own equality at `path` should
    /// be compared with it. The root never is.
    pub fn should_use_own_equality(&self, path: &FieldPath, actual: &Value) -> bool {
        if path.is_root() || !self.use_overridden_equals {
            return false;
        }
        let rule_path = path.rule_path();
        if !self.compared_fields.is_empty() && !self.compared_fields.contains(rule_path) {
            return false;
        }
        if self.ignored_overridden_equals_fields.contains(rule_path)
            || self
                .ignored_overridden_equals_patterns
                .iter()
                .any(|p| p.matches(rule_path))
        {
            return false;
        }
        actual
            .type_name()
            .map_or(true, |name| !self.ignored_overridden_equals_types.contains(&name))
    }

    /// Returns `true` if ordered collections at `path` compare as multisets.
    pub fn ignores_collection_order(&self, path: &FieldPath) -> bool {
        if self.ignore_collection_order {
            return true;
        }
        if self.ignored_collection_order_fields.is_empty() && self.ignored_collection_order_patterns.is_empty() {
            return false;
        }
        let rule_path = path.rule_path();
        self.ignored_collection_order_fields.contains(rule_path)
            || self
                .ignored_collection_order_patterns
                .iter()
                .any(|p| p.matches(rule_path))
    }

    /// The message template overriding differences at `path`, field
    /// messages first.
    pub fn message_for(&self, path: &FieldPath, actual: &Value, expected: &Value) -> Option<&str> {
        if !self.field_messages.is_empty() {
            if let Some(message) = self.field_messages.get(path.rule_path()) {
                return Some(message.as_str());
            }
        }
        if self.type_messages.is_empty() {
            return None;
        }
        let type_name = actual.type_name().or_else(|| expected.type_name())?;
        self.type_messages.get(&type_name).map(String::as_str)
    }
}

impl fmt::Debug for RecursiveComparisonConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveComparisonConfiguration")
            .field("strict_type_checking", &self.strict_type_checking)
            .field("compared_fields", &self.compared_fields)
            .field("compared_types", &self.compared_types)
            .field("ignored_fields", &self.ignored_fields)
            .field("ignored_types", &self.ignored_types)
            .field("use_overridden_equals", &self.use_overridden_equals)
            .field("ignore_collection_order", &self.ignore_collection_order)
            .field("field_rules", &self.field_rules.keys().collect::<Vec<_>>())
            .field("type_rules", &self.type_rules.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
