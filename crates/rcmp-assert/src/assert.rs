//! Fluent assertion over a recursive comparison.

use std::cmp::Ordering;

use tracing::debug;

use rcmp_config::{ConfigResult, RecursiveComparisonConfiguration};
use rcmp_diff::{ComparisonDifference, DifferenceCalculator};
use rcmp_types::{TypeName, Value, Walkable};

use crate::error::{AssertResult, AssertionError};
use crate::report::ComparisonFailure;

/// Start a recursive comparison assertion on `actual`.
pub fn using_recursive_comparison<T: Walkable + ?Sized>(actual: &T) -> ComparisonAssert {
    ComparisonAssert::new(actual.to_value())
}

fn candidates<T: Walkable>(values: &[T]) -> AssertResult<Vec<Value>> {
    if values.is_empty() {
        return Err(AssertionError::NoValues);
    }
    Ok(values.iter().map(Walkable::to_value).collect())
}

/// An actual value and the configuration it will be compared with.
///
/// Setters consume and return the assertion so they can be chained before a
/// terminal [`is_equal_to`](Self::is_equal_to) or
/// [`is_not_equal_to`](Self::is_not_equal_to). Terminal operations borrow,
/// so one assertion can be checked against several expected values.
#[derive(Clone, Debug)]
pub struct ComparisonAssert {
    actual: Value,
    configuration: RecursiveComparisonConfiguration,
}

impl ComparisonAssert {
    pub fn new(actual: Value) -> Self {
        Self {
            actual,
            configuration: RecursiveComparisonConfiguration::new(),
        }
    }

    /// Replace the whole configuration, e.g. one loaded from settings.
    pub fn with_configuration(mut self, configuration: RecursiveComparisonConfiguration) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn actual(&self) -> &Value {
        &self.actual
    }

    pub fn configuration(&self) -> &RecursiveComparisonConfiguration {
        &self.configuration
    }

    fn configure(
        mut self,
        f: impl FnOnce(RecursiveComparisonConfiguration) -> RecursiveComparisonConfiguration,
    ) -> Self {
        self.configuration = f(self.configuration);
        self
    }

    fn try_configure(
        mut self,
        f: impl FnOnce(RecursiveComparisonConfiguration) -> ConfigResult<RecursiveComparisonConfiguration>,
    ) -> ConfigResult<Self> {
        self.configuration = f(self.configuration)?;
        Ok(self)
    }

    // ------------------------------------------------------------------
    // Terminal operations
    // ------------------------------------------------------------------

    /// Pass if `expected` is recursively equal to the actual value.
    pub fn is_equal_to<T: Walkable + ?Sized>(&self, expected: &T) -> AssertResult<&Self> {
        let expected = expected.to_value();
        if Value::same_ref(&self.actual, &expected) {
            return Ok(self);
        }
        if expected.is_null() {
            return Err(AssertionError::ExpectedNull {
                actual: self.actual.clone(),
            });
        }
        if self.actual.is_null() {
            return Err(AssertionError::ExpectedNonNull { expected });
        }
        let differences = self.differences(&expected)?;
        if differences.is_empty() {
            return Ok(self);
        }
        debug!(differences = differences.len(), "recursive equality assertion failed");
        Err(AssertionError::NotEqual(Box::new(ComparisonFailure::new(
            self.actual.clone(),
            expected,
            differences,
            &self.configuration,
        ))))
    }

    /// Pass if `other` differs from the actual value in at least one place.
    /// A one-sided null always differs.
    pub fn is_not_equal_to<T: Walkable + ?Sized>(&self, other: &T) -> AssertResult<&Self> {
        let other = other.to_value();
        if self.is_recursively_equal(&other)? {
            return Err(AssertionError::UnexpectedlyEqual {
                actual: self.actual.clone(),
                other,
            });
        }
        Ok(self)
    }

    /// Pass if the actual value is recursively equal to one of `values`.
    pub fn is_in<T: Walkable>(&self, values: &[T]) -> AssertResult<&Self> {
        let values = candidates(values)?;
        for value in &values {
            if self.is_recursively_equal(value)? {
                return Ok(self);
            }
        }
        Err(AssertionError::NotIn {
            actual: self.actual.clone(),
            values: Value::list(values),
            configuration: self.configuration.multi_line_description(),
        })
    }

    /// Pass if the actual value is recursively equal to none of `values`.
    pub fn is_not_in<T: Walkable>(&self, values: &[T]) -> AssertResult<&Self> {
        let values = candidates(values)?;
        let mut found = false;
        for value in &values {
            if self.is_recursively_equal(value)? {
                found = true;
                break;
            }
        }
        if found {
            return Err(AssertionError::UnexpectedlyIn {
                actual: self.actual.clone(),
                values: Value::list(values),
                configuration: self.configuration.multi_line_description(),
            });
        }
        Ok(self)
    }

    /// The raw difference list against `expected`, without asserting.
    pub fn determine_differences_with<T: Walkable + ?Sized>(
        &self,
        expected: &T,
    ) -> AssertResult<Vec<ComparisonDifference>> {
        self.differences(&expected.to_value())
    }

    fn differences(&self, expected: &Value) -> AssertResult<Vec<ComparisonDifference>> {
        Ok(DifferenceCalculator::new(&self.configuration).determine_differences(&self.actual, expected)?)
    }

    /// Nulls equal only nulls; no configuration flag changes that.
    fn is_recursively_equal(&self, other: &Value) -> AssertResult<bool> {
        if Value::same_ref(&self.actual, other) {
            return Ok(true);
        }
        if self.actual.is_null() || other.is_null() {
            return Ok(false);
        }
        Ok(self.differences(other)?.is_empty())
    }

    // ------------------------------------------------------------------
    // Null and empty handling
    // ------------------------------------------------------------------

    pub fn ignoring_actual_null_fields(self) -> Self {
        self.configure(|c| c.ignoring_actual_null_fields())
    }

    pub fn ignoring_expected_null_fields(self) -> Self {
        self.configure(|c| c.ignoring_expected_null_fields())
    }

    pub fn ignoring_actual_empty_optional_fields(self) -> Self {
        self.configure(|c| c.ignoring_actual_empty_optional_fields())
    }

    // ------------------------------------------------------------------
    // Field selection
    // ------------------------------------------------------------------

    pub fn comparing_only_fields<I, S>(self, fields: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.try_configure(|c| c.comparing_only_fields(fields))
    }

    pub fn comparing_only_fields_of_types<I, T>(self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.configure(|c| c.comparing_only_fields_of_types(types))
    }

    pub fn ignoring_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure(|c| c.ignoring_fields(fields))
    }

    pub fn ignoring_fields_matching_regexes<I, S>(self, regexes: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_configure(|c| c.ignoring_fields_matching_regexes(regexes))
    }

    pub fn ignoring_fields_of_types<I, T>(self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.configure(|c| c.ignoring_fields_of_types(types))
    }

    pub fn ignoring_fields_of_types_matching_regexes<I, S>(self, regexes: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_configure(|c| c.ignoring_fields_of_types_matching_regexes(regexes))
    }

    // ------------------------------------------------------------------
    // Type checking and own equality
    // ------------------------------------------------------------------

    pub fn with_strict_type_checking(self, strict: bool) -> Self {
        self.configure(|c| c.with_strict_type_checking(strict))
    }

    pub fn using_overridden_equals(self) -> Self {
        self.configure(|c| c.using_overridden_equals())
    }

    pub fn ignoring_all_overridden_equals(self) -> Self {
        self.configure(|c| c.ignoring_all_overridden_equals())
    }

    pub fn ignoring_overridden_equals_for_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure(|c| c.ignoring_overridden_equals_for_fields(fields))
    }

    pub fn ignoring_overridden_equals_for_types<I, T>(self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TypeName>,
    {
        self.configure(|c| c.ignoring_overridden_equals_for_types(types))
    }

    pub fn ignoring_overridden_equals_for_fields_matching_regexes<I, S>(
        self,
        regexes: I,
    ) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_configure(|c| c.ignoring_overridden_equals_for_fields_matching_regexes(regexes))
    }

    pub fn allowing_enum_string_comparison(self, allow: bool) -> Self {
        self.configure(|c| c.allowing_enum_string_comparison(allow))
    }

    // ------------------------------------------------------------------
    // Collection order
    // ------------------------------------------------------------------

    pub fn ignoring_collection_order(self) -> Self {
        self.configure(|c| c.ignoring_collection_order())
    }

    pub fn ignoring_collection_order_in_fields<I, S>(self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.configure(|c| c.ignoring_collection_order_in_fields(fields))
    }

    pub fn ignoring_collection_order_in_fields_matching_regexes<I, S>(
        self,
        regexes: I,
    ) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_configure(|c| c.ignoring_collection_order_in_fields_matching_regexes(regexes))
    }

    // ------------------------------------------------------------------
    // Custom comparison rules and messages
    // ------------------------------------------------------------------

    pub fn with_comparator_for_fields<F, I, S>(self, comparator: F, fields: I) -> ConfigResult<Self>
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.try_configure(|c| c.with_comparator_for_fields(comparator, fields))
    }

    pub fn with_equals_for_fields<F, I, S>(self, equals: F, fields: I) -> ConfigResult<Self>
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.try_configure(|c| c.with_equals_for_fields(equals, fields))
    }

    pub fn with_equals_for_fields_matching_regexes<F, I, S>(
        self,
        equals: F,
        regexes: I,
    ) -> ConfigResult<Self>
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.try_configure(|c| c.with_equals_for_fields_matching_regexes(equals, regexes))
    }

    pub fn with_comparator_for_type<F>(self, type_name: impl Into<TypeName>, comparator: F) -> Self
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.configure(|c| c.with_comparator_for_type(type_name, comparator))
    }

    pub fn with_equals_for_type<F>(self, type_name: impl Into<TypeName>, equals: F) -> Self
    where
        F: Fn(&Value, &Value) -> bool + Send + Sync + 'static,
    {
        self.configure(|c| c.with_equals_for_type(type_name, equals))
    }

    pub fn with_error_message_for_fields<I, S>(self, message: impl Into<String>, fields: I) -> ConfigResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.try_configure(|c| c.with_error_message_for_fields(message, fields))
    }

    pub fn with_error_message_for_type(
        self,
        message: impl Into<String>,
        type_name: impl Into<TypeName>,
    ) -> ConfigResult<Self> {
        self.try_configure(|c| c.with_error_message_for_type(message, type_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcmp_config::ConfigError;
    use rcmp_diff::DiffError;
    use rcmp_types::{Object, TypeInfo};

    fn person(name: &str, age: i64) -> Value {
        Object::new(TypeInfo::new("Person"))
            .with_field("name", Value::str(name))
            .with_field("age", Value::Int(age))
            .into_value()
    }

    #[test]
    fn same_reference_passes_both_ways_round() {
        let value = person("Frodo", 33);
        let assertion = ComparisonAssert::new(value.clone());
        assert!(assertion.is_equal_to(&value).is_ok());
        assert!(matches!(
            assertion.is_not_equal_to(&value),
            Err(AssertionError::UnexpectedlyEqual { .. })
        ));
    }

    #[test]
    fn null_guards() {
        let frodo = person("Frodo", 33);
        let err = ComparisonAssert::new(frodo.clone()).is_equal_to(&Value::Null).unwrap_err();
        assert!(matches!(err, AssertionError::ExpectedNull { .. }));

        let err = ComparisonAssert::new(Value::Null).is_equal_to(&frodo).unwrap_err();
        assert!(matches!(err, AssertionError::ExpectedNonNull { .. }));

        assert!(ComparisonAssert::new(Value::Null).is_equal_to(&Value::Null).is_ok());
        assert!(ComparisonAssert::new(Value::Null).is_not_equal_to(&frodo).is_ok());
        assert!(ComparisonAssert::new(frodo).is_not_equal_to(&Value::Null).is_ok());
    }

    #[test]
    fn failure_carries_every_difference() {
        let err = ComparisonAssert::new(person("Frodo", 33))
            .is_equal_to(&person("Sam", 38))
            .unwrap_err();
        let failure = err.failure().unwrap();
        assert_eq!(failure.paths(), vec!["name", "age"]);
        assert!(err.to_string().contains("following 2 differences"));
    }

    #[test]
    fn structurally_equal_values_are_not_unequal() {
        let assertion = ComparisonAssert::new(person("Frodo", 33));
        assert!(assertion.is_equal_to(&person("Frodo", 33)).is_ok());
        assert!(assertion.is_not_equal_to(&person("Frodo", 33)).is_err());
        assert!(assertion.is_not_equal_to(&person("Frodo", 50)).is_ok());
    }

    #[test]
    fn membership_uses_the_recursive_comparison() {
        let frodo = ComparisonAssert::new(person("Frodo", 33));
        let hobbits = [person("Sam", 38), person("Frodo", 33)];
        let strangers = [person("Aragorn", 87), person("Frodo", 50)];

        assert!(frodo.is_in(&hobbits).is_ok());
        assert!(frodo.is_not_in(&strangers).is_ok());

        let err = frodo.is_in(&strangers).unwrap_err();
        assert!(matches!(err, AssertionError::NotIn { .. }));
        assert!(err.to_string().contains("to be in:\n  [Person(name=\"Aragorn\", age=87), "));

        let err = frodo.is_not_in(&hobbits).unwrap_err();
        assert!(matches!(err, AssertionError::UnexpectedlyIn { .. }));

        let lenient = frodo.ignoring_fields(["age"]);
        assert!(lenient.is_in(&strangers).is_ok());
        assert!(lenient.is_not_in(&strangers).is_err());
    }

    #[test]
    fn membership_handles_nulls_and_empty_values() {
        let null = ComparisonAssert::new(Value::Null);
        assert!(null.is_in(&[person("Frodo", 33), Value::Null]).is_ok());
        assert!(null.is_not_in(&[person("Frodo", 33)]).is_ok());
        assert!(matches!(
            null.is_in(&Vec::<Value>::new()),
            Err(AssertionError::NoValues)
        ));
        assert!(matches!(
            null.is_not_in(&Vec::<Value>::new()),
            Err(AssertionError::NoValues)
        ));
    }

    #[test]
    fn setters_delegate_to_the_configuration() {
        let assertion = ComparisonAssert::new(person("Frodo", 33))
            .ignoring_fields(["age"])
            .ignoring_collection_order()
            .with_strict_type_checking(true);
        let config = assertion.configuration();
        assert!(config.is_strict_type_checking());
        assert!(config.should_ignore_field(&rcmp_types::FieldPath::root().field("age")));
        assert!(assertion.is_equal_to(&person("Frodo", 50)).is_ok());
    }

    #[test]
    fn invalid_configuration_is_reported_at_registration() {
        let result = ComparisonAssert::new(Value::Int(1)).ignoring_fields_matching_regexes(["("]);
        assert!(matches!(result, Err(ConfigError::InvalidRegex { .. })));

        let result = ComparisonAssert::new(Value::Int(1))
            .with_equals_for_fields(|_: &Value, _: &Value| true, Vec::<String>::new());
        assert!(matches!(result, Err(ConfigError::NoFields(_))));
    }

    #[test]
    fn aborted_comparison_is_not_a_content_failure() {
        let err = ComparisonAssert::new(person("Frodo", 33))
            .comparing_only_fields(["ring"])
            .unwrap()
            .is_equal_to(&person("Frodo", 33))
            .unwrap_err();
        assert!(matches!(
            err,
            AssertionError::Comparison(DiffError::UnknownComparedFields(_))
        ));
        assert!(err.failure().is_none());
    }
}
