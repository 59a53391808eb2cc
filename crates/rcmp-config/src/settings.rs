use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use rcmp_types::TypeName;

use crate::config::RecursiveComparisonConfiguration;
use crate::error::ConfigResult;
use crate::pattern::FieldPattern;

/// The plain-data part of a [`RecursiveComparisonConfiguration`].
///
/// Comparators and predicates are code and cannot be loaded; everything
/// else can be kept in a JSON or TOML file shared by a test suite:
///
/// ```toml
/// strict_type_checking = true
/// ignored_fields = ["id", "home.address.street"]
/// ignored_collection_order_in_fields = ["friends"]
///
/// [field_messages]
/// age = "age mismatch at {0}"
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComparisonSettings {
    /// Require expected types to be the actual type or one of its subtypes.
    pub strict_type_checking: bool,
    pub ignore_all_actual_null_fields: bool,
    pub ignore_all_expected_null_fields: bool,
    pub ignore_all_actual_empty_optional_fields: bool,
    /// Restrict the comparison to these fields.
    pub compared_fields: Vec<String>,
    /// Restrict the comparison to fields of these types.
    pub compared_types: Vec<String>,
    pub ignored_fields: Vec<String>,
    pub ignored_field_regexes: Vec<String>,
    pub ignored_types: Vec<String>,
    pub ignored_type_regexes: Vec<String>,
    /// Honour the own equality of types declaring one.
    pub use_overridden_equals: bool,
    pub ignored_overridden_equals_for_fields: Vec<String>,
    pub ignored_overridden_equals_for_types: Vec<String>,
    pub ignored_overridden_equals_for_field_regexes: Vec<String>,
    /// Compare every ordered collection as a multiset.
    pub ignore_collection_order: bool,
    pub ignored_collection_order_in_fields: Vec<String>,
    pub ignored_collection_order_in_field_regexes: Vec<String>,
    pub allow_enum_string_comparison: bool,
    /// Field path to message template.
    pub field_messages: BTreeMap<String, String>,
    /// Type name to message template.
    pub type_messages: BTreeMap<String, String>,
}

impl ComparisonSettings {
    /// Parse settings from a JSON document.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings from a TOML document.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(text)?)
    }
}

fn sources(patterns: &[FieldPattern]) -> Vec<String> {
    patterns.iter().map(|p| p.as_str().to_string()).collect()
}

fn names<'a>(types: impl IntoIterator<Item = &'a TypeName>) -> Vec<String> {
    types.into_iter().map(|t| t.as_str().to_string()).collect()
}

impl RecursiveComparisonConfiguration {
    /// Build a configuration from loaded settings. Regexes and messages are
    /// validated as if registered through the fluent setters.
    pub fn from_settings(settings: &ComparisonSettings) -> ConfigResult<Self> {
        let mut config = Self::new()
            .with_strict_type_checking(settings.strict_type_checking)
            .comparing_only_fields(settings.compared_fields.iter().cloned())?
            .comparing_only_fields_of_types(settings.compared_types.iter().cloned())
            .ignoring_fields(settings.ignored_fields.iter().cloned())
            .ignoring_fields_matching_regexes(&settings.ignored_field_regexes)?
            .ignoring_fields_of_types(settings.ignored_types.iter().cloned())
            .ignoring_fields_of_types_matching_regexes(&settings.ignored_type_regexes)?
            .ignoring_overridden_equals_for_fields(
                settings.ignored_overridden_equals_for_fields.iter().cloned(),
            )
            .ignoring_overridden_equals_for_types(
                settings.ignored_overridden_equals_for_types.iter().cloned(),
            )
            .ignoring_overridden_equals_for_fields_matching_regexes(
                &settings.ignored_overridden_equals_for_field_regexes,
            )?
            .ignoring_collection_order_in_fields(
                settings.ignored_collection_order_in_fields.iter().cloned(),
            )
            .ignoring_collection_order_in_fields_matching_regexes(
                &settings.ignored_collection_order_in_field_regexes,
            )?
            .allowing_enum_string_comparison(settings.allow_enum_string_comparison);

        config.ignore_all_actual_null_fields = settings.ignore_all_actual_null_fields;
        config.ignore_all_expected_null_fields = settings.ignore_all_expected_null_fields;
        config.ignore_all_actual_empty_optional_fields =
            settings.ignore_all_actual_empty_optional_fields;
        config.use_overridden_equals = settings.use_overridden_equals;
        config.ignore_collection_order = settings.ignore_collection_order;

        for (field, message) in &settings.field_messages {
            config = config.with_error_message_for_fields(message.as_str(), [field.as_str()])?;
        }
        for (type_name, message) in &settings.type_messages {
            config = config.with_error_message_for_type(message.as_str(), type_name.as_str())?;
        }
        Ok(config)
    }

    /// The plain-data part of this configuration. Registered comparators and
    /// predicates are not included.
    pub fn to_settings(&self) -> ComparisonSettings {
        ComparisonSettings {
            strict_type_checking: self.strict_type_checking,
            ignore_all_actual_null_fields: self.ignore_all_actual_null_fields,
            ignore_all_expected_null_fields: self.ignore_all_expected_null_fields,
            ignore_all_actual_empty_optional_fields: self.ignore_all_actual_empty_optional_fields,
            compared_fields: self.compared_fields.iter().cloned().collect(),
            compared_types: names(&self.compared_types),
            ignored_fields: self.ignored_fields.iter().cloned().collect(),
            ignored_field_regexes: sources(&self.ignored_field_patterns),
            ignored_types: names(&self.ignored_types),
            ignored_type_regexes: sources(&self.ignored_type_patterns),
            use_overridden_equals: self.use_overridden_equals,
            ignored_overridden_equals_for_fields: self
                .ignored_overridden_equals_fields
                .iter()
                .cloned()
                .collect(),
            ignored_overridden_equals_for_types: names(&self.ignored_overridden_equals_types),
            ignored_overridden_equals_for_field_regexes: sources(
                &self.ignored_overridden_equals_patterns,
            ),
            ignore_collection_order: self.ignore_collection_order,
            ignored_collection_order_in_fields: self
                .ignored_collection_order_fields
                .iter()
                .cloned()
                .collect(),
            ignored_collection_order_in_field_regexes: sources(
                &self.ignored_collection_order_patterns,
            ),
            allow_enum_string_comparison: self.allow_enum_string_comparison,
            field_messages: self.field_messages.clone(),
            type_messages: self
                .type_messages
                .iter()
                .map(|(t, m)| (t.as_str().to_string(), m.clone()))
                .collect(),
        }
    }
}
