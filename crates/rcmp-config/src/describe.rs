//! Human-readable summary of the active policies, appended to failure
//! reports so a failing comparison can be reproduced.

use std::fmt::Write;

use crate::config::RecursiveComparisonConfiguration;
use crate::pattern::FieldPattern;

const INDENT_LEVEL_2: &str = "  -";

fn join<T: ToString>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_patterns(patterns: &[FieldPattern]) -> String {
    join(patterns.iter().map(FieldPattern::as_str))
}

impl RecursiveComparisonConfiguration {
    /// One `- ...` line per active policy.
    pub fn multi_line_description(&self) -> String {
        let mut out = String::new();
        self.describe_null_handling(&mut out);
        self.describe_field_selection(&mut out);
        self.describe_own_equality(&mut out);
        self.describe_collection_order(&mut out);
        self.describe_rules(&mut out);
        self.describe_type_checking(&mut out);
        self.describe_messages(&mut out);
        if self.allow_enum_string_comparison {
            out.push_str(
                "- enums can be compared against strings (and vice versa), e.g. Color::Red and \"Red\" are considered equal\n",
            );
        }
        out
    }

    fn describe_null_handling(&self, out: &mut String) {
        if self.ignore_all_actual_null_fields {
            out.push_str("- all actual null fields were ignored in the comparison\n");
        }
        if self.ignore_all_actual_empty_optional_fields {
            out.push_str("- all actual empty optional fields were ignored in the comparison\n");
        }
        if self.ignore_all_expected_null_fields {
            out.push_str("- all expected null fields were ignored in the comparison\n");
        }
    }

    fn describe_field_selection(&self, out: &mut String) {
        if !self.compared_fields.is_empty() {
            let _ = writeln!(
                out,
                "- the comparison was performed on the following fields: {}",
                join(&self.compared_fields)
            );
        }
        if !self.compared_types.is_empty() {
            let _ = writeln!(
                out,
                "- the comparison was performed on any fields with types: {}",
                join(&self.compared_types)
            );
        }
        if !self.ignored_fields.is_empty() {
            let _ = writeln!(
                out,
                "- the following fields were ignored in the comparison: {}",
                join(&self.ignored_fields)
            );
        }
        if !self.ignored_field_patterns.is_empty() {
            let _ = writeln!(
                out,
                "- the fields matching the following regexes were ignored in the comparison: {}",
                join_patterns(&self.ignored_field_patterns)
            );
        }
        if !self.ignored_types.is_empty() {
            let _ = writeln!(
                out,
                "- the following types were ignored in the comparison: {}",
                join(&self.ignored_types)
            );
        }
        if !self.ignored_type_patterns.is_empty() {
            let _ = writeln!(
                out,
                "- the types matching the following regexes were ignored in the comparison: {}",
                join_patterns(&self.ignored_type_patterns)
            );
        }
    }

    fn describe_own_equality(&self, out: &mut String) {
        if !self.use_overridden_equals {
            out.push_str(
                "- no overridden equals methods were used in the comparison except for built-in value types\n",
            );
            return;
        }
        out.push_str("- overridden equals methods were used in the comparison");
        let some_ignored = !self.ignored_overridden_equals_fields.is_empty()
            || !self.ignored_overridden_equals_types.is_empty()
            || !self.ignored_overridden_equals_patterns.is_empty();
        if !some_ignored {
            out.push('\n');
            return;
        }
        out.push_str(" except for:\n");
        if !self.ignored_overridden_equals_fields.is_empty() {
            let _ = writeln!(
                out,
                "{INDENT_LEVEL_2} the following fields: {}",
                join(&self.ignored_overridden_equals_fields)
            );
        }
        if !self.ignored_overridden_equals_types.is_empty() {
            let _ = writeln!(
                out,
                "{INDENT_LEVEL_2} the following types: {}",
                join(&self.ignored_overridden_equals_types)
            );
        }
        if !self.ignored_overridden_equals_patterns.is_empty() {
            let _ = writeln!(
                out,
                "{INDENT_LEVEL_2} the fields matching the following regexes: {}",
                join_patterns(&self.ignored_overridden_equals_patterns)
            );
        }
    }

    fn describe_collection_order(&self, out: &mut String) {
        if self.ignore_collection_order {
            out.push_str("- collection order was ignored in all fields in the comparison\n");
        }
        if !self.ignored_collection_order_fields.is_empty() {
            let _ = writeln!(
                out,
                "- collection order was ignored in the following fields in the comparison: {}",
                join(&self.ignored_collection_order_fields)
            );
        }
        if !self.ignored_collection_order_patterns.is_empty() {
            let _ = writeln!(
                out,
                "- collection order was ignored in the fields matching the following regexes in the comparison: {}",
                join_patterns(&self.ignored_collection_order_patterns)
            );
        }
    }

    fn describe_rules(&self, out: &mut String) {
        if !self.type_rules.is_empty() {
            out.push_str("- these types were compared with the following comparators:\n");
            for (type_name, rule) in &self.type_rules {
                let _ = writeln!(out, "{INDENT_LEVEL_2} {type_name} -> {}", rule.kind());
            }
        }
        if !self.field_rules.is_empty() {
            out.push_str("- these fields were compared with the following comparators:\n");
            for (field, rule) in &self.field_rules {
                let _ = writeln!(out, "{INDENT_LEVEL_2} {field} -> {}", rule.kind());
            }
        }
        if !self.pattern_equals.is_empty() {
            out.push_str("- the fields matching these regexes were compared with the following comparators:\n");
            for (patterns, rule) in &self.pattern_equals {
                let _ = writeln!(
                    out,
                    "{INDENT_LEVEL_2} [{}] -> {}",
                    join_patterns(patterns),
                    rule.kind()
                );
            }
        }
        if !self.field_rules.is_empty() && !self.pattern_equals.is_empty() {
            out.push_str("- field comparators take precedence over regex field matching comparators.\n");
        }
        let has_field_rules = !self.field_rules.is_empty() || !self.pattern_equals.is_empty();
        if has_field_rules && !self.type_rules.is_empty() {
            out.push_str("- field comparators take precedence over type comparators.\n");
        }
    }

    fn describe_type_checking(&self, out: &mut String) {
        if self.strict_type_checking {
            out.push_str(
                "- actual and expected objects and their fields were considered different when of incompatible types (i.e. expected type does not extend actual's type) even if all their fields match, for example a Person instance will never match a PersonDto (call with_strict_type_checking(false) to change that behavior).\n",
            );
        } else {
            out.push_str(
                "- actual and expected objects and their fields were compared field by field recursively even if they were not of the same type, this allows for example to compare a Person to a PersonDto (call with_strict_type_checking(true) to change that behavior).\n",
            );
        }
    }

    fn describe_messages(&self, out: &mut String) {
        if !self.field_messages.is_empty() {
            out.push_str("- these fields had overridden error messages:\n");
            let _ = writeln!(out, "{INDENT_LEVEL_2} {}", join(self.field_messages.keys()));
            if !self.type_messages.is_empty() {
                out.push_str("- field custom messages take precedence over type messages.\n");
            }
        }
        if !self.type_messages.is_empty() {
            out.push_str("- these types had overridden error messages:\n");
            let _ = writeln!(out, "{INDENT_LEVEL_2} {}", join(self.type_messages.keys()));
        }
    }
}
