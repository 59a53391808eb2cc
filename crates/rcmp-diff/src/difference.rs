use std::fmt;

use rcmp_types::{FieldPath, Value};

/// A user-supplied message replacing the default rendering of a difference.
///
/// `{0}`, `{1}` and `{2}` in the template expand to the path, the actual
/// value and the expected value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CustomMessage {
    pub template: String,
    pub args: Vec<String>,
}

impl CustomMessage {
    pub fn new(template: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            template: template.into(),
            args,
        }
    }

    /// The template with positional arguments substituted.
    pub fn render(&self) -> String {
        self.args
            .iter()
            .enumerate()
            .fold(self.template.clone(), |text, (i, arg)| {
                text.replace(&format!("{{{i}}}"), arg)
            })
    }
}

/// One discrepancy found during a comparison.
#[derive(Clone, Debug)]
pub struct ComparisonDifference {
    /// Location of the discrepancy, root for top-level differences.
    pub path: FieldPath,
    pub actual: Value,
    pub expected: Value,
    /// Extra detail explaining why the values were considered different.
    pub description: Option<String>,
    /// Overrides the default rendering when set.
    pub message: Option<CustomMessage>,
}

impl ComparisonDifference {
    pub fn new(path: FieldPath, actual: Value, expected: Value) -> Self {
        Self {
            path,
            actual,
            expected,
            description: None,
            message: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_message(mut self, message: CustomMessage) -> Self {
        self.message = Some(message);
        self
    }

    /// Returns `true` if the difference concerns the compared values
    /// themselves rather than one of their members.
    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    /// The multi-line block used in failure reports.
    pub fn multi_line_description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ComparisonDifference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(message) = &self.message {
            return f.write_str(&message.render());
        }
        if self.is_root() {
            writeln!(f, "Top level actual and expected objects differ:")?;
        } else {
            writeln!(f, "field/property '{}' differ:", self.path)?;
        }
        writeln!(f, "- actual value  : {}", self.actual)?;
        write!(f, "- expected value: {}", self.expected)?;
        if let Some(description) = &self.description {
            write!(f, "\n{description}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_difference_block() {
        let diff = ComparisonDifference::new(
            FieldPath::root().field("name"),
            Value::str("Frodo"),
            Value::str("Frodon"),
        );
        assert_eq!(
            diff.to_string(),
            "field/property 'name' differ:\n- actual value  : \"Frodo\"\n- expected value: \"Frodon\""
        );
    }

    #[test]
    fn root_difference_block_with_description() {
        let diff = ComparisonDifference::new(FieldPath::root(), Value::Int(1), Value::Null)
            .with_description("expected was null");
        assert!(diff.is_root());
        assert_eq!(
            diff.multi_line_description(),
            "Top level actual and expected objects differ:\n- actual value  : 1\n- expected value: null\nexpected was null"
        );
    }

    #[test]
    fn custom_message_replaces_the_block() {
        let path = FieldPath::root().field("height");
        let message = CustomMessage::new(
            "The field '{0}' differ: {1} vs {2}",
            vec![path.to_string(), "1.2".into(), "1.4".into()],
        );
        let diff = ComparisonDifference::new(path, Value::Float(1.2), Value::Float(1.4))
            .with_message(message);
        assert_eq!(diff.to_string(), "The field 'height' differ: 1.2 vs 1.4");
    }

    #[test]
    fn template_without_placeholders_is_kept_verbatim() {
        let message = CustomMessage::new("heights differ", vec!["height".into()]);
        assert_eq!(message.render(), "heights differ");
    }
}
