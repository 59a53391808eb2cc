use std::fmt;

use rcmp_config::RecursiveComparisonConfiguration;
use rcmp_diff::ComparisonDifference;
use rcmp_types::Value;

/// Report of an equality assertion that found differences.
///
/// Keeps the differences in traversal order together with the configuration
/// summary in effect, so a failure can be reproduced from its message alone.
#[derive(Clone, Debug)]
pub struct ComparisonFailure {
    pub actual: Value,
    pub expected: Value,
    pub differences: Vec<ComparisonDifference>,
    /// Multi-line summary of the configuration the values were compared with.
    pub configuration: String,
}

impl ComparisonFailure {
    pub fn new(
        actual: Value,
        expected: Value,
        differences: Vec<ComparisonDifference>,
        configuration: &RecursiveComparisonConfiguration,
    ) -> Self {
        Self {
            actual,
            expected,
            differences,
            configuration: configuration.multi_line_description(),
        }
    }

    pub fn differences(&self) -> &[ComparisonDifference] {
        &self.differences
    }

    /// Paths of the differences, root rendered as an empty string.
    pub fn paths(&self) -> Vec<String> {
        self.differences.iter().map(|d| d.path.to_string()).collect()
    }
}

impl fmt::Display for ComparisonFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.differences.len();
        writeln!(f, "Expecting actual:")?;
        writeln!(f, "  {}", self.actual)?;
        writeln!(f, "to be equal to:")?;
        writeln!(f, "  {}", self.expected)?;
        writeln!(
            f,
            "when recursively comparing field by field, but found the following {} difference{}:",
            count,
            if count == 1 { "" } else { "s" }
        )?;
        for difference in &self.differences {
            write!(f, "\n{}\n", difference.multi_line_description())?;
        }
        writeln!(f)?;
        write!(f, "The recursive comparison was performed with this configuration:\n{}", self.configuration)
    }
}
