use std::fmt;

use regex::Regex;

use crate::error::{ConfigError, ConfigResult};

/// A regular expression that must match the whole input.
///
/// Patterns are matched against rule paths (`home.address.street`) or
/// fully qualified type names. `.*id` matches `id` and `person.id` but not
/// `identity`.
#[derive(Clone, Debug)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    /// Compile a pattern. Anchors are added around the whole expression.
    pub fn new(pattern: &str) -> ConfigResult<Self> {
        let regex =
            Regex::new(&format!("^(?:{pattern})$")).map_err(|source| ConfigError::InvalidRegex {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Compile every pattern, failing on the first invalid one.
    pub fn compile_all<I, S>(patterns: I) -> ConfigResult<Vec<Self>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        patterns
            .into_iter()
            .map(|p| Self::new(p.as_ref()))
            .collect()
    }

    /// Returns `true` if the whole of `text` matches.
    pub fn matches(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// The pattern as registered, without the added anchors.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for FieldPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_whole_string_only() {
        let pattern = FieldPattern::new(".*id").unwrap();
        assert!(pattern.matches("id"));
        assert!(pattern.matches("person.id"));
        assert!(!pattern.matches("identity"));
    }

    #[test]
    fn alternation_is_anchored_as_a_group() {
        let pattern = FieldPattern::new("name|age").unwrap();
        assert!(pattern.matches("age"));
        assert!(!pattern.matches("page"));
        assert!(!pattern.matches("names"));
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = FieldPattern::new("(unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRegex { ref pattern, .. } if pattern == "(unclosed"));
    }

    #[test]
    fn display_keeps_the_registered_source() {
        let pattern = FieldPattern::new("home\\..*").unwrap();
        assert_eq!(pattern.to_string(), "home\\..*");
        assert_eq!(pattern.as_str(), "home\\..*");
    }
}
