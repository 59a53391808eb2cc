//! Error types for the configuration crate.

/// Errors raised when a configuration rule is registered or loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A field or type pattern is not a valid regular expression.
    #[error("invalid regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rule was registered without any field to apply to.
    #[error("{0} requires at least one field")]
    NoFields(&'static str),

    /// An error message override was empty.
    #[error("error message must not be empty")]
    EmptyMessage,

    /// A field location was the empty string.
    #[error("field location must not be empty")]
    EmptyFieldLocation,

    /// Settings could not be parsed from JSON.
    #[error("invalid JSON settings: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings could not be parsed from TOML.
    #[error("invalid TOML settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Convenience alias for configuration results.
pub type ConfigResult<T> = Result<T, ConfigError>;
