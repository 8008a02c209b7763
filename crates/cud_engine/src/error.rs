//! Engine error types.

use cud_core::types::AnalyticsError;
use thiserror::Error;

/// Errors that stop an analysis before any component runs.
///
/// Component failures never surface here; they are recorded per component
/// in the composite result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// A mandatory configuration scalar was not supplied.
    #[error("Missing configuration value: {0}")]
    MissingConfig(String),

    /// A configuration value is outside its valid domain.
    #[error("Invalid configuration value '{name}': {reason}")]
    InvalidConfig {
        /// Configuration key
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The configuration text is not valid TOML or has unknown keys.
    #[error("Configuration parse error: {0}")]
    ConfigParse(String),

    /// The configuration file could not be read.
    #[error("Configuration file error: {0}")]
    ConfigFile(String),
}

impl EngineError {
    pub(crate) fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<AnalyticsError> for EngineError {
    fn from(err: AnalyticsError) -> Self {
        match err {
            AnalyticsError::InvalidParameter {
                name, constraint, ..
            } => Self::InvalidConfig {
                name,
                reason: constraint,
            },
            other => Self::invalid("configuration", other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = EngineError::MissingConfig("risk_free_rate".to_string());
        assert_eq!(format!("{}", err), "Missing configuration value: risk_free_rate");

        let err = EngineError::invalid("confidence_level", "must be in (0, 1)");
        assert_eq!(
            format!("{}", err),
            "Invalid configuration value 'confidence_level': must be in (0, 1)"
        );
    }

    #[test]
    fn test_from_analytics_error() {
        let err: EngineError =
            AnalyticsError::invalid_parameter("horizon", 0.0, "must be positive").into();
        assert_eq!(err, EngineError::invalid("horizon", "must be positive"));
    }
}
