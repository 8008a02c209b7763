//! Per-component result of an analysis run.

use cud_core::types::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Result of one analytics component.
///
/// A skipped component had an unmet precondition (too little data, no
/// eligible assets); a failed one hit an error. Neither affects the other
/// components.
///
/// # Examples
/// ```
/// use cud_core::types::AnalyticsError;
/// use cud_engine::Outcome;
///
/// let short: Outcome<f64> =
///     Outcome::from_result(Err(AnalyticsError::insufficient_data("forecast", 12, 24)));
/// assert!(short.is_skipped());
///
/// let done = Outcome::from_result(Ok::<_, AnalyticsError>(1.5));
/// assert_eq!(done.computed(), Some(&1.5));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The component produced a value.
    Computed(T),
    /// A precondition was not met.
    Skipped {
        /// Why the component did not run
        reason: String,
    },
    /// The component ran and failed.
    Failed {
        /// Error description
        error: String,
    },
}

impl<T> Outcome<T> {
    /// Maps a component result, treating precondition errors as skips.
    pub fn from_result(result: Result<T, AnalyticsError>) -> Self {
        match result {
            Ok(value) => Self::Computed(value),
            Err(err) if err.is_precondition() => Self::Skipped {
                reason: err.to_string(),
            },
            Err(err) => Self::Failed {
                error: err.to_string(),
            },
        }
    }

    /// A skipped outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// The computed value, if any.
    pub fn computed(&self) -> Option<&T> {
        match self {
            Self::Computed(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a value was computed.
    pub fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }

    /// Whether the component was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// Whether the component failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Lower-case status name used in logs.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Computed(_) => "computed",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        let failed: Outcome<()> =
            Outcome::from_result(Err(AnalyticsError::invalid_parameter("spot", -1.0, "must be positive")));
        assert!(failed.is_failed());
        assert_eq!(failed.status(), "failed");

        let diverged: Outcome<()> = Outcome::from_result(Err(AnalyticsError::divergence("IRR", 50)));
        assert!(diverged.is_failed());
    }

    #[test]
    fn test_skipped_reason_carries_message() {
        let outcome: Outcome<()> =
            Outcome::from_result(Err(AnalyticsError::insufficient_data("demand forecast", 12, 24)));
        match outcome {
            Outcome::Skipped { reason } => assert!(reason.contains("got 12, need at least 24")),
            other => panic!("Expected Skipped, got {:?}", other),
        }
    }
}
