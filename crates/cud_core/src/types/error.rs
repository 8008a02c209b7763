//! Error types for structured error handling.
//!
//! This module provides:
//! - `AnalyticsError`: Errors surfaced by every analytics component
//! - `SolverError`: Errors from root-finding and optimisation solvers

use thiserror::Error;

/// Categorised analytics errors.
///
/// Each variant maps to a recovery policy applied by the orchestration layer:
///
/// # Variants
/// - `InsufficientData`: Series too short for an estimator or forecaster step;
///   the caller skips that asset or step
/// - `NumericalDivergence`: An optimiser or root finder failed to converge; the
///   caller surfaces an explicit failure marker
/// - `InvalidParameter`: Out-of-domain input; fatal for that computation only
/// - `DegenerateInput`: Input for which no well-defined answer exists
///
/// # Examples
/// ```
/// use cud_core::types::AnalyticsError;
///
/// let err = AnalyticsError::invalid_parameter("volatility", -0.2, "must be non-negative");
/// assert_eq!(
///     format!("{}", err),
///     "Invalid parameter 'volatility' = -0.2: must be non-negative"
/// );
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalyticsError {
    /// Not enough observations for the requested computation.
    #[error("Insufficient data for {context}: got {got}, need at least {need}")]
    InsufficientData {
        /// What was being computed
        context: String,
        /// Number of observations provided
        got: usize,
        /// Minimum number of observations required
        need: usize,
    },

    /// Iterative method did not converge.
    #[error("Numerical divergence in {context} after {iterations} iterations")]
    NumericalDivergence {
        /// What was being solved
        context: String,
        /// Number of iterations attempted
        iterations: usize,
    },

    /// Parameter outside its valid domain.
    #[error("Invalid parameter '{name}' = {value}: {constraint}")]
    InvalidParameter {
        /// Parameter name
        name: String,
        /// Offending value
        value: f64,
        /// Constraint that was violated
        constraint: String,
    },

    /// Input admits no well-defined answer.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

impl AnalyticsError {
    /// Create an `InsufficientData` error.
    pub fn insufficient_data(context: impl Into<String>, got: usize, need: usize) -> Self {
        Self::InsufficientData {
            context: context.into(),
            got,
            need,
        }
    }

    /// Create a `NumericalDivergence` error.
    pub fn divergence(context: impl Into<String>, iterations: usize) -> Self {
        Self::NumericalDivergence {
            context: context.into(),
            iterations,
        }
    }

    /// Create an `InvalidParameter` error.
    pub fn invalid_parameter(
        name: impl Into<String>,
        value: f64,
        constraint: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            value,
            constraint: constraint.into(),
        }
    }

    /// Returns `true` when the failure only means a step should be skipped.
    ///
    /// Insufficient data is a precondition, not a fault.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::InsufficientData { .. })
    }
}

/// Root-finding and optimisation solver errors.
///
/// # Variants
/// - `MaxIterationsExceeded`: Solver failed to converge within iteration limit
/// - `NoBracket`: Function values at bracket endpoints have same sign
/// - `NumericalInstability`: General numerical instability
///
/// # Examples
/// ```
/// use cud_core::types::SolverError;
///
/// let err = SolverError::MaxIterationsExceeded { iterations: 100 };
/// assert!(format!("{}", err).contains("100 iterations"));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverError {
    /// Solver failed to converge within maximum iterations.
    #[error("Failed to converge after {iterations} iterations")]
    MaxIterationsExceeded {
        /// Number of iterations attempted
        iterations: usize,
    },

    /// No valid bracket (function values at endpoints have same sign).
    #[error("No bracket: f({a}) and f({b}) have same sign")]
    NoBracket {
        /// Left bracket endpoint
        a: f64,
        /// Right bracket endpoint
        b: f64,
    },

    /// Numerical instability during computation.
    #[error("Numerical instability: {0}")]
    NumericalInstability(String),
}

impl From<SolverError> for AnalyticsError {
    fn from(err: SolverError) -> Self {
        match err {
            SolverError::MaxIterationsExceeded { iterations } => {
                AnalyticsError::divergence("solver", iterations)
            }
            SolverError::NoBracket { .. } | SolverError::NumericalInstability(_) => {
                AnalyticsError::divergence(err.to_string(), 0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_display() {
        let err = AnalyticsError::insufficient_data("demand forecast", 12, 24);
        assert_eq!(
            format!("{}", err),
            "Insufficient data for demand forecast: got 12, need at least 24"
        );
        assert!(err.is_precondition());
    }

    #[test]
    fn test_divergence_display() {
        let err = AnalyticsError::divergence("IRR", 100);
        assert!(format!("{}", err).contains("IRR after 100 iterations"));
        assert!(!err.is_precondition());
    }

    #[test]
    fn test_degenerate_display() {
        let err = AnalyticsError::DegenerateInput("zero spend".to_string());
        assert_eq!(format!("{}", err), "Degenerate input: zero spend");
    }

    #[test]
    fn test_solver_error_conversion() {
        let err: AnalyticsError = SolverError::MaxIterationsExceeded { iterations: 7 }.into();
        match err {
            AnalyticsError::NumericalDivergence { iterations, .. } => assert_eq!(iterations, 7),
            other => panic!("Expected NumericalDivergence, got {:?}", other),
        }

        let err: AnalyticsError = SolverError::NoBracket { a: 0.0, b: 1.0 }.into();
        assert!(matches!(err, AnalyticsError::NumericalDivergence { .. }));
    }

    #[test]
    fn test_error_trait_implementation() {
        let err = AnalyticsError::invalid_parameter("confidence_level", 1.5, "must be in (0, 1)");
        let _: &dyn std::error::Error = &err;
    }
}
