//! Solver configuration types.

use crate::types::SolverError;
use num_traits::Float;

/// Configuration for root-finding algorithms.
///
/// # Example
///
/// ```
/// use cud_core::math::solvers::SolverConfig;
///
/// let config: SolverConfig<f64> = SolverConfig::default();
/// assert!(config.tolerance < 1e-8);
///
/// let custom = SolverConfig::new(1e-12, 200).unwrap();
/// assert_eq!(custom.max_iterations, 200);
/// assert!(SolverConfig::new(0.0_f64, 10).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig<T: Float> {
    /// Convergence tolerance on both `|f(x)|` and the bracket half-width.
    pub tolerance: T,

    /// Maximum number of iterations before giving up.
    pub max_iterations: usize,
}

impl<T: Float> Default for SolverConfig<T> {
    /// Tolerance 1e-10, 100 iterations.
    fn default() -> Self {
        Self {
            tolerance: T::from(1e-10).unwrap_or_else(T::epsilon),
            max_iterations: 100,
        }
    }
}

impl<T: Float> SolverConfig<T> {
    /// Create a validated configuration.
    ///
    /// # Errors
    /// `SolverError::NumericalInstability` if `tolerance <= 0` or
    /// `max_iterations == 0`.
    pub fn new(tolerance: T, max_iterations: usize) -> Result<Self, SolverError> {
        if !(tolerance > T::zero()) {
            return Err(SolverError::NumericalInstability(
                "tolerance must be positive".to_string(),
            ));
        }
        if max_iterations == 0 {
            return Err(SolverError::NumericalInstability(
                "max_iterations must be > 0".to_string(),
            ));
        }
        Ok(Self {
            tolerance,
            max_iterations,
        })
    }

    /// Tighter tolerance (1e-14) and 500 iterations.
    pub fn high_precision() -> Self {
        Self {
            tolerance: T::from(1e-14).unwrap_or_else(T::epsilon),
            max_iterations: 500,
        }
    }
}
