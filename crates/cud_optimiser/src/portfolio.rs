//! Sharpe-maximising commitment allocation.
//!
//! Resource classes are treated as assets with a diagonal covariance of
//! fixed scale `a` (0.1 by default); no cross-class covariance is estimated.
//! For weights `w` on the simplex:
//!
//! ```text
//! σ(w)   = √(a · Σ w_i²)
//! S(w)   = (μ·w − r_f) / σ(w)
//! ∂S/∂w_i = μ_i / σ − (μ·w − r_f) · a · w_i / σ³
//! ```
//!
//! The optimum is found by projected gradient ascent from equal weights and
//! is a local optimum only.

use std::collections::BTreeMap;

use cud_core::math::solvers::{SimplexConfig, SimplexOptimiser};
use cud_core::types::{AnalyticsError, SolverError};
use tracing::debug;

/// Variance scale of the diagonal covariance approximation.
pub const DIAGONAL_VARIANCE: f64 = 0.1;

/// Iteration limit of the default optimiser.
const DEFAULT_MAX_ITERATIONS: usize = 5_000;

/// Optimised allocation across resource classes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Portfolio {
    /// Weight per resource class, each in [0, 1], summing to 1.
    pub weights: BTreeMap<String, f64>,
    /// μ·w.
    pub expected_return: f64,
    /// Portfolio volatility under the diagonal covariance.
    pub volatility: f64,
    /// Sharpe ratio, 0 when the volatility is 0.
    pub sharpe_ratio: f64,
    /// Effective number of classes, 1 / Σw².
    pub diversification_ratio: f64,
    /// Optimiser iterations performed.
    pub iterations: usize,
}

impl Portfolio {
    /// Allocation with no classes.
    pub fn empty() -> Self {
        Self {
            weights: BTreeMap::new(),
            expected_return: 0.0,
            volatility: 0.0,
            sharpe_ratio: 0.0,
            diversification_ratio: 0.0,
            iterations: 0,
        }
    }

    /// Whether the allocation holds any class.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}

/// Long-only, fully invested Sharpe optimiser.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use cud_optimiser::portfolio::PortfolioOptimiser;
///
/// let optimiser = PortfolioOptimiser::new(0.03).unwrap();
/// let single = optimiser
///     .optimise(&BTreeMap::from([("e2".to_string(), 0.10)]))
///     .unwrap();
///
/// assert_eq!(single.weights["e2"], 1.0);
/// assert!((single.sharpe_ratio - 0.07 / 0.1_f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioOptimiser {
    risk_free_rate: f64,
    variance_scale: f64,
    config: SimplexConfig,
}

impl PortfolioOptimiser {
    /// Create an optimiser with the default variance scale.
    ///
    /// # Errors
    /// `InvalidParameter` for a non-finite risk-free rate.
    pub fn new(risk_free_rate: f64) -> Result<Self, AnalyticsError> {
        if !risk_free_rate.is_finite() {
            return Err(AnalyticsError::invalid_parameter(
                "risk_free_rate",
                risk_free_rate,
                "must be finite",
            ));
        }
        Ok(Self {
            risk_free_rate,
            variance_scale: DIAGONAL_VARIANCE,
            config: SimplexConfig {
                max_iterations: DEFAULT_MAX_ITERATIONS,
                ..SimplexConfig::default()
            },
        })
    }

    /// Replace the diagonal variance scale.
    ///
    /// # Errors
    /// `InvalidParameter` if the scale is negative or not finite.
    pub fn with_variance_scale(mut self, variance_scale: f64) -> Result<Self, AnalyticsError> {
        if !(variance_scale.is_finite() && variance_scale >= 0.0) {
            return Err(AnalyticsError::invalid_parameter(
                "variance_scale",
                variance_scale,
                "must be finite and non-negative",
            ));
        }
        self.variance_scale = variance_scale;
        Ok(self)
    }

    /// Replace the simplex optimiser settings.
    pub fn with_solver_config(mut self, config: SimplexConfig) -> Self {
        self.config = config;
        self
    }

    /// Risk-free rate in use.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// Diagonal variance scale in use.
    pub fn variance_scale(&self) -> f64 {
        self.variance_scale
    }

    fn volatility(&self, w: &[f64]) -> f64 {
        (self.variance_scale * w.iter().map(|x| x * x).sum::<f64>()).sqrt()
    }

    /// Sharpe ratio with the zero-volatility case mapped to −∞.
    fn sharpe(&self, mu: &[f64], w: &[f64]) -> f64 {
        let vol = self.volatility(w);
        if vol <= 0.0 {
            return f64::NEG_INFINITY;
        }
        (dot(mu, w) - self.risk_free_rate) / vol
    }

    fn sharpe_gradient(&self, mu: &[f64], w: &[f64]) -> Vec<f64> {
        let vol = self.volatility(w);
        let excess = dot(mu, w) - self.risk_free_rate;
        let vol3 = vol * vol * vol;
        mu.iter()
            .zip(w)
            .map(|(m, wi)| m / vol - excess * self.variance_scale * wi / vol3)
            .collect()
    }

    fn assemble(&self, ids: &[&String], mu: &[f64], w: Vec<f64>, iterations: usize) -> Portfolio {
        let sharpe = self.sharpe(mu, &w);
        let sum_sq: f64 = w.iter().map(|x| x * x).sum();
        Portfolio {
            expected_return: dot(mu, &w),
            volatility: self.volatility(&w),
            sharpe_ratio: if sharpe.is_finite() { sharpe } else { 0.0 },
            diversification_ratio: if sum_sq > 0.0 { 1.0 / sum_sq } else { 0.0 },
            weights: ids.iter().map(|id| (*id).clone()).zip(w).collect(),
            iterations,
        }
    }

    /// Optimise the allocation for the given expected returns.
    ///
    /// No classes give an empty portfolio; one class is held in full.
    ///
    /// # Errors
    /// - `InvalidParameter` if an expected return is not finite
    /// - `NumericalDivergence` if the optimiser does not converge
    pub fn optimise(
        &self,
        expected_returns: &BTreeMap<String, f64>,
    ) -> Result<Portfolio, AnalyticsError> {
        if let Some((id, r)) = expected_returns.iter().find(|(_, r)| !r.is_finite()) {
            return Err(AnalyticsError::invalid_parameter(
                format!("expected_return[{}]", id),
                *r,
                "must be finite",
            ));
        }

        let ids: Vec<&String> = expected_returns.keys().collect();
        let mu: Vec<f64> = expected_returns.values().copied().collect();
        let n = mu.len();

        match n {
            0 => return Ok(Portfolio::empty()),
            1 => return Ok(self.assemble(&ids, &mu, vec![1.0], 0)),
            _ => {}
        }

        let equal = vec![1.0 / n as f64; n];
        if self.variance_scale == 0.0 {
            return Ok(self.assemble(&ids, &mu, equal, 0));
        }

        let result = SimplexOptimiser::new(self.config)
            .maximise(
                |w| self.sharpe(&mu, w),
                |w| self.sharpe_gradient(&mu, w),
                &equal,
            )
            .map_err(|err| match err {
                SolverError::MaxIterationsExceeded { iterations } => {
                    AnalyticsError::divergence("portfolio optimisation", iterations)
                }
                other => AnalyticsError::from(other),
            })?;

        debug!(
            assets = n,
            iterations = result.iterations,
            sharpe = result.objective,
            "portfolio optimised"
        );
        Ok(self.assemble(&ids, &mu, result.weights, result.iterations))
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
