//! Projected gradient ascent over the probability simplex.
//!
//! Maximises a smooth objective `f(w)` subject to `Σw = 1` and `w ≥ 0`.
//! Each iteration takes a gradient step, projects it back onto the simplex
//! and backtracks until the Armijo sufficient-increase condition holds.
//!
//! ```text
//! w_{k+1} = Π(w_k + t ∇f(w_k))
//! f(w_{k+1}) ≥ f(w_k) + c ∇f(w_k)·(w_{k+1} − w_k)
//! ```

use crate::types::SolverError;

/// Configuration for [`SimplexOptimiser`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimplexConfig {
    /// Stop when the accepted step moves the weights by less than this (L2).
    pub tolerance: f64,
    /// Stop when an accepted step changes the objective by at most
    /// `objective_tolerance · (1 + |f|)`.
    pub objective_tolerance: f64,
    /// Stop when the projected gradient step `‖Π(w + ∇f) − w‖` is at most
    /// this.
    pub gradient_tolerance: f64,
    /// Maximum number of accepted or attempted gradient steps.
    pub max_iterations: usize,
    /// Step length tried first on every iteration.
    pub initial_step: f64,
    /// Step shrink factor on a failed Armijo test.
    pub backtrack: f64,
    /// Armijo sufficient-increase constant, in (0, 0.5].
    pub armijo: f64,
    /// Smallest step length tried before declaring a stationary point.
    pub min_step: f64,
}

impl Default for SimplexConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            objective_tolerance: 1e-13,
            gradient_tolerance: 1e-10,
            max_iterations: 1_000,
            initial_step: 1.0,
            backtrack: 0.5,
            armijo: 0.3,
            min_step: 1e-14,
        }
    }
}

/// Result of a simplex-constrained optimisation.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexResult {
    /// Final weights, non-negative and summing to one.
    pub weights: Vec<f64>,
    /// Objective value at `weights`.
    pub objective: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether the stopping criterion was met.
    pub converged: bool,
}

/// Long-only, fully invested weight optimiser.
///
/// # Example
///
/// ```
/// use cud_core::math::solvers::SimplexOptimiser;
///
/// // Maximise -(w0 - 0.8)^2 - (w1 - 0.2)^2 on the simplex
/// let f = |w: &[f64]| -(w[0] - 0.8).powi(2) - (w[1] - 0.2).powi(2);
/// let grad = |w: &[f64]| vec![-2.0 * (w[0] - 0.8), -2.0 * (w[1] - 0.2)];
///
/// let result = SimplexOptimiser::with_defaults()
///     .maximise(f, grad, &[0.5, 0.5])
///     .unwrap();
/// assert!((result.weights[0] - 0.8).abs() < 1e-6);
/// ```
#[derive(Debug, Clone)]
pub struct SimplexOptimiser {
    config: SimplexConfig,
}

impl SimplexOptimiser {
    /// Create an optimiser with the given configuration.
    pub fn new(config: SimplexConfig) -> Self {
        Self { config }
    }

    /// Create an optimiser with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(SimplexConfig::default())
    }

    /// Get the optimiser configuration.
    pub fn config(&self) -> &SimplexConfig {
        &self.config
    }

    /// Maximise `f` over the simplex starting from the projection of
    /// `initial`.
    ///
    /// # Errors
    /// * `SolverError::NumericalInstability` for an empty start or a
    ///   non-finite objective at the start
    /// * `SolverError::MaxIterationsExceeded` if the iteration limit is hit
    pub fn maximise<F, G>(&self, f: F, grad: G, initial: &[f64]) -> Result<SimplexResult, SolverError>
    where
        F: Fn(&[f64]) -> f64,
        G: Fn(&[f64]) -> Vec<f64>,
    {
        if initial.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty weight vector".to_string(),
            ));
        }

        let mut w = project_onto_simplex(initial);
        let mut fw = f(&w);
        if !fw.is_finite() {
            return Err(SolverError::NumericalInstability(
                "Non-finite objective at starting point".to_string(),
            ));
        }

        for iteration in 0..self.config.max_iterations {
            let g = grad(&w);
            if g.len() != w.len() || g.iter().any(|x| !x.is_finite()) {
                return Err(SolverError::NumericalInstability(
                    "Non-finite gradient".to_string(),
                ));
            }

            let full_step: Vec<f64> = w.iter().zip(&g).map(|(wi, gi)| wi + gi).collect();
            if distance(&project_onto_simplex(&full_step), &w) <= self.config.gradient_tolerance {
                return Ok(SimplexResult {
                    weights: w,
                    objective: fw,
                    iterations: iteration,
                    converged: true,
                });
            }

            let mut t = self.config.initial_step;
            let accepted = loop {
                let trial: Vec<f64> = w.iter().zip(&g).map(|(wi, gi)| wi + t * gi).collect();
                let trial = project_onto_simplex(&trial);
                let f_trial = f(&trial);
                let ascent: f64 = g.iter().zip(trial.iter().zip(&w)).map(|(gi, (y, x))| gi * (y - x)).sum();
                if f_trial.is_finite() && f_trial >= fw + self.config.armijo * ascent {
                    break Some((trial, f_trial));
                }
                t *= self.config.backtrack;
                if t < self.config.min_step {
                    break None;
                }
            };

            let Some((next, f_next)) = accepted else {
                return Ok(SimplexResult {
                    weights: w,
                    objective: fw,
                    iterations: iteration + 1,
                    converged: true,
                });
            };

            let moved = distance(&next, &w);
            let gained = (f_next - fw).abs();
            let stalled = gained <= self.config.objective_tolerance * (1.0 + fw.abs());
            w = next;
            fw = f_next;

            if moved < self.config.tolerance || stalled {
                return Ok(SimplexResult {
                    weights: w,
                    objective: fw,
                    iterations: iteration + 1,
                    converged: true,
                });
            }
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// Euclidean projection onto `{w : Σw = 1, w ≥ 0}`.
///
/// Sort-based algorithm of Duchi et al. (2008).
///
/// ```
/// use cud_core::math::solvers::project_onto_simplex;
///
/// let w = project_onto_simplex(&[2.0, 0.0]);
/// assert_eq!(w, vec![1.0, 0.0]);
/// ```
pub fn project_onto_simplex(v: &[f64]) -> Vec<f64> {
    if v.is_empty() {
        return Vec::new();
    }
    let mut sorted = v.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));

    let mut cumulative = 0.0;
    let mut theta = 0.0;
    for (j, u) in sorted.iter().enumerate() {
        cumulative += u;
        let candidate = (cumulative - 1.0) / (j + 1) as f64;
        if u - candidate > 0.0 {
            theta = candidate;
        }
    }

    v.iter().map(|x| (x - theta).max(0.0)).collect()
}
