//! Levenberg-Marquardt nonlinear least-squares solver.
//!
//! Each iteration solves the damped normal equations
//!
//! ```text
//! (J^T J + λI) δ = -J^T r
//! p_{n+1} = p_n + δ
//! ```
//!
//! with a forward-difference Jacobian `J`. The damping `λ` shrinks after an
//! accepted step and grows after a rejected one.

use crate::types::SolverError;

/// Configuration for the Levenberg-Marquardt solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LMConfig {
    /// Stop when the residual norm falls below this value.
    pub tolerance: f64,
    /// Maximum number of iterations.
    pub max_iterations: usize,
    /// Initial damping factor.
    pub initial_lambda: f64,
    /// Factor applied to lambda on a rejected step.
    pub lambda_up: f64,
    /// Factor applied to lambda on an accepted step.
    pub lambda_down: f64,
    /// Lower bound on lambda.
    pub min_lambda: f64,
    /// Upper bound on lambda. Reaching it ends the search.
    pub max_lambda: f64,
    /// Stop when the relative parameter step falls below this value.
    pub param_tolerance: f64,
}

impl Default for LMConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-10,
            max_iterations: 100,
            initial_lambda: 1e-3,
            lambda_up: 10.0,
            lambda_down: 0.1,
            min_lambda: 1e-10,
            max_lambda: 1e10,
            param_tolerance: 1e-10,
        }
    }
}

impl LMConfig {
    /// Create a configuration with the given tolerance and iteration limit.
    pub fn new(tolerance: f64, max_iterations: usize) -> Self {
        Self {
            tolerance,
            max_iterations,
            ..Default::default()
        }
    }
}

/// Result of a Levenberg-Marquardt run.
#[derive(Debug, Clone, PartialEq)]
pub struct LMResult {
    /// Final parameters.
    pub params: Vec<f64>,
    /// Final residual sum of squares.
    pub residual_ss: f64,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether a convergence criterion was met.
    pub converged: bool,
    /// Final damping factor.
    pub final_lambda: f64,
}

impl LMResult {
    /// Root mean square error over `n_observations` residuals.
    pub fn rmse(&self, n_observations: usize) -> f64 {
        if n_observations == 0 {
            return 0.0;
        }
        (self.residual_ss / n_observations as f64).sqrt()
    }
}

/// Levenberg-Marquardt solver for `min_p ||r(p)||^2`.
#[derive(Debug, Clone)]
pub struct LevenbergMarquardtSolver {
    config: LMConfig,
}

impl LevenbergMarquardtSolver {
    /// Create a new LM solver with the given configuration.
    pub fn new(config: LMConfig) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(LMConfig::default())
    }

    /// Get the solver configuration.
    pub fn config(&self) -> &LMConfig {
        &self.config
    }

    /// Minimise the sum of squared residuals starting from `initial_params`.
    ///
    /// A run that exhausts its iterations still returns `Ok` with
    /// `converged == false` and the best parameters found.
    ///
    /// # Errors
    /// `SolverError::NumericalInstability` for empty parameter or residual
    /// vectors, or a non-finite initial residual.
    pub fn solve<F>(&self, residuals: F, initial_params: Vec<f64>) -> Result<LMResult, SolverError>
    where
        F: Fn(&[f64]) -> Vec<f64>,
    {
        let n_params = initial_params.len();
        if n_params == 0 {
            return Err(SolverError::NumericalInstability(
                "Empty parameter vector".to_string(),
            ));
        }

        let mut params = initial_params;
        let mut lambda = self.config.initial_lambda;

        let mut r = residuals(&params);
        if r.is_empty() {
            return Err(SolverError::NumericalInstability(
                "Empty residual vector".to_string(),
            ));
        }
        let mut ss = sum_of_squares(&r);
        if !ss.is_finite() {
            return Err(SolverError::NumericalInstability(
                "Non-finite initial residuals".to_string(),
            ));
        }

        let done = |params: Vec<f64>, ss, iterations, converged, lambda| LMResult {
            params,
            residual_ss: ss,
            iterations,
            converged,
            final_lambda: lambda,
        };

        for iteration in 0..self.config.max_iterations {
            if ss.sqrt() < self.config.tolerance {
                return Ok(done(params, ss, iteration, true, lambda));
            }

            let jacobian = forward_jacobian(&residuals, &params, &r);

            let delta = match solve_normal_equations(&jacobian, &r, lambda, n_params) {
                Some(d) => d,
                None => {
                    lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
                    continue;
                }
            };

            let step = sum_of_squares(&delta).sqrt();
            let scale = sum_of_squares(&params).sqrt().max(1.0);
            if step / scale < self.config.param_tolerance {
                return Ok(done(params, ss, iteration, true, lambda));
            }

            let trial: Vec<f64> = params.iter().zip(&delta).map(|(p, d)| p + d).collect();
            let trial_r = residuals(&trial);
            let trial_ss = sum_of_squares(&trial_r);

            if trial_ss.is_finite() && trial_ss < ss {
                params = trial;
                r = trial_r;
                ss = trial_ss;
                lambda = (lambda * self.config.lambda_down).max(self.config.min_lambda);
            } else {
                if lambda >= self.config.max_lambda {
                    // Flat in every direction the damping allows
                    return Ok(done(params, ss, iteration, true, lambda));
                }
                lambda = (lambda * self.config.lambda_up).min(self.config.max_lambda);
            }
        }

        Ok(done(
            params,
            ss,
            self.config.max_iterations,
            false,
            lambda,
        ))
    }
}

/// Forward-difference Jacobian, rows indexed by residual.
fn forward_jacobian<F>(residuals: &F, params: &[f64], r0: &[f64]) -> Vec<Vec<f64>>
where
    F: Fn(&[f64]) -> Vec<f64>,
{
    let n_params = params.len();
    let mut jacobian = vec![vec![0.0; n_params]; r0.len()];

    for j in 0..n_params {
        let h = 1e-8 * params[j].abs().max(1.0);
        let mut bumped = params.to_vec();
        bumped[j] += h;
        let r_plus = residuals(&bumped);
        for (row, (rp, r)) in jacobian.iter_mut().zip(r_plus.iter().zip(r0)) {
            row[j] = (rp - r) / h;
        }
    }

    jacobian
}

fn solve_normal_equations(
    jacobian: &[Vec<f64>],
    residuals: &[f64],
    lambda: f64,
    n_params: usize,
) -> Option<Vec<f64>> {
    let mut jtj = vec![vec![0.0; n_params]; n_params];
    let mut jtr = vec![0.0; n_params];

    for (row, r) in jacobian.iter().zip(residuals) {
        for i in 0..n_params {
            jtr[i] -= row[i] * r;
            for j in 0..=i {
                jtj[i][j] += row[i] * row[j];
            }
        }
    }
    for i in 0..n_params {
        for j in 0..i {
            jtj[j][i] = jtj[i][j];
        }
        jtj[i][i] += lambda;
    }

    solve_cholesky(&jtj, &jtr)
}

#[inline]
fn sum_of_squares(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Solve `Ax = b` for symmetric positive definite `A`.
fn solve_cholesky(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 || !sum.is_finite() {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_config_default() {
        let config = LMConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert!(config.initial_lambda > 0.0);
    }

    #[test]
    fn test_linear_residuals() {
        let solver = LevenbergMarquardtSolver::with_defaults();
        let result = solver
            .solve(|p: &[f64]| vec![p[0] - 2.0, p[1] + 1.5], vec![10.0, 10.0])
            .unwrap();
        assert!(result.converged);
        assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(result.params[1], -1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_exponential_fit() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys: Vec<f64> = xs.iter().map(|x: &f64| 2.0 * (-0.5 * x).exp()).collect();
        let residuals = |p: &[f64]| -> Vec<f64> {
            xs.iter()
                .zip(&ys)
                .map(|(x, y)| p[0] * (-p[1] * x).exp() - y)
                .collect()
        };
        let result = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![1.0, 1.0])
            .unwrap();
        assert_relative_eq!(result.params[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(result.params[1], 0.5, epsilon = 1e-5);
        assert!(result.rmse(xs.len()) < 1e-6);
    }

    #[test]
    fn test_nonzero_minimum_terminates() {
        // Inconsistent system: best fit is p = 1 with residual SS 2
        let residuals = |p: &[f64]| vec![p[0], p[0] - 2.0];
        let result = LevenbergMarquardtSolver::with_defaults()
            .solve(residuals, vec![5.0])
            .unwrap();
        assert_relative_eq!(result.params[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(result.residual_ss, 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_empty_inputs() {
        let solver = LevenbergMarquardtSolver::with_defaults();
        assert!(solver.solve(|_: &[f64]| vec![1.0], vec![]).is_err());
        assert!(solver.solve(|_: &[f64]| vec![], vec![1.0]).is_err());
    }

    #[test]
    fn test_cholesky_identity() {
        let a = vec![vec![2.0, 0.0], vec![0.0, 4.0]];
        let x = solve_cholesky(&a, &[2.0, 2.0]).unwrap();
        assert_relative_eq!(x[0], 1.0);
        assert_relative_eq!(x[1], 0.5);
        assert!(solve_cholesky(&[vec![-1.0]], &[1.0]).is_none());
    }
}
