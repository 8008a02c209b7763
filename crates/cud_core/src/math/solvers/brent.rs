//! Brent's method root-finding solver.

use super::SolverConfig;
use crate::types::SolverError;
use num_traits::Float;

/// Brent's method root finder.
///
/// Combines bisection, secant steps and inverse quadratic interpolation.
/// Converges for any continuous function given a valid bracket.
///
/// # Example
///
/// ```
/// use cud_core::math::solvers::{BrentSolver, SolverConfig};
///
/// let solver = BrentSolver::new(SolverConfig::default());
/// let f = |x: f64| x * x * x - x - 2.0;
/// let root = solver.find_root(f, 1.0, 2.0).unwrap();
/// assert!(f(root).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct BrentSolver<T: Float> {
    config: SolverConfig<T>,
}

impl<T: Float> BrentSolver<T> {
    /// Create a new Brent solver with the given configuration.
    pub fn new(config: SolverConfig<T>) -> Self {
        Self { config }
    }

    /// Create a solver with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: SolverConfig::default(),
        }
    }

    /// Returns a reference to the solver configuration.
    pub fn config(&self) -> &SolverConfig<T> {
        &self.config
    }

    /// Find a root of `f` in the bracket `[a, b]`.
    ///
    /// # Errors
    /// * `SolverError::NoBracket` if `f(a)` and `f(b)` share a sign
    /// * `SolverError::MaxIterationsExceeded` if the iteration limit is hit
    pub fn find_root<F>(&self, f: F, a: T, b: T) -> Result<T, SolverError>
    where
        F: Fn(T) -> T,
    {
        let zero = T::zero();
        let two = T::one() + T::one();
        let three = two + T::one();
        let half = T::one() / two;
        let tol = self.config.tolerance;

        let mut a = a;
        let mut b = b;
        let mut fa = f(a);
        let mut fb = f(b);

        if fa == zero {
            return Ok(a);
        }
        if fb == zero {
            return Ok(b);
        }
        if (fa > zero) == (fb > zero) || fa.is_nan() || fb.is_nan() {
            return Err(SolverError::NoBracket {
                a: a.to_f64().unwrap_or(f64::NAN),
                b: b.to_f64().unwrap_or(f64::NAN),
            });
        }

        let mut c = b;
        let mut fc = fb;
        let mut d = b - a;
        let mut e = d;

        for _ in 0..self.config.max_iterations {
            // Keep the root between b and c
            if (fb > zero) == (fc > zero) {
                c = a;
                fc = fa;
                d = b - a;
                e = d;
            }
            // b is the best estimate so far
            if fc.abs() < fb.abs() {
                a = b;
                b = c;
                c = a;
                fa = fb;
                fb = fc;
                fc = fa;
            }

            let tol1 = two * T::epsilon() * b.abs() + half * tol;
            let m = half * (c - b);
            if m.abs() <= tol1 || fb.abs() < tol {
                return Ok(b);
            }

            if e.abs() >= tol1 && fa.abs() > fb.abs() {
                let s = fb / fa;
                let (mut p, mut q) = if a == c {
                    // Secant step
                    (two * m * s, T::one() - s)
                } else {
                    // Inverse quadratic interpolation
                    let q0 = fa / fc;
                    let r = fb / fc;
                    (
                        s * (two * m * q0 * (q0 - r) - (b - a) * (r - T::one())),
                        (q0 - T::one()) * (r - T::one()) * (s - T::one()),
                    )
                };
                if p > zero {
                    q = -q;
                }
                p = p.abs();
                let min1 = three * m * q - (tol1 * q).abs();
                let min2 = (e * q).abs();
                if two * p < min1.min(min2) {
                    e = d;
                    d = p / q;
                } else {
                    d = m;
                    e = d;
                }
            } else {
                d = m;
                e = d;
            }

            a = b;
            fa = fb;
            if d.abs() > tol1 {
                b = b + d;
            } else {
                b = b + if m > zero { tol1 } else { -tol1 };
            }
            fb = f(b);
        }

        Err(SolverError::MaxIterationsExceeded {
            iterations: self.config.max_iterations,
        })
    }
}
