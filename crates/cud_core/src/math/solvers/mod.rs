//! Root-finding and optimisation solvers.
//!
//! ## Root-Finding
//!
//! - [`BrentSolver`]: Bracketing method used for IRR and implied volatility
//!
//! ## Optimisation
//!
//! - [`LevenbergMarquardtSolver`]: Nonlinear least-squares for smoothing
//!   parameter fits
//! - [`SimplexOptimiser`]: Projected gradient ascent over the probability
//!   simplex, used for long-only fully invested weights
//!
//! ## Examples
//!
//! ```
//! use cud_core::math::solvers::{BrentSolver, SolverConfig};
//!
//! let solver = BrentSolver::new(SolverConfig::default());
//! let root = solver.find_root(|x: f64| x * x - 2.0, 0.0, 2.0).unwrap();
//! assert!((root - std::f64::consts::SQRT_2).abs() < 1e-9);
//! ```
//!
//! ```
//! use cud_core::math::solvers::LevenbergMarquardtSolver;
//!
//! let residuals = |p: &[f64]| vec![p[0] - 2.0, p[1] - 3.0];
//! let result = LevenbergMarquardtSolver::with_defaults()
//!     .solve(residuals, vec![0.0, 0.0])
//!     .unwrap();
//! assert!(result.converged);
//! assert!((result.params[0] - 2.0).abs() < 1e-6);
//! ```

mod brent;
mod config;
mod levenberg_marquardt;
mod simplex;

pub use brent::BrentSolver;
pub use config::SolverConfig;
pub use levenberg_marquardt::{LMConfig, LMResult, LevenbergMarquardtSolver};
pub use simplex::{project_onto_simplex, SimplexConfig, SimplexOptimiser, SimplexResult};
