//! Mathematical building blocks.
//!
//! - [`distributions`]: Standard normal CDF and PDF
//! - [`statistics`]: Mean, deviations, percentiles over samples
//! - [`solvers`]: Root finding, least squares and simplex-constrained ascent

pub mod distributions;
pub mod solvers;
pub mod statistics;
