//! # cud_core: Numerical Foundation for Commitment Analytics
//!
//! ## Layer 1 (Foundation) Role
//!
//! cud_core is the bottom layer of the commitment analytics workspace and
//! provides:
//! - Error types: `AnalyticsError`, `SolverError` (`types::error`)
//! - Commitment discount table supplied as data (`types::discount`)
//! - Standard normal distribution functions (`math::distributions`)
//! - Descriptive statistics over cost samples (`math::statistics`)
//! - Root finding and optimisation (`math::solvers`)
//! - Seeded random-source handle (`rng`)
//!
//! ## Zero Dependency Principle
//!
//! Layer 1 has no dependencies on other cud_* crates, with minimal external
//! dependencies:
//! - num-traits: Traits for generic numerical computation
//! - rand / rand_distr: Seeded generator and normal sampling
//! - thiserror: Error derivation
//! - serde: Serialisation support (optional)
//!
//! ## Usage Examples
//!
//! ```rust
//! use cud_core::math::distributions::norm_cdf;
//! use cud_core::math::statistics::{mean, percentile};
//! use cud_core::rng::CudRng;
//!
//! let samples = [10.0, 20.0, 30.0, 40.0];
//! assert_eq!(mean(&samples), Some(25.0));
//! assert_eq!(percentile(&samples, 50.0), Some(25.0));
//!
//! assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
//!
//! let mut rng = CudRng::from_seed(42);
//! let z = rng.gen_normal();
//! assert!(z.is_finite());
//! ```
//!
//! ## Feature Flags
//!
//! - `serde`: Enable serialisation for error and discount table types

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod math;
pub mod rng;
pub mod types;
