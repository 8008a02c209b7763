//! # cud_optimiser
//!
//! Commitment portfolio allocation across resource classes.
//!
//! ## Architecture Position
//!
//! Layer 3 alongside `cud_risk`. Depends on `cud_core` (L1) for the
//! simplex-constrained optimiser and error types. Takes the expected-return
//! map produced by `cud_models::estimation` as plain data.
//!
//! ## Modules
//!
//! - [`portfolio`]: Long-only, fully invested Sharpe maximisation
//!
//! ## Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use cud_optimiser::portfolio::PortfolioOptimiser;
//!
//! let returns = BTreeMap::from([
//!     ("e2-standard".to_string(), 0.12),
//!     ("n2-highmem".to_string(), 0.08),
//! ]);
//! let portfolio = PortfolioOptimiser::new(0.03).unwrap().optimise(&returns).unwrap();
//!
//! let total: f64 = portfolio.weights.values().sum();
//! assert!((total - 1.0).abs() < 1e-5);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod portfolio;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::portfolio::{Portfolio, PortfolioOptimiser, DIAGONAL_VARIANCE};
}
