//! # cud_engine (L4: Service)
//!
//! Runs the commitment analytics pipeline and merges every component into a
//! single serialisable [`CommitmentAnalysis`].
//!
//! ## Pipeline
//!
//! ```text
//! AnalysisInput ──┬─ estimation ── portfolio (≥ 2 eligible classes)
//!                 ├─ usage history ─┬─ tail risk, risk score
//!                 │                 └─ forecast ── ladder ── monthly savings
//!                 ├─ cost simulation
//!                 ├─ option valuation
//!                 ├─ financial metrics (committed cash flows)
//!                 └─ stress test
//! ```
//!
//! Each component result is an [`Outcome`]: computed, skipped when a
//! precondition is unmet, or failed. A component failure never stops the
//! others; only an incomplete [`AnalysisConfig`] stops a run.
//!
//! ## Example
//!
//! ```
//! use cud_engine::{run_analysis, AnalysisConfig, AnalysisInput};
//! use cud_models::estimation::AssetClass;
//!
//! let config = AnalysisConfig::builder()
//!     .risk_free_rate(0.03)
//!     .confidence_level(0.95)
//!     .risk_tolerance(0.3)
//!     .commitment_term_years(1.0)
//!     .discount_rate(0.05)
//!     .var_simulations(1_000)
//!     .simulation_paths(1_000);
//!
//! let input = AnalysisInput::new(vec![AssetClass::new("c2-standard", vec![800.0, 820.0])]);
//! let analysis = run_analysis(&input, config).unwrap();
//!
//! assert!(analysis.stress_test.is_computed());
//! assert!(analysis.portfolio.is_skipped());
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod input;
pub mod outcome;

pub use analysis::{run_analysis, CommitmentAnalyser, CommitmentAnalysis, UsageSource};
pub use config::{AnalysisConfig, AnalysisConfigBuilder};
pub use error::EngineError;
pub use input::AnalysisInput;
pub use outcome::Outcome;
