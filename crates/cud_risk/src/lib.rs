//! # cud_risk (L3: Risk)
//!
//! Stochastic cost projection and risk measures for a commitment.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │              cud_risk (L3)              │
//! ├─────────────────────────────────────────┤
//! │  simulation/ - GBM cost paths, bands    │
//! │  var         - VaR / CVaR, tail stats   │
//! │  score       - Commitment risk score    │
//! │  stress      - Fixed stress scenarios   │
//! │  parallel/   - Seeded batches, control  │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │             cud_core (L1)               │
//! │  Statistics, normal CDF, CudRng         │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Reproducibility
//!
//! Monte Carlo work is split into batches. Each batch gets a seed drawn
//! sequentially from the caller's [`CudRng`](cud_core::rng::CudRng) before
//! any thread starts, so a given seed produces the same output on any
//! number of threads.
//!
//! ## Example
//!
//! ```
//! use cud_core::rng::CudRng;
//! use cud_risk::simulation::{CostSimulator, SimulationConfig};
//!
//! let config = SimulationConfig::builder()
//!     .initial_cost(10_000.0)
//!     .drift(0.05)
//!     .volatility(0.2)
//!     .n_paths(2_000)
//!     .build()
//!     .unwrap();
//!
//! let mut rng = CudRng::from_seed(42);
//! let summary = CostSimulator::new(config).run(&mut rng).unwrap();
//!
//! assert_eq!(summary.completed_paths, 2_000);
//! assert!(summary.percentile_5 < summary.percentile_95);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod parallel;
pub mod score;
pub mod simulation;
pub mod stress;
pub mod var;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::parallel::{BatchPlan, SimulationControl};
    pub use crate::score::{commitment_risk_score, RiskCategory, RiskMetrics, RiskScore};
    pub use crate::simulation::{
        CostSimulator, PathBands, SimulationConfig, SimulationEnsemble, SimulationSummary,
    };
    pub use crate::stress::{stress_test, ScenarioOutcome, StressScenarioKind, StressTestResult};
    pub use crate::var::{CostDistributionFit, TailRisk, TailRiskEstimator};
}
