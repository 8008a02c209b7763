//! Stochastic cost projection.
//!
//! Monthly cost follows geometric Brownian motion with `dt = 1/12`:
//!
//! ```text
//! c(t) = c(t−1) · exp[(μ − σ²/2)·dt + σ·√dt·Z],   Z ~ N(0, 1)
//! ```
//!
//! Paths are generated in seeded parallel batches (see
//! [`crate::parallel`]) and merged into a [`SimulationEnsemble`], which
//! reduces to a [`SimulationSummary`] of final-cost statistics and
//! per-step bands.

mod batch;
mod config;

pub use batch::PathBatch;
pub use config::{
    SimulationConfig, SimulationConfigBuilder, DEFAULT_PATHS, DEFAULT_PERIODS, MAX_PATHS,
    MAX_PERIODS,
};

use cud_core::math::statistics::{mean, percentile_sorted, std_population};
use cud_core::rng::CudRng;
use cud_core::types::AnalyticsError;
use tracing::{debug, warn};

use crate::parallel::{run_seeded_batches, BatchPlan, SimulationControl};

/// Time step of one month in years.
pub const MONTHLY_DT: f64 = 1.0 / 12.0;

/// Lower and upper band percentiles.
const BAND_PERCENTILES: (f64, f64) = (5.0, 95.0);

/// Per-step mean and 5th/95th percentile across paths.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathBands {
    /// Mean cost per step.
    pub mean: Vec<f64>,
    /// 5th percentile per step.
    pub lower: Vec<f64>,
    /// 95th percentile per step.
    pub upper: Vec<f64>,
}

/// Statistics of a simulated ensemble.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationSummary {
    /// Mean final cost.
    pub expected_final_cost: f64,
    /// Median final cost.
    pub median_final_cost: f64,
    /// Population standard deviation of final cost.
    pub cost_std_dev: f64,
    /// 5th percentile of final cost.
    pub percentile_5: f64,
    /// 95th percentile of final cost.
    pub percentile_95: f64,
    /// Share of paths whose final cost exceeds twice the initial cost.
    pub probability_cost_doubles: f64,
    /// Smallest `min(path) / initial − 1` over all paths.
    pub max_drawdown: f64,
    /// Per-step bands.
    pub bands: PathBands,
    /// Paths actually simulated.
    pub completed_paths: usize,
    /// Paths requested by the configuration.
    pub requested_paths: usize,
}

/// Simulated paths, each of length `n_periods + 1` starting at the initial
/// cost.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationEnsemble {
    initial_cost: f64,
    requested_paths: usize,
    paths: Vec<Vec<f64>>,
}

impl SimulationEnsemble {
    /// Cost at period 0.
    pub fn initial_cost(&self) -> f64 {
        self.initial_cost
    }

    /// Simulated paths.
    pub fn paths(&self) -> &[Vec<f64>] {
        &self.paths
    }

    /// Number of paths simulated.
    pub fn completed_paths(&self) -> usize {
        self.paths.len()
    }

    /// Number of paths the configuration asked for.
    pub fn requested_paths(&self) -> usize {
        self.requested_paths
    }

    /// Final cost of every path.
    pub fn final_costs(&self) -> Vec<f64> {
        self.paths.iter().filter_map(|p| p.last().copied()).collect()
    }

    /// Reduces the ensemble to summary statistics.
    ///
    /// # Errors
    /// `InsufficientData` when no path was completed.
    pub fn summary(&self) -> Result<SimulationSummary, AnalyticsError> {
        let n = self.paths.len();
        let mut finals = self.final_costs();
        if finals.is_empty() {
            return Err(AnalyticsError::insufficient_data("cost simulation", 0, 1));
        }
        finals.sort_by(|a, b| a.total_cmp(b));

        let doubling_threshold = 2.0 * self.initial_cost;
        let doubles = finals.iter().filter(|c| **c > doubling_threshold).count();

        let max_drawdown = if self.initial_cost > 0.0 {
            self.paths
                .iter()
                .map(|p| p.iter().copied().fold(f64::INFINITY, f64::min) / self.initial_cost - 1.0)
                .fold(f64::INFINITY, f64::min)
        } else {
            0.0
        };

        Ok(SimulationSummary {
            expected_final_cost: mean(&finals).unwrap_or(0.0),
            median_final_cost: percentile_sorted(&finals, 50.0).unwrap_or(0.0),
            cost_std_dev: std_population(&finals).unwrap_or(0.0),
            percentile_5: percentile_sorted(&finals, BAND_PERCENTILES.0).unwrap_or(0.0),
            percentile_95: percentile_sorted(&finals, BAND_PERCENTILES.1).unwrap_or(0.0),
            probability_cost_doubles: doubles as f64 / n as f64,
            max_drawdown,
            bands: self.bands(),
            completed_paths: n,
            requested_paths: self.requested_paths,
        })
    }

    fn bands(&self) -> PathBands {
        let steps = self.paths.first().map_or(0, Vec::len);
        let mut bands = PathBands {
            mean: Vec::with_capacity(steps),
            lower: Vec::with_capacity(steps),
            upper: Vec::with_capacity(steps),
        };
        let mut column = Vec::with_capacity(self.paths.len());
        for t in 0..steps {
            column.clear();
            column.extend(self.paths.iter().map(|p| p[t]));
            bands.mean.push(mean(&column).unwrap_or(0.0));
            column.sort_by(|a, b| a.total_cmp(b));
            bands
                .lower
                .push(percentile_sorted(&column, BAND_PERCENTILES.0).unwrap_or(0.0));
            bands
                .upper
                .push(percentile_sorted(&column, BAND_PERCENTILES.1).unwrap_or(0.0));
        }
        bands
    }
}

/// GBM cost simulator.
#[derive(Clone, Debug)]
pub struct CostSimulator {
    config: SimulationConfig,
}

impl CostSimulator {
    /// Creates a simulator for a validated configuration.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn simulate_batch(&self, size: usize, rng: &mut CudRng) -> PathBatch {
        let periods = self.config.n_periods();
        let sigma = self.config.volatility();
        let drift_term = (self.config.drift() - 0.5 * sigma * sigma) * MONTHLY_DT;
        let shock_scale = sigma * MONTHLY_DT.sqrt();

        let mut shocks = vec![0.0; periods];
        let paths = (0..size)
            .map(|_| {
                rng.fill_normal(&mut shocks);
                let mut path = Vec::with_capacity(periods + 1);
                let mut cost = self.config.initial_cost();
                path.push(cost);
                for z in &shocks {
                    cost *= (drift_term + shock_scale * z).exp();
                    path.push(cost);
                }
                path
            })
            .collect();
        PathBatch::new(paths)
    }

    /// Simulates the ensemble, stopping early if `control` asks to.
    ///
    /// Only completed batches are kept.
    pub fn simulate_with_control(
        &self,
        rng: &mut CudRng,
        control: &SimulationControl,
    ) -> SimulationEnsemble {
        let plan = BatchPlan::new(self.config.n_paths(), self.config.batch_size());
        let batches = run_seeded_batches(&plan, rng, control, |size, batch_rng| {
            self.simulate_batch(size, batch_rng)
        });
        let merged = batches.into_iter().fold(PathBatch::empty(), PathBatch::merge);

        let requested = self.config.n_paths();
        if merged.len() < requested {
            warn!(
                completed = merged.len(),
                requested, "cost simulation stopped before all batches ran"
            );
        } else {
            debug!(paths = requested, periods = self.config.n_periods(), "cost simulation complete");
        }

        SimulationEnsemble {
            initial_cost: self.config.initial_cost(),
            requested_paths: requested,
            paths: merged.into_paths(),
        }
    }

    /// Simulates the full ensemble.
    pub fn simulate(&self, rng: &mut CudRng) -> SimulationEnsemble {
        self.simulate_with_control(rng, &SimulationControl::new())
    }

    /// Simulates and summarises in one step.
    ///
    /// # Errors
    /// `InsufficientData` if no path completed.
    pub fn run(&self, rng: &mut CudRng) -> Result<SimulationSummary, AnalyticsError> {
        self.simulate(rng).summary()
    }

    /// Simulates under `control` and summarises the completed paths.
    ///
    /// # Errors
    /// `InsufficientData` if no path completed.
    pub fn run_with_control(
        &self,
        rng: &mut CudRng,
        control: &SimulationControl,
    ) -> Result<SimulationSummary, AnalyticsError> {
        self.simulate_with_control(rng, control).summary()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn simulator(initial: f64, drift: f64, vol: f64, paths: usize) -> CostSimulator {
        CostSimulator::new(
            SimulationConfig::builder()
                .initial_cost(initial)
                .drift(drift)
                .volatility(vol)
                .n_paths(paths)
                .n_periods(24)
                .batch_size(64)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_zero_drift_zero_vol_is_flat() {
        let mut rng = CudRng::from_seed(3);
        let ensemble = simulator(1_234.5, 0.0, 0.0, 100).simulate(&mut rng);
        for path in ensemble.paths() {
            assert_eq!(path.len(), 25);
            assert!(path.iter().all(|c| *c == 1_234.5));
        }
        let summary = ensemble.summary().unwrap();
        assert_eq!(summary.expected_final_cost, 1_234.5);
        assert_eq!(summary.cost_std_dev, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.probability_cost_doubles, 0.0);
        assert!(summary.bands.upper.iter().all(|c| *c == 1_234.5));
    }

    #[test]
    fn test_deterministic_drift_compounds() {
        let mut rng = CudRng::from_seed(3);
        let summary = simulator(100.0, 0.12, 0.0, 10).run(&mut rng).unwrap();
        assert_relative_eq!(summary.expected_final_cost, 100.0 * (0.12_f64 * 2.0).exp(), epsilon = 1e-9);
    }

    #[test]
    fn test_same_seed_same_summary() {
        let sim = simulator(1_000.0, 0.05, 0.3, 500);
        let a = sim.run(&mut CudRng::from_seed(42)).unwrap();
        let b = sim.run(&mut CudRng::from_seed(42)).unwrap();
        assert_eq!(a, b);
        let c = sim.run(&mut CudRng::from_seed(43)).unwrap();
        assert_ne!(a.expected_final_cost, c.expected_final_cost);
    }

    #[test]
    fn test_summary_ordering() {
        let summary = simulator(1_000.0, 0.05, 0.3, 2_000)
            .run(&mut CudRng::from_seed(11))
            .unwrap();
        assert!(summary.percentile_5 <= summary.median_final_cost);
        assert!(summary.median_final_cost <= summary.percentile_95);
        assert!(summary.max_drawdown <= 0.0);
        assert!((0.0..=1.0).contains(&summary.probability_cost_doubles));
        assert_eq!(summary.bands.mean.len(), 25);
        assert_eq!(summary.bands.mean[0], 1_000.0);
        for (lo, hi) in summary.bands.lower.iter().zip(&summary.bands.upper) {
            assert!(lo <= hi);
        }
    }

    #[test]
    fn test_zero_initial_cost() {
        let summary = simulator(0.0, 0.05, 0.3, 50)
            .run(&mut CudRng::from_seed(1))
            .unwrap();
        assert_eq!(summary.expected_final_cost, 0.0);
        assert_eq!(summary.max_drawdown, 0.0);
        assert_eq!(summary.probability_cost_doubles, 0.0);
    }

    #[test]
    fn test_cancelled_run_reports_no_paths() {
        let control = SimulationControl::new();
        control.cancel();
        let sim = simulator(100.0, 0.0, 0.2, 1_000);
        let ensemble = sim.simulate_with_control(&mut CudRng::from_seed(5), &control);
        assert_eq!(ensemble.completed_paths(), 0);
        assert_eq!(ensemble.requested_paths(), 1_000);
        assert!(ensemble.summary().unwrap_err().is_precondition());
    }
}
