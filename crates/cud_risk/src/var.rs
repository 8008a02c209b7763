//! Value at Risk and Conditional Value at Risk of cumulative cost.
//!
//! A normal distribution is fitted to the monthly cost sample (mean and
//! maximum-likelihood deviation). `n` totals of `time_horizon` independent
//! monthly draws are simulated, and:
//!
//! ```text
//! VaR  = percentile(totals, (1 − confidence) · 100)
//! CVaR = mean(totals ≥ VaR)
//! ```
//!
//! CVaR ≥ VaR holds by construction.

use cud_core::math::statistics::{mean, percentile_sorted, std_population};
use cud_core::rng::CudRng;
use cud_core::types::AnalyticsError;
use tracing::debug;

use crate::parallel::{run_seeded_batches, BatchPlan, SimulationControl, DEFAULT_BATCH_SIZE};

/// Default number of simulated totals.
pub const DEFAULT_SIMULATIONS: usize = 10_000;

/// Default number of months summed per total.
pub const DEFAULT_TIME_HORIZON: usize = 12;

/// Normal fit of a historical cost sample.
///
/// # Examples
/// ```
/// use cud_risk::var::CostDistributionFit;
///
/// let fit = CostDistributionFit::fit(&[90.0, 110.0]).unwrap();
/// assert_eq!(fit.mean, 100.0);
/// assert_eq!(fit.std_dev, 10.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CostDistributionFit {
    /// Sample mean.
    pub mean: f64,
    /// Maximum-likelihood (population) standard deviation.
    pub std_dev: f64,
}

impl CostDistributionFit {
    /// Fits a normal distribution to `sample`.
    ///
    /// # Errors
    /// - `InsufficientData` for an empty sample
    /// - `DegenerateInput` if an observation is not finite
    pub fn fit(sample: &[f64]) -> Result<Self, AnalyticsError> {
        if sample.iter().any(|x| !x.is_finite()) {
            return Err(AnalyticsError::DegenerateInput(
                "cost sample contains a non-finite value".to_string(),
            ));
        }
        let mean = mean(sample).ok_or_else(|| AnalyticsError::insufficient_data("VaR fit", 0, 1))?;
        let std_dev = std_population(sample).unwrap_or(0.0);
        Ok(Self { mean, std_dev })
    }
}

/// Tail statistics of simulated cumulative cost.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TailRisk {
    /// Confidence level used.
    pub confidence_level: f64,
    /// Months summed per total.
    pub time_horizon: usize,
    /// Distribution the totals were drawn from.
    pub fit: CostDistributionFit,
    /// Value at Risk.
    pub var: f64,
    /// Conditional Value at Risk.
    pub cvar: f64,
    /// Mean simulated total.
    pub expected_cost: f64,
    /// Population standard deviation of the totals.
    pub cost_volatility: f64,
    /// Largest simulated total.
    pub worst_case: f64,
    /// Smallest simulated total.
    pub best_case: f64,
    #[cfg_attr(feature = "serde", serde(skip))]
    totals: Vec<f64>,
}

impl TailRisk {
    /// Share of simulated totals strictly above `budget`.
    ///
    /// # Examples
    /// ```
    /// use cud_core::rng::CudRng;
    /// use cud_risk::var::TailRiskEstimator;
    ///
    /// let estimator = TailRiskEstimator::new(0.95).unwrap().with_simulations(1_000);
    /// let risk = estimator
    ///     .estimate(&[100.0, 110.0, 90.0], &mut CudRng::from_seed(1))
    ///     .unwrap();
    /// assert_eq!(risk.probability_exceeding(f64::INFINITY), 0.0);
    /// assert_eq!(risk.probability_exceeding(0.0), 1.0);
    /// ```
    pub fn probability_exceeding(&self, budget: f64) -> f64 {
        if self.totals.is_empty() {
            return 0.0;
        }
        let at_or_below = self.totals.partition_point(|t| *t <= budget);
        (self.totals.len() - at_or_below) as f64 / self.totals.len() as f64
    }

    /// Simulated totals, ascending.
    pub fn totals(&self) -> &[f64] {
        &self.totals
    }
}

/// Monte Carlo VaR/CVaR estimator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TailRiskEstimator {
    confidence_level: f64,
    time_horizon: usize,
    n_simulations: usize,
    batch_size: usize,
}

impl TailRiskEstimator {
    /// Creates an estimator with the default horizon and simulation count.
    ///
    /// # Errors
    /// `InvalidParameter` unless `0 < confidence_level < 1`.
    pub fn new(confidence_level: f64) -> Result<Self, AnalyticsError> {
        if !(confidence_level > 0.0 && confidence_level < 1.0) {
            return Err(AnalyticsError::invalid_parameter(
                "confidence_level",
                confidence_level,
                "must be in (0, 1)",
            ));
        }
        Ok(Self {
            confidence_level,
            time_horizon: DEFAULT_TIME_HORIZON,
            n_simulations: DEFAULT_SIMULATIONS,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Sets the number of months summed per total. Zero is treated as one.
    pub fn with_time_horizon(mut self, time_horizon: usize) -> Self {
        self.time_horizon = time_horizon.max(1);
        self
    }

    /// Sets the number of simulated totals. Zero is treated as one.
    pub fn with_simulations(mut self, n_simulations: usize) -> Self {
        self.n_simulations = n_simulations.max(1);
        self
    }

    /// Confidence level in use.
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Months summed per total.
    pub fn time_horizon(&self) -> usize {
        self.time_horizon
    }

    /// Number of simulated totals.
    pub fn n_simulations(&self) -> usize {
        self.n_simulations
    }

    /// Estimates tail risk for a monthly cost sample.
    ///
    /// # Errors
    /// - `InsufficientData` for an empty sample
    /// - `DegenerateInput` if an observation is not finite
    pub fn estimate(&self, sample: &[f64], rng: &mut CudRng) -> Result<TailRisk, AnalyticsError> {
        let fit = CostDistributionFit::fit(sample)?;
        let horizon = self.time_horizon;

        let plan = BatchPlan::new(self.n_simulations, self.batch_size);
        let batches = run_seeded_batches(&plan, rng, &SimulationControl::new(), |size, batch_rng| {
            let mut draws = vec![0.0; horizon];
            (0..size)
                .map(|_| {
                    batch_rng.fill_normal(&mut draws);
                    draws.iter().map(|z| fit.mean + fit.std_dev * z).sum::<f64>()
                })
                .collect::<Vec<f64>>()
        });
        let mut totals: Vec<f64> = batches.into_iter().flatten().collect();
        totals.sort_by(|a, b| a.total_cmp(b));

        let var = percentile_sorted(&totals, (1.0 - self.confidence_level) * 100.0)
            .ok_or_else(|| AnalyticsError::insufficient_data("VaR simulation", 0, 1))?;
        let tail_start = totals.partition_point(|t| *t < var);
        // Summation error can pull the tail mean of near-equal totals below VaR.
        let cvar = mean(&totals[tail_start..]).unwrap_or(var).max(var);

        debug!(
            var,
            cvar,
            simulations = totals.len(),
            horizon,
            "tail risk estimated"
        );

        Ok(TailRisk {
            confidence_level: self.confidence_level,
            time_horizon: horizon,
            fit,
            var,
            cvar,
            expected_cost: mean(&totals).unwrap_or(0.0),
            cost_volatility: std_population(&totals).unwrap_or(0.0),
            worst_case: totals.last().copied().unwrap_or(0.0),
            best_case: totals.first().copied().unwrap_or(0.0),
            totals,
        })
    }
}
