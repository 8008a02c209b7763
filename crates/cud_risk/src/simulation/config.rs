//! Cost simulation configuration.

use cud_core::types::AnalyticsError;

use crate::parallel::DEFAULT_BATCH_SIZE;

/// Maximum number of simulated paths.
///
/// Every path is kept for the band statistics, so an ensemble holds
/// `8 · n_paths · (n_periods + 1)` bytes: about 1 GB at both limits.
pub const MAX_PATHS: usize = 100_000;

/// Maximum number of monthly periods per path.
pub const MAX_PERIODS: usize = 1_200;

/// Default projection length in months.
pub const DEFAULT_PERIODS: usize = 36;

/// Default number of paths.
pub const DEFAULT_PATHS: usize = 10_000;

/// Geometric Brownian motion cost simulation settings.
///
/// Use [`SimulationConfigBuilder`] to construct instances.
///
/// # Examples
/// ```rust
/// use cud_risk::simulation::SimulationConfig;
///
/// let config = SimulationConfig::builder()
///     .initial_cost(5_000.0)
///     .drift(0.05)
///     .volatility(0.2)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.n_periods(), 36);
/// assert_eq!(config.n_paths(), 10_000);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    initial_cost: f64,
    drift: f64,
    volatility: f64,
    n_periods: usize,
    n_paths: usize,
    batch_size: usize,
}

impl SimulationConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> SimulationConfigBuilder {
        SimulationConfigBuilder::default()
    }

    /// Cost at period 0.
    #[inline]
    pub fn initial_cost(&self) -> f64 {
        self.initial_cost
    }

    /// Annual drift μ.
    #[inline]
    pub fn drift(&self) -> f64 {
        self.drift
    }

    /// Annual volatility σ.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Number of monthly steps per path.
    #[inline]
    pub fn n_periods(&self) -> usize {
        self.n_periods
    }

    /// Number of paths requested.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Paths per parallel batch.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if:
    /// - `initial_cost` is negative or not finite
    /// - `drift` is not finite
    /// - `volatility` is negative or not finite
    /// - `n_paths` is 0 or greater than [`MAX_PATHS`]
    /// - `n_periods` is 0 or greater than 1,200
    /// - `batch_size` is 0
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if !(self.initial_cost.is_finite() && self.initial_cost >= 0.0) {
            return Err(AnalyticsError::invalid_parameter(
                "initial_cost",
                self.initial_cost,
                "must be finite and non-negative",
            ));
        }
        if !self.drift.is_finite() {
            return Err(AnalyticsError::invalid_parameter("drift", self.drift, "must be finite"));
        }
        if !(self.volatility.is_finite() && self.volatility >= 0.0) {
            return Err(AnalyticsError::invalid_parameter(
                "volatility",
                self.volatility,
                "must be finite and non-negative",
            ));
        }
        if self.n_paths == 0 || self.n_paths > MAX_PATHS {
            return Err(AnalyticsError::invalid_parameter(
                "n_paths",
                self.n_paths as f64,
                "must be in [1, 100000]",
            ));
        }
        if self.n_periods == 0 || self.n_periods > MAX_PERIODS {
            return Err(AnalyticsError::invalid_parameter(
                "n_periods",
                self.n_periods as f64,
                "must be in [1, 1200]",
            ));
        }
        if self.batch_size == 0 {
            return Err(AnalyticsError::invalid_parameter(
                "batch_size",
                0.0,
                "must be positive",
            ));
        }
        Ok(())
    }
}

/// Builder for [`SimulationConfig`].
///
/// The initial cost, drift and volatility must be given; the path count,
/// horizon and batch size fall back to their defaults.
#[derive(Clone, Debug, Default)]
pub struct SimulationConfigBuilder {
    initial_cost: Option<f64>,
    drift: Option<f64>,
    volatility: Option<f64>,
    n_periods: Option<usize>,
    n_paths: Option<usize>,
    batch_size: Option<usize>,
}

impl SimulationConfigBuilder {
    /// Sets the cost at period 0.
    #[inline]
    pub fn initial_cost(mut self, initial_cost: f64) -> Self {
        self.initial_cost = Some(initial_cost);
        self
    }

    /// Sets the annual drift.
    #[inline]
    pub fn drift(mut self, drift: f64) -> Self {
        self.drift = Some(drift);
        self
    }

    /// Sets the annual volatility.
    #[inline]
    pub fn volatility(mut self, volatility: f64) -> Self {
        self.volatility = Some(volatility);
        self
    }

    /// Sets the number of monthly steps.
    #[inline]
    pub fn n_periods(mut self, n_periods: usize) -> Self {
        self.n_periods = Some(n_periods);
        self
    }

    /// Sets the number of paths.
    #[inline]
    pub fn n_paths(mut self, n_paths: usize) -> Self {
        self.n_paths = Some(n_paths);
        self
    }

    /// Sets the number of paths per parallel batch.
    #[inline]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if a mandatory value is missing or any
    /// value fails [`SimulationConfig::validate`].
    pub fn build(self) -> Result<SimulationConfig, AnalyticsError> {
        let missing = |name: &str| AnalyticsError::invalid_parameter(name, f64::NAN, "must be specified");

        let config = SimulationConfig {
            initial_cost: self.initial_cost.ok_or_else(|| missing("initial_cost"))?,
            drift: self.drift.ok_or_else(|| missing("drift"))?,
            volatility: self.volatility.ok_or_else(|| missing("volatility"))?,
            n_periods: self.n_periods.unwrap_or(DEFAULT_PERIODS),
            n_paths: self.n_paths.unwrap_or(DEFAULT_PATHS),
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SimulationConfigBuilder {
        SimulationConfig::builder()
            .initial_cost(100.0)
            .drift(0.05)
            .volatility(0.2)
    }

    #[test]
    fn test_builder_defaults() {
        let config = base().build().unwrap();
        assert_eq!(config.n_periods(), DEFAULT_PERIODS);
        assert_eq!(config.n_paths(), DEFAULT_PATHS);
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_missing_mandatory_value() {
        let result = SimulationConfig::builder().drift(0.0).volatility(0.1).build();
        match result {
            Err(AnalyticsError::InvalidParameter { name, .. }) => assert_eq!(name, "initial_cost"),
            other => panic!("Expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_initial_cost_is_valid() {
        assert!(base().initial_cost(0.0).build().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(base().initial_cost(-1.0).build().is_err());
        assert!(base().volatility(-0.1).build().is_err());
        assert!(base().drift(f64::NAN).build().is_err());
        assert!(base().n_paths(0).build().is_err());
        assert!(base().n_paths(MAX_PATHS).build().is_ok());
        assert!(base().n_paths(MAX_PATHS + 1).build().is_err());
        assert!(base().n_periods(0).build().is_err());
        assert!(base().n_periods(MAX_PERIODS + 1).build().is_err());
        assert!(base().batch_size(0).build().is_err());
    }
}
