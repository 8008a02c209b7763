//! Analysis configuration.
//!
//! Five scalars have no sensible default and must always be supplied:
//! the risk-free rate, VaR confidence level, risk tolerance, commitment term
//! and cash-flow discount rate. Every other knob falls back to a default.
//!
//! A configuration is built in code through [`AnalysisConfigBuilder`] or
//! parsed from TOML:
//!
//! ```toml
//! risk_free_rate = 0.03
//! confidence_level = 0.95
//! risk_tolerance = 0.5
//! commitment_term_years = 3.0
//! discount_rate = 0.05
//! seed = 7
//!
//! [discounts]
//! three_year = 0.57
//! ```

use std::path::Path;

use cud_core::types::DiscountTable;
use cud_risk::simulation::{MAX_PATHS, MAX_PERIODS};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Default seed of the random source.
pub const DEFAULT_SEED: u64 = 42;

/// Default share of current spend placed under commitment.
pub const DEFAULT_COMMITMENT_RATIO: f64 = 0.7;

/// Default length of a synthesised usage history in months.
pub const DEFAULT_SYNTHETIC_MONTHS: usize = 36;

/// Validated analysis configuration.
///
/// Use [`AnalysisConfig::builder`] or [`AnalysisConfig::from_toml_str`].
///
/// # Examples
///
/// ```rust
/// use cud_engine::config::AnalysisConfig;
///
/// let config = AnalysisConfig::builder()
///     .risk_free_rate(0.03)
///     .confidence_level(0.95)
///     .risk_tolerance(0.5)
///     .commitment_term_years(3.0)
///     .discount_rate(0.05)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.term_months(), 36);
/// assert_eq!(config.seed(), 42);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisConfig {
    risk_free_rate: f64,
    confidence_level: f64,
    risk_tolerance: f64,
    commitment_term_years: f64,
    discount_rate: f64,
    seed: u64,
    annualisation_factor: f64,
    forecast_horizon: usize,
    var_simulations: usize,
    var_time_horizon: usize,
    simulation_paths: usize,
    simulation_drift: f64,
    simulation_volatility: f64,
    option_volatility: f64,
    commitment_ratio: f64,
    synthetic_history_months: usize,
    discounts: DiscountTable,
}

impl AnalysisConfig {
    /// Creates a new configuration builder.
    #[inline]
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Parses and validates a TOML configuration.
    ///
    /// # Errors
    /// - `ConfigParse` for malformed TOML or unknown keys
    /// - `MissingConfig` or `InvalidConfig` from [`AnalysisConfigBuilder::build`]
    pub fn from_toml_str(content: &str) -> Result<Self, EngineError> {
        let builder: AnalysisConfigBuilder =
            toml::from_str(content).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        builder.build()
    }

    /// Reads and validates a TOML configuration file.
    ///
    /// # Errors
    /// `ConfigFile` if the file cannot be read, otherwise as
    /// [`AnalysisConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::ConfigFile(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Risk-free rate for the Sharpe ratio and option pricing.
    pub fn risk_free_rate(&self) -> f64 {
        self.risk_free_rate
    }

    /// VaR confidence level.
    pub fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Risk tolerance for the commitment ladder.
    pub fn risk_tolerance(&self) -> f64 {
        self.risk_tolerance
    }

    /// Commitment term in years.
    pub fn commitment_term_years(&self) -> f64 {
        self.commitment_term_years
    }

    /// Commitment term in whole months, at least one.
    pub fn term_months(&self) -> usize {
        ((self.commitment_term_years * 12.0).round() as usize).max(1)
    }

    /// Discount rate for NPV.
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Seed of the random source.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Return annualisation factor.
    pub fn annualisation_factor(&self) -> f64 {
        self.annualisation_factor
    }

    /// Forecast horizon in months.
    pub fn forecast_horizon(&self) -> usize {
        self.forecast_horizon
    }

    /// Number of VaR totals simulated.
    pub fn var_simulations(&self) -> usize {
        self.var_simulations
    }

    /// Months summed per VaR total.
    pub fn var_time_horizon(&self) -> usize {
        self.var_time_horizon
    }

    /// Number of cost simulation paths.
    pub fn simulation_paths(&self) -> usize {
        self.simulation_paths
    }

    /// Annual drift of the cost simulation.
    pub fn simulation_drift(&self) -> f64 {
        self.simulation_drift
    }

    /// Annual volatility of the cost simulation.
    pub fn simulation_volatility(&self) -> f64 {
        self.simulation_volatility
    }

    /// Volatility used to price the commitment option.
    pub fn option_volatility(&self) -> f64 {
        self.option_volatility
    }

    /// Share of current spend placed under commitment.
    pub fn commitment_ratio(&self) -> f64 {
        self.commitment_ratio
    }

    /// Length of a synthesised usage history.
    pub fn synthetic_history_months(&self) -> usize {
        self.synthetic_history_months
    }

    /// Discount per commitment layer.
    pub fn discounts(&self) -> &DiscountTable {
        &self.discounts
    }
}

/// Builder for [`AnalysisConfig`], also the TOML schema.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfigBuilder {
    risk_free_rate: Option<f64>,
    confidence_level: Option<f64>,
    risk_tolerance: Option<f64>,
    commitment_term_years: Option<f64>,
    discount_rate: Option<f64>,
    seed: Option<u64>,
    annualisation_factor: Option<f64>,
    forecast_horizon: Option<usize>,
    var_simulations: Option<usize>,
    var_time_horizon: Option<usize>,
    simulation_paths: Option<usize>,
    simulation_drift: Option<f64>,
    simulation_volatility: Option<f64>,
    option_volatility: Option<f64>,
    commitment_ratio: Option<f64>,
    synthetic_history_months: Option<usize>,
    discounts: Option<DiscountTable>,
}

impl AnalysisConfigBuilder {
    /// Sets the risk-free rate.
    #[inline]
    pub fn risk_free_rate(mut self, value: f64) -> Self {
        self.risk_free_rate = Some(value);
        self
    }

    /// Sets the VaR confidence level, in (0, 1).
    #[inline]
    pub fn confidence_level(mut self, value: f64) -> Self {
        self.confidence_level = Some(value);
        self
    }

    /// Sets the ladder risk tolerance, in [0, 1].
    #[inline]
    pub fn risk_tolerance(mut self, value: f64) -> Self {
        self.risk_tolerance = Some(value);
        self
    }

    /// Sets the commitment term in years.
    #[inline]
    pub fn commitment_term_years(mut self, value: f64) -> Self {
        self.commitment_term_years = Some(value);
        self
    }

    /// Sets the NPV discount rate.
    #[inline]
    pub fn discount_rate(mut self, value: f64) -> Self {
        self.discount_rate = Some(value);
        self
    }

    /// Sets the random seed (default 42).
    #[inline]
    pub fn seed(mut self, value: u64) -> Self {
        self.seed = Some(value);
        self
    }

    /// Sets the return annualisation factor (default 252).
    #[inline]
    pub fn annualisation_factor(mut self, value: f64) -> Self {
        self.annualisation_factor = Some(value);
        self
    }

    /// Sets the forecast horizon in months (default 12).
    #[inline]
    pub fn forecast_horizon(mut self, value: usize) -> Self {
        self.forecast_horizon = Some(value);
        self
    }

    /// Sets the number of VaR totals (default 10,000).
    #[inline]
    pub fn var_simulations(mut self, value: usize) -> Self {
        self.var_simulations = Some(value);
        self
    }

    /// Sets the months per VaR total (default 12).
    #[inline]
    pub fn var_time_horizon(mut self, value: usize) -> Self {
        self.var_time_horizon = Some(value);
        self
    }

    /// Sets the number of cost simulation paths (default 10,000).
    #[inline]
    pub fn simulation_paths(mut self, value: usize) -> Self {
        self.simulation_paths = Some(value);
        self
    }

    /// Sets the cost simulation drift (default 0.05).
    #[inline]
    pub fn simulation_drift(mut self, value: f64) -> Self {
        self.simulation_drift = Some(value);
        self
    }

    /// Sets the cost simulation volatility (default 0.2).
    #[inline]
    pub fn simulation_volatility(mut self, value: f64) -> Self {
        self.simulation_volatility = Some(value);
        self
    }

    /// Sets the option pricing volatility (default 0.2).
    #[inline]
    pub fn option_volatility(mut self, value: f64) -> Self {
        self.option_volatility = Some(value);
        self
    }

    /// Sets the committed share of current spend (default 0.7).
    #[inline]
    pub fn commitment_ratio(mut self, value: f64) -> Self {
        self.commitment_ratio = Some(value);
        self
    }

    /// Sets the synthesised history length (default 36).
    #[inline]
    pub fn synthetic_history_months(mut self, value: usize) -> Self {
        self.synthetic_history_months = Some(value);
        self
    }

    /// Sets the discount table.
    #[inline]
    pub fn discounts(mut self, value: DiscountTable) -> Self {
        self.discounts = Some(value);
        self
    }

    /// Builds and validates the configuration.
    ///
    /// # Errors
    /// - `MissingConfig` naming the first absent mandatory scalar
    /// - `InvalidConfig` for any out-of-domain value
    pub fn build(self) -> Result<AnalysisConfig, EngineError> {
        fn required(value: Option<f64>, name: &str) -> Result<f64, EngineError> {
            value.ok_or_else(|| EngineError::MissingConfig(name.to_string()))
        }

        let config = AnalysisConfig {
            risk_free_rate: required(self.risk_free_rate, "risk_free_rate")?,
            confidence_level: required(self.confidence_level, "confidence_level")?,
            risk_tolerance: required(self.risk_tolerance, "risk_tolerance")?,
            commitment_term_years: required(self.commitment_term_years, "commitment_term_years")?,
            discount_rate: required(self.discount_rate, "discount_rate")?,
            seed: self.seed.unwrap_or(DEFAULT_SEED),
            annualisation_factor: self.annualisation_factor.unwrap_or(252.0),
            forecast_horizon: self.forecast_horizon.unwrap_or(12),
            var_simulations: self.var_simulations.unwrap_or(10_000),
            var_time_horizon: self.var_time_horizon.unwrap_or(12),
            simulation_paths: self.simulation_paths.unwrap_or(10_000),
            simulation_drift: self.simulation_drift.unwrap_or(0.05),
            simulation_volatility: self.simulation_volatility.unwrap_or(0.2),
            option_volatility: self.option_volatility.unwrap_or(0.2),
            commitment_ratio: self.commitment_ratio.unwrap_or(DEFAULT_COMMITMENT_RATIO),
            synthetic_history_months: self
                .synthetic_history_months
                .unwrap_or(DEFAULT_SYNTHETIC_MONTHS),
            discounts: self.discounts.unwrap_or_default(),
        };
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &AnalysisConfig) -> Result<(), EngineError> {
    let finite = [
        ("risk_free_rate", config.risk_free_rate),
        ("simulation_drift", config.simulation_drift),
    ];
    for (name, value) in finite {
        if !value.is_finite() {
            return Err(EngineError::invalid(name, "must be finite"));
        }
    }
    if !(config.confidence_level > 0.0 && config.confidence_level < 1.0) {
        return Err(EngineError::invalid("confidence_level", "must be in (0, 1)"));
    }
    if !(0.0..=1.0).contains(&config.risk_tolerance) {
        return Err(EngineError::invalid("risk_tolerance", "must be in [0, 1]"));
    }
    if !(config.commitment_term_years.is_finite() && config.commitment_term_years > 0.0) {
        return Err(EngineError::invalid("commitment_term_years", "must be positive"));
    }
    if config.term_months() > MAX_PERIODS {
        return Err(EngineError::invalid(
            "commitment_term_years",
            format!("must not exceed {} months", MAX_PERIODS),
        ));
    }
    if !(config.discount_rate.is_finite() && config.discount_rate > -1.0) {
        return Err(EngineError::invalid("discount_rate", "must be greater than -1"));
    }
    if !(config.annualisation_factor.is_finite() && config.annualisation_factor > 0.0) {
        return Err(EngineError::invalid("annualisation_factor", "must be positive"));
    }
    let counts = [
        ("forecast_horizon", config.forecast_horizon),
        ("var_simulations", config.var_simulations),
        ("var_time_horizon", config.var_time_horizon),
        ("simulation_paths", config.simulation_paths),
        ("synthetic_history_months", config.synthetic_history_months),
    ];
    for (name, value) in counts {
        if value == 0 {
            return Err(EngineError::invalid(name, "must be positive"));
        }
    }
    let volatilities = [
        ("simulation_volatility", config.simulation_volatility),
        ("option_volatility", config.option_volatility),
    ];
    for (name, value) in volatilities {
        if !(value.is_finite() && value >= 0.0) {
            return Err(EngineError::invalid(name, "must be finite and non-negative"));
        }
    }
    if config.simulation_paths > MAX_PATHS {
        return Err(EngineError::invalid(
            "simulation_paths",
            format!("must not exceed {}", MAX_PATHS),
        ));
    }
    if !(config.commitment_ratio > 0.0 && config.commitment_ratio <= 1.0) {
        return Err(EngineError::invalid("commitment_ratio", "must be in (0, 1]"));
    }
    config.discounts.validate()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AnalysisConfigBuilder {
        AnalysisConfig::builder()
            .risk_free_rate(0.03)
            .confidence_level(0.95)
            .risk_tolerance(0.5)
            .commitment_term_years(3.0)
            .discount_rate(0.05)
    }

    #[test]
    fn test_defaults() {
        let config = complete().build().unwrap();
        assert_eq!(config.seed(), DEFAULT_SEED);
        assert_eq!(config.annualisation_factor(), 252.0);
        assert_eq!(config.forecast_horizon(), 12);
        assert_eq!(config.var_simulations(), 10_000);
        assert_eq!(config.simulation_paths(), 10_000);
        assert_eq!(config.commitment_ratio(), 0.7);
        assert_eq!(config.discounts(), &DiscountTable::default());
    }

    #[test]
    fn test_each_mandatory_scalar_is_reported() {
        let cases = [
            ("risk_free_rate", AnalysisConfigBuilder::default()),
            ("confidence_level", AnalysisConfig::builder().risk_free_rate(0.03)),
            (
                "risk_tolerance",
                AnalysisConfig::builder()
                    .risk_free_rate(0.03)
                    .confidence_level(0.95),
            ),
            (
                "discount_rate",
                AnalysisConfig::builder()
                    .risk_free_rate(0.03)
                    .confidence_level(0.95)
                    .risk_tolerance(0.5)
                    .commitment_term_years(1.0),
            ),
        ];
        for (name, builder) in cases {
            assert_eq!(builder.build(), Err(EngineError::MissingConfig(name.to_string())));
        }
    }

    #[test]
    fn test_out_of_domain_values() {
        assert!(matches!(
            complete().confidence_level(1.0).build(),
            Err(EngineError::InvalidConfig { .. })
        ));
        assert!(complete().risk_tolerance(1.5).build().is_err());
        assert!(complete().commitment_term_years(0.0).build().is_err());
        assert!(complete().var_simulations(0).build().is_err());
        assert!(complete().commitment_ratio(0.0).build().is_err());
        assert!(complete().option_volatility(-0.2).build().is_err());
        assert!(complete()
            .discounts(DiscountTable {
                three_year: 1.5,
                one_year: 0.3,
                flex: 0.2
            })
            .build()
            .is_err());
    }

    #[test]
    fn test_term_bounded_by_simulation_periods() {
        let longest = complete().commitment_term_years(100.0).build().unwrap();
        assert_eq!(longest.term_months(), MAX_PERIODS);

        for years in [100.1, 3e7, 1e300] {
            assert!(matches!(
                complete().commitment_term_years(years).build(),
                Err(EngineError::InvalidConfig { ref name, .. }) if name == "commitment_term_years"
            ));
        }
        assert!(complete().simulation_paths(MAX_PATHS + 1).build().is_err());
    }

    #[test]
    fn test_toml_round_trip_of_fields() {
        let text = r#"
            risk_free_rate = 0.03
            confidence_level = 0.99
            risk_tolerance = 0.8
            commitment_term_years = 1.0
            discount_rate = 0.04
            seed = 7
            simulation_paths = 500

            [discounts]
            three_year = 0.6
        "#;
        let config = AnalysisConfig::from_toml_str(text).unwrap();
        assert_eq!(config.confidence_level(), 0.99);
        assert_eq!(config.term_months(), 12);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.simulation_paths(), 500);
        assert_eq!(config.discounts().three_year, 0.6);
        assert_eq!(config.discounts().one_year, 0.37);
    }

    #[test]
    fn test_toml_missing_and_unknown_keys() {
        let missing = "risk_free_rate = 0.03\nconfidence_level = 0.95";
        assert_eq!(
            AnalysisConfig::from_toml_str(missing),
            Err(EngineError::MissingConfig("risk_tolerance".to_string()))
        );

        let unknown = "risk_free_rat = 0.03";
        assert!(matches!(
            AnalysisConfig::from_toml_str(unknown),
            Err(EngineError::ConfigParse(_))
        ));

        assert!(matches!(
            AnalysisConfig::from_toml_str("risk_free_rate = "),
            Err(EngineError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            AnalysisConfig::from_file("/nonexistent/cud-analysis.toml"),
            Err(EngineError::ConfigFile(_))
        ));
    }
}
