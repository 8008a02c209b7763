//! Returns/volatility estimation per resource class.
//!
//! For each asset the period-over-period log returns of its spend series are
//! annualised:
//!
//! ```text
//! μ = mean(ln(x_t / x_{t-1})) · A
//! σ = sd(ln(x_t / x_{t-1})) · √A
//! ```
//!
//! where `A` is the annualisation factor (252 by default) and `sd` is the
//! sample standard deviation.

use std::collections::BTreeMap;

use cud_core::math::statistics::{mean, std_sample};
use cud_core::types::AnalyticsError;
use rayon::prelude::*;
use tracing::warn;

/// Default annualisation factor.
pub const DEFAULT_ANNUALISATION_FACTOR: f64 = 252.0;

/// A resource class with its ordered monthly spend history.
///
/// # Examples
/// ```
/// use cud_models::estimation::AssetClass;
///
/// let asset = AssetClass::new("n2-standard", vec![100.0, 110.0, 121.0]);
/// assert_eq!(asset.current_spend(), Some(121.0));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetClass {
    /// Identifier of the resource class.
    pub id: String,
    /// Monthly spend, oldest first.
    pub spend: Vec<f64>,
}

impl AssetClass {
    /// Create an asset from an identifier and spend history.
    pub fn new(id: impl Into<String>, spend: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            spend,
        }
    }

    /// Latest observation, the current run-rate.
    pub fn current_spend(&self) -> Option<f64> {
        self.spend.last().copied()
    }

    /// Period-over-period log returns.
    ///
    /// # Errors
    /// - `InsufficientData` for fewer than two observations
    /// - `DegenerateInput` if any observation is non-positive or not finite
    pub fn log_returns(&self) -> Result<Vec<f64>, AnalyticsError> {
        if self.spend.len() < 2 {
            return Err(AnalyticsError::insufficient_data(
                format!("returns of '{}'", self.id),
                self.spend.len(),
                2,
            ));
        }
        if let Some(bad) = self.spend.iter().find(|x| !(x.is_finite() && **x > 0.0)) {
            return Err(AnalyticsError::DegenerateInput(format!(
                "asset '{}' has non-positive spend {}",
                self.id, bad
            )));
        }
        Ok(self
            .spend
            .windows(2)
            .map(|w| (w[1] / w[0]).ln())
            .collect())
    }
}

/// Annualised return and volatility of one asset.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssetEstimate {
    /// Annualised mean log return.
    pub expected_return: f64,
    /// Annualised volatility of log returns.
    pub volatility: f64,
    /// Number of returns the estimate is based on.
    pub observations: usize,
}

/// An asset left out of the estimate and why.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkippedAsset {
    /// Identifier of the skipped asset.
    pub id: String,
    /// Reason for skipping.
    pub reason: AnalyticsError,
}

/// Estimates for every eligible asset plus the skipped ones.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EstimationReport {
    /// Estimates keyed by asset identifier.
    pub estimates: BTreeMap<String, AssetEstimate>,
    /// Assets that could not be estimated, in input order.
    pub skipped: Vec<SkippedAsset>,
}

impl EstimationReport {
    /// Expected-return map, the optimiser's input.
    pub fn expected_returns(&self) -> BTreeMap<String, f64> {
        self.estimates
            .iter()
            .map(|(id, e)| (id.clone(), e.expected_return))
            .collect()
    }

    /// Number of assets with an estimate.
    pub fn eligible(&self) -> usize {
        self.estimates.len()
    }
}

/// Returns/volatility estimator.
///
/// # Examples
/// ```
/// use cud_models::estimation::{AssetClass, ReturnEstimator};
///
/// let estimator = ReturnEstimator::default();
/// let assets = vec![
///     AssetClass::new("a", vec![100.0, 101.0, 103.0, 102.0]),
///     AssetClass::new("b", vec![50.0]),
/// ];
/// let report = estimator.estimate(&assets);
/// assert_eq!(report.eligible(), 1);
/// assert_eq!(report.skipped[0].id, "b");
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReturnEstimator {
    annualisation_factor: f64,
}

impl Default for ReturnEstimator {
    fn default() -> Self {
        Self {
            annualisation_factor: DEFAULT_ANNUALISATION_FACTOR,
        }
    }
}

impl ReturnEstimator {
    /// Create an estimator with a custom annualisation factor.
    ///
    /// # Errors
    /// `InvalidParameter` if the factor is not finite and positive.
    pub fn new(annualisation_factor: f64) -> Result<Self, AnalyticsError> {
        if !(annualisation_factor.is_finite() && annualisation_factor > 0.0) {
            return Err(AnalyticsError::invalid_parameter(
                "annualisation_factor",
                annualisation_factor,
                "must be finite and positive",
            ));
        }
        Ok(Self {
            annualisation_factor,
        })
    }

    /// Annualisation factor in use.
    pub fn annualisation_factor(&self) -> f64 {
        self.annualisation_factor
    }

    /// Estimate a single asset.
    ///
    /// With a single return the sample deviation is undefined and the
    /// volatility is reported as 0.
    pub fn estimate_asset(&self, asset: &AssetClass) -> Result<AssetEstimate, AnalyticsError> {
        let returns = asset.log_returns()?;
        let mu = mean(&returns).unwrap_or(0.0);
        let sd = std_sample(&returns).unwrap_or(0.0);
        Ok(AssetEstimate {
            expected_return: mu * self.annualisation_factor,
            volatility: sd * self.annualisation_factor.sqrt(),
            observations: returns.len(),
        })
    }

    /// Estimate every asset independently and in parallel.
    ///
    /// Ineligible assets are logged and listed in the report; they never
    /// affect the estimates of the others.
    pub fn estimate(&self, assets: &[AssetClass]) -> EstimationReport {
        let results: Vec<(&AssetClass, Result<AssetEstimate, AnalyticsError>)> = assets
            .par_iter()
            .map(|asset| (asset, self.estimate_asset(asset)))
            .collect();

        let mut report = EstimationReport::default();
        for (asset, result) in results {
            match result {
                Ok(estimate) => {
                    report.estimates.insert(asset.id.clone(), estimate);
                }
                Err(reason) => {
                    warn!(asset = %asset.id, %reason, "skipping asset in return estimation");
                    report.skipped.push(SkippedAsset {
                        id: asset.id.clone(),
                        reason,
                    });
                }
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_constant_growth_has_zero_volatility() {
        let spend: Vec<f64> = (0..6).map(|i| 100.0 * 1.01_f64.powi(i)).collect();
        let estimate = ReturnEstimator::default()
            .estimate_asset(&AssetClass::new("a", spend))
            .unwrap();
        assert_relative_eq!(estimate.expected_return, 1.01_f64.ln() * 252.0, epsilon = 1e-10);
        assert!(estimate.volatility < 1e-10);
        assert_eq!(estimate.observations, 5);
    }

    #[test]
    fn test_annualisation_factor_is_configurable() {
        let asset = AssetClass::new("a", vec![100.0, 110.0, 99.0]);
        let daily = ReturnEstimator::default().estimate_asset(&asset).unwrap();
        let monthly = ReturnEstimator::new(12.0).unwrap().estimate_asset(&asset).unwrap();
        assert_relative_eq!(
            daily.expected_return / monthly.expected_return,
            21.0,
            epsilon = 1e-10
        );
        assert_relative_eq!(
            daily.volatility / monthly.volatility,
            21.0_f64.sqrt(),
            epsilon = 1e-10
        );
    }

    #[test]
    fn test_single_return_reports_zero_volatility() {
        let estimate = ReturnEstimator::default()
            .estimate_asset(&AssetClass::new("a", vec![100.0, 120.0]))
            .unwrap();
        assert_eq!(estimate.volatility, 0.0);
        assert_eq!(estimate.observations, 1);
    }

    #[test]
    fn test_short_and_degenerate_assets_are_skipped() {
        let assets = vec![
            AssetClass::new("short", vec![10.0]),
            AssetClass::new("ok", vec![10.0, 11.0, 12.0]),
            AssetClass::new("zero", vec![10.0, 0.0, 12.0]),
        ];
        let report = ReturnEstimator::default().estimate(&assets);

        assert_eq!(report.eligible(), 1);
        assert!(report.estimates.contains_key("ok"));
        assert_eq!(report.skipped.len(), 2);
        assert!(report.skipped[0].reason.is_precondition());
        assert!(matches!(
            report.skipped[1].reason,
            AnalyticsError::DegenerateInput(_)
        ));
    }

    #[test]
    fn test_invalid_factor() {
        assert!(ReturnEstimator::new(0.0).is_err());
        assert!(ReturnEstimator::new(f64::INFINITY).is_err());
    }

    #[test]
    fn test_expected_returns_map() {
        let assets = vec![
            AssetClass::new("b", vec![10.0, 11.0]),
            AssetClass::new("a", vec![10.0, 9.0]),
        ];
        let map = ReturnEstimator::default().estimate(&assets).expected_returns();
        let keys: Vec<&String> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(map["a"] < 0.0 && map["b"] > 0.0);
    }
}
