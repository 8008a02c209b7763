//! Fixed stress scenarios for a commitment.
//!
//! Each scenario perturbs usage by a fixed percentage. Its cost impact is the
//! unused commitment plus a 30% premium on usage growth above the base:
//!
//! ```text
//! impact = max(0, commitment − perturbed) + 0.3 · max(0, perturbed − base)
//! ```
//!
//! The baseline scenario has zero impact by definition.

use cud_core::types::AnalyticsError;
use rayon::prelude::*;

/// Premium paid on on-demand usage above the base.
pub const OVERAGE_PREMIUM: f64 = 0.3;

/// The five stress scenarios.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StressScenarioKind {
    /// No change in usage.
    Baseline,
    /// Usage −20%.
    MildRecession,
    /// Usage −40%.
    SevereRecession,
    /// Usage +50%.
    RapidGrowth,
    /// Usage −30%.
    TechnologyShift,
}

impl StressScenarioKind {
    /// Every scenario, in reporting order.
    pub const ALL: [Self; 5] = [
        Self::Baseline,
        Self::MildRecession,
        Self::SevereRecession,
        Self::RapidGrowth,
        Self::TechnologyShift,
    ];

    /// Snake-case name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::MildRecession => "mild_recession",
            Self::SevereRecession => "severe_recession",
            Self::RapidGrowth => "rapid_growth",
            Self::TechnologyShift => "technology_shift",
        }
    }

    /// Get description.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Baseline => "Usage continues at the current level",
            Self::MildRecession => "Usage falls 20% in a mild downturn",
            Self::SevereRecession => "Usage falls 40% in a severe downturn",
            Self::RapidGrowth => "Usage grows 50% beyond the base",
            Self::TechnologyShift => "Usage falls 30% after a platform migration",
        }
    }

    /// Relative change in usage.
    pub fn usage_change(&self) -> f64 {
        match self {
            Self::Baseline => 0.0,
            Self::MildRecession => -0.20,
            Self::SevereRecession => -0.40,
            Self::RapidGrowth => 0.50,
            Self::TechnologyShift => -0.30,
        }
    }

    /// Probability weight. The five weights sum to 1.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Baseline => 0.40,
            Self::MildRecession => 0.25,
            Self::SevereRecession => 0.10,
            Self::RapidGrowth => 0.15,
            Self::TechnologyShift => 0.10,
        }
    }
}

/// Result of one scenario.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScenarioOutcome {
    /// Scenario evaluated.
    pub kind: StressScenarioKind,
    /// Relative usage change applied.
    pub usage_change: f64,
    /// Probability weight.
    pub weight: f64,
    /// Usage cost after the change.
    pub perturbed_cost: f64,
    /// Cost impact.
    pub cost_impact: f64,
}

/// Result of the full stress test.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StressTestResult {
    /// Outcomes in reporting order.
    pub scenarios: Vec<ScenarioOutcome>,
    /// Σ weight × impact.
    pub weighted_risk_impact: f64,
    /// Largest single impact.
    pub worst_case_impact: f64,
    /// `commitment · (1 − weighted / base)`, or the commitment when the base
    /// is not positive.
    pub risk_adjusted_commitment: f64,
}

impl StressTestResult {
    /// Outcome of one scenario.
    pub fn outcome(&self, kind: StressScenarioKind) -> Option<&ScenarioOutcome> {
        self.scenarios.iter().find(|s| s.kind == kind)
    }
}

fn evaluate(kind: StressScenarioKind, base_cost: f64, commitment: f64) -> ScenarioOutcome {
    let perturbed_cost = base_cost * (1.0 + kind.usage_change());
    let cost_impact = match kind {
        StressScenarioKind::Baseline => 0.0,
        _ => {
            (commitment - perturbed_cost).max(0.0)
                + OVERAGE_PREMIUM * (perturbed_cost - base_cost).max(0.0)
        }
    };
    ScenarioOutcome {
        kind,
        usage_change: kind.usage_change(),
        weight: kind.weight(),
        perturbed_cost,
        cost_impact,
    }
}

/// Runs every scenario against a base cost and commitment level.
///
/// # Errors
/// `InvalidParameter` if either amount is negative or not finite.
///
/// # Examples
/// ```
/// use cud_risk::stress::{stress_test, StressScenarioKind};
///
/// let result = stress_test(1_000.0, 700.0).unwrap();
/// let severe = result.outcome(StressScenarioKind::SevereRecession).unwrap();
/// assert!((severe.cost_impact - 100.0).abs() < 1e-9);
/// ```
pub fn stress_test(base_cost: f64, commitment: f64) -> Result<StressTestResult, AnalyticsError> {
    for (name, value) in [("base_cost", base_cost), ("commitment", commitment)] {
        if !(value.is_finite() && value >= 0.0) {
            return Err(AnalyticsError::invalid_parameter(
                name,
                value,
                "must be finite and non-negative",
            ));
        }
    }

    let scenarios: Vec<ScenarioOutcome> = StressScenarioKind::ALL
        .par_iter()
        .map(|kind| evaluate(*kind, base_cost, commitment))
        .collect();

    let weighted_risk_impact: f64 = scenarios.iter().map(|s| s.weight * s.cost_impact).sum();
    let worst_case_impact = scenarios
        .iter()
        .map(|s| s.cost_impact)
        .fold(0.0, f64::max);
    let risk_adjusted_commitment = if base_cost > 0.0 {
        commitment * (1.0 - weighted_risk_impact / base_cost)
    } else {
        commitment
    };

    Ok(StressTestResult {
        scenarios,
        weighted_risk_impact,
        worst_case_impact,
        risk_adjusted_commitment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_weights_sum_to_one() {
        let total: f64 = StressScenarioKind::ALL.iter().map(|k| k.weight()).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_baseline_impact_is_zero_even_when_over_committed() {
        let result = stress_test(100.0, 150.0).unwrap();
        let baseline = result.outcome(StressScenarioKind::Baseline).unwrap();
        assert_eq!(baseline.cost_impact, 0.0);
        assert_eq!(baseline.perturbed_cost, 100.0);
    }

    #[test]
    fn test_impacts() {
        let result = stress_test(1_000.0, 700.0).unwrap();
        let impact = |k| result.outcome(k).unwrap().cost_impact;

        assert_relative_eq!(impact(StressScenarioKind::MildRecession), 0.0, epsilon = 1e-9);
        assert_relative_eq!(impact(StressScenarioKind::SevereRecession), 100.0, epsilon = 1e-9);
        assert_relative_eq!(impact(StressScenarioKind::RapidGrowth), 150.0, epsilon = 1e-9);
        assert_relative_eq!(impact(StressScenarioKind::TechnologyShift), 0.0, epsilon = 1e-9);

        // 0.1·100 + 0.15·150
        assert_relative_eq!(result.weighted_risk_impact, 32.5, epsilon = 1e-9);
        assert_relative_eq!(result.worst_case_impact, 150.0, epsilon = 1e-9);
        assert_relative_eq!(
            result.risk_adjusted_commitment,
            700.0 * (1.0 - 32.5 / 1_000.0),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_reporting_order() {
        let result = stress_test(10.0, 5.0).unwrap();
        let kinds: Vec<StressScenarioKind> = result.scenarios.iter().map(|s| s.kind).collect();
        assert_eq!(kinds, StressScenarioKind::ALL.to_vec());
    }

    #[test]
    fn test_zero_base_keeps_commitment() {
        let result = stress_test(0.0, 50.0).unwrap();
        assert_eq!(result.risk_adjusted_commitment, 50.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(stress_test(-1.0, 10.0).is_err());
        assert!(stress_test(10.0, f64::NAN).is_err());
    }
}
