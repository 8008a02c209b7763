//! Commitment risk score.
//!
//! Three metrics of the historical usage `u` against a commitment `c`:
//!
//! - coefficient of variation `CV = sd(u) / mean(u)` (∞ when `mean(u) ≤ 0`)
//! - downside risk, the mean relative shortfall `(c − u) / c` over the
//!   months where `u < c` (0 when there are none)
//! - underutilisation probability `Φ((c − mean) / sd)` (0.5 when `sd = 0`)
//!
//! combine into `20·CV + 50·downside + 30·P`, clamped to [0, 100].

use cud_core::math::distributions::norm_cdf;
use cud_core::math::statistics::{mean, std_sample};
use cud_core::types::AnalyticsError;

/// Score below which a commitment is low risk.
pub const LOW_THRESHOLD: f64 = 30.0;

/// Score below which a commitment is medium risk.
pub const MEDIUM_THRESHOLD: f64 = 60.0;

/// Risk band of a score.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
pub enum RiskCategory {
    /// Score below 30.
    Low,
    /// Score in [30, 60).
    Medium,
    /// Score of 60 or more.
    High,
}

impl RiskCategory {
    /// Band for a score.
    pub fn from_score(score: f64) -> Self {
        if score < LOW_THRESHOLD {
            Self::Low
        } else if score < MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }

    /// Upper-case label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }
}

/// Metrics behind a risk score.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskMetrics {
    /// Sample deviation over mean of usage.
    pub coefficient_of_variation: f64,
    /// Mean relative shortfall below the commitment.
    pub downside_risk: f64,
    /// Probability that usage falls below the commitment.
    pub underutilisation_probability: f64,
}

/// Scored commitment risk.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RiskScore {
    /// Score in [0, 100].
    pub score: f64,
    /// Band of the score.
    pub category: RiskCategory,
    /// Contributing metrics.
    pub metrics: RiskMetrics,
}

impl RiskScore {
    /// Scores a set of metrics.
    ///
    /// # Examples
    /// ```
    /// use cud_risk::score::{RiskCategory, RiskMetrics, RiskScore};
    ///
    /// let score = RiskScore::from_metrics(RiskMetrics {
    ///     coefficient_of_variation: 0.1,
    ///     downside_risk: 0.2,
    ///     underutilisation_probability: 0.5,
    /// });
    /// assert!((score.score - 27.0).abs() < 1e-12);
    /// assert_eq!(score.category, RiskCategory::Low);
    /// ```
    pub fn from_metrics(metrics: RiskMetrics) -> Self {
        let raw = 20.0 * metrics.coefficient_of_variation
            + 50.0 * metrics.downside_risk
            + 30.0 * metrics.underutilisation_probability;
        Self {
            score: raw.clamp(0.0, 100.0),
            category: RiskCategory::from_score(raw),
            metrics,
        }
    }
}

/// Scores `commitment` against monthly `usage`.
///
/// # Errors
/// - `InvalidParameter` if the commitment is not positive and finite
/// - `InsufficientData` for fewer than two usage points
/// - `DegenerateInput` if a usage point is not finite
pub fn commitment_risk_score(commitment: f64, usage: &[f64]) -> Result<RiskScore, AnalyticsError> {
    if !(commitment.is_finite() && commitment > 0.0) {
        return Err(AnalyticsError::invalid_parameter(
            "commitment",
            commitment,
            "must be finite and positive",
        ));
    }
    if usage.iter().any(|u| !u.is_finite()) {
        return Err(AnalyticsError::DegenerateInput(
            "usage history contains a non-finite value".to_string(),
        ));
    }
    let (mu, sd) = match (mean(usage), std_sample(usage)) {
        (Some(mu), Some(sd)) => (mu, sd),
        _ => {
            return Err(AnalyticsError::insufficient_data(
                "commitment risk score",
                usage.len(),
                2,
            ))
        }
    };

    let coefficient_of_variation = if mu > 0.0 { sd / mu } else { f64::INFINITY };

    let shortfalls: Vec<f64> = usage
        .iter()
        .filter(|u| **u < commitment)
        .map(|u| (commitment - u) / commitment)
        .collect();
    let downside_risk = mean(&shortfalls).unwrap_or(0.0);

    let underutilisation_probability = if sd > 0.0 {
        norm_cdf((commitment - mu) / sd)
    } else {
        0.5
    };

    Ok(RiskScore::from_metrics(RiskMetrics {
        coefficient_of_variation,
        downside_risk,
        underutilisation_probability,
    }))
}
