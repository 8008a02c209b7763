//! Commitment ladder design.
//!
//! Splits forecast demand into 3-year, 1-year and flexible commitments plus
//! an on-demand buffer. The split is a fixed table keyed by risk-tolerance
//! band, not a continuous function of tolerance:
//!
//! | Tier | Range | 3-year | 1-year | Flex | Buffer |
//! |---|---|---|---|---|---|
//! | Conservative | < 0.3 | 50% safe | 30% safe | 20% safe | mean − safe |
//! | Moderate | [0.3, 0.7) | 60% safe | 25% safe | 15% safe | mean − safe |
//! | Aggressive | ≥ 0.7 | 70% mean | 20% mean | 10% mean | 10% mean |
//!
//! The safe level is the mean of the forecast's lower bound, or
//! `mean − 1.96σ` without one, clamped to `[0, mean]`.

use cud_core::math::statistics::{mean, std_sample};
use cud_core::types::{AnalyticsError, DiscountTable};

use crate::forecasting::DemandForecast;

/// Risk-tolerance band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RiskTier {
    /// Tolerance below 0.3.
    Conservative,
    /// Tolerance in [0.3, 0.7).
    Moderate,
    /// Tolerance of 0.7 or more.
    Aggressive,
}

impl RiskTier {
    /// Band for a tolerance in [0, 1].
    ///
    /// # Errors
    /// `InvalidParameter` outside [0, 1].
    pub fn from_tolerance(tolerance: f64) -> Result<Self, AnalyticsError> {
        if !(0.0..=1.0).contains(&tolerance) {
            return Err(AnalyticsError::invalid_parameter(
                "risk_tolerance",
                tolerance,
                "must be in [0, 1]",
            ));
        }
        Ok(if tolerance < 0.3 {
            Self::Conservative
        } else if tolerance < 0.7 {
            Self::Moderate
        } else {
            Self::Aggressive
        })
    }

    /// Share of the base allocated to 3-year, 1-year and flex layers.
    pub fn layer_shares(&self) -> [f64; 3] {
        match self {
            Self::Conservative => [0.5, 0.3, 0.2],
            Self::Moderate => [0.6, 0.25, 0.15],
            Self::Aggressive => [0.7, 0.2, 0.1],
        }
    }

    /// Lower-case name used in reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Moderate => "moderate",
            Self::Aggressive => "aggressive",
        }
    }
}

/// Tiered commitment allocation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitmentLadder {
    /// 3-year resource commitment.
    pub three_year: f64,
    /// 1-year resource commitment.
    pub one_year: f64,
    /// Flexible spend-based commitment.
    pub flex: f64,
    /// Uncommitted on-demand buffer.
    pub on_demand_buffer: f64,
    /// Risk tier the allocation was taken from.
    pub tier: RiskTier,
    /// Mean forecast demand.
    pub base_demand: f64,
    /// Confidence-adjusted demand level.
    pub safe_level: f64,
    /// Σ layer × discount.
    pub expected_monthly_savings: f64,
}

impl CommitmentLadder {
    /// Committed amount across the three layers.
    pub fn total_committed(&self) -> f64 {
        self.three_year + self.one_year + self.flex
    }
}

/// Ladder designer parameterised by a discount table.
///
/// # Examples
/// ```
/// use cud_models::ladder::{LadderDesigner, RiskTier};
///
/// let designer = LadderDesigner::default();
/// let ladder = designer.design(&[1_000.0; 12], Some(&[800.0; 12]), 0.5).unwrap();
///
/// assert_eq!(ladder.tier, RiskTier::Moderate);
/// assert!((ladder.three_year - 480.0).abs() < 1e-9);
/// assert!((ladder.on_demand_buffer - 200.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LadderDesigner {
    discounts: DiscountTable,
}

impl LadderDesigner {
    /// Create a designer using the given discount table.
    pub fn new(discounts: DiscountTable) -> Self {
        Self { discounts }
    }

    /// Discount table in use.
    pub fn discounts(&self) -> &DiscountTable {
        &self.discounts
    }

    /// Design a ladder from a forecast produced by the demand forecaster.
    pub fn design_from_forecast(
        &self,
        forecast: &DemandForecast,
        risk_tolerance: f64,
    ) -> Result<CommitmentLadder, AnalyticsError> {
        self.design(&forecast.point, forecast.lower.as_deref(), risk_tolerance)
    }

    /// Design a ladder from a point forecast and optional lower bound.
    ///
    /// # Errors
    /// - `InsufficientData` for an empty forecast
    /// - `InvalidParameter` for a tolerance outside [0, 1]
    pub fn design(
        &self,
        point: &[f64],
        lower: Option<&[f64]>,
        risk_tolerance: f64,
    ) -> Result<CommitmentLadder, AnalyticsError> {
        let tier = RiskTier::from_tolerance(risk_tolerance)?;
        let base = mean(point)
            .ok_or_else(|| AnalyticsError::insufficient_data("commitment ladder", 0, 1))?
            .max(0.0);

        let raw_safe = match lower.and_then(mean) {
            Some(bound) => bound,
            None => {
                let sigma = match std_sample(point) {
                    Some(s) if s > 0.0 => s,
                    _ => 0.1 * base,
                };
                base - 1.96 * sigma
            }
        };
        let safe = raw_safe.clamp(0.0, base);

        let [s3, s1, sf] = tier.layer_shares();
        let (layer_base, buffer) = match tier {
            RiskTier::Aggressive => (base, 0.1 * base),
            _ => (safe, base - safe),
        };
        let three_year = s3 * layer_base;
        let one_year = s1 * layer_base;
        let flex = sf * layer_base;

        let expected_monthly_savings = three_year * self.discounts.three_year
            + one_year * self.discounts.one_year
            + flex * self.discounts.flex;

        Ok(CommitmentLadder {
            three_year,
            one_year,
            flex,
            on_demand_buffer: buffer,
            tier,
            base_demand: base,
            safe_level: safe,
            expected_monthly_savings,
        })
    }
}
