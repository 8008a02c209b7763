//! A commitment valued as a European call option.
//!
//! The spot is the current on-demand run-rate, the strike the discounted
//! committed cost and the maturity the commitment term in years.
//!
//! ## Mathematical Formulas
//!
//! **Call Price**: C = S·N(d₁) − K·e^(−rT)·N(d₂)
//!
//! Where:
//! - d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T)
//! - d₂ = d₁ − σ√T
//!
//! With σ = 0 the value collapses to the discounted intrinsic value.

use cud_core::math::distributions::{norm_cdf, norm_pdf};
use cud_core::math::solvers::{BrentSolver, SolverConfig};
use cud_core::types::AnalyticsError;

/// Volatility search interval for the implied-volatility solve.
const IMPLIED_VOL_BRACKET: (f64, f64) = (1e-6, 5.0);

/// Option sensitivities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Greeks {
    /// ∂V/∂S
    pub delta: f64,
    /// ∂²V/∂S²
    pub gamma: f64,
    /// ∂V/∂t (per year, usually negative)
    pub theta: f64,
    /// ∂V/∂σ
    pub vega: f64,
    /// ∂V/∂r
    pub rho: f64,
}

/// Result of valuing a commitment option.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptionValuation {
    /// Call value.
    pub option_value: f64,
    /// max(S − K, 0).
    pub intrinsic_value: f64,
    /// Option value less intrinsic value; 0 when σ = 0.
    pub time_value: f64,
    /// Sensitivities.
    pub greeks: Greeks,
    /// K / S.
    pub break_even_utilisation: f64,
    /// Volatility the valuation was computed with.
    pub implied_volatility_target: f64,
}

/// Commitment modelled as a European call.
///
/// # Examples
/// ```
/// use cud_models::option::CommitmentOption;
///
/// let option = CommitmentOption::new(100_000.0, 70_000.0, 3.0, 0.20, 0.03).unwrap();
/// let valuation = option.value();
///
/// assert!(valuation.option_value > 30_000.0);
/// assert!(valuation.greeks.delta > 0.0 && valuation.greeks.delta < 1.0);
/// assert!(valuation.time_value >= 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommitmentOption {
    spot: f64,
    strike: f64,
    maturity: f64,
    volatility: f64,
    discount_rate: f64,
}

impl CommitmentOption {
    /// Creates a new commitment option.
    ///
    /// # Errors
    /// `InvalidParameter` unless spot, strike and maturity are positive,
    /// volatility is non-negative and every input is finite.
    pub fn new(
        spot: f64,
        strike: f64,
        maturity: f64,
        volatility: f64,
        discount_rate: f64,
    ) -> Result<Self, AnalyticsError> {
        for (name, value) in [("spot", spot), ("strike", strike), ("maturity", maturity)] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalyticsError::invalid_parameter(
                    name,
                    value,
                    "must be finite and positive",
                ));
            }
        }
        if !(volatility.is_finite() && volatility >= 0.0) {
            return Err(AnalyticsError::invalid_parameter(
                "volatility",
                volatility,
                "must be finite and non-negative",
            ));
        }
        if !discount_rate.is_finite() {
            return Err(AnalyticsError::invalid_parameter(
                "discount_rate",
                discount_rate,
                "must be finite",
            ));
        }
        Ok(Self {
            spot,
            strike,
            maturity,
            volatility,
            discount_rate,
        })
    }

    /// Option whose strike is the spot less a commitment discount.
    ///
    /// ```
    /// use cud_models::option::CommitmentOption;
    ///
    /// let option = CommitmentOption::from_discount(1_000.0, 0.3, 1.0, 0.2, 0.03).unwrap();
    /// assert!((option.strike() - 700.0).abs() < 1e-9);
    /// ```
    pub fn from_discount(
        spot: f64,
        discount_fraction: f64,
        maturity: f64,
        volatility: f64,
        discount_rate: f64,
    ) -> Result<Self, AnalyticsError> {
        if !(0.0..1.0).contains(&discount_fraction) {
            return Err(AnalyticsError::invalid_parameter(
                "discount_fraction",
                discount_fraction,
                "must be in [0, 1)",
            ));
        }
        Self::new(
            spot,
            spot * (1.0 - discount_fraction),
            maturity,
            volatility,
            discount_rate,
        )
    }

    /// Returns the spot (current run-rate).
    #[inline]
    pub fn spot(&self) -> f64 {
        self.spot
    }

    /// Returns the strike (discounted committed cost).
    #[inline]
    pub fn strike(&self) -> f64 {
        self.strike
    }

    /// Returns the maturity in years.
    #[inline]
    pub fn maturity(&self) -> f64 {
        self.maturity
    }

    /// Returns the volatility.
    #[inline]
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Returns the discount rate.
    #[inline]
    pub fn discount_rate(&self) -> f64 {
        self.discount_rate
    }

    /// Same option at a different volatility.
    pub fn with_volatility(&self, volatility: f64) -> Result<Self, AnalyticsError> {
        Self::new(
            self.spot,
            self.strike,
            self.maturity,
            volatility,
            self.discount_rate,
        )
    }

    /// d₁ = (ln(S/K) + (r + σ²/2)T) / (σ√T). Requires σ > 0.
    #[inline]
    fn d1(&self) -> f64 {
        let vol_sqrt_t = self.volatility * self.maturity.sqrt();
        ((self.spot / self.strike).ln()
            + (self.discount_rate + 0.5 * self.volatility * self.volatility) * self.maturity)
            / vol_sqrt_t
    }

    /// Call price only.
    pub fn price(&self) -> f64 {
        let discount = (-self.discount_rate * self.maturity).exp();
        if self.volatility == 0.0 {
            return (self.spot - self.strike).max(0.0) * discount;
        }
        let d1 = self.d1();
        let d2 = d1 - self.volatility * self.maturity.sqrt();
        self.spot * norm_cdf(d1) - self.strike * discount * norm_cdf(d2)
    }

    /// Value the option with its Greeks.
    pub fn value(&self) -> OptionValuation {
        let intrinsic_value = (self.spot - self.strike).max(0.0);
        let break_even_utilisation = self.strike / self.spot;
        let discount = (-self.discount_rate * self.maturity).exp();

        if self.volatility == 0.0 {
            return OptionValuation {
                option_value: intrinsic_value * discount,
                intrinsic_value,
                time_value: 0.0,
                greeks: Greeks {
                    delta: if self.spot > self.strike { 1.0 } else { 0.0 },
                    ..Greeks::default()
                },
                break_even_utilisation,
                implied_volatility_target: 0.0,
            };
        }

        let sqrt_t = self.maturity.sqrt();
        let d1 = self.d1();
        let d2 = d1 - self.volatility * sqrt_t;
        let n_d1 = norm_cdf(d1);
        let n_d2 = norm_cdf(d2);
        let pdf_d1 = norm_pdf(d1);

        let option_value = self.spot * n_d1 - self.strike * discount * n_d2;
        let greeks = Greeks {
            delta: n_d1,
            gamma: pdf_d1 / (self.spot * self.volatility * sqrt_t),
            theta: -(self.spot * pdf_d1 * self.volatility) / (2.0 * sqrt_t)
                - self.discount_rate * self.strike * discount * n_d2,
            vega: self.spot * pdf_d1 * sqrt_t,
            rho: self.strike * self.maturity * discount * n_d2,
        };

        OptionValuation {
            option_value,
            intrinsic_value,
            time_value: option_value - intrinsic_value,
            greeks,
            break_even_utilisation,
            implied_volatility_target: self.volatility,
        }
    }

    /// Volatility at which the option is worth `target_value`.
    ///
    /// # Errors
    /// - `InvalidParameter` for a non-finite target
    /// - `NumericalDivergence` if no volatility in (0, 5] matches the target
    ///
    /// # Examples
    /// ```
    /// use cud_models::option::CommitmentOption;
    ///
    /// let option = CommitmentOption::new(100.0, 90.0, 1.0, 0.35, 0.02).unwrap();
    /// let target = option.price();
    /// let implied = option.implied_volatility(target).unwrap();
    /// assert!((implied - 0.35).abs() < 1e-6);
    /// ```
    pub fn implied_volatility(&self, target_value: f64) -> Result<f64, AnalyticsError> {
        if !target_value.is_finite() {
            return Err(AnalyticsError::invalid_parameter(
                "target_value",
                target_value,
                "must be finite",
            ));
        }
        let objective = |vol: f64| {
            let priced = Self {
                volatility: vol,
                ..*self
            };
            priced.price() - target_value
        };
        let solver = BrentSolver::new(SolverConfig::new(1e-10, 200)?);
        let (lo, hi) = IMPLIED_VOL_BRACKET;
        Ok(solver.find_root(objective, lo, hi)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_worked_example() {
        let option = CommitmentOption::new(100_000.0, 70_000.0, 3.0, 0.20, 0.03).unwrap();
        let v = option.value();
        assert!(v.option_value > 30_000.0);
        assert!(v.greeks.delta > 0.0 && v.greeks.delta < 1.0);
        assert_eq!(v.intrinsic_value, 30_000.0);
        assert_relative_eq!(v.break_even_utilisation, 0.7);
        assert_eq!(v.implied_volatility_target, 0.20);
    }

    #[test]
    fn test_zero_volatility() {
        let option = CommitmentOption::new(100_000.0, 70_000.0, 3.0, 0.0, 0.03).unwrap();
        let v = option.value();
        assert_relative_eq!(v.option_value, 30_000.0 * (-0.09_f64).exp(), epsilon = 1e-9);
        assert_relative_eq!(v.option_value, 27_417.93, epsilon = 0.01);
        assert_eq!(v.greeks.delta, 1.0);
        assert_eq!(v.greeks.gamma, 0.0);
        assert_eq!(v.greeks.theta, 0.0);
        assert_eq!(v.greeks.vega, 0.0);
        assert_eq!(v.greeks.rho, 0.0);
        assert_eq!(v.time_value, 0.0);
    }

    #[test]
    fn test_zero_volatility_out_of_money() {
        let v = CommitmentOption::new(50.0, 70.0, 1.0, 0.0, 0.03).unwrap().value();
        assert_eq!(v.option_value, 0.0);
        assert_eq!(v.greeks.delta, 0.0);
    }

    #[test]
    fn test_greeks_match_finite_differences() {
        let option = CommitmentOption::new(100.0, 95.0, 2.0, 0.25, 0.04).unwrap();
        let g = option.value().greeks;
        let h = 1e-4;

        let bump = |spot: f64, vol: f64, rate: f64| {
            CommitmentOption::new(spot, 95.0, 2.0, vol, rate).unwrap().price()
        };
        let delta_fd = (bump(100.0 + h, 0.25, 0.04) - bump(100.0 - h, 0.25, 0.04)) / (2.0 * h);
        let gamma_fd = (bump(100.0 + h, 0.25, 0.04) - 2.0 * option.price()
            + bump(100.0 - h, 0.25, 0.04))
            / (h * h);
        let vega_fd = (bump(100.0, 0.25 + h, 0.04) - bump(100.0, 0.25 - h, 0.04)) / (2.0 * h);
        let rho_fd = (bump(100.0, 0.25, 0.04 + h) - bump(100.0, 0.25, 0.04 - h)) / (2.0 * h);

        assert_relative_eq!(g.delta, delta_fd, epsilon = 1e-5);
        assert_relative_eq!(g.gamma, gamma_fd, max_relative = 1e-3);
        assert_relative_eq!(g.vega, vega_fd, max_relative = 1e-4);
        assert_relative_eq!(g.rho, rho_fd, max_relative = 1e-4);
        assert!(g.theta < 0.0);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(CommitmentOption::new(0.0, 1.0, 1.0, 0.2, 0.0).is_err());
        assert!(CommitmentOption::new(1.0, -1.0, 1.0, 0.2, 0.0).is_err());
        assert!(CommitmentOption::new(1.0, 1.0, 0.0, 0.2, 0.0).is_err());
        assert!(CommitmentOption::new(1.0, 1.0, 1.0, -0.2, 0.0).is_err());
        assert!(CommitmentOption::new(1.0, 1.0, 1.0, 0.2, f64::NAN).is_err());
        assert!(CommitmentOption::from_discount(1.0, 1.0, 1.0, 0.2, 0.0).is_err());
    }

    #[test]
    fn test_implied_volatility_unreachable_target() {
        let option = CommitmentOption::new(100.0, 90.0, 1.0, 0.2, 0.02).unwrap();
        // Above the spot: no volatility prices this high
        let err = option.implied_volatility(150.0).unwrap_err();
        assert!(matches!(err, AnalyticsError::NumericalDivergence { .. }));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn test_value_at_least_intrinsic(
                spot in 10.0..1_000.0_f64,
                moneyness in 0.5..1.5_f64,
                maturity in 0.1..5.0_f64,
                vol in 0.01..1.0_f64,
                rate in 0.0..0.1_f64,
            ) {
                let option = CommitmentOption::new(spot, spot * moneyness, maturity, vol, rate).unwrap();
                let v = option.value();
                // Abramowitz-Stegun CDF error bound scaled by spot
                prop_assert!(v.time_value >= -1e-6 * spot);
                prop_assert!(v.greeks.delta >= 0.0 && v.greeks.delta <= 1.0);
                prop_assert!(v.greeks.gamma >= 0.0);
            }
        }
    }
}
