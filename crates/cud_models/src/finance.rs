//! Discounted-cash-flow appraisal of a commitment.
//!
//! The investment `I` is paid at period 0 and cash flows `cf_1..cf_n`
//! arrive at the end of each period:
//!
//! ```text
//! NPV(r) = −I + Σ cf_t / (1 + r)^t
//! ```
//!
//! IRR is the `r` with `NPV(r) = 0`, found by scanning a rate grid for a
//! sign change and refining it with Brent's method. A stream with no sign
//! change reports [`IrrOutcome::NotConverged`] rather than a default rate.

use cud_core::math::solvers::{BrentSolver, SolverConfig};
use cud_core::math::statistics::{mean, std_population};
use cud_core::types::AnalyticsError;

/// Rates scanned for an IRR sign change, ascending.
const IRR_SCAN_GRID: [f64; 18] = [
    -0.99, -0.9, -0.75, -0.5, -0.25, 0.0, 0.05, 0.1, 0.2, 0.35, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0,
    5.0, 10.0,
];

/// Added to the return volatility in the risk-adjusted return.
const RISK_ADJUSTED_EPSILON: f64 = 1e-10;

/// Internal rate of return, or an explicit failure marker.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IrrOutcome {
    /// Rate at which NPV is zero.
    Converged(f64),
    /// No root was found in the scanned rate range.
    NotConverged,
}

impl IrrOutcome {
    /// The rate, if one was found.
    pub fn rate(&self) -> Option<f64> {
        match self {
            Self::Converged(r) => Some(*r),
            Self::NotConverged => None,
        }
    }
}

/// Payback period, or an explicit "never" marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Payback {
    /// Number of periods after which the cumulative flow is non-negative.
    Periods(usize),
    /// The cumulative flow stays negative over the whole stream.
    NotWithinHorizon,
}

/// Investment-appraisal metrics.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FinancialMetrics {
    /// Net present value at the discount rate.
    pub npv: f64,
    /// Internal rate of return.
    pub irr: IrrOutcome,
    /// Payback period.
    pub payback: Payback,
    /// (Σcf − I) / I, or 0 when I = 0.
    pub roi: f64,
    /// I / mean(cf), infinite when mean(cf) ≤ 0.
    pub break_even: f64,
    /// (mean(cf/I) − r) / (sd(cf/I) + ε).
    pub risk_adjusted_return: f64,
}

/// Net present value of `cash_flows` after paying `initial_investment`.
///
/// # Examples
/// ```
/// use cud_models::finance::npv;
///
/// let value = npv(0.05, 100_000.0, &[30_000.0; 5]);
/// assert!((value - 29_884.3).abs() < 0.1);
/// ```
pub fn npv(rate: f64, initial_investment: f64, cash_flows: &[f64]) -> f64 {
    let growth = 1.0 + rate;
    let mut factor = 1.0;
    let mut value = -initial_investment;
    for cf in cash_flows {
        factor /= growth;
        value += cf * factor;
    }
    value
}

/// Internal rate of return of the stream.
///
/// Scans rates from −99% to 1000% for the first interval where NPV changes sign and
/// refines it with Brent's method.
pub fn irr(initial_investment: f64, cash_flows: &[f64]) -> IrrOutcome {
    let f = |r: f64| npv(r, initial_investment, cash_flows);
    let solver = BrentSolver::new(SolverConfig::default());

    for pair in IRR_SCAN_GRID.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let (fa, fb) = (f(a), f(b));
        if !(fa.is_finite() && fb.is_finite()) {
            continue;
        }
        if fa == 0.0 {
            return IrrOutcome::Converged(a);
        }
        if fa.signum() != fb.signum() {
            return match solver.find_root(f, a, b) {
                Ok(rate) => IrrOutcome::Converged(rate),
                Err(_) => IrrOutcome::NotConverged,
            };
        }
    }
    IrrOutcome::NotConverged
}

/// First number of periods after which the cumulative flow, starting at
/// `−initial_investment`, is non-negative.
pub fn payback(initial_investment: f64, cash_flows: &[f64]) -> Payback {
    let mut cumulative = -initial_investment;
    if cumulative >= 0.0 {
        return Payback::Periods(0);
    }
    for (t, cf) in cash_flows.iter().enumerate() {
        cumulative += cf;
        if cumulative >= 0.0 {
            return Payback::Periods(t + 1);
        }
    }
    Payback::NotWithinHorizon
}

/// Compute every appraisal metric for one cash-flow stream.
///
/// # Errors
/// - `InsufficientData` for an empty stream
/// - `InvalidParameter` for a negative or non-finite investment, or a
///   discount rate of −100% or below
///
/// # Examples
/// ```
/// use cud_models::finance::{compute_metrics, Payback};
///
/// let m = compute_metrics(100_000.0, &[30_000.0; 5], 0.05).unwrap();
/// assert_eq!(m.payback, Payback::Periods(4));
/// assert!((m.roi - 0.5).abs() < 1e-12);
/// assert!(m.irr.rate().unwrap() > 0.15);
/// ```
pub fn compute_metrics(
    initial_investment: f64,
    cash_flows: &[f64],
    discount_rate: f64,
) -> Result<FinancialMetrics, AnalyticsError> {
    if !(initial_investment.is_finite() && initial_investment >= 0.0) {
        return Err(AnalyticsError::invalid_parameter(
            "initial_investment",
            initial_investment,
            "must be finite and non-negative",
        ));
    }
    if !(discount_rate.is_finite() && discount_rate > -1.0) {
        return Err(AnalyticsError::invalid_parameter(
            "discount_rate",
            discount_rate,
            "must be finite and greater than -1",
        ));
    }
    let mean_cf = mean(cash_flows)
        .ok_or_else(|| AnalyticsError::insufficient_data("financial metrics", 0, 1))?;

    let total: f64 = cash_flows.iter().sum();
    let roi = if initial_investment == 0.0 {
        0.0
    } else {
        (total - initial_investment) / initial_investment
    };
    let break_even = if mean_cf > 0.0 {
        initial_investment / mean_cf
    } else {
        f64::INFINITY
    };

    let returns: Vec<f64> = if initial_investment == 0.0 {
        vec![0.0]
    } else {
        cash_flows.iter().map(|cf| cf / initial_investment).collect()
    };
    let mean_return = mean(&returns).unwrap_or(0.0);
    let sd_return = std_population(&returns).unwrap_or(0.0);
    let risk_adjusted_return = (mean_return - discount_rate) / (sd_return + RISK_ADJUSTED_EPSILON);

    Ok(FinancialMetrics {
        npv: npv(discount_rate, initial_investment, cash_flows),
        irr: irr(initial_investment, cash_flows),
        payback: payback(initial_investment, cash_flows),
        roi,
        break_even,
        risk_adjusted_return,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_npv_worked_example() {
        let m = compute_metrics(100_000.0, &[30_000.0; 5], 0.05).unwrap();
        assert!((m.npv - 29_884.0).abs() <= 1.0);
    }

    #[test]
    fn test_irr_two_period() {
        let rate = irr(100.0, &[60.0, 60.0]).rate().unwrap();
        assert_relative_eq!(rate, 0.1306623862918075, epsilon = 1e-8);
        assert!(npv(rate, 100.0, &[60.0, 60.0]).abs() < 1e-8);
    }

    #[test]
    fn test_irr_without_sign_change_is_explicit() {
        // Flows never repay the investment at any rate above -99%
        assert_eq!(irr(100.0, &[-10.0, -10.0]), IrrOutcome::NotConverged);
        let m = compute_metrics(100.0, &[-10.0, -10.0], 0.05).unwrap();
        assert_eq!(m.irr, IrrOutcome::NotConverged);
        assert_eq!(m.irr.rate(), None);
    }

    #[test]
    fn test_payback_boundary_counts_exact_break_even() {
        assert_eq!(payback(100.0, &[50.0, 50.0, 50.0]), Payback::Periods(2));
        assert_eq!(payback(100.0, &[10.0, 10.0]), Payback::NotWithinHorizon);
        assert_eq!(payback(0.0, &[10.0]), Payback::Periods(0));
    }

    #[test]
    fn test_break_even_and_roi() {
        let m = compute_metrics(1_000.0, &[-5.0, 5.0], 0.0).unwrap();
        assert_eq!(m.break_even, f64::INFINITY);
        assert_relative_eq!(m.roi, -1.0);

        let zero = compute_metrics(0.0, &[10.0, 10.0], 0.03).unwrap();
        assert_eq!(zero.roi, 0.0);
        assert_eq!(zero.break_even, 0.0);
    }

    #[test]
    fn test_risk_adjusted_return_constant_flows() {
        // sd = 0 so the denominator is the epsilon alone
        let m = compute_metrics(100.0, &[10.0; 4], 0.05).unwrap();
        assert_relative_eq!(m.risk_adjusted_return, 0.05 / 1e-10, max_relative = 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            compute_metrics(-1.0, &[1.0], 0.05),
            Err(AnalyticsError::InvalidParameter { .. })
        ));
        assert!(matches!(
            compute_metrics(1.0, &[], 0.05),
            Err(AnalyticsError::InsufficientData { .. })
        ));
        assert!(compute_metrics(1.0, &[1.0], -1.0).is_err());
    }
}
