//! Standard normal distribution functions.
//!
//! This module provides:
//! - `norm_cdf`: Cumulative distribution function (CDF)
//! - `norm_pdf`: Probability density function (PDF)
//!
//! Both are generic over `T: Float` so they serve the `f64` pricing code and
//! any `f32` callers alike.

use num_traits::Float;

/// Square root of 2.
const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// 1 / sqrt(2 * pi)
const FRAC_1_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

/// Complementary error function approximation.
///
/// Abramowitz and Stegun formula 7.1.26, maximum absolute error 1.5e-7.
///
/// # Mathematical Definition
/// erfc(x) = 1 - erf(x) = (2/√π) ∫_x^∞ e^(-t²) dt
#[inline]
fn erfc_approx<T: Float>(x: T) -> T {
    let one = T::one();
    let abs_x = x.abs();

    let a1 = T::from(0.254829592).unwrap_or(T::zero());
    let a2 = T::from(-0.284496736).unwrap_or(T::zero());
    let a3 = T::from(1.421413741).unwrap_or(T::zero());
    let a4 = T::from(-1.453152027).unwrap_or(T::zero());
    let a5 = T::from(1.061405429).unwrap_or(T::zero());
    let p = T::from(0.3275911).unwrap_or(T::zero());

    let t = one / (one + p * abs_x);

    // Horner's method
    let poly = a1 + t * (a2 + t * (a3 + t * (a4 + t * a5)));
    let erfc_abs = t * poly * (-abs_x * abs_x).exp();

    // erfc(-x) = 2 - erfc(x)
    if x < T::zero() {
        (one + one) - erfc_abs
    } else {
        erfc_abs
    }
}

/// Standard normal cumulative distribution function.
///
/// Computes P(X <= x) where X ~ N(0, 1).
///
/// # Mathematical Definition
/// Φ(x) = (1/2) * erfc(-x / sqrt(2))
///
/// # Accuracy
/// Accurate to at least 1e-7 for all finite x. Infinite arguments map to
/// exactly 0 or 1.
///
/// # Examples
/// ```
/// use cud_core::math::distributions::norm_cdf;
///
/// assert!((norm_cdf(0.0_f64) - 0.5).abs() < 1e-7);
/// assert!(norm_cdf(-3.0_f64) < 0.01);
/// assert!(norm_cdf(3.0_f64) > 0.99);
/// assert_eq!(norm_cdf(f64::INFINITY), 1.0);
/// ```
#[inline]
pub fn norm_cdf<T: Float>(x: T) -> T {
    if x == T::infinity() {
        return T::one();
    }
    if x == T::neg_infinity() {
        return T::zero();
    }
    let sqrt_2 = T::from(SQRT_2).unwrap_or(T::one());
    let half = T::from(0.5).unwrap_or(T::zero());
    half * erfc_approx(-x / sqrt_2)
}

/// Standard normal probability density function.
///
/// φ(x) = (1 / sqrt(2π)) * exp(-x² / 2)
///
/// # Examples
/// ```
/// use cud_core::math::distributions::norm_pdf;
///
/// assert!((norm_pdf(0.0_f64) - 0.3989422804).abs() < 1e-7);
/// assert!((norm_pdf(1.0_f64) - 0.2419707245).abs() < 1e-7);
/// ```
#[inline]
pub fn norm_pdf<T: Float>(x: T) -> T {
    let frac_1_sqrt_2pi = T::from(FRAC_1_SQRT_2PI).unwrap_or(T::zero());
    let half = T::from(0.5).unwrap_or(T::zero());
    frac_1_sqrt_2pi * (-half * x * x).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // ==========================================================
    // norm_cdf tests
    // ==========================================================

    #[test]
    fn test_norm_cdf_at_zero() {
        assert_relative_eq!(norm_cdf(0.0_f64), 0.5, epsilon = 1e-7);
    }

    #[test]
    fn test_norm_cdf_symmetry() {
        for x in [-3.0, -2.0, -1.0, -0.5, 0.0, 0.5, 1.0, 2.0, 3.0] {
            assert_relative_eq!(norm_cdf(x) + norm_cdf(-x), 1.0_f64, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_norm_cdf_reference_values() {
        assert_relative_eq!(norm_cdf(1.0_f64), 0.8413447460685429, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(-1.0_f64), 0.15865525393145707, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(1.96_f64), 0.9750021048517795, epsilon = 1e-7);
        assert_relative_eq!(norm_cdf(-2.0_f64), 0.022750131948179195, epsilon = 1e-7);
    }

    #[test]
    fn test_norm_cdf_infinite_arguments() {
        assert_eq!(norm_cdf(f64::INFINITY), 1.0);
        assert_eq!(norm_cdf(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_norm_cdf_monotonic() {
        let mut previous = 0.0_f64;
        for i in -40..=40 {
            let value = norm_cdf(i as f64 * 0.2);
            assert!(value >= previous);
            previous = value;
        }
    }

    // ==========================================================
    // norm_pdf tests
    // ==========================================================

    #[test]
    fn test_norm_pdf_peak_and_symmetry() {
        assert_relative_eq!(norm_pdf(0.0_f64), FRAC_1_SQRT_2PI, epsilon = 1e-15);
        assert_relative_eq!(norm_pdf(1.3_f64), norm_pdf(-1.3_f64), epsilon = 1e-15);
    }

    #[test]
    fn test_norm_pdf_f32() {
        let value = norm_pdf(0.0_f32);
        assert!((value - 0.398_942_3).abs() < 1e-6);
    }
}
