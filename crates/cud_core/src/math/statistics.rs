//! Descriptive statistics over `f64` samples.
//!
//! All functions return `None` for samples too small to define the statistic
//! instead of producing `NaN`.
//!
//! Conventions:
//! - `std_population` divides by `n` (maximum-likelihood estimate)
//! - `std_sample` divides by `n - 1`
//! - `percentile` uses linear interpolation between closest ranks

/// Arithmetic mean.
///
/// # Examples
/// ```
/// use cud_core::math::statistics::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sum of squared deviations about the mean.
#[inline]
pub fn sum_squares_about_mean(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    Some(values.iter().map(|v| (v - m) * (v - m)).sum())
}

/// Population standard deviation (divides by `n`).
///
/// # Examples
/// ```
/// use cud_core::math::statistics::std_population;
///
/// let sd = std_population(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
/// assert!((sd - 2.0).abs() < 1e-12);
/// ```
#[inline]
pub fn std_population(values: &[f64]) -> Option<f64> {
    let ss = sum_squares_about_mean(values)?;
    Some((ss / values.len() as f64).sqrt())
}

/// Sample standard deviation (divides by `n - 1`).
///
/// Returns `None` for fewer than two observations.
#[inline]
pub fn std_sample(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let ss = sum_squares_about_mean(values)?;
    Some((ss / (values.len() - 1) as f64).sqrt())
}

/// Percentile of an already sorted sample, `pct` in [0, 100].
///
/// Linear interpolation between closest ranks. Returns `None` for an empty
/// sample.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pct = pct.clamp(0.0, 100.0);
    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let lo = sorted[lower];
    if lower == upper {
        return Some(lo);
    }
    let hi = sorted[upper];
    Some(lo + (hi - lo) * (rank - lower as f64))
}

/// Percentile of an unsorted sample, `pct` in [0, 100].
///
/// # Examples
/// ```
/// use cud_core::math::statistics::percentile;
///
/// let data = [40.0, 10.0, 30.0, 20.0];
/// assert_eq!(percentile(&data, 0.0), Some(10.0));
/// assert_eq!(percentile(&data, 50.0), Some(25.0));
/// assert_eq!(percentile(&data, 100.0), Some(40.0));
/// ```
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    percentile_sorted(&sorted, pct)
}

/// Median (50th percentile).
#[inline]
pub fn median(values: &[f64]) -> Option<f64> {
    percentile(values, 50.0)
}

/// Ordinary least-squares fit `y = slope * x + intercept`.
///
/// Returns `None` when the inputs differ in length, hold fewer than two
/// points, or `x` has no spread.
///
/// # Examples
/// ```
/// use cud_core::math::statistics::linear_fit;
///
/// let (slope, intercept) = linear_fit(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap();
/// assert!((slope - 2.0).abs() < 1e-12);
/// assert!((intercept - 1.0).abs() < 1e-12);
/// ```
pub fn linear_fit(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let sxx: f64 = x.iter().map(|xi| (xi - mx) * (xi - mx)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = x.iter().zip(y).map(|(xi, yi)| (xi - mx) * (yi - my)).sum();
    let slope = sxy / sxx;
    Some((slope, my - slope * mx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_empty() {
        assert_eq!(mean(&[5.0]), Some(5.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_std_conventions() {
        let data = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(std_population(&data).unwrap(), 1.118033988749895, epsilon = 1e-12);
        assert_relative_eq!(std_sample(&data).unwrap(), 1.2909944487358056, epsilon = 1e-12);
        assert_eq!(std_sample(&[1.0]), None);
        assert_eq!(std_population(&[3.0]), Some(0.0));
    }

    #[test]
    fn test_percentile_interpolation() {
        let data = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(percentile(&data, 5.0).unwrap(), 1.2, epsilon = 1e-12);
        assert_relative_eq!(percentile(&data, 95.0).unwrap(), 4.8, epsilon = 1e-12);
        assert_eq!(median(&data), Some(3.0));
    }

    #[test]
    fn test_percentile_constant_sample_is_exact() {
        let data = [7.25; 11];
        assert_eq!(percentile(&data, 5.0), Some(7.25));
        assert_eq!(percentile(&data, 95.0), Some(7.25));
    }

    #[test]
    fn test_percentile_clamps_range() {
        let data = [1.0, 2.0];
        assert_eq!(percentile(&data, -10.0), Some(1.0));
        assert_eq!(percentile(&data, 150.0), Some(2.0));
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_linear_fit_degenerate() {
        assert!(linear_fit(&[1.0, 1.0], &[2.0, 3.0]).is_none());
        assert!(linear_fit(&[1.0], &[2.0]).is_none());
        assert!(linear_fit(&[1.0, 2.0], &[2.0]).is_none());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(200))]

            #[test]
            fn test_percentile_within_sample_range(
                data in prop::collection::vec(-1e6..1e6_f64, 1..64),
                pct in 0.0..100.0_f64
            ) {
                let value = percentile(&data, pct).unwrap();
                let min = data.iter().cloned().fold(f64::INFINITY, f64::min);
                let max = data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
                prop_assert!(value >= min && value <= max);
            }

            #[test]
            fn test_population_std_not_above_sample_std(
                data in prop::collection::vec(-1e3..1e3_f64, 2..64)
            ) {
                let pop = std_population(&data).unwrap();
                let sample = std_sample(&data).unwrap();
                prop_assert!(pop <= sample + 1e-12);
            }
        }
    }
}
