//! Demand forecasting with additive Holt-Winters smoothing.
//!
//! ## Model
//!
//! Additive trend and additive seasonality with period `m = 12`:
//!
//! ```text
//! ŷ_t   = l_{t-1} + b_{t-1} + s_{t-m}
//! l_t   = α(y_t − s_{t-m}) + (1 − α)(l_{t-1} + b_{t-1})
//! b_t   = β(l_t − l_{t-1}) + (1 − β)b_{t-1}
//! s_t   = γ(y_t − l_t) + (1 − γ)s_{t-m}
//! ```
//!
//! Initial states come from the first two seasons. The smoothing parameters
//! are fitted by Levenberg-Marquardt on the one-step-ahead errors, each
//! parameter passed through a logistic map so it stays inside (0, 1).
//!
//! ## Interval
//!
//! The 95% band is `±1.96 · se` with `se` the population standard deviation
//! of the in-sample one-step errors.

use cud_core::math::solvers::{LMConfig, LevenbergMarquardtSolver};
use cud_core::math::statistics::{linear_fit, mean, std_population};
use cud_core::types::AnalyticsError;
use tracing::debug;

/// Seasonal period in months.
pub const SEASON_LENGTH: usize = 12;

/// Shortest history that can be forecast (two full seasons).
pub const MIN_HISTORY: usize = 2 * SEASON_LENGTH;

/// Default forecast horizon in months.
pub const DEFAULT_HORIZON: usize = 12;

const Z_95: f64 = 1.96;

/// Smoothing parameters are kept within `[PARAM_FLOOR, 1 − PARAM_FLOOR]`.
const PARAM_FLOOR: f64 = 1e-4;

/// Smoothing parameters, each in (0, 1).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoltWintersParams {
    /// Level smoothing.
    pub alpha: f64,
    /// Trend smoothing.
    pub beta: f64,
    /// Seasonal smoothing.
    pub gamma: f64,
}

impl Default for HoltWintersParams {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            beta: 0.1,
            gamma: 0.1,
        }
    }
}

impl HoltWintersParams {
    fn to_unconstrained(self) -> Vec<f64> {
        [self.alpha, self.beta, self.gamma]
            .iter()
            .map(|p| (p / (1.0 - p)).ln())
            .collect()
    }

    fn from_unconstrained(theta: &[f64]) -> Self {
        let logistic = |x: f64| (1.0 / (1.0 + (-x).exp())).clamp(PARAM_FLOOR, 1.0 - PARAM_FLOOR);
        Self {
            alpha: logistic(theta[0]),
            beta: logistic(theta[1]),
            gamma: logistic(theta[2]),
        }
    }
}

/// Smoothing state after the last processed observation.
#[derive(Debug, Clone)]
struct State {
    level: f64,
    trend: f64,
    /// Indexed by phase `t % SEASON_LENGTH`.
    seasonals: Vec<f64>,
}

impl State {
    /// Initial state from the first two seasons of `history`.
    ///
    /// Chosen so that a noiseless linear-plus-seasonal series is reproduced
    /// exactly.
    fn initialise(history: &[f64]) -> Self {
        let m = SEASON_LENGTH;
        let first = mean(&history[..m]).unwrap_or(0.0);
        let second = mean(&history[m..2 * m]).unwrap_or(0.0);
        let trend = (second - first) / m as f64;
        let centre = (m as f64 - 1.0) / 2.0;

        let seasonals = (0..m)
            .map(|i| {
                let offset = trend * (i as f64 - centre);
                ((history[i] - first - offset) + (history[m + i] - second - offset)) / 2.0
            })
            .collect();

        Self {
            level: first - trend * (centre + 1.0),
            trend,
            seasonals,
        }
    }

    /// Run the recursions over `history`, returning one-step-ahead fits.
    fn filter(&mut self, params: HoltWintersParams, history: &[f64]) -> Vec<f64> {
        let HoltWintersParams { alpha, beta, gamma } = params;
        let mut fitted = Vec::with_capacity(history.len());

        for (t, &y) in history.iter().enumerate() {
            let phase = t % SEASON_LENGTH;
            let season = self.seasonals[phase];
            fitted.push(self.level + self.trend + season);

            let previous_level = self.level;
            self.level = alpha * (y - season) + (1.0 - alpha) * (self.level + self.trend);
            self.trend = beta * (self.level - previous_level) + (1.0 - beta) * self.trend;
            self.seasonals[phase] = gamma * (y - self.level) + (1.0 - gamma) * season;
        }

        fitted
    }

    /// Point forecast `h` steps past an `n`-point history, `h >= 1`.
    fn project(&self, n: usize, h: usize) -> f64 {
        self.level + h as f64 * self.trend + self.seasonals[(n + h - 1) % SEASON_LENGTH]
    }
}

/// Point forecast with its 95% band and decomposition diagnostics.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DemandForecast {
    /// Point estimate per future month.
    pub point: Vec<f64>,
    /// Lower 95% bound per future month.
    pub lower: Option<Vec<f64>>,
    /// Upper 95% bound per future month.
    pub upper: Option<Vec<f64>>,
    /// Share of variance explained by month-of-year means, in [0, 1].
    pub seasonality_strength: f64,
    /// Share of variance explained by a linear trend, in [0, 1].
    pub trend_strength: f64,
    /// Fitted smoothing parameters.
    pub params: HoltWintersParams,
    /// Population standard deviation of the in-sample one-step errors.
    pub residual_std_error: f64,
}

/// Holt-Winters demand forecaster.
///
/// # Examples
/// ```
/// use cud_models::forecasting::DemandForecaster;
///
/// let history: Vec<f64> = (0..36)
///     .map(|t| 1_000.0 + 5.0 * t as f64 + 50.0 * ((t % 12) as f64 - 5.5))
///     .collect();
/// let forecast = DemandForecaster::default().forecast(&history).unwrap();
/// assert_eq!(forecast.point.len(), 12);
///
/// // Too short: an explicit precondition failure, never a zero-filled forecast
/// let err = DemandForecaster::default().forecast(&history[..23]).unwrap_err();
/// assert!(err.is_precondition());
/// ```
#[derive(Debug, Clone)]
pub struct DemandForecaster {
    horizon: usize,
    lm_config: LMConfig,
}

impl Default for DemandForecaster {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            lm_config: LMConfig::new(1e-10, 200),
        }
    }
}

impl DemandForecaster {
    /// Create a forecaster with the given horizon in months.
    ///
    /// # Errors
    /// `InvalidParameter` for a zero horizon.
    pub fn new(horizon: usize) -> Result<Self, AnalyticsError> {
        if horizon == 0 {
            return Err(AnalyticsError::invalid_parameter(
                "horizon",
                0.0,
                "must be at least one period",
            ));
        }
        Ok(Self {
            horizon,
            ..Default::default()
        })
    }

    /// Forecast horizon in months.
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Fit the model to `history` and forecast `horizon` months ahead.
    ///
    /// # Errors
    /// - `InsufficientData` for fewer than 24 observations
    /// - `DegenerateInput` for non-finite observations
    pub fn forecast(&self, history: &[f64]) -> Result<DemandForecast, AnalyticsError> {
        if history.len() < MIN_HISTORY {
            return Err(AnalyticsError::insufficient_data(
                "demand forecast",
                history.len(),
                MIN_HISTORY,
            ));
        }
        if history.iter().any(|y| !y.is_finite()) {
            return Err(AnalyticsError::DegenerateInput(
                "demand history contains non-finite values".to_string(),
            ));
        }

        let initial = State::initialise(history);
        let params = self.fit(history, &initial);

        let mut state = initial;
        let fitted = state.filter(params, history);
        let residuals: Vec<f64> = history.iter().zip(&fitted).map(|(y, f)| y - f).collect();
        let residual_std_error = std_population(&residuals).unwrap_or(0.0);

        let n = history.len();
        let point: Vec<f64> = (1..=self.horizon).map(|h| state.project(n, h)).collect();
        let half_width = Z_95 * residual_std_error;
        let lower = point.iter().map(|p| p - half_width).collect();
        let upper = point.iter().map(|p| p + half_width).collect();

        Ok(DemandForecast {
            point,
            lower: Some(lower),
            upper: Some(upper),
            seasonality_strength: seasonality_strength(history),
            trend_strength: trend_strength(history),
            params,
            residual_std_error,
        })
    }

    fn fit(&self, history: &[f64], initial: &State) -> HoltWintersParams {
        let residuals = |theta: &[f64]| -> Vec<f64> {
            let params = HoltWintersParams::from_unconstrained(theta);
            let mut state = initial.clone();
            let fitted = state.filter(params, history);
            history.iter().zip(&fitted).map(|(y, f)| y - f).collect()
        };

        let start = HoltWintersParams::default();
        let solver = LevenbergMarquardtSolver::new(self.lm_config);
        match solver.solve(residuals, start.to_unconstrained()) {
            Ok(result) => {
                let params = HoltWintersParams::from_unconstrained(&result.params);
                debug!(
                    alpha = params.alpha,
                    beta = params.beta,
                    gamma = params.gamma,
                    iterations = result.iterations,
                    converged = result.converged,
                    "fitted Holt-Winters parameters"
                );
                params
            }
            Err(err) => {
                debug!(%err, "Holt-Winters fit failed, using starting parameters");
                start
            }
        }
    }
}

/// `1 − SSR/SST` clamped to [0, 1], or 0 when the series is constant.
fn explained_share(history: &[f64], ssr: f64) -> f64 {
    let centre = mean(history).unwrap_or(0.0);
    let sst: f64 = history.iter().map(|y| (y - centre).powi(2)).sum();
    if sst <= 0.0 {
        return 0.0;
    }
    (1.0 - ssr / sst).clamp(0.0, 1.0)
}

/// Strength of seasonality against a month-of-year means fit.
pub fn seasonality_strength(history: &[f64]) -> f64 {
    let mut sums = [0.0; SEASON_LENGTH];
    let mut counts = [0usize; SEASON_LENGTH];
    for (t, y) in history.iter().enumerate() {
        sums[t % SEASON_LENGTH] += y;
        counts[t % SEASON_LENGTH] += 1;
    }
    let ssr: f64 = history
        .iter()
        .enumerate()
        .map(|(t, y)| {
            let phase = t % SEASON_LENGTH;
            (y - sums[phase] / counts[phase] as f64).powi(2)
        })
        .sum();
    explained_share(history, ssr)
}

/// Strength of trend against an ordinary least-squares line.
pub fn trend_strength(history: &[f64]) -> f64 {
    let t: Vec<f64> = (0..history.len()).map(|i| i as f64).collect();
    let Some((slope, intercept)) = linear_fit(&t, history) else {
        return 0.0;
    };
    let ssr: f64 = t
        .iter()
        .zip(history)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();
    explained_share(history, ssr)
}

/// Price elasticity of demand.
///
/// Slope of the least-squares line of `ln(demand)` on `ln(price)`.
///
/// # Errors
/// - `InsufficientData` for fewer than two pairs or mismatched lengths
/// - `DegenerateInput` for non-positive values or constant prices
///
/// # Examples
/// ```
/// use cud_models::forecasting::price_elasticity;
///
/// // demand = 1000 · price^-1.5
/// let prices = [1.0, 2.0, 4.0, 8.0];
/// let demand: Vec<f64> = prices.iter().map(|p: &f64| 1000.0 * p.powf(-1.5)).collect();
/// let e = price_elasticity(&prices, &demand).unwrap();
/// assert!((e + 1.5).abs() < 1e-10);
/// ```
pub fn price_elasticity(prices: &[f64], demand: &[f64]) -> Result<f64, AnalyticsError> {
    let n = prices.len().min(demand.len());
    if prices.len() != demand.len() || n < 2 {
        return Err(AnalyticsError::insufficient_data("price elasticity", n, 2));
    }
    if prices
        .iter()
        .chain(demand)
        .any(|v| !(v.is_finite() && *v > 0.0))
    {
        return Err(AnalyticsError::DegenerateInput(
            "prices and demand must be positive".to_string(),
        ));
    }
    let log_price: Vec<f64> = prices.iter().map(|p| p.ln()).collect();
    let log_demand: Vec<f64> = demand.iter().map(|d| d.ln()).collect();
    linear_fit(&log_price, &log_demand)
        .map(|(slope, _)| slope)
        .ok_or_else(|| AnalyticsError::DegenerateInput("prices have no variation".to_string()))
}
