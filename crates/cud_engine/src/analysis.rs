//! Orchestration of every analytics component into one result.
//!
//! Run order and random streams are fixed: the usage history is synthesised
//! first (when absent), then one child stream is forked for tail risk and
//! one for the cost simulation. The same seed and input therefore always
//! give the same [`CommitmentAnalysis`].

use cud_core::rng::CudRng;
use cud_models::estimation::{EstimationReport, ReturnEstimator};
use cud_models::finance::{compute_metrics, FinancialMetrics};
use cud_models::forecasting::{DemandForecast, DemandForecaster};
use cud_models::ladder::{CommitmentLadder, LadderDesigner};
use cud_models::option::{CommitmentOption, OptionValuation};
use cud_optimiser::portfolio::{Portfolio, PortfolioOptimiser};
use cud_risk::score::{commitment_risk_score, RiskScore};
use cud_risk::simulation::{CostSimulator, SimulationConfig, SimulationSummary};
use cud_risk::stress::{stress_test, StressTestResult};
use cud_risk::var::{TailRisk, TailRiskEstimator};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::config::{AnalysisConfig, AnalysisConfigBuilder};
use crate::error::EngineError;
use crate::input::AnalysisInput;
use crate::outcome::Outcome;

/// Relative spread of a synthesised usage history.
const SYNTHETIC_SPREAD: f64 = 0.1;

/// Where the usage history came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageSource {
    /// Supplied with the input.
    Observed,
    /// Drawn from Normal(total spend, 10% of total spend).
    Synthesised,
}

/// Composite result of one analysis run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CommitmentAnalysis {
    /// Seed of the random source.
    pub seed: u64,
    /// Sum of the latest spend of every asset.
    pub total_spend: f64,
    /// Share of the total spend placed under commitment.
    pub committed_spend: f64,
    /// Origin of the usage history.
    pub usage_source: UsageSource,
    /// Usage history the risk and forecast components ran on.
    pub usage_history: Vec<f64>,
    /// Per-asset return estimates and skipped assets.
    pub estimation: EstimationReport,
    /// Sharpe-optimal allocation.
    pub portfolio: Outcome<Portfolio>,
    /// VaR, CVaR and tail statistics.
    pub tail_risk: Outcome<TailRisk>,
    /// Commitment risk score.
    pub risk_score: Outcome<RiskScore>,
    /// Cost projection.
    pub simulation: Outcome<SimulationSummary>,
    /// Demand forecast.
    pub forecast: Outcome<DemandForecast>,
    /// Commitment ladder built on the forecast.
    pub ladder: Outcome<CommitmentLadder>,
    /// Commitment valued as a call option.
    pub option_valuation: Outcome<OptionValuation>,
    /// Investment appraisal of the committed cash flows.
    pub financial_metrics: Outcome<FinancialMetrics>,
    /// Stress scenarios.
    pub stress_test: Outcome<StressTestResult>,
}

impl CommitmentAnalysis {
    /// Status of every component, in run order.
    pub fn component_statuses(&self) -> [(&'static str, &'static str); 9] {
        [
            ("portfolio", self.portfolio.status()),
            ("tail_risk", self.tail_risk.status()),
            ("risk_score", self.risk_score.status()),
            ("simulation", self.simulation.status()),
            ("forecast", self.forecast.status()),
            ("ladder", self.ladder.status()),
            ("option_valuation", self.option_valuation.status()),
            ("financial_metrics", self.financial_metrics.status()),
            ("stress_test", self.stress_test.status()),
        ]
    }
}

/// Runs the full pipeline under one configuration.
///
/// # Examples
/// ```
/// use cud_engine::{AnalysisConfig, AnalysisInput, CommitmentAnalyser};
/// use cud_models::estimation::AssetClass;
///
/// let config = AnalysisConfig::builder()
///     .risk_free_rate(0.03)
///     .confidence_level(0.95)
///     .risk_tolerance(0.5)
///     .commitment_term_years(3.0)
///     .discount_rate(0.05)
///     .var_simulations(1_000)
///     .simulation_paths(1_000)
///     .build()
///     .unwrap();
///
/// let input = AnalysisInput::new(vec![
///     AssetClass::new("n2-standard", vec![900.0, 950.0, 1_000.0]),
///     AssetClass::new("e2-medium", vec![400.0, 380.0, 410.0]),
/// ]);
/// let analysis = CommitmentAnalyser::new(config).unwrap().analyse(&input);
///
/// assert!(analysis.portfolio.is_computed());
/// assert!(analysis.tail_risk.is_computed());
/// ```
#[derive(Clone, Debug)]
pub struct CommitmentAnalyser {
    config: AnalysisConfig,
    estimator: ReturnEstimator,
    optimiser: PortfolioOptimiser,
    forecaster: DemandForecaster,
    ladder_designer: LadderDesigner,
    tail_risk: TailRiskEstimator,
}

impl CommitmentAnalyser {
    /// Creates an analyser for a validated configuration.
    ///
    /// # Errors
    /// `InvalidConfig` if a component rejects its configured parameters.
    pub fn new(config: AnalysisConfig) -> Result<Self, EngineError> {
        Ok(Self {
            estimator: ReturnEstimator::new(config.annualisation_factor())?,
            optimiser: PortfolioOptimiser::new(config.risk_free_rate())?,
            forecaster: DemandForecaster::new(config.forecast_horizon())?,
            ladder_designer: LadderDesigner::new(*config.discounts()),
            tail_risk: TailRiskEstimator::new(config.confidence_level())?
                .with_time_horizon(config.var_time_horizon())
                .with_simulations(config.var_simulations()),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs every component on `input`.
    ///
    /// Never fails: each component's result is recorded as an [`Outcome`].
    pub fn analyse(&self, input: &AnalysisInput) -> CommitmentAnalysis {
        let config = &self.config;
        let _span = info_span!("commitment_analysis", seed = config.seed()).entered();

        let mut rng = CudRng::from_seed(config.seed());
        let total_spend = input.total_spend();
        let committed_spend = total_spend * config.commitment_ratio();

        let (usage_source, usage_history) = match &input.usage_history {
            Some(history) if !history.is_empty() => (UsageSource::Observed, history.clone()),
            _ => (
                UsageSource::Synthesised,
                self.synthesise_usage(total_spend, &mut rng),
            ),
        };
        let mut var_rng = rng.fork();
        let mut simulation_rng = rng.fork();

        info!(
            assets = input.assets.len(),
            total_spend,
            usage_points = usage_history.len(),
            ?usage_source,
            "starting commitment analysis"
        );

        let estimation = self.estimator.estimate(&input.assets);

        let portfolio = if estimation.eligible() < 2 {
            Outcome::skipped(format!(
                "portfolio optimisation needs at least 2 eligible resource classes, got {}",
                estimation.eligible()
            ))
        } else {
            Outcome::from_result(self.optimiser.optimise(&estimation.expected_returns()))
        };

        let tail_risk = Outcome::from_result(self.tail_risk.estimate(&usage_history, &mut var_rng));

        let risk_score = if committed_spend > 0.0 {
            Outcome::from_result(commitment_risk_score(committed_spend, &usage_history))
        } else {
            Outcome::skipped("no current spend to commit")
        };

        let simulation = Outcome::from_result(
            SimulationConfig::builder()
                .initial_cost(total_spend)
                .drift(config.simulation_drift())
                .volatility(config.simulation_volatility())
                .n_periods(config.term_months())
                .n_paths(config.simulation_paths())
                .build()
                .and_then(|c| CostSimulator::new(c).run(&mut simulation_rng)),
        );

        let forecast = Outcome::from_result(self.forecaster.forecast(&usage_history));

        let ladder = match forecast.computed() {
            Some(f) => Outcome::from_result(
                self.ladder_designer
                    .design_from_forecast(f, config.risk_tolerance()),
            ),
            None => Outcome::skipped("no demand forecast to build a ladder on"),
        };

        let option_valuation = if total_spend > 0.0 {
            Outcome::from_result(
                CommitmentOption::new(
                    total_spend,
                    committed_spend,
                    config.commitment_term_years(),
                    config.option_volatility(),
                    config.risk_free_rate(),
                )
                .map(|option| option.value()),
            )
        } else {
            Outcome::skipped("no current spend to value")
        };

        let monthly_savings = input
            .monthly_savings
            .or_else(|| ladder.computed().map(|l| l.expected_monthly_savings));
        let financial_metrics = match monthly_savings {
            Some(savings) => {
                let cash_flows = vec![savings; config.term_months()];
                Outcome::from_result(compute_metrics(
                    committed_spend,
                    &cash_flows,
                    config.discount_rate(),
                ))
            }
            None => Outcome::skipped("no monthly savings for the committed cash flows"),
        };

        let stress_test = if total_spend > 0.0 {
            Outcome::from_result(stress_test(total_spend, committed_spend))
        } else {
            Outcome::skipped("no current spend to stress")
        };

        let analysis = CommitmentAnalysis {
            seed: config.seed(),
            total_spend,
            committed_spend,
            usage_source,
            usage_history,
            estimation,
            portfolio,
            tail_risk,
            risk_score,
            simulation,
            forecast,
            ladder,
            option_valuation,
            financial_metrics,
            stress_test,
        };
        log_outcomes(&analysis);
        analysis
    }

    fn synthesise_usage(&self, total_spend: f64, rng: &mut CudRng) -> Vec<f64> {
        let spread = if total_spend > 0.0 {
            SYNTHETIC_SPREAD * total_spend
        } else {
            1.0
        };
        match rng.sample_normal(total_spend, spread, self.config.synthetic_history_months()) {
            Ok(sample) => sample,
            Err(reason) => {
                warn!(%reason, "could not synthesise usage history");
                Vec::new()
            }
        }
    }
}

fn log_outcomes(analysis: &CommitmentAnalysis) {
    let mut computed = 0;
    for (component, status) in analysis.component_statuses() {
        match status {
            "computed" => {
                computed += 1;
                debug!(component, "component computed");
            }
            "skipped" => info!(component, "component skipped"),
            _ => warn!(component, "component failed"),
        }
    }
    info!(
        computed,
        skipped_assets = analysis.estimation.skipped.len(),
        "commitment analysis complete"
    );
}

/// Builds the configuration and runs one analysis.
///
/// # Errors
/// `MissingConfig` or `InvalidConfig` if the configuration is incomplete or
/// out of domain. Component failures are reported inside the result.
pub fn run_analysis(
    input: &AnalysisInput,
    config: AnalysisConfigBuilder,
) -> Result<CommitmentAnalysis, EngineError> {
    let analyser = CommitmentAnalyser::new(config.build()?)?;
    Ok(analyser.analyse(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cud_models::estimation::AssetClass;

    fn config() -> AnalysisConfigBuilder {
        AnalysisConfig::builder()
            .risk_free_rate(0.03)
            .confidence_level(0.95)
            .risk_tolerance(0.5)
            .commitment_term_years(3.0)
            .discount_rate(0.05)
            .var_simulations(500)
            .simulation_paths(500)
    }

    #[test]
    fn test_single_asset_skips_portfolio() {
        let input = AnalysisInput::new(vec![AssetClass::new("a", vec![100.0, 110.0, 120.0])]);
        let analysis = run_analysis(&input, config()).unwrap();
        assert!(analysis.portfolio.is_skipped());
        assert!(analysis.option_valuation.is_computed());
        assert_eq!(analysis.usage_source, UsageSource::Synthesised);
        assert_eq!(analysis.usage_history.len(), 36);
    }

    #[test]
    fn test_no_assets_degrades_without_failing() {
        let analysis = run_analysis(&AnalysisInput::default(), config()).unwrap();
        assert_eq!(analysis.total_spend, 0.0);
        assert!(analysis.portfolio.is_skipped());
        assert!(analysis.option_valuation.is_skipped());
        assert!(analysis.stress_test.is_skipped());
        assert!(analysis.risk_score.is_skipped());
        // Usage is synthesised around 0 with unit spread
        assert!(analysis.tail_risk.is_computed());
    }

    #[test]
    fn test_missing_scalar_fails_outright() {
        let builder = AnalysisConfig::builder().risk_free_rate(0.03);
        let err = run_analysis(&AnalysisInput::default(), builder).unwrap_err();
        assert!(matches!(err, EngineError::MissingConfig(_)));
    }

    #[test]
    fn test_monthly_savings_drive_cash_flows() {
        let input = AnalysisInput::new(vec![AssetClass::new("a", vec![1_000.0, 1_000.0])])
            .with_monthly_savings(100.0);
        let analysis = run_analysis(&input, config()).unwrap();
        let metrics = analysis.financial_metrics.computed().unwrap();
        // Investment 700, 36 flows of 100
        assert!((metrics.roi - (3_600.0 - 700.0) / 700.0).abs() < 1e-12);
    }
}
