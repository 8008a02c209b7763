//! End-to-end tests of the commitment analysis pipeline.

use cud_engine::{
    run_analysis, AnalysisConfig, AnalysisConfigBuilder, AnalysisInput, CommitmentAnalyser,
    EngineError, Outcome, UsageSource,
};
use cud_models::estimation::AssetClass;
use cud_models::finance::IrrOutcome;

fn config() -> AnalysisConfigBuilder {
    AnalysisConfig::builder()
        .risk_free_rate(0.03)
        .confidence_level(0.95)
        .risk_tolerance(0.5)
        .commitment_term_years(3.0)
        .discount_rate(0.05)
        .var_simulations(2_000)
        .simulation_paths(2_000)
}

fn seasonal_usage(months: usize) -> Vec<f64> {
    (0..months)
        .map(|t| {
            let season = (2.0 * std::f64::consts::PI * (t % 12) as f64 / 12.0).sin();
            10_000.0 + 40.0 * t as f64 + 800.0 * season + 50.0 * ((t * 7 % 5) as f64 - 2.0)
        })
        .collect()
}

fn fleet() -> Vec<AssetClass> {
    vec![
        AssetClass::new("n2-standard", vec![4_000.0, 4_100.0, 4_250.0, 4_300.0, 4_500.0]),
        AssetClass::new("c2-compute", vec![3_000.0, 2_950.0, 3_100.0, 3_200.0, 3_150.0]),
        AssetClass::new("e2-medium", vec![2_000.0, 2_020.0, 1_990.0, 2_050.0, 2_080.0]),
        AssetClass::new("m1-megamem", vec![900.0]),
    ]
}

#[test]
fn test_full_run_with_observed_history() {
    let input = AnalysisInput::new(fleet()).with_usage_history(seasonal_usage(36));
    let analysis = run_analysis(&input, config()).unwrap();

    assert_eq!(analysis.usage_source, UsageSource::Observed);
    assert_eq!(analysis.estimation.eligible(), 3);
    assert_eq!(analysis.estimation.skipped[0].id, "m1-megamem");

    let portfolio = analysis.portfolio.computed().unwrap();
    assert_eq!(portfolio.weights.len(), 3);
    assert!((portfolio.weights.values().sum::<f64>() - 1.0).abs() < 1e-5);

    let risk = analysis.tail_risk.computed().unwrap();
    assert!(risk.cvar >= risk.var);

    let forecast = analysis.forecast.computed().unwrap();
    assert_eq!(forecast.point.len(), 12);
    assert!(forecast.seasonality_strength > 0.5);

    let ladder = analysis.ladder.computed().unwrap();
    assert!(ladder.three_year >= 0.0 && ladder.on_demand_buffer >= 0.0);

    // No savings given: the ladder's expected savings feed the cash flows
    let metrics = analysis.financial_metrics.computed().unwrap();
    assert!(matches!(metrics.irr, IrrOutcome::Converged(_)));

    let option = analysis.option_valuation.computed().unwrap();
    assert!(option.option_value >= option.intrinsic_value * (-0.03_f64 * 3.0).exp());

    let simulation = analysis.simulation.computed().unwrap();
    assert_eq!(simulation.bands.mean.len(), 37);
    assert_eq!(simulation.completed_paths, 2_000);

    assert_eq!(analysis.stress_test.computed().unwrap().scenarios.len(), 5);
}

#[test]
fn test_short_history_skips_forecast_and_ladder_only() {
    let input = AnalysisInput::new(fleet())
        .with_usage_history(seasonal_usage(12))
        .with_monthly_savings(1_500.0);
    let analysis = run_analysis(&input, config()).unwrap();

    assert!(matches!(analysis.forecast, Outcome::Skipped { .. }));
    assert!(analysis.ladder.is_skipped());
    assert!(analysis.tail_risk.is_computed());
    assert!(analysis.risk_score.is_computed());
    assert!(analysis.financial_metrics.is_computed());
    assert!(analysis.portfolio.is_computed());
}

#[test]
fn test_same_seed_reproduces_analysis() {
    let analyser = CommitmentAnalyser::new(config().seed(99).build().unwrap()).unwrap();
    let input = AnalysisInput::new(fleet());

    let first = analyser.analyse(&input);
    let second = analyser.analyse(&input);
    assert_eq!(first, second);
    assert_eq!(first.usage_source, UsageSource::Synthesised);

    let other = CommitmentAnalyser::new(config().seed(100).build().unwrap())
        .unwrap()
        .analyse(&input);
    assert_ne!(first.usage_history, other.usage_history);
}

#[test]
fn test_failed_component_does_not_stop_the_rest() {
    // A negative spend makes the option inputs invalid but the rest still runs
    let input = AnalysisInput::new(vec![
        AssetClass::new("a", vec![100.0, 120.0]),
        AssetClass::new("b", vec![50.0, -300.0]),
    ]);
    let analysis = run_analysis(&input, config()).unwrap();

    assert!(analysis.total_spend < 0.0);
    assert!(analysis.simulation.is_failed());
    assert!(analysis.stress_test.is_skipped());
    assert!(analysis.tail_risk.is_computed());
    assert_eq!(analysis.estimation.skipped.len(), 1);
}

#[test]
fn test_serialises_to_json_with_stable_names() {
    let input = AnalysisInput::new(fleet()).with_usage_history(seasonal_usage(30));
    let analysis = run_analysis(&input, config()).unwrap();
    let json = serde_json::to_value(&analysis).unwrap();

    for key in [
        "seed",
        "total_spend",
        "estimation",
        "portfolio",
        "tail_risk",
        "risk_score",
        "simulation",
        "forecast",
        "ladder",
        "option_valuation",
        "financial_metrics",
        "stress_test",
    ] {
        assert!(json.get(key).is_some(), "missing key {}", key);
    }
    assert_eq!(json["usage_source"], "observed");
    assert!(json["portfolio"]["computed"]["weights"].is_object());
    assert!(json["risk_score"]["computed"]["category"].is_string());
    assert_eq!(json["stress_test"]["computed"]["scenarios"][0]["kind"], "baseline");
}

#[test]
fn test_config_from_toml_drives_the_run() {
    let config = AnalysisConfig::from_toml_str(
        r#"
        risk_free_rate = 0.02
        confidence_level = 0.9
        risk_tolerance = 0.9
        commitment_term_years = 1.0
        discount_rate = 0.04
        seed = 5
        var_simulations = 300
        simulation_paths = 300
        "#,
    )
    .unwrap();
    let analysis = CommitmentAnalyser::new(config).unwrap().analyse(&AnalysisInput::new(fleet()));

    assert_eq!(analysis.seed, 5);
    assert_eq!(analysis.simulation.computed().unwrap().bands.mean.len(), 13);
}

#[test]
fn test_missing_configuration_is_the_only_hard_failure() {
    let incomplete = AnalysisConfig::builder()
        .risk_free_rate(0.03)
        .confidence_level(0.95)
        .risk_tolerance(0.5)
        .commitment_term_years(3.0);
    assert_eq!(
        run_analysis(&AnalysisInput::new(fleet()), incomplete).unwrap_err(),
        EngineError::MissingConfig("discount_rate".to_string())
    );
}

#[test]
fn test_unbounded_term_is_rejected_before_analysis() {
    let input = AnalysisInput::new(fleet()).with_monthly_savings(100.0);
    let err = run_analysis(&input, config().commitment_term_years(1e300)).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig { .. }));
}
