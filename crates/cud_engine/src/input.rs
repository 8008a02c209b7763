//! Analysis input.

use cud_models::estimation::AssetClass;
use serde::{Deserialize, Serialize};

/// Spend data for one analysis run.
///
/// # Examples
/// ```
/// use cud_engine::AnalysisInput;
/// use cud_models::estimation::AssetClass;
///
/// let input = AnalysisInput::new(vec![
///     AssetClass::new("n2-standard", vec![900.0, 950.0, 1_000.0]),
///     AssetClass::new("e2-medium", vec![400.0, 410.0]),
/// ])
/// .with_monthly_savings(350.0);
///
/// assert_eq!(input.total_spend(), 1_410.0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    /// Spend history per resource class.
    pub assets: Vec<AssetClass>,
    /// Observed monthly usage cost. Synthesised when absent.
    #[serde(default)]
    pub usage_history: Option<Vec<f64>>,
    /// Monthly savings of the committed position. The ladder's expected
    /// savings are used when absent.
    #[serde(default)]
    pub monthly_savings: Option<f64>,
}

impl AnalysisInput {
    /// Input with asset series only.
    pub fn new(assets: Vec<AssetClass>) -> Self {
        Self {
            assets,
            usage_history: None,
            monthly_savings: None,
        }
    }

    /// Attaches an observed usage history.
    pub fn with_usage_history(mut self, history: Vec<f64>) -> Self {
        self.usage_history = Some(history);
        self
    }

    /// Attaches the monthly savings of the committed position.
    pub fn with_monthly_savings(mut self, savings: f64) -> Self {
        self.monthly_savings = Some(savings);
        self
    }

    /// Sum of the latest spend of every asset.
    pub fn total_spend(&self) -> f64 {
        self.assets.iter().filter_map(AssetClass::current_spend).sum()
    }
}
