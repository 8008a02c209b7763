//! Representative discount rates per commitment layer.

use super::error::AnalyticsError;

/// Representative discount (fraction of on-demand price saved) for each
/// commitment layer.
///
/// Supplied as data so the ladder designer and savings estimates can be run
/// against synthetic rate tables.
///
/// # Examples
/// ```
/// use cud_core::types::DiscountTable;
///
/// let table = DiscountTable::default();
/// assert_eq!(table.three_year, 0.55);
/// assert!(table.validate().is_ok());
///
/// let custom = DiscountTable::new(0.70, 0.45, 0.30).unwrap();
/// assert_eq!(custom.flex, 0.30);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DiscountTable {
    /// Discount for 3-year resource commitments.
    pub three_year: f64,
    /// Discount for 1-year resource commitments.
    pub one_year: f64,
    /// Discount for flexible (spend-based) commitments.
    pub flex: f64,
}

impl Default for DiscountTable {
    fn default() -> Self {
        Self {
            three_year: 0.55,
            one_year: 0.37,
            flex: 0.28,
        }
    }
}

impl DiscountTable {
    /// Create a validated discount table.
    ///
    /// # Errors
    /// `AnalyticsError::InvalidParameter` if any rate lies outside [0, 1).
    pub fn new(three_year: f64, one_year: f64, flex: f64) -> Result<Self, AnalyticsError> {
        let table = Self {
            three_year,
            one_year,
            flex,
        };
        table.validate()?;
        Ok(table)
    }

    /// Check that every rate is a fraction in [0, 1).
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        for (name, rate) in [
            ("three_year", self.three_year),
            ("one_year", self.one_year),
            ("flex", self.flex),
        ] {
            if !(0.0..1.0).contains(&rate) {
                return Err(AnalyticsError::invalid_parameter(
                    name,
                    rate,
                    "discount must be in [0, 1)",
                ));
            }
        }
        Ok(())
    }
}
