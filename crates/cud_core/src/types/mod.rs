//! Core types shared by every analytics layer.
//!
//! - [`error`]: `AnalyticsError` and `SolverError`
//! - [`discount`]: `DiscountTable` of representative commitment discounts

pub mod discount;
pub mod error;

pub use discount::DiscountTable;
pub use error::{AnalyticsError, SolverError};
