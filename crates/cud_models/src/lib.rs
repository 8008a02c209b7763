//! # cud_models (L2: Business Logic)
//!
//! Per-component models of the commitment analytics workspace:
//!
//! - [`estimation`]: Annualised return and volatility per resource class
//! - [`forecasting`]: Holt-Winters demand forecast and price elasticity
//! - [`ladder`]: Tiered commitment ladder by risk tolerance
//! - [`option`]: A commitment valued as a European call, with Greeks
//! - [`finance`]: NPV, IRR, payback, ROI and related appraisal metrics
//!
//! Every model returns a typed result record and reports failures through
//! [`cud_core::types::AnalyticsError`].
//!
//! ## Example
//!
//! ```
//! use cud_models::finance::compute_metrics;
//!
//! let metrics = compute_metrics(100_000.0, &[30_000.0; 5], 0.05).unwrap();
//! assert!((metrics.npv - 29_884.0).abs() < 1.0);
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

pub mod estimation;
pub mod finance;
pub mod forecasting;
pub mod ladder;
pub mod option;
