//! Aggregation and report building.
//!
//! Everything here is pure: repositories load [`EntryAmounts`],
//! [`ReportLine`]s and [`ProjectRollup`]s, and [`ReportService`] turns them
//! into totals and report documents.
//! - Totals and outstanding balances
//! - Contractor dashboard and profitability report
//! - Customer and job cost reports for projects and estimates
//! - Estimate vs actual comparison
//! - Project analytics recomputed through the calculator

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
