//! Cost and billable amounts for usage entries.
//!
//! A usage entry (job entry or estimate entry) records hours against an
//! optional asset, an optional employee and an optional material. Its
//! `cost_amount` and `billable_amount` are always derived here, never edited
//! directly.

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BillingError;
pub use service::BillingService;
pub use types::{
    Charge, ChargeBreakdown, MAX_AMOUNT, MAX_HOURS, MAX_MARKUP, Margin, MaterialUsage, RateSource,
    Rates, UsageAmounts, UsageInput,
};
