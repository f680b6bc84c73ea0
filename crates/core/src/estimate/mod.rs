//! Estimate lifecycle rules.
//!
//! - `types` - `EstimateStatus` and the rendered customer email
//! - `error` - Estimate-specific error types
//! - `service` - Status transitions, copy naming and email rendering

pub mod error;
pub mod service;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::EstimateError;
pub use service::EstimateService;
pub use types::{EstimateEmail, EstimateStatus};
