//! Estimate error types.

use thiserror::Error;

use jobledger_shared::AppError;

use super::types::EstimateStatus;

/// Errors that can occur during estimate operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EstimateError {
    /// Attempted an invalid status transition.
    #[error("Invalid estimate status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: EstimateStatus,
        /// The attempted target status.
        to: EstimateStatus,
    },

    /// The estimate was already accepted.
    #[error("Estimate has already been accepted")]
    AlreadyAccepted,

    /// Attempted to change an accepted estimate.
    #[error("Accepted estimates cannot be modified")]
    ReadOnly,

    /// The estimate has no customer email to send to.
    #[error("Estimate has no customer email")]
    MissingCustomerEmail,

    /// Unknown status text in storage.
    #[error("Unknown estimate status: {0}")]
    UnknownStatus(String),
}

impl From<EstimateError> for AppError {
    fn from(err: EstimateError) -> Self {
        match err {
            EstimateError::MissingCustomerEmail => {
                Self::invalid_field("customer_email", "is required to email an estimate")
            }
            EstimateError::UnknownStatus(_) => Self::Internal(err.to_string()),
            EstimateError::InvalidTransition { .. }
            | EstimateError::AlreadyAccepted
            | EstimateError::ReadOnly => Self::BusinessRule(err.to_string()),
        }
    }
}
