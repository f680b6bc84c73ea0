//! Billing error types.

use rust_decimal::Decimal;
use thiserror::Error;

use jobledger_shared::AppError;

/// Errors raised while validating billing inputs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BillingError {
    /// Hours must not be negative.
    #[error("hours cannot be negative: {0}")]
    NegativeHours(Decimal),

    /// A rate or unit cost must not be negative.
    #[error("{field} cannot be negative: {value}")]
    NegativeRate {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },

    /// Service markup must not be negative.
    #[error("service markup cannot be negative: {0}")]
    NegativeMarkup(Decimal),

    /// A value is larger than its column can store.
    #[error("{field} must be at most {max}, got {value}")]
    TooLarge {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
        /// Largest accepted value.
        max: Decimal,
    },

    /// A value has more decimal places than its column stores.
    #[error("{field} allows at most 2 decimal places, got {value}")]
    TooPrecise {
        /// Name of the offending field.
        field: &'static str,
        /// Supplied value.
        value: Decimal,
    },

    /// Margin must satisfy 0 <= margin < 100.
    #[error("material margin must be at least 0 and below 100, got {0}")]
    MarginOutOfRange(Decimal),
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        Self::Validation(err.to_string())
    }
}
