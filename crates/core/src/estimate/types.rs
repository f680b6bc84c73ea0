//! Estimate domain types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Estimate status.
///
/// The valid transitions are:
/// - Draft → Sent (email)
/// - Sent → Sent (email again)
/// - Draft → Accepted (accept)
/// - Sent → Accepted (accept)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateStatus {
    /// Being prepared; freely editable.
    #[default]
    Draft,
    /// Emailed to the customer.
    Sent,
    /// Accepted and turned into a project (read-only).
    Accepted,
}

impl EstimateStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Accepted => "accepted",
        }
    }

    /// Parses a status from a string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "accepted" => Some(Self::Accepted),
            _ => None,
        }
    }

    /// Returns true if the estimate and its entries can be modified.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }
}

impl fmt::Display for EstimateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rendered estimate email, ready for the mailer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EstimateEmail {
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}
