//! Estimate status transitions and customer email rendering.

use jobledger_shared::types::format_money;

use super::error::EstimateError;
use super::types::{EstimateEmail, EstimateStatus};
use crate::reports::CustomerReport;

/// Suffix appended to the name of a duplicated estimate.
pub const COPY_SUFFIX: &str = " (Copy)";

/// Stateless estimate rules.
pub struct EstimateService;

impl EstimateService {
    /// Fails unless entries of an estimate in `status` may be changed.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::ReadOnly` for accepted estimates.
    pub const fn ensure_editable(status: EstimateStatus) -> Result<(), EstimateError> {
        if status.is_editable() {
            Ok(())
        } else {
            Err(EstimateError::ReadOnly)
        }
    }

    /// Status after emailing the estimate to the customer.
    ///
    /// Re-sending a sent estimate is allowed.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::InvalidTransition` for accepted estimates.
    pub const fn mark_sent(status: EstimateStatus) -> Result<EstimateStatus, EstimateError> {
        match status {
            EstimateStatus::Draft | EstimateStatus::Sent => Ok(EstimateStatus::Sent),
            EstimateStatus::Accepted => Err(EstimateError::InvalidTransition {
                from: status,
                to: EstimateStatus::Sent,
            }),
        }
    }

    /// Status after the customer accepts the estimate.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::AlreadyAccepted` if it was accepted before.
    pub const fn accept(status: EstimateStatus) -> Result<EstimateStatus, EstimateError> {
        match status {
            EstimateStatus::Draft | EstimateStatus::Sent => Ok(EstimateStatus::Accepted),
            EstimateStatus::Accepted => Err(EstimateError::AlreadyAccepted),
        }
    }

    /// Name given to a duplicate of the estimate called `name`.
    #[must_use]
    pub fn copy_name(name: &str) -> String {
        format!("{}{COPY_SUFFIX}", name.trim_end())
    }

    /// Renders the plain-text email sent to the customer.
    ///
    /// # Errors
    ///
    /// Returns `EstimateError::MissingCustomerEmail` if `customer_email` is blank.
    pub fn render_email(
        report: &CustomerReport,
        customer_email: &str,
        notes: &str,
        contractor_name: &str,
        currency_symbol: &str,
    ) -> Result<EstimateEmail, EstimateError> {
        let to = customer_email.trim();
        if to.is_empty() {
            return Err(EstimateError::MissingCustomerEmail);
        }

        let greeting = report
            .subject
            .customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("there");

        let mut lines = vec![
            format!("Hello {greeting},"),
            String::new(),
            format!(
                "{contractor_name} has prepared the estimate \"{}\" for you.",
                report.subject.name
            ),
            String::new(),
        ];
        lines.extend(report.lines.iter().map(|line| {
            format!(
                "- {} ({}): {}",
                line.description,
                line.hours.normalize(),
                format_money(line.billable_amount, currency_symbol)
            )
        }));
        lines.push(String::new());
        lines.push(format!(
            "Estimated total: {}",
            format_money(report.total_billable, currency_symbol)
        ));
        let notes = notes.trim();
        if !notes.is_empty() {
            lines.push(String::new());
            lines.push(notes.to_string());
        }
        lines.push(String::new());
        lines.push("Thank you,".to_string());
        lines.push(contractor_name.to_string());

        Ok(EstimateEmail {
            to: to.to_string(),
            subject: format!("Estimate: {}", report.subject.name),
            body: lines.join("\n"),
        })
    }
}
