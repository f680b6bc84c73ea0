//! Report data types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::{ChargeBreakdown, UsageInput};

/// Persisted derived amounts of one usage entry.
///
/// Either amount may be missing on legacy rows; aggregation counts a missing
/// amount as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryAmounts {
    /// Stored cost amount.
    pub cost_amount: Option<Decimal>,
    /// Stored billable amount.
    pub billable_amount: Option<Decimal>,
}

impl EntryAmounts {
    /// Amounts of an entry with both values present.
    #[must_use]
    pub const fn new(cost_amount: Decimal, billable_amount: Decimal) -> Self {
        Self {
            cost_amount: Some(cost_amount),
            billable_amount: Some(billable_amount),
        }
    }

    /// True if either amount is missing.
    #[must_use]
    pub const fn is_incomplete(&self) -> bool {
        self.cost_amount.is_none() || self.billable_amount.is_none()
    }
}

/// Aggregated cost, billable, profit and margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    /// Sum of cost amounts.
    pub total_cost: Decimal,
    /// Sum of billable amounts.
    pub total_billable: Decimal,
    /// `total_billable - total_cost`.
    pub total_profit: Decimal,
    /// `profit / billable * 100`, rounded to 2 dp; zero when nothing is billable.
    pub margin_pct: Decimal,
    /// Number of entries aggregated.
    pub entry_count: usize,
    /// Entries with at least one missing amount (counted as zero).
    pub skipped: usize,
}

/// A project or estimate a report is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubject {
    /// Record ID.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// First day of work, for projects.
    pub start_date: Option<NaiveDate>,
    /// Last day of work, for finished projects.
    pub end_date: Option<NaiveDate>,
    /// Customer name, for estimates.
    pub customer_name: Option<String>,
}

/// Per-project aggregates loaded from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRollup {
    /// Project ID.
    pub project_id: Uuid,
    /// Project name.
    pub name: String,
    /// Project start date.
    pub start_date: NaiveDate,
    /// Project end date.
    pub end_date: Option<NaiveDate>,
    /// Sum of entry costs; `None` when the project has no entries.
    pub total_cost: Option<Decimal>,
    /// Sum of entry billable amounts; `None` when the project has no entries.
    pub total_billable: Option<Decimal>,
    /// Sum of payments; `None` when no payment was recorded.
    pub total_payments: Option<Decimal>,
    /// Number of entries.
    pub entry_count: i64,
}

/// Dashboard row: what a project has billed and what is still owed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBalance {
    /// Project ID.
    pub project_id: Uuid,
    /// Project name.
    pub name: String,
    /// Project start date.
    pub start_date: NaiveDate,
    /// Project end date.
    pub end_date: Option<NaiveDate>,
    /// Total billable.
    pub total_billable: Decimal,
    /// Payments received.
    pub total_payments: Decimal,
    /// Billable minus payments.
    pub outstanding: Decimal,
}

/// Contractor dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorSummary {
    /// One row per project, newest first.
    pub projects: Vec<ProjectBalance>,
    /// Billable across all projects.
    pub overall_billable: Decimal,
    /// Payments across all projects.
    pub overall_payments: Decimal,
    /// Outstanding across all projects.
    pub overall_outstanding: Decimal,
}

/// Contractor report row: profitability of one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProfit {
    /// Project ID.
    pub project_id: Uuid,
    /// Project name.
    pub name: String,
    /// Project totals.
    pub totals: Totals,
}

/// Profitability across all projects of a contractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractorReport {
    /// Per-project rows.
    pub projects: Vec<ProjectProfit>,
    /// Grand totals.
    pub totals: Totals,
}

/// An entry as loaded for a line-level report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Entry ID.
    pub entry_id: Uuid,
    /// Work date; estimate entries have none.
    pub date: Option<NaiveDate>,
    /// Free-text description.
    pub description: String,
    /// Material description, if material was used.
    pub material_description: Option<String>,
    /// Material unit, if material was used.
    pub material_unit: Option<String>,
    /// Asset name, if an asset was used.
    pub asset_name: Option<String>,
    /// Employee name, if an employee worked.
    pub employee_name: Option<String>,
    /// Hours or material quantity.
    pub hours: Decimal,
    /// Stored amounts.
    pub amounts: EntryAmounts,
}

/// A payment as shown on reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLine {
    /// Payment date.
    pub date: NaiveDate,
    /// Amount received.
    pub amount: Decimal,
    /// Free-text notes.
    pub notes: String,
}

/// A customer-facing line: no cost information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerLine {
    /// Work date.
    pub date: Option<NaiveDate>,
    /// Description with repeated quantities removed.
    pub description: String,
    /// Hours or quantity.
    pub hours: Decimal,
    /// Amount billed.
    pub billable_amount: Decimal,
}

/// Report sent to a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerReport {
    /// Project or estimate.
    pub subject: ReportSubject,
    /// Billed lines.
    pub lines: Vec<CustomerLine>,
    /// Payments received; empty for estimates.
    pub payments: Vec<PaymentLine>,
    /// Total billable.
    pub total_billable: Decimal,
    /// Total of payments.
    pub total_payments: Decimal,
    /// Billable minus payments.
    pub outstanding: Decimal,
}

/// An internal line with cost and profit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLine {
    /// Entry ID.
    pub entry_id: Uuid,
    /// Work date.
    pub date: Option<NaiveDate>,
    /// Description as entered.
    pub description: String,
    /// Asset used.
    pub asset_name: Option<String>,
    /// Employee who worked.
    pub employee_name: Option<String>,
    /// Hours or quantity.
    pub hours: Decimal,
    /// Cost amount (zero if missing).
    pub cost_amount: Decimal,
    /// Billable amount (zero if missing).
    pub billable_amount: Decimal,
    /// Billable minus cost.
    pub profit: Decimal,
}

/// Internal job cost report for the contractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCostReport {
    /// Project or estimate.
    pub subject: ReportSubject,
    /// Lines with cost detail.
    pub lines: Vec<CostLine>,
    /// Totals over all lines.
    pub totals: Totals,
    /// Payments received; empty for estimates.
    pub payments: Vec<PaymentLine>,
    /// Total of payments.
    pub total_payments: Decimal,
    /// Billable minus payments.
    pub outstanding: Decimal,
}

/// How actual figures compare to the estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceStatus {
    /// Actual is below the estimate.
    UnderEstimate,
    /// Actual equals the estimate.
    OnEstimate,
    /// Actual exceeds the estimate.
    OverEstimate,
}

/// Actual minus estimated for one figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variance {
    /// Estimated value.
    pub estimated: Decimal,
    /// Actual value.
    pub actual: Decimal,
    /// `actual - estimated`.
    pub variance: Decimal,
    /// Variance as a percentage of the estimate; zero when the estimate is zero.
    pub variance_pct: Decimal,
    /// Direction of the variance.
    pub status: VarianceStatus,
}

/// Estimate compared with the project created from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EstimateVsActual {
    /// The estimate.
    pub estimate: ReportSubject,
    /// Estimate totals.
    pub estimated: Totals,
    /// The linked project, once the estimate is accepted.
    pub project: Option<ReportSubject>,
    /// Project totals.
    pub actual: Option<Totals>,
    /// Billable variance.
    pub billable: Option<Variance>,
    /// Cost variance.
    pub cost: Option<Variance>,
}

/// A usage input with the day it was recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatedUsage {
    /// Work date.
    pub date: NaiveDate,
    /// Pricing input.
    pub input: UsageInput,
}

/// Daily analytics point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    /// Day.
    pub date: NaiveDate,
    /// Cost recorded that day.
    pub cost: Decimal,
    /// Billable recorded that day.
    pub billable: Decimal,
    /// Billable minus cost.
    pub profit: Decimal,
}

/// Optional inclusive date window for analytics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// True if `date` lies inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }
}

/// Project analytics recomputed from current rates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectAnalytics {
    /// One point per day with entries, in date order.
    pub daily: Vec<DailyPoint>,
    /// Equipment, labor and material split.
    pub breakdown: ChargeBreakdown,
    /// Totals over the window.
    pub totals: Totals,
}
