//! Report generation service.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use jobledger_shared::types::round_money;

use super::error::ReportError;
use super::types::{
    ContractorReport, ContractorSummary, CostLine, CustomerLine, CustomerReport, DailyPoint,
    DateRange, DatedUsage, EntryAmounts, EstimateVsActual, JobCostReport, PaymentLine,
    ProjectAnalytics, ProjectBalance, ProjectProfit, ProjectRollup, ReportLine, ReportSubject,
    Totals, Variance, VarianceStatus,
};
use crate::billing::{BillingService, Charge, ChargeBreakdown, Margin, UsageInput};
use crate::text::dedupe_qty;

/// Service for aggregating entries into reports.
pub struct ReportService;

impl ReportService {
    /// Sums stored entry amounts.
    ///
    /// A missing amount counts as zero; the entry is still counted and also
    /// reported in [`Totals::skipped`].
    #[must_use]
    pub fn totals<'a, I>(entries: I) -> Totals
    where
        I: IntoIterator<Item = &'a EntryAmounts>,
    {
        let mut cost = Decimal::ZERO;
        let mut billable = Decimal::ZERO;
        let mut count = 0;
        let mut skipped = 0;

        for entry in entries {
            count += 1;
            if entry.is_incomplete() {
                skipped += 1;
            }
            cost += entry.cost_amount.unwrap_or_default();
            billable += entry.billable_amount.unwrap_or_default();
        }

        Self::summarize(cost, billable, count, skipped)
    }

    /// Recomputes every input through the calculator and sums the results.
    #[must_use]
    pub fn totals_from_inputs(inputs: &[UsageInput], margin: Margin) -> Totals {
        let amounts: Vec<EntryAmounts> = inputs
            .iter()
            .map(|input| {
                let computed = BillingService::compute(input, margin);
                EntryAmounts::new(computed.cost_amount, computed.billable_amount)
            })
            .collect();
        Self::totals(&amounts)
    }

    /// Billable minus payments received. Negative when overpaid.
    #[must_use]
    pub fn outstanding<I>(total_billable: Decimal, payments: I) -> Decimal
    where
        I: IntoIterator<Item = Decimal>,
    {
        total_billable - payments.into_iter().sum::<Decimal>()
    }

    /// `profit / billable * 100` rounded to cents, zero when nothing is billable.
    #[must_use]
    pub fn margin_pct(profit: Decimal, billable: Decimal) -> Decimal {
        if billable.is_zero() {
            return Decimal::ZERO;
        }
        round_money(profit / billable * Decimal::ONE_HUNDRED)
    }

    /// Builds the dashboard: billed, paid and outstanding per project.
    #[must_use]
    pub fn contractor_summary(rows: &[ProjectRollup]) -> ContractorSummary {
        let projects: Vec<ProjectBalance> = rows
            .iter()
            .map(|row| {
                let total_billable = row.total_billable.unwrap_or_default();
                let total_payments = row.total_payments.unwrap_or_default();
                ProjectBalance {
                    project_id: row.project_id,
                    name: row.name.clone(),
                    start_date: row.start_date,
                    end_date: row.end_date,
                    total_billable,
                    total_payments,
                    outstanding: Self::outstanding(total_billable, [total_payments]),
                }
            })
            .collect();

        let overall_billable: Decimal = projects.iter().map(|p| p.total_billable).sum();
        let overall_payments: Decimal = projects.iter().map(|p| p.total_payments).sum();

        ContractorSummary {
            overall_outstanding: Self::outstanding(overall_billable, [overall_payments]),
            projects,
            overall_billable,
            overall_payments,
        }
    }

    /// Builds the contractor profitability report across projects.
    #[must_use]
    pub fn contractor_report(rows: &[ProjectRollup]) -> ContractorReport {
        let projects: Vec<ProjectProfit> = rows
            .iter()
            .map(|row| ProjectProfit {
                project_id: row.project_id,
                name: row.name.clone(),
                totals: Self::summarize(
                    row.total_cost.unwrap_or_default(),
                    row.total_billable.unwrap_or_default(),
                    usize::try_from(row.entry_count).unwrap_or_default(),
                    0,
                ),
            })
            .collect();

        let cost: Decimal = projects.iter().map(|p| p.totals.total_cost).sum();
        let billable: Decimal = projects.iter().map(|p| p.totals.total_billable).sum();
        let count: usize = projects.iter().map(|p| p.totals.entry_count).sum();

        ContractorReport {
            projects,
            totals: Self::summarize(cost, billable, count, 0),
        }
    }

    /// Builds the customer-facing project report.
    #[must_use]
    pub fn customer_report(
        subject: ReportSubject,
        lines: &[ReportLine],
        payments: Vec<PaymentLine>,
    ) -> CustomerReport {
        let customer_lines: Vec<CustomerLine> = lines
            .iter()
            .map(|line| CustomerLine {
                date: line.date,
                description: Self::customer_description(line),
                hours: line.hours,
                billable_amount: line.amounts.billable_amount.unwrap_or_default(),
            })
            .collect();

        let total_billable: Decimal = customer_lines.iter().map(|l| l.billable_amount).sum();
        let total_payments: Decimal = payments.iter().map(|p| p.amount).sum();

        CustomerReport {
            subject,
            lines: customer_lines,
            payments,
            total_billable,
            total_payments,
            outstanding: Self::outstanding(total_billable, [total_payments]),
        }
    }

    /// Builds the internal job cost report with per-line profit.
    #[must_use]
    pub fn job_cost_report(
        subject: ReportSubject,
        lines: &[ReportLine],
        payments: Vec<PaymentLine>,
    ) -> JobCostReport {
        let cost_lines = lines
            .iter()
            .map(|line| {
                let cost_amount = line.amounts.cost_amount.unwrap_or_default();
                let billable_amount = line.amounts.billable_amount.unwrap_or_default();
                CostLine {
                    entry_id: line.entry_id,
                    date: line.date,
                    description: line.description.clone(),
                    asset_name: line.asset_name.clone(),
                    employee_name: line.employee_name.clone(),
                    hours: line.hours,
                    cost_amount,
                    billable_amount,
                    profit: billable_amount - cost_amount,
                }
            })
            .collect();

        let totals = Self::totals(lines.iter().map(|line| &line.amounts));
        let total_payments: Decimal = payments.iter().map(|p| p.amount).sum();

        JobCostReport {
            subject,
            lines: cost_lines,
            totals,
            payments,
            total_payments,
            outstanding: Self::outstanding(totals.total_billable, [total_payments]),
        }
    }

    /// Customer view of an estimate. Estimates have no payments.
    #[must_use]
    pub fn estimate_customer_report(subject: ReportSubject, lines: &[ReportLine]) -> CustomerReport {
        Self::customer_report(subject, lines, Vec::new())
    }

    /// Internal view of an estimate.
    #[must_use]
    pub fn estimate_internal_report(subject: ReportSubject, lines: &[ReportLine]) -> JobCostReport {
        Self::job_cost_report(subject, lines, Vec::new())
    }

    /// Compares an estimate with the project created from it, if any.
    #[must_use]
    pub fn estimate_vs_actual(
        estimate: ReportSubject,
        estimated: Totals,
        actual: Option<(ReportSubject, Totals)>,
    ) -> EstimateVsActual {
        match actual {
            Some((project, actual)) => EstimateVsActual {
                estimate,
                estimated,
                project: Some(project),
                actual: Some(actual),
                billable: Some(Self::variance(
                    estimated.total_billable,
                    actual.total_billable,
                )),
                cost: Some(Self::variance(estimated.total_cost, actual.total_cost)),
            },
            None => EstimateVsActual {
                estimate,
                estimated,
                project: None,
                actual: None,
                billable: None,
                cost: None,
            },
        }
    }

    /// Actual minus estimated, with percentage and direction.
    #[must_use]
    pub fn variance(estimated: Decimal, actual: Decimal) -> Variance {
        let variance = actual - estimated;
        let variance_pct = if estimated.is_zero() {
            Decimal::ZERO
        } else {
            round_money(variance / estimated * Decimal::ONE_HUNDRED)
        };
        let status = match variance.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Less => VarianceStatus::UnderEstimate,
            std::cmp::Ordering::Equal => VarianceStatus::OnEstimate,
            std::cmp::Ordering::Greater => VarianceStatus::OverEstimate,
        };

        Variance {
            estimated,
            actual,
            variance,
            variance_pct,
            status,
        }
    }

    /// Recomputes a project's entries against current rates and groups them by day.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::InvalidDateRange` if `range.from` is after `range.to`.
    pub fn project_analytics(
        usages: &[DatedUsage],
        margin: Margin,
        range: DateRange,
    ) -> Result<ProjectAnalytics, ReportError> {
        if let (Some(start), Some(end)) = (range.from, range.to) {
            if start > end {
                return Err(ReportError::InvalidDateRange { start, end });
            }
        }

        let mut by_day: BTreeMap<_, Charge> = BTreeMap::new();
        let mut breakdown = ChargeBreakdown::default();
        let mut amounts = Vec::new();

        for usage in usages.iter().filter(|u| range.contains(u.date)) {
            let computed = BillingService::compute(&usage.input, margin);
            *by_day.entry(usage.date).or_default() += Charge {
                cost: computed.cost_amount,
                billable: computed.billable_amount,
            };
            breakdown += computed.breakdown;
            amounts.push(EntryAmounts::new(computed.cost_amount, computed.billable_amount));
        }

        let daily = by_day
            .into_iter()
            .map(|(date, charge)| DailyPoint {
                date,
                cost: charge.cost,
                billable: charge.billable,
                profit: charge.profit(),
            })
            .collect();

        Ok(ProjectAnalytics {
            daily,
            breakdown,
            totals: Self::totals(&amounts),
        })
    }

    /// Description shown to customers: entry text plus material and quantity,
    /// with repeated quantity groups removed.
    #[must_use]
    pub fn customer_description(line: &ReportLine) -> String {
        let mut parts = Vec::with_capacity(2);

        let description = line.description.trim();
        if !description.is_empty() {
            parts.push(description.to_string());
        }

        let material = line
            .material_description
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty());
        let unit = line
            .material_unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty());
        match (material, unit) {
            (Some(material), Some(unit)) => {
                parts.push(format!("{material} ({} {unit})", line.hours.normalize()));
            }
            (Some(material), None) => parts.push(material.to_string()),
            (None, _) => {}
        }

        dedupe_qty(&parts.join(" - "))
    }

    fn summarize(cost: Decimal, billable: Decimal, entry_count: usize, skipped: usize) -> Totals {
        let profit = billable - cost;
        Totals {
            total_cost: cost,
            total_billable: billable,
            total_profit: profit,
            margin_pct: Self::margin_pct(profit, billable),
            entry_count,
            skipped,
        }
    }
}
