//! Layout of reports as printable documents.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use jobledger_core::reports::{
    ContractorReport, CustomerReport, EstimateVsActual, JobCostReport, ReportSubject, Totals,
    Variance,
};
use jobledger_shared::types::format_money;

/// A table column: header text, left edge in millimetres and the widest
/// text it holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Header text.
    pub header: &'static str,
    /// Left edge, in mm from the page edge.
    pub x_mm: u16,
    /// Longer cell text is cut to this many characters.
    pub max_chars: usize,
}

const fn column(header: &'static str, x_mm: u16, max_chars: usize) -> Column {
    Column {
        header,
        x_mm,
        max_chars,
    }
}

/// A report ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Heading on the first page; also the PDF title.
    pub title: String,
    /// Lines under the heading.
    pub subtitle: Vec<String>,
    /// Table columns.
    pub columns: Vec<Column>,
    /// Table rows, one cell per column.
    pub rows: Vec<Vec<String>>,
    /// Label/value pairs printed after the table.
    pub summary: Vec<(String, String)>,
}

impl Document {
    /// Customer-facing report of a project or estimate.
    #[must_use]
    pub fn customer_report(report: &CustomerReport, symbol: &str) -> Self {
        let is_estimate = report.subject.customer_name.is_some();
        let title = if is_estimate {
            format!("Estimate: {}", report.subject.name)
        } else {
            format!("Customer Report: {}", report.subject.name)
        };

        let rows = report
            .lines
            .iter()
            .map(|line| {
                vec![
                    date_cell(line.date),
                    line.description.clone(),
                    line.hours.normalize().to_string(),
                    format_money(line.billable_amount, symbol),
                ]
            })
            .collect();

        let mut summary = vec![(
            "Total".to_string(),
            format_money(report.total_billable, symbol),
        )];
        if !is_estimate {
            summary.push((
                "Payments received".to_string(),
                format_money(report.total_payments, symbol),
            ));
            summary.push((
                "Balance due".to_string(),
                format_money(report.outstanding, symbol),
            ));
        }

        Self {
            title,
            subtitle: subject_lines(&report.subject),
            columns: vec![
                column("Date", 15, 10),
                column("Description", 40, 55),
                column("Qty", 140, 10),
                column("Amount", 165, 16),
            ],
            rows,
            summary,
        }
    }

    /// Internal job cost report of a project or estimate.
    #[must_use]
    pub fn job_cost_report(report: &JobCostReport, symbol: &str) -> Self {
        let rows = report
            .lines
            .iter()
            .map(|line| {
                vec![
                    date_cell(line.date),
                    line.description.clone(),
                    line.hours.normalize().to_string(),
                    format_money(line.cost_amount, symbol),
                    format_money(line.billable_amount, symbol),
                    format_money(line.profit, symbol),
                ]
            })
            .collect();

        let mut summary = totals_summary(&report.totals, symbol);
        if report.subject.customer_name.is_none() {
            summary.push((
                "Payments received".to_string(),
                format_money(report.total_payments, symbol),
            ));
            summary.push((
                "Balance due".to_string(),
                format_money(report.outstanding, symbol),
            ));
        }

        Self {
            title: format!("Job Cost Report: {}", report.subject.name),
            subtitle: subject_lines(&report.subject),
            columns: vec![
                column("Date", 15, 10),
                column("Description", 38, 34),
                column("Hours", 105, 8),
                column("Cost", 125, 12),
                column("Billable", 150, 12),
                column("Profit", 175, 12),
            ],
            rows,
            summary,
        }
    }

    /// Profitability across all projects.
    #[must_use]
    pub fn contractor_report(report: &ContractorReport, contractor_name: &str, symbol: &str) -> Self {
        let rows = report
            .projects
            .iter()
            .map(|project| {
                vec![
                    project.name.clone(),
                    project.totals.entry_count.to_string(),
                    format_money(project.totals.total_cost, symbol),
                    format_money(project.totals.total_billable, symbol),
                    format_money(project.totals.total_profit, symbol),
                    percent(project.totals.margin_pct),
                ]
            })
            .collect();

        Self {
            title: format!("Contractor Report: {contractor_name}"),
            subtitle: Vec::new(),
            columns: vec![
                column("Project", 15, 30),
                column("Entries", 78, 6),
                column("Cost", 95, 12),
                column("Billable", 122, 12),
                column("Profit", 149, 12),
                column("Margin", 176, 8),
            ],
            rows,
            summary: totals_summary(&report.totals, symbol),
        }
    }

    /// An estimate compared with the project created from it.
    #[must_use]
    pub fn estimate_vs_actual(report: &EstimateVsActual, symbol: &str) -> Self {
        let mut subtitle = subject_lines(&report.estimate);
        let rows = match (&report.project, report.billable, report.cost) {
            (Some(project), Some(billable), Some(cost)) => {
                subtitle.push(format!("Project: {}", project.name));
                vec![
                    variance_row("Billable", &billable, symbol),
                    variance_row("Cost", &cost, symbol),
                ]
            }
            _ => {
                subtitle.push("Not yet accepted; no project to compare.".to_string());
                Vec::new()
            }
        };

        Self {
            title: format!("Estimate vs Actual: {}", report.estimate.name),
            subtitle,
            columns: vec![
                column("Figure", 15, 12),
                column("Estimated", 45, 14),
                column("Actual", 80, 14),
                column("Variance", 115, 14),
                column("%", 150, 9),
                column("Status", 170, 14),
            ],
            rows,
            summary: totals_summary(&report.estimated, symbol)
                .into_iter()
                .map(|(label, value)| (format!("Estimated {}", label.to_lowercase()), value))
                .collect(),
        }
    }
}

fn subject_lines(subject: &ReportSubject) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(customer) = subject.customer_name.as_deref().filter(|c| !c.is_empty()) {
        lines.push(format!("Customer: {customer}"));
    }
    match (subject.start_date, subject.end_date) {
        (Some(start), Some(end)) => lines.push(format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))),
        (Some(start), None) => lines.push(format!("Started {}", start.format("%Y-%m-%d"))),
        _ => {}
    }
    lines
}

fn totals_summary(totals: &Totals, symbol: &str) -> Vec<(String, String)> {
    vec![
        ("Cost".to_string(), format_money(totals.total_cost, symbol)),
        ("Billable".to_string(), format_money(totals.total_billable, symbol)),
        ("Profit".to_string(), format_money(totals.total_profit, symbol)),
        ("Margin".to_string(), percent(totals.margin_pct)),
    ]
}

fn variance_row(label: &str, variance: &Variance, symbol: &str) -> Vec<String> {
    let status = serde_json::to_value(variance.status)
        .ok()
        .and_then(|v| v.as_str().map(|s| s.replace('_', " ")))
        .unwrap_or_default();
    vec![
        label.to_string(),
        format_money(variance.estimated, symbol),
        format_money(variance.actual, symbol),
        format_money(variance.variance, symbol),
        percent(variance.variance_pct),
        status,
    ]
}

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn percent(value: Decimal) -> String {
    format!("{}%", value.round_dp(2).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobledger_core::reports::{CustomerLine, ReportService};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn subject(customer: Option<&str>) -> ReportSubject {
        ReportSubject {
            id: Uuid::new_v4(),
            name: "Barn pad".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            end_date: None,
            customer_name: customer.map(str::to_string),
        }
    }

    fn customer_report(customer: Option<&str>) -> CustomerReport {
        CustomerReport {
            subject: subject(customer),
            lines: vec![CustomerLine {
                date: NaiveDate::from_ymd_opt(2025, 3, 2),
                description: "Grading".to_string(),
                hours: dec!(4.50),
                billable_amount: dec!(1200),
            }],
            payments: Vec::new(),
            total_billable: dec!(1200),
            total_payments: dec!(200),
            outstanding: dec!(1000),
        }
    }

    #[test]
    fn test_project_customer_report_shows_balance() {
        let doc = Document::customer_report(&customer_report(None), "$");

        assert_eq!(doc.title, "Customer Report: Barn pad");
        assert_eq!(doc.rows[0], vec!["2025-03-02", "Grading", "4.5", "$1,200.00"]);
        assert_eq!(doc.summary.last().unwrap(), &("Balance due".to_string(), "$1,000.00".to_string()));
    }

    #[test]
    fn test_estimate_customer_report_has_no_payments() {
        let doc = Document::customer_report(&customer_report(Some("Dana")), "$");

        assert_eq!(doc.title, "Estimate: Barn pad");
        assert_eq!(doc.subtitle[0], "Customer: Dana");
        assert_eq!(doc.summary.len(), 1);
    }

    #[test]
    fn test_variance_rows_only_after_acceptance() {
        let pending =
            ReportService::estimate_vs_actual(subject(Some("Dana")), Totals::default(), None);

        let doc = Document::estimate_vs_actual(&pending, "$");

        assert!(doc.rows.is_empty());
        assert!(doc.subtitle.iter().any(|l| l.contains("Not yet accepted")));
    }

    #[test]
    fn test_variance_status_is_readable() {
        let row = variance_row("Cost", &ReportService::variance(dec!(100), dec!(120)), "$");

        assert_eq!(row[3], "$20.00");
        assert_eq!(row[4], "20%");
        assert_eq!(row[5], "over estimate");
    }
}
