//! Tests for report aggregation.

use chrono::NaiveDate;
use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::error::ReportError;
use super::service::ReportService;
use super::types::*;
use crate::billing::{Margin, MaterialUsage, Rates, UsageInput};

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
}

fn subject(name: &str) -> ReportSubject {
    ReportSubject {
        id: Uuid::new_v4(),
        name: name.to_string(),
        start_date: Some(day(1)),
        end_date: None,
        customer_name: None,
    }
}

fn line(description: &str, hours: Decimal, cost: Decimal, billable: Decimal) -> ReportLine {
    ReportLine {
        entry_id: Uuid::new_v4(),
        date: Some(day(2)),
        description: description.to_string(),
        material_description: None,
        material_unit: None,
        asset_name: None,
        employee_name: None,
        hours,
        amounts: EntryAmounts::new(cost, billable),
    }
}

fn payment(amount: Decimal) -> PaymentLine {
    PaymentLine {
        date: day(10),
        amount,
        notes: String::new(),
    }
}

fn rollup(name: &str, cost: Option<Decimal>, billable: Option<Decimal>, paid: Option<Decimal>) -> ProjectRollup {
    ProjectRollup {
        project_id: Uuid::new_v4(),
        name: name.to_string(),
        start_date: day(1),
        end_date: None,
        total_cost: cost,
        total_billable: billable,
        total_payments: paid,
        entry_count: 1,
    }
}

#[test]
fn test_totals_and_margin() {
    let entries = [
        EntryAmounts::new(dec!(100.00), dec!(150.00)),
        EntryAmounts::new(dec!(300.00), dec!(408.33)),
    ];

    let totals = ReportService::totals(&entries);

    assert_eq!(totals.total_cost, dec!(400.00));
    assert_eq!(totals.total_billable, dec!(558.33));
    assert_eq!(totals.total_profit, dec!(158.33));
    assert_eq!(totals.margin_pct, dec!(28.36));
    assert_eq!(totals.entry_count, 2);
    assert_eq!(totals.skipped, 0);
}

#[test]
fn test_totals_of_nothing_has_zero_margin() {
    let totals = ReportService::totals(&Vec::<EntryAmounts>::new());

    assert_eq!(totals, Totals::default());
    assert_eq!(totals.margin_pct, Decimal::ZERO);
}

#[test]
fn test_missing_amounts_count_as_zero() {
    let entries = [
        EntryAmounts::new(dec!(10), dec!(20)),
        EntryAmounts {
            cost_amount: None,
            billable_amount: Some(dec!(5)),
        },
        EntryAmounts::default(),
    ];

    let totals = ReportService::totals(&entries);

    assert_eq!(totals.total_cost, dec!(10));
    assert_eq!(totals.total_billable, dec!(25));
    assert_eq!(totals.entry_count, 3);
    assert_eq!(totals.skipped, 2);
}

#[rstest]
#[case::unpaid(dec!(500), vec![], dec!(500))]
#[case::partly_paid(dec!(500), vec![dec!(200), dec!(100)], dec!(200))]
#[case::overpaid(dec!(500), vec![dec!(600)], dec!(-100))]
fn test_outstanding(#[case] billable: Decimal, #[case] payments: Vec<Decimal>, #[case] expected: Decimal) {
    assert_eq!(ReportService::outstanding(billable, payments), expected);
}

#[test]
fn test_totals_from_inputs_uses_calculator() {
    let input = UsageInput::new(dec!(5))
        .unwrap()
        .with_asset(Rates::new(dec!(10), dec!(15)).unwrap())
        .with_employee(Rates::new(dec!(20), dec!(30)).unwrap())
        .with_material(MaterialUsage::new(dec!(50), None).unwrap());

    let totals = ReportService::totals_from_inputs(&[input], Margin::new(dec!(25)).unwrap());

    assert_eq!(totals.total_cost, dec!(400.00));
    assert_eq!(totals.total_billable, dec!(558.33));
}

#[test]
fn test_contractor_summary() {
    let rows = [
        rollup("Driveway", Some(dec!(800)), Some(dec!(1000)), Some(dec!(400))),
        rollup("Fence", None, None, None),
    ];

    let summary = ReportService::contractor_summary(&rows);

    assert_eq!(summary.projects.len(), 2);
    assert_eq!(summary.projects[0].outstanding, dec!(600));
    assert_eq!(summary.projects[1].total_billable, Decimal::ZERO);
    assert_eq!(summary.projects[1].outstanding, Decimal::ZERO);
    assert_eq!(summary.overall_billable, dec!(1000));
    assert_eq!(summary.overall_payments, dec!(400));
    assert_eq!(summary.overall_outstanding, dec!(600));
}

#[test]
fn test_contractor_report_grand_totals() {
    let rows = [
        rollup("A", Some(dec!(75)), Some(dec!(100)), None),
        rollup("B", Some(dec!(150)), Some(dec!(200)), None),
    ];

    let report = ReportService::contractor_report(&rows);

    assert_eq!(report.projects[0].totals.margin_pct, dec!(25.00));
    assert_eq!(report.totals.total_cost, dec!(225));
    assert_eq!(report.totals.total_billable, dec!(300));
    assert_eq!(report.totals.total_profit, dec!(75));
    assert_eq!(report.totals.margin_pct, dec!(25.00));
    assert_eq!(report.totals.entry_count, 2);
}

#[test]
fn test_customer_report_hides_cost_and_dedupes() {
    let mut gravel = line("Gravel (3 tons)", dec!(3), dec!(90), dec!(120));
    gravel.material_description = Some("Gravel".to_string());
    gravel.material_unit = Some("tons".to_string());
    let labor = line("Grading", dec!(4), dec!(80), dec!(160));

    let report = ReportService::customer_report(
        subject("Driveway"),
        &[gravel, labor],
        vec![payment(dec!(100))],
    );

    assert_eq!(report.lines[0].description, "Gravel (3 tons) - Gravel");
    assert_eq!(report.lines[1].description, "Grading");
    assert_eq!(report.total_billable, dec!(280));
    assert_eq!(report.total_payments, dec!(100));
    assert_eq!(report.outstanding, dec!(180));

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["lines"][0].get("cost_amount").is_none());
}

#[rstest]
#[case::text_only("Haul", None, None, "Haul")]
#[case::material_with_unit("", Some("Mulch"), Some("yd"), "Mulch (2.5 yd)")]
#[case::material_without_unit("Spread", Some("Mulch"), None, "Spread - Mulch")]
#[case::blank_material("Spread", Some("  "), Some("yd"), "Spread")]
fn test_customer_description(
    #[case] description: &str,
    #[case] material: Option<&str>,
    #[case] unit: Option<&str>,
    #[case] expected: &str,
) {
    let mut entry = line(description, dec!(2.50), dec!(0), dec!(0));
    entry.material_description = material.map(str::to_string);
    entry.material_unit = unit.map(str::to_string);

    assert_eq!(ReportService::customer_description(&entry), expected);
}

#[test]
fn test_job_cost_report_profit_per_line() {
    let mut legacy = line("Old entry", dec!(1), dec!(0), dec!(0));
    legacy.amounts = EntryAmounts::default();

    let report = ReportService::job_cost_report(
        subject("Barn"),
        &[line("Framing", dec!(8), dec!(200), dec!(320)), legacy],
        vec![payment(dec!(320))],
    );

    assert_eq!(report.lines[0].profit, dec!(120));
    assert_eq!(report.lines[1].profit, Decimal::ZERO);
    assert_eq!(report.totals.total_profit, dec!(120));
    assert_eq!(report.totals.skipped, 1);
    assert_eq!(report.outstanding, Decimal::ZERO);
}

#[test]
fn test_estimate_reports_have_no_payments() {
    let lines = [line("Demo", dec!(2), dec!(40), dec!(60))];

    let customer = ReportService::estimate_customer_report(subject("Kitchen"), &lines);
    let internal = ReportService::estimate_internal_report(subject("Kitchen"), &lines);

    assert!(customer.payments.is_empty());
    assert_eq!(customer.outstanding, dec!(60));
    assert!(internal.payments.is_empty());
    assert_eq!(internal.totals.total_profit, dec!(20));
}

#[rstest]
#[case::under(dec!(1000), dec!(900), VarianceStatus::UnderEstimate, dec!(-10.00))]
#[case::on(dec!(1000), dec!(1000), VarianceStatus::OnEstimate, dec!(0))]
#[case::over(dec!(1000), dec!(1250), VarianceStatus::OverEstimate, dec!(25.00))]
#[case::zero_estimate(dec!(0), dec!(50), VarianceStatus::OverEstimate, dec!(0))]
fn test_variance(
    #[case] estimated: Decimal,
    #[case] actual: Decimal,
    #[case] status: VarianceStatus,
    #[case] pct: Decimal,
) {
    let variance = ReportService::variance(estimated, actual);

    assert_eq!(variance.variance, actual - estimated);
    assert_eq!(variance.variance_pct, pct);
    assert_eq!(variance.status, status);
}

#[test]
fn test_estimate_vs_actual_without_project() {
    let estimated = ReportService::totals(&[EntryAmounts::new(dec!(50), dec!(80))]);

    let report = ReportService::estimate_vs_actual(subject("Deck"), estimated, None);

    assert!(report.project.is_none());
    assert!(report.billable.is_none());
    assert_eq!(report.estimated.total_billable, dec!(80));
}

#[test]
fn test_estimate_vs_actual_with_project() {
    let estimated = ReportService::totals(&[EntryAmounts::new(dec!(50), dec!(80))]);
    let actual = ReportService::totals(&[EntryAmounts::new(dec!(60), dec!(100))]);

    let report =
        ReportService::estimate_vs_actual(subject("Deck"), estimated, Some((subject("Deck"), actual)));

    let billable = report.billable.unwrap();
    assert_eq!(billable.variance, dec!(20));
    assert_eq!(billable.status, VarianceStatus::OverEstimate);
    assert_eq!(report.cost.unwrap().variance, dec!(10));
}

fn usage(date: NaiveDate, hours: Decimal) -> DatedUsage {
    DatedUsage {
        date,
        input: UsageInput::new(hours)
            .unwrap()
            .with_employee(Rates::new(dec!(20), dec!(35)).unwrap())
            .with_material(MaterialUsage::new(dec!(10), Some(dec!(50))).unwrap()),
    }
}

#[test]
fn test_project_analytics_groups_by_day() {
    let usages = [usage(day(3), dec!(2)), usage(day(1), dec!(1)), usage(day(3), dec!(1))];

    let analytics =
        ReportService::project_analytics(&usages, Margin::ZERO, DateRange::default()).unwrap();

    assert_eq!(analytics.daily.len(), 2);
    assert_eq!(analytics.daily[0].date, day(1));
    assert_eq!(analytics.daily[0].cost, dec!(30.00));
    assert_eq!(analytics.daily[0].billable, dec!(50.00));
    assert_eq!(analytics.daily[1].billable, dec!(150.00));
    assert_eq!(analytics.daily[1].profit, dec!(60.00));
    assert_eq!(analytics.breakdown.labor.billable, dec!(140));
    assert_eq!(analytics.breakdown.material.billable, dec!(60));
    assert_eq!(analytics.totals.total_billable, dec!(200.00));
    assert_eq!(analytics.totals.entry_count, 3);
}

#[test]
fn test_project_analytics_date_window() {
    let usages = [usage(day(1), dec!(1)), usage(day(5), dec!(1)), usage(day(9), dec!(1))];
    let range = DateRange {
        from: Some(day(2)),
        to: Some(day(9)),
    };

    let analytics = ReportService::project_analytics(&usages, Margin::ZERO, range).unwrap();

    assert_eq!(analytics.totals.entry_count, 2);
    assert_eq!(analytics.daily[0].date, day(5));
}

#[test]
fn test_project_analytics_rejects_inverted_range() {
    let range = DateRange {
        from: Some(day(9)),
        to: Some(day(2)),
    };

    assert_eq!(
        ReportService::project_analytics(&[], Margin::ZERO, range),
        Err(ReportError::InvalidDateRange {
            start: day(9),
            end: day(2)
        })
    );
}

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// Outstanding is always billable minus the sum of payments.
    #[test]
    fn prop_outstanding_is_billable_minus_payments(
        billable in money(),
        payments in proptest::collection::vec(money(), 0..20),
    ) {
        let paid: Decimal = payments.iter().copied().sum();
        let outstanding = ReportService::outstanding(billable, payments);

        prop_assert_eq!(outstanding + paid, billable);
    }

    /// Totals profit is billable minus cost and margin stays within bounds
    /// when nothing is billed below cost.
    #[test]
    fn prop_totals_are_consistent(
        pairs in proptest::collection::vec((money(), money()), 0..30),
    ) {
        let entries: Vec<EntryAmounts> = pairs
            .iter()
            .map(|(cost, extra)| EntryAmounts::new(*cost, *cost + *extra))
            .collect();

        let totals = ReportService::totals(&entries);

        prop_assert_eq!(totals.total_profit, totals.total_billable - totals.total_cost);
        prop_assert!(totals.margin_pct >= Decimal::ZERO);
        prop_assert!(totals.margin_pct <= Decimal::ONE_HUNDRED);
        prop_assert_eq!(totals.entry_count, entries.len());
    }
}
