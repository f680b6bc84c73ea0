//! Tests for estimate rules.

use rstest::rstest;
use rust_decimal_macros::dec;
use uuid::Uuid;

use jobledger_shared::AppError;

use super::error::EstimateError;
use super::service::EstimateService;
use super::types::EstimateStatus;
use crate::reports::{EntryAmounts, ReportLine, ReportService, ReportSubject};

fn estimate_report(customer_name: Option<&str>) -> crate::reports::CustomerReport {
    let subject = ReportSubject {
        id: Uuid::new_v4(),
        name: "Patio".to_string(),
        start_date: None,
        end_date: None,
        customer_name: customer_name.map(str::to_string),
    };
    let lines = [
        ReportLine {
            entry_id: Uuid::new_v4(),
            date: None,
            description: "Pavers (40 sqft) (40 sqft)".to_string(),
            material_description: None,
            material_unit: None,
            asset_name: None,
            employee_name: None,
            hours: dec!(40),
            amounts: EntryAmounts::new(dec!(600), dec!(1200)),
        },
        ReportLine {
            entry_id: Uuid::new_v4(),
            date: None,
            description: "Labor".to_string(),
            material_description: None,
            material_unit: None,
            asset_name: None,
            employee_name: None,
            hours: dec!(6.5),
            amounts: EntryAmounts::new(dec!(130), dec!(227.5)),
        },
    ];
    ReportService::estimate_customer_report(subject, &lines)
}

#[rstest]
#[case(EstimateStatus::Draft, true)]
#[case(EstimateStatus::Sent, true)]
#[case(EstimateStatus::Accepted, false)]
fn test_editability(#[case] status: EstimateStatus, #[case] editable: bool) {
    assert_eq!(status.is_editable(), editable);
    assert_eq!(EstimateService::ensure_editable(status).is_ok(), editable);
}

#[test]
fn test_accept_from_draft_and_sent() {
    assert_eq!(
        EstimateService::accept(EstimateStatus::Draft),
        Ok(EstimateStatus::Accepted)
    );
    assert_eq!(
        EstimateService::accept(EstimateStatus::Sent),
        Ok(EstimateStatus::Accepted)
    );
}

#[test]
fn test_double_accept_is_rejected() {
    let err = EstimateService::accept(EstimateStatus::Accepted).unwrap_err();
    assert_eq!(err, EstimateError::AlreadyAccepted);

    let app: AppError = err.into();
    assert_eq!(app.status_code(), 422);
}

#[test]
fn test_mark_sent() {
    assert_eq!(
        EstimateService::mark_sent(EstimateStatus::Draft),
        Ok(EstimateStatus::Sent)
    );
    assert_eq!(
        EstimateService::mark_sent(EstimateStatus::Sent),
        Ok(EstimateStatus::Sent)
    );
    assert!(matches!(
        EstimateService::mark_sent(EstimateStatus::Accepted),
        Err(EstimateError::InvalidTransition { .. })
    ));
}

#[rstest]
#[case("draft", Some(EstimateStatus::Draft))]
#[case("SENT", Some(EstimateStatus::Sent))]
#[case("accepted", Some(EstimateStatus::Accepted))]
#[case("void", None)]
fn test_status_parse(#[case] raw: &str, #[case] expected: Option<EstimateStatus>) {
    assert_eq!(EstimateStatus::parse(raw), expected);
}

#[test]
fn test_status_round_trips_through_str() {
    for status in [
        EstimateStatus::Draft,
        EstimateStatus::Sent,
        EstimateStatus::Accepted,
    ] {
        assert_eq!(EstimateStatus::parse(status.as_str()), Some(status));
    }
}

#[rstest]
#[case("Kitchen remodel", "Kitchen remodel (Copy)")]
#[case("Deck ", "Deck (Copy)")]
fn test_copy_name(#[case] name: &str, #[case] expected: &str) {
    assert_eq!(EstimateService::copy_name(name), expected);
}

#[test]
fn test_render_email() {
    let report = estimate_report(Some("Dana"));

    let email = EstimateService::render_email(
        &report,
        " dana@example.com ",
        "Valid for 30 days.",
        "Acme Paving",
        "$",
    )
    .unwrap();

    assert_eq!(email.to, "dana@example.com");
    assert_eq!(email.subject, "Estimate: Patio");
    assert!(email.body.starts_with("Hello Dana,"));
    assert!(email.body.contains("- Pavers (40 sqft) (40): $1,200.00"));
    assert!(email.body.contains("- Labor (6.5): $227.50"));
    assert!(email.body.contains("Estimated total: $1,427.50"));
    assert!(email.body.contains("Valid for 30 days."));
    assert!(email.body.ends_with("Acme Paving"));
}

#[test]
fn test_render_email_without_customer_name_or_notes() {
    let report = estimate_report(None);

    let email = EstimateService::render_email(&report, "x@example.com", "  ", "Acme", "$").unwrap();

    assert!(email.body.starts_with("Hello there,"));
    assert!(!email.body.contains("\n\n\n"));
}

#[test]
fn test_render_email_requires_address() {
    let report = estimate_report(Some("Dana"));

    let err = EstimateService::render_email(&report, "   ", "", "Acme", "$").unwrap_err();

    assert_eq!(err, EstimateError::MissingCustomerEmail);
    let app: AppError = err.into();
    assert_eq!(app.status_code(), 400);
}
