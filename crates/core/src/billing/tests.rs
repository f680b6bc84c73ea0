//! Tests for the billing calculator.

use proptest::prelude::*;
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::BillingError;
use super::service::BillingService;
use super::types::{
    MAX_AMOUNT, MAX_HOURS, MAX_MARKUP, Margin, MaterialUsage, RateSource, Rates, UsageInput,
};

fn rates(cost: Decimal, billable: Decimal) -> Rates {
    Rates::new(cost, billable).unwrap()
}

#[test]
fn test_asset_employee_and_material_with_margin() {
    let input = UsageInput::new(dec!(5))
        .unwrap()
        .with_asset(rates(dec!(10), dec!(15)))
        .with_employee(rates(dec!(20), dec!(30)))
        .with_material(MaterialUsage::new(dec!(50), None).unwrap());

    let amounts = BillingService::compute(&input, Margin::new(dec!(25)).unwrap());

    assert_eq!(amounts.cost_amount, dec!(400.00));
    assert_eq!(amounts.billable_amount, dec!(558.33));
    assert_eq!(amounts.breakdown.equipment.billable, dec!(75));
    assert_eq!(amounts.breakdown.labor.billable, dec!(150));
    assert_eq!(amounts.breakdown.material.cost, dec!(250));
    assert_eq!(amounts.breakdown.material.billable, dec!(333.33));
}

#[test]
fn test_asset_only() {
    let input = UsageInput::new(dec!(2))
        .unwrap()
        .with_asset(rates(dec!(10), dec!(20)));

    let amounts = BillingService::compute(&input, Margin::ZERO);

    assert_eq!(amounts.cost_amount, dec!(20.00));
    assert_eq!(amounts.billable_amount, dec!(40.00));
}

#[test]
fn test_no_sources_is_zero() {
    let input = UsageInput::new(dec!(8)).unwrap();
    let amounts = BillingService::compute(&input, Margin::new(dec!(30)).unwrap());

    assert_eq!(amounts.cost_amount, Decimal::ZERO);
    assert_eq!(amounts.billable_amount, Decimal::ZERO);
}

#[rstest]
#[case::markup_overrides_margin(Some(dec!(20)), dec!(25), dec!(120.00))]
#[case::zero_markup_falls_back_to_margin(Some(dec!(0)), dec!(20), dec!(125.00))]
#[case::no_markup_uses_margin(None, dec!(50), dec!(200.00))]
#[case::no_markup_no_margin_bills_at_cost(None, dec!(0), dec!(100.00))]
fn test_material_billing(
    #[case] markup: Option<Decimal>,
    #[case] margin: Decimal,
    #[case] expected_billable: Decimal,
) {
    let input = UsageInput::new(dec!(4))
        .unwrap()
        .with_material(MaterialUsage::new(dec!(25), markup).unwrap());

    let amounts = BillingService::compute(&input, Margin::new(margin).unwrap());

    assert_eq!(amounts.cost_amount, dec!(100.00));
    assert_eq!(amounts.billable_amount, expected_billable);
}

#[test]
fn test_rounding_is_half_up_after_summation() {
    // 0.125 + 0.125 = 0.25 exactly; rounding parts first would give 0.26.
    let input = UsageInput::new(dec!(0.5))
        .unwrap()
        .with_asset(rates(dec!(0.25), dec!(0.25)))
        .with_employee(rates(dec!(0.25), dec!(0.25)));

    let amounts = BillingService::compute(&input, Margin::ZERO);

    assert_eq!(amounts.billable_amount, dec!(0.25));

    // 0.5 * 0.01 = 0.005 and 0.5 * 0.03 = 0.015 both round away from zero.
    let input = UsageInput::new(dec!(0.5))
        .unwrap()
        .with_asset(rates(dec!(0.01), dec!(0.03)));
    let amounts = BillingService::compute(&input, Margin::ZERO);

    assert_eq!(amounts.cost_amount, dec!(0.01));
    assert_eq!(amounts.billable_amount, dec!(0.02));
}

#[rstest]
#[case(dec!(100))]
#[case(dec!(150))]
#[case(dec!(-1))]
fn test_margin_out_of_range_is_rejected(#[case] percent: Decimal) {
    assert_eq!(
        Margin::new(percent),
        Err(BillingError::MarginOutOfRange(percent))
    );
}

#[test]
fn test_margin_just_below_hundred_computes() {
    let margin = Margin::new(dec!(99.99)).unwrap();
    let input = UsageInput::new(dec!(1))
        .unwrap()
        .with_material(MaterialUsage::new(dec!(1), None).unwrap());

    let amounts = BillingService::compute(&input, margin);

    assert_eq!(amounts.billable_amount, dec!(10000.00));
}

#[test]
fn test_margin_deserialization_validates() {
    let ok: Margin = serde_json::from_str("\"25\"").unwrap();
    assert_eq!(ok.percent(), dec!(25));
    assert!(serde_json::from_str::<Margin>("\"100\"").is_err());
}

#[test]
fn test_negative_inputs_are_rejected() {
    assert_eq!(
        UsageInput::new(dec!(-1)),
        Err(BillingError::NegativeHours(dec!(-1)))
    );
    assert!(matches!(
        Rates::new(dec!(-5), dec!(10)),
        Err(BillingError::NegativeRate {
            field: "cost_rate",
            ..
        })
    ));
    assert!(matches!(
        MaterialUsage::new(dec!(10), Some(dec!(-3))),
        Err(BillingError::NegativeMarkup(_))
    ));
}

#[test]
fn test_values_beyond_column_bounds_are_rejected() {
    assert!(matches!(
        UsageInput::new(Decimal::MAX),
        Err(BillingError::TooLarge { field: "hours", .. })
    ));
    assert!(matches!(
        Rates::new(dec!(1), MAX_AMOUNT + dec!(0.01)),
        Err(BillingError::TooLarge {
            field: "billable_rate",
            ..
        })
    ));
    assert!(matches!(
        MaterialUsage::new(Decimal::MAX, None),
        Err(BillingError::TooLarge {
            field: "material_cost",
            ..
        })
    ));
    assert!(matches!(
        MaterialUsage::new(dec!(1), Some(dec!(1000))),
        Err(BillingError::TooLarge {
            field: "service_markup",
            ..
        })
    ));
}

#[rstest]
#[case(dec!(1.005))]
#[case(dec!(0.001))]
fn test_hours_with_extra_decimal_places_are_rejected(#[case] hours: Decimal) {
    assert_eq!(
        UsageInput::new(hours),
        Err(BillingError::TooPrecise {
            field: "hours",
            value: hours
        })
    );
}

#[test]
fn test_extra_decimal_places_are_rejected_for_rates_and_materials() {
    assert!(matches!(
        Rates::new(dec!(0.005), dec!(1)),
        Err(BillingError::TooPrecise {
            field: "cost_rate",
            ..
        })
    ));
    assert!(matches!(
        MaterialUsage::new(dec!(2.499), None),
        Err(BillingError::TooPrecise {
            field: "material_cost",
            ..
        })
    ));
    // Trailing zeros are not extra precision.
    assert!(UsageInput::new(dec!(1.5000)).is_ok());
}

#[test]
fn test_largest_storable_inputs_do_not_overflow() {
    let max_rates = rates(MAX_AMOUNT, MAX_AMOUNT);
    let input = UsageInput::new(MAX_HOURS)
        .unwrap()
        .with_asset(max_rates)
        .with_employee(max_rates)
        .with_material(MaterialUsage::new(MAX_AMOUNT, None).unwrap());

    let amounts = BillingService::compute(&input, Margin::new(dec!(99.99)).unwrap());
    assert!(amounts.billable_amount > amounts.cost_amount);

    let marked_up = UsageInput::new(MAX_HOURS)
        .unwrap()
        .with_material(MaterialUsage::new(MAX_AMOUNT, Some(MAX_MARKUP)).unwrap());
    let amounts = BillingService::compute(&marked_up, Margin::ZERO);
    assert!(amounts.billable_amount > amounts.cost_amount);
}

#[rstest]
#[case(dec!(2.25))]
#[case(dec!(7))]
#[case(dec!(0.10))]
fn test_accepted_inputs_survive_storage_unchanged(#[case] value: Decimal) {
    // Stored columns keep two decimal places; repricing a stored entry must see
    // exactly the values it was priced from.
    let input = UsageInput::new(value)
        .unwrap()
        .with_asset(rates(value, value))
        .with_material(MaterialUsage::new(value, Some(value)).unwrap());
    let stored = UsageInput::new(value.round_dp(2))
        .unwrap()
        .with_asset(rates(value.round_dp(2), value.round_dp(2)))
        .with_material(MaterialUsage::new(value.round_dp(2), Some(value.round_dp(2))).unwrap());

    assert_eq!(
        BillingService::compute(&input, Margin::ZERO),
        BillingService::compute(&stored, Margin::ZERO)
    );
}

#[test]
fn test_deserialization_runs_validation() {
    let ok: UsageInput = serde_json::from_str(
        r#"{"hours":"2","asset":{"cost_rate":"10","billable_rate":"15"}}"#,
    )
    .unwrap();
    assert_eq!(ok.hours, dec!(2));
    assert_eq!(ok.asset, Some(rates(dec!(10), dec!(15))));

    assert!(serde_json::from_str::<UsageInput>(r#"{"hours":"-1"}"#).is_err());
    assert!(serde_json::from_str::<UsageInput>(r#"{"hours":"1.005"}"#).is_err());
    assert!(
        serde_json::from_str::<Rates>(r#"{"cost_rate":"-5","billable_rate":"10"}"#).is_err()
    );
    assert!(
        serde_json::from_str::<MaterialUsage>(r#"{"unit_cost":"1","service_markup":"-3"}"#)
            .is_err()
    );
}

#[test]
fn test_rate_sources_are_labelled() {
    let input = UsageInput::new(dec!(1))
        .unwrap()
        .with_asset(rates(dec!(1), dec!(2)))
        .with_employee(rates(dec!(3), dec!(4)));

    let sources: Vec<RateSource> = input.rate_sources().collect();

    assert_eq!(
        sources,
        vec![
            RateSource::Asset(rates(dec!(1), dec!(2))),
            RateSource::Employee(rates(dec!(3), dec!(4))),
        ]
    );
    assert_eq!(sources[1].rates().billable_rate, dec!(4));
}

fn money() -> impl Strategy<Value = Decimal> {
    (0i64..100_000).prop_map(|cents| Decimal::new(cents, 2))
}

proptest! {
    /// Recomputing an entry gives identical amounts.
    #[test]
    fn prop_compute_is_idempotent(
        hours in money(),
        asset_cost in money(),
        asset_bill in money(),
        unit_cost in money(),
        margin_bp in 0i64..9_999,
    ) {
        let input = UsageInput::new(hours)
            .unwrap()
            .with_asset(rates(asset_cost, asset_bill))
            .with_material(MaterialUsage::new(unit_cost, None).unwrap());
        let margin = Margin::new(Decimal::new(margin_bp, 2)).unwrap();

        let first = BillingService::compute(&input, margin);
        let second = BillingService::compute(&input, margin);

        prop_assert_eq!(first, second);
        prop_assert!(first.cost_amount.scale() <= 2);
        prop_assert!(first.billable_amount.scale() <= 2);
    }

    /// With margin applied, material is never billed below cost.
    #[test]
    fn prop_margin_never_bills_material_below_cost(
        quantity in money(),
        unit_cost in money(),
        margin_bp in 0i64..9_999,
    ) {
        let input = UsageInput::new(quantity)
            .unwrap()
            .with_material(MaterialUsage::new(unit_cost, None).unwrap());
        let margin = Margin::new(Decimal::new(margin_bp, 2)).unwrap();

        let amounts = BillingService::compute(&input, margin);

        prop_assert!(amounts.billable_amount >= amounts.cost_amount);
    }

    /// Hourly sources are additive.
    #[test]
    fn prop_asset_and_employee_add_up(
        hours in money(),
        a in money(),
        b in money(),
    ) {
        let both = UsageInput::new(hours)
            .unwrap()
            .with_asset(rates(a, a))
            .with_employee(rates(b, b));
        let only_asset = UsageInput::new(hours).unwrap().with_asset(rates(a, a));
        let only_employee = UsageInput::new(hours).unwrap().with_employee(rates(b, b));

        let total = BillingService::compute(&both, Margin::ZERO);
        let parts = BillingService::compute(&only_asset, Margin::ZERO).breakdown.equipment
            + BillingService::compute(&only_employee, Margin::ZERO).breakdown.labor;

        prop_assert_eq!(total.breakdown.equipment + total.breakdown.labor, parts);
    }
}
