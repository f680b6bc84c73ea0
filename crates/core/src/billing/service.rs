//! Billing calculator.

use rust_decimal::Decimal;

use jobledger_shared::types::round_money;

use super::types::{Charge, ChargeBreakdown, Margin, MaterialUsage, Rates, UsageAmounts, UsageInput};

/// Prices usage entries.
pub struct BillingService;

impl BillingService {
    /// Computes the cost and billable amounts of one entry.
    ///
    /// - asset and employee rates are additive, each multiplied by `hours`
    /// - material cost is `unit_cost × hours`; it is billed with the entry's
    ///   service markup when that is positive, otherwise grossed up by the
    ///   contractor margin (`total / (1 - margin/100)`)
    /// - totals are summed unrounded, then rounded to cents half-up
    #[must_use]
    pub fn compute(input: &UsageInput, margin: Margin) -> UsageAmounts {
        let equipment = input
            .asset
            .map(|rates| Self::hourly_charge(rates, input.hours))
            .unwrap_or_default();
        let labor = input
            .employee
            .map(|rates| Self::hourly_charge(rates, input.hours))
            .unwrap_or_default();
        let material = input
            .material
            .map(|usage| Self::material_charge(usage, input.hours, margin))
            .unwrap_or_default();

        let total = equipment + labor + material;

        UsageAmounts {
            cost_amount: round_money(total.cost),
            billable_amount: round_money(total.billable),
            breakdown: ChargeBreakdown {
                equipment: Self::rounded(equipment),
                labor: Self::rounded(labor),
                material: Self::rounded(material),
            },
        }
    }

    /// Cost/billable for `hours` at the given hourly rates, unrounded.
    #[must_use]
    pub fn hourly_charge(rates: Rates, hours: Decimal) -> Charge {
        Charge {
            cost: rates.cost_rate * hours,
            billable: rates.billable_rate * hours,
        }
    }

    /// Cost/billable for `quantity` units of material, unrounded.
    #[must_use]
    pub fn material_charge(usage: MaterialUsage, quantity: Decimal, margin: Margin) -> Charge {
        let cost = usage.unit_cost * quantity;
        let billable = match usage.effective_markup() {
            Some(markup) => cost * (Decimal::ONE + markup / Decimal::ONE_HUNDRED),
            None => cost / margin.divisor(),
        };
        Charge { cost, billable }
    }

    fn rounded(charge: Charge) -> Charge {
        Charge {
            cost: round_money(charge.cost),
            billable: round_money(charge.billable),
        }
    }
}
