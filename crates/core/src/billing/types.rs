//! Billing data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use jobledger_shared::types::money::MONEY_SCALE;

use super::error::BillingError;

/// Largest storable hours or quantity (`NUMERIC(10, 2)`).
pub const MAX_HOURS: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2); // 99999999.99

/// Largest storable rate, cost or amount (`NUMERIC(12, 2)`).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2); // 9999999999.99

/// Largest storable service markup percentage (`NUMERIC(5, 2)`).
pub const MAX_MARKUP: Decimal = Decimal::from_parts(99_999, 0, 0, false, 2); // 999.99

/// Checks that `value` fits its column: at most `max` and at most two
/// decimal places. Sign is checked by the callers.
fn check_bounds(field: &'static str, value: Decimal, max: Decimal) -> Result<(), BillingError> {
    if value > max {
        return Err(BillingError::TooLarge { field, value, max });
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(BillingError::TooPrecise { field, value });
    }
    Ok(())
}

/// Hourly cost and billable rates of an asset or employee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRates")]
pub struct Rates {
    /// Contractor's cost per hour.
    pub cost_rate: Decimal,
    /// Price charged to the customer per hour.
    pub billable_rate: Decimal,
}

impl Rates {
    /// Creates validated rates.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NegativeRate` if either rate is negative, or a
    /// bounds error if a rate does not fit its column.
    pub fn new(cost_rate: Decimal, billable_rate: Decimal) -> Result<Self, BillingError> {
        if cost_rate.is_sign_negative() && !cost_rate.is_zero() {
            return Err(BillingError::NegativeRate {
                field: "cost_rate",
                value: cost_rate,
            });
        }
        if billable_rate.is_sign_negative() && !billable_rate.is_zero() {
            return Err(BillingError::NegativeRate {
                field: "billable_rate",
                value: billable_rate,
            });
        }
        check_bounds("cost_rate", cost_rate, MAX_AMOUNT)?;
        check_bounds("billable_rate", billable_rate, MAX_AMOUNT)?;
        Ok(Self {
            cost_rate,
            billable_rate,
        })
    }
}

#[derive(Deserialize)]
struct RawRates {
    cost_rate: Decimal,
    billable_rate: Decimal,
}

impl TryFrom<RawRates> for Rates {
    type Error = BillingError;

    fn try_from(raw: RawRates) -> Result<Self, Self::Error> {
        Self::new(raw.cost_rate, raw.billable_rate)
    }
}

/// Where an hourly rate comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "rates", rename_all = "snake_case")]
pub enum RateSource {
    /// Equipment such as an excavator.
    Asset(Rates),
    /// A member of the crew.
    Employee(Rates),
}

impl RateSource {
    /// Returns the rates regardless of the source kind.
    #[must_use]
    pub const fn rates(&self) -> Rates {
        match self {
            Self::Asset(rates) | Self::Employee(rates) => *rates,
        }
    }
}

/// Material consumed by an entry, priced per unit of `hours`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawMaterialUsage")]
pub struct MaterialUsage {
    /// Contractor's cost per unit.
    pub unit_cost: Decimal,
    /// Per-entry markup percentage; used instead of the contractor margin when > 0.
    pub service_markup: Option<Decimal>,
}

impl MaterialUsage {
    /// Creates a validated material usage.
    ///
    /// # Errors
    ///
    /// Returns an error if the unit cost or markup is negative or does not fit
    /// its column.
    pub fn new(unit_cost: Decimal, service_markup: Option<Decimal>) -> Result<Self, BillingError> {
        if unit_cost.is_sign_negative() && !unit_cost.is_zero() {
            return Err(BillingError::NegativeRate {
                field: "material_cost",
                value: unit_cost,
            });
        }
        if let Some(markup) = service_markup {
            if markup.is_sign_negative() && !markup.is_zero() {
                return Err(BillingError::NegativeMarkup(markup));
            }
            check_bounds("service_markup", markup, MAX_MARKUP)?;
        }
        check_bounds("material_cost", unit_cost, MAX_AMOUNT)?;
        Ok(Self {
            unit_cost,
            service_markup,
        })
    }

    /// The markup that applies, if any. A zero markup counts as unset.
    #[must_use]
    pub fn effective_markup(&self) -> Option<Decimal> {
        self.service_markup.filter(|m| *m > Decimal::ZERO)
    }
}

#[derive(Deserialize)]
struct RawMaterialUsage {
    unit_cost: Decimal,
    service_markup: Option<Decimal>,
}

impl TryFrom<RawMaterialUsage> for MaterialUsage {
    type Error = BillingError;

    fn try_from(raw: RawMaterialUsage) -> Result<Self, Self::Error> {
        Self::new(raw.unit_cost, raw.service_markup)
    }
}

/// Contractor material margin: the share of the billable price that is profit.
///
/// Always satisfies `0 <= margin < 100`, so `1 - margin / 100` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Margin(Decimal);

impl Margin {
    /// No margin: materials are billed at cost.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Creates a validated margin percentage.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::MarginOutOfRange` unless `0 <= percent < 100`.
    pub fn new(percent: Decimal) -> Result<Self, BillingError> {
        if percent < Decimal::ZERO || percent >= Decimal::ONE_HUNDRED {
            return Err(BillingError::MarginOutOfRange(percent));
        }
        Ok(Self(percent))
    }

    /// The margin as a percentage.
    #[must_use]
    pub const fn percent(self) -> Decimal {
        self.0
    }

    /// `1 - margin / 100`, strictly positive.
    #[must_use]
    pub fn divisor(self) -> Decimal {
        Decimal::ONE - self.0 / Decimal::ONE_HUNDRED
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self::ZERO
    }
}

impl<'de> Deserialize<'de> for Margin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let percent = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::new(percent).map_err(serde::de::Error::custom)
    }
}

/// Everything needed to price one usage entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUsageInput")]
pub struct UsageInput {
    /// Hours worked, or units of material consumed.
    pub hours: Decimal,
    /// Equipment rates, if an asset was used.
    pub asset: Option<Rates>,
    /// Labor rates, if an employee worked.
    pub employee: Option<Rates>,
    /// Material consumed, if any.
    pub material: Option<MaterialUsage>,
}

impl UsageInput {
    /// Starts an input with the given hours and no rate sources.
    ///
    /// # Errors
    ///
    /// Returns `BillingError::NegativeHours` if `hours` is negative, or a
    /// bounds error if it does not fit its column.
    pub fn new(hours: Decimal) -> Result<Self, BillingError> {
        if hours.is_sign_negative() && !hours.is_zero() {
            return Err(BillingError::NegativeHours(hours));
        }
        check_bounds("hours", hours, MAX_HOURS)?;
        Ok(Self {
            hours,
            asset: None,
            employee: None,
            material: None,
        })
    }

    /// Attaches asset rates.
    #[must_use]
    pub const fn with_asset(mut self, rates: Rates) -> Self {
        self.asset = Some(rates);
        self
    }

    /// Attaches employee rates.
    #[must_use]
    pub const fn with_employee(mut self, rates: Rates) -> Self {
        self.employee = Some(rates);
        self
    }

    /// Attaches material usage.
    #[must_use]
    pub const fn with_material(mut self, material: MaterialUsage) -> Self {
        self.material = Some(material);
        self
    }

    /// The hourly rate sources in pricing order (asset, then employee).
    pub fn rate_sources(&self) -> impl Iterator<Item = RateSource> + '_ {
        self.asset
            .map(RateSource::Asset)
            .into_iter()
            .chain(self.employee.map(RateSource::Employee))
    }
}

#[derive(Deserialize)]
struct RawUsageInput {
    hours: Decimal,
    asset: Option<Rates>,
    employee: Option<Rates>,
    material: Option<MaterialUsage>,
}

impl TryFrom<RawUsageInput> for UsageInput {
    type Error = BillingError;

    fn try_from(raw: RawUsageInput) -> Result<Self, Self::Error> {
        Ok(Self {
            asset: raw.asset,
            employee: raw.employee,
            material: raw.material,
            ..Self::new(raw.hours)?
        })
    }
}

/// A cost/billable pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Charge {
    /// Contractor's cost.
    pub cost: Decimal,
    /// Amount billed to the customer.
    pub billable: Decimal,
}

impl Charge {
    /// Profit on this charge.
    #[must_use]
    pub fn profit(&self) -> Decimal {
        self.billable - self.cost
    }
}

impl std::ops::Add for Charge {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            cost: self.cost + rhs.cost,
            billable: self.billable + rhs.billable,
        }
    }
}

impl std::ops::AddAssign for Charge {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Charges split by what was used, each rounded to cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChargeBreakdown {
    /// Asset (equipment) charges.
    pub equipment: Charge,
    /// Employee (labor) charges.
    pub labor: Charge,
    /// Material charges.
    pub material: Charge,
}

impl std::ops::AddAssign for ChargeBreakdown {
    fn add_assign(&mut self, rhs: Self) {
        self.equipment += rhs.equipment;
        self.labor += rhs.labor;
        self.material += rhs.material;
    }
}

/// Derived amounts stored on a usage entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageAmounts {
    /// Rounded total cost.
    pub cost_amount: Decimal,
    /// Rounded total billable amount.
    pub billable_amount: Decimal,
    /// Per-component detail.
    pub breakdown: ChargeBreakdown,
}
