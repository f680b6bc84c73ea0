//! Removes repeated `(quantity unit)` annotations.
//!
//! Descriptions built by appending a quantity/unit suffix can end up with the
//! same annotation twice in different numeric spellings, for example
//! `"Item (1 Each) (1.00 Each)"`. Only the first occurrence of each
//! (quantity, unit) pair is kept.

use std::collections::HashSet;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_decimal::Decimal;

static QTY_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\d+(?:\.\d+)?)\s*([^()]+?)\)").expect("quantity pattern is valid")
});

static SPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s{2,}").expect("whitespace pattern is valid"));

#[derive(Debug, Hash, PartialEq, Eq)]
enum Quantity {
    Number(Decimal),
    Text(String),
}

/// Drops duplicate `(quantity unit)` groups, keeping the first of each.
///
/// Quantities compare numerically (`1` equals `1.00`) and units compare
/// case-insensitively. Runs of whitespace left behind collapse to one space
/// and the result is trimmed.
///
/// ```
/// use jobledger_core::text::dedupe_qty;
///
/// assert_eq!(dedupe_qty("Item (1 Each) (1.00 Each)"), "Item (1 Each)");
/// assert_eq!(dedupe_qty("Fill (6.5 Yards) (6.50 Yards)"), "Fill (6.5 Yards)");
/// ```
#[must_use]
pub fn dedupe_qty(value: &str) -> String {
    let mut seen: HashSet<(Quantity, String)> = HashSet::new();

    let stripped = QTY_GROUP.replace_all(value, |caps: &Captures<'_>| {
        let qty = &caps[1];
        let unit = caps[2].trim().to_lowercase();
        let quantity = Decimal::from_str(qty)
            .map(|d| Quantity::Number(d.normalize()))
            .unwrap_or_else(|_| Quantity::Text(qty.to_string()));

        if seen.insert((quantity, unit)) {
            caps[0].to_string()
        } else {
            String::new()
        }
    });

    SPACE_RUN.replace_all(&stripped, " ").trim().to_string()
}
