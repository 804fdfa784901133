//! # Totals
//!
//! ```text
//! subtotal   = base + modifiers
//! multiplier = max((sqft − 3000) / 10000 + 1, 1)
//! exact      = subtotal × multiplier
//! rounded    = ceil(exact / 2) × 2
//! ```
//!
//! The liability multiplier scales hours for design-risk exposure on larger
//! buildings and never reduces an estimate. Rounding always goes up to the
//! next billing increment.

use serde::{Deserialize, Serialize};

use crate::format::format_num;
use crate::ledger::{Ledger, LedgerValue};
use crate::rules::RuleSet;
use crate::units::Hours;

/// Final hour totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalsResult {
    pub subtotal: Hours,
    pub liability_multiplier: f64,
    pub exact: Hours,
    pub rounded: Hours,
}

/// Round hours up to the next multiple of `increment`.
///
/// ```rust
/// use estimate_core::calculations::totals::round_up_to;
///
/// assert_eq!(round_up_to(9.0, 2.0), 10.0);
/// assert_eq!(round_up_to(10.0, 2.0), 10.0);
/// assert_eq!(round_up_to(10.1, 2.0), 12.0);
/// ```
pub fn round_up_to(hours: f64, increment: f64) -> f64 {
    (hours / increment).ceil() * increment
}

/// Combine base and modifier hours, scale and round.
pub fn assemble(
    base: Hours,
    modifiers: Hours,
    square_footage: f64,
    rules: &RuleSet,
    ledger: &mut Ledger,
) -> TotalsResult {
    ledger.heading("Step 5: Total Estimated Hours");

    let subtotal = base + modifiers;
    ledger.total(
        "Base + Modifiers",
        format!("{} + {}", format_num(base.0), format_num(modifiers.0)),
        LedgerValue::Hours(subtotal.0),
    );

    let liability = &rules.liability;
    let multiplier = liability.multiplier(square_footage);
    ledger.total(
        "Liability multiplier",
        format!(
            "({} − {}) ÷ {} + 1 = {}",
            format_num(square_footage),
            format_num(liability.threshold_sqft),
            format_num(liability.scale_sqft),
            format_num(multiplier)
        ),
        LedgerValue::Multiplier(multiplier),
    );

    let exact = subtotal * multiplier;
    ledger.total(
        "Adjusted total",
        format!("{} × {}", format_num(subtotal.0), format_num(multiplier)),
        LedgerValue::Hours(exact.0),
    );

    let increment = rules.rounding_increment_hours;
    let rounded = Hours(round_up_to(exact.0, increment));
    ledger.total(
        format!("Rounded to nearest {} hrs", format_num(increment)),
        format!(
            "ceil({} / {}) × {}",
            format_num(exact.0),
            format_num(increment),
            format_num(increment)
        ),
        LedgerValue::Hours(rounded.0),
    );

    tracing::debug!(
        subtotal = subtotal.0,
        multiplier,
        exact = exact.0,
        rounded = rounded.0,
        "totals assembled"
    );

    TotalsResult {
        subtotal,
        liability_multiplier: multiplier,
        exact,
        rounded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LineItem;
    use crate::rules::REVISED;

    #[test]
    fn test_small_building() {
        let mut ledger = Ledger::new();
        let totals = assemble(Hours(7.0), Hours(2.0), 0.0, &REVISED, &mut ledger);
        assert_eq!(totals.subtotal, Hours(9.0));
        assert_eq!(totals.liability_multiplier, 1.0);
        assert_eq!(totals.exact, Hours(9.0));
        assert_eq!(totals.rounded, Hours(10.0));
    }

    #[test]
    fn test_large_building_multiplier() {
        let mut ledger = Ledger::new();
        let totals = assemble(Hours(30.0), Hours(10.0), 13000.0, &REVISED, &mut ledger);
        assert_eq!(totals.liability_multiplier, 2.0);
        assert_eq!(totals.exact, Hours(80.0));
        assert_eq!(totals.rounded, Hours(80.0));

        match ledger.find_row("Liability multiplier").unwrap() {
            LineItem::Row { detail, value, .. } => {
                assert_eq!(detail, "(13000 − 3000) ÷ 10000 + 1 = 2");
                assert_eq!(value.to_string(), "×2");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_all_rows_emphasized() {
        let mut ledger = Ledger::new();
        assemble(Hours(1.0), Hours(1.0), 4500.0, &REVISED, &mut ledger);
        let rows: Vec<_> = ledger
            .iter()
            .filter(|item| matches!(item, LineItem::Row { .. }))
            .collect();
        assert_eq!(rows.len(), 4);
        assert!(rows
            .iter()
            .all(|item| matches!(item, LineItem::Row { emphasized: true, .. })));
        assert!(ledger.find_row("Rounded to nearest 2 hrs").is_some());
    }

    #[test]
    fn test_round_up_to() {
        assert_eq!(round_up_to(0.0, 2.0), 0.0);
        assert_eq!(round_up_to(0.5, 2.0), 2.0);
        assert_eq!(round_up_to(11.0, 2.0), 12.0);
        assert_eq!(round_up_to(12.0, 2.0), 12.0);
    }
}
