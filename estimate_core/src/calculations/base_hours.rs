//! # Base Hours
//!
//! Hours that every project carries in proportion to its size: setup,
//! foundation, framing, pier and beam, roof and concrete details. Under the
//! original rule set retaining walls are priced here as well.
//!
//! ```text
//! base = setup
//!      + foundation_levels × per_level + foundation_squares × per_square
//!      + framing_squares × per_square
//!      + pier_and_beam_squares × per_square          (if present)
//!      + roof_levels × per_level + roof_count × per_roof
//!      + concrete details
//!      + retaining walls                              (original rules)
//! ```
//!
//! ## Pier-and-beam concrete floor
//!
//! Pier footings need at least one concrete detail. The floor is applied at
//! the input boundary ([`ScopeForm::normalize`](crate::form::ScopeForm::normalize)).
//! A snapshot that arrives here below the floor is priced as given; the
//! ledger gets a note and a warning is logged.

use serde::{Deserialize, Serialize};

use super::geometry::{join_plus, GeometryResult};
use crate::format::format_num;
use crate::ledger::{Ledger, LedgerValue};
use crate::rules::{ConcreteScheme, RuleSet};
use crate::scope::{DetailItem, ScopeInput};
use crate::units::Hours;

/// Base hours by term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseHoursResult {
    pub setup: Hours,
    pub foundation: Hours,
    pub framing: Hours,
    /// Zero when pier and beam is absent
    pub pier_and_beam: Hours,
    pub roof: Hours,
    pub concrete: Hours,
    /// Zero when the rule set does not price retaining walls
    pub retaining_walls: Hours,
    pub total: Hours,
}

/// Compute base hours and record one row per contributing term.
pub fn calculate(
    scope: &ScopeInput,
    geometry: &GeometryResult,
    rules: &RuleSet,
    ledger: &mut Ledger,
) -> BaseHoursResult {
    ledger.heading("Step 2: Base Hours");

    let setup = rules.setup_hours;
    ledger.row("Fixed setup", "", LedgerValue::Hours(setup));

    let foundation_sq = geometry.foundation_squares.0;
    let foundation = f64::from(scope.foundation_levels) * rules.foundation_per_level
        + foundation_sq * rules.foundation_per_square;
    ledger.row(
        "Foundation",
        format!(
            "{} lvl × {} + {} sq × {}",
            scope.foundation_levels,
            per_hours(rules.foundation_per_level),
            format_num(foundation_sq),
            per_hours(rules.foundation_per_square)
        ),
        LedgerValue::Hours(foundation),
    );

    let framing_sq = geometry.framing_squares.0;
    let framing = framing_sq * rules.framing_per_square;
    ledger.row(
        "Framing squares",
        format!("{} sq × {}", format_num(framing_sq), per_hours(rules.framing_per_square)),
        LedgerValue::Hours(framing),
    );

    let pier_and_beam = match geometry.pier_and_beam_squares {
        Some(sq) => {
            let hours = sq.0 * rules.pier_and_beam_per_square;
            ledger.row(
                "Pier & beam framing",
                format!("{} sq × {}", format_num(sq.0), per_hours(rules.pier_and_beam_per_square)),
                LedgerValue::Hours(hours),
            );
            hours
        }
        None => 0.0,
    };

    let roof = f64::from(scope.roof_levels) * rules.roof_per_level
        + f64::from(scope.roof_count) * rules.roof_per_count;
    ledger.row(
        "Roof",
        format!(
            "{} lvl × {} + {} count × {}",
            scope.roof_levels,
            per_hours(rules.roof_per_level),
            scope.roof_count,
            per_hours(rules.roof_per_count)
        ),
        LedgerValue::Hours(roof),
    );

    if !rules.meets_pier_and_beam_floor(scope) {
        tracing::warn!(
            rule_set = %rules.id,
            minor = scope.minor_concrete_details,
            major = scope.major_concrete_details,
            "pier and beam present but concrete details are below the pier footing floor"
        );
        ledger.note(format!(
            "Pier and beam is present but fewer than {} concrete detail(s) were entered for pier footings; priced as entered.",
            rules.pier_and_beam_concrete_floor
        ));
    }

    let concrete = concrete_hours(scope, rules, ledger);

    let retaining_walls = match rules.retaining_walls {
        Some(rates) => {
            let walls = &scope.retaining_walls;
            let bands = [
                ("4–6 ft", walls.feet_4_to_6, rates.feet_4_to_6),
                ("6–10 ft", walls.feet_6_to_10, rates.feet_6_to_10),
                ("10–12 ft", walls.feet_10_to_12, rates.feet_10_to_12),
            ];
            let mut parts = Vec::new();
            let mut hours = 0.0;
            for (band, count, rate) in bands {
                if count > 0 {
                    let band_hours = f64::from(count) * rate;
                    parts.push(format!(
                        "{}: {} × {} = {}",
                        band,
                        count,
                        format_num(rate),
                        format_num(band_hours)
                    ));
                    hours += band_hours;
                }
            }
            if let Some(manual) = walls.over_12_hours {
                parts.push(format!("12+ ft: manual {}", format_num(manual)));
                hours += manual;
            }
            let detail = if parts.is_empty() {
                "none".to_string()
            } else {
                parts.join(", ")
            };
            ledger.row("Retaining walls", detail, LedgerValue::Hours(hours));
            hours
        }
        None => {
            if !scope.retaining_walls.is_empty() {
                note_ignored(ledger, rules, "Retaining walls");
            }
            0.0
        }
    };

    let terms = [setup, foundation, framing, pier_and_beam, roof, concrete, retaining_walls];
    let total: f64 = terms.iter().sum();
    let shown: Vec<f64> = match (rules.retaining_walls.is_some(), geometry.pier_and_beam_squares.is_some()) {
        (true, _) => terms.to_vec(),
        (false, true) => terms[..6].to_vec(),
        (false, false) => vec![setup, foundation, framing, roof, concrete],
    };
    ledger.total("Base Hours Total", join_plus(shown), LedgerValue::Hours(total));

    tracing::debug!(total, concrete, framing, "base hours computed");

    BaseHoursResult {
        setup: Hours(setup),
        foundation: Hours(foundation),
        framing: Hours(framing),
        pier_and_beam: Hours(pier_and_beam),
        roof: Hours(roof),
        concrete: Hours(concrete),
        retaining_walls: Hours(retaining_walls),
        total: Hours(total),
    }
}

fn concrete_hours(scope: &ScopeInput, rules: &RuleSet, ledger: &mut Ledger) -> f64 {
    match rules.concrete {
        ConcreteScheme::PerType { hours_per_type } => {
            let types = scope
                .minor_concrete_details
                .saturating_add(scope.major_concrete_details);
            let hours = f64::from(types) * hours_per_type;
            ledger.row(
                "Concrete detail types",
                format!("{} × {}", types, per_hours(hours_per_type)),
                LedgerValue::Hours(hours),
            );
            if !scope.manual_concrete_details.is_empty() {
                note_ignored(ledger, rules, "Manual concrete details");
            }
            hours
        }
        ConcreteScheme::MinorMajor {
            minor_hours,
            major_hours,
        } => {
            let minor = f64::from(scope.minor_concrete_details) * minor_hours;
            ledger.row(
                "Minor concrete details",
                format!("{} × {}", scope.minor_concrete_details, per_hours(minor_hours)),
                LedgerValue::Hours(minor),
            );
            let major = f64::from(scope.major_concrete_details) * major_hours;
            ledger.row(
                "Major concrete details",
                format!("{} × {}", scope.major_concrete_details, per_hours(major_hours)),
                LedgerValue::Hours(major),
            );
            let manual = manual_items_row("Manual concrete details", &scope.manual_concrete_details, ledger);
            minor + major + manual
        }
    }
}

/// Single row summarizing manually estimated items; returns their sum.
pub(crate) fn manual_items_row(label: &str, items: &[DetailItem], ledger: &mut Ledger) -> f64 {
    let hours: f64 = items.iter().map(|item| item.hours).sum();
    let detail = if items.is_empty() {
        "none".to_string()
    } else {
        items
            .iter()
            .map(|item| format!("{}: {}", item.description, format_num(item.hours)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    ledger.row(label, detail, LedgerValue::Hours(hours));
    hours
}

/// Note that an entered input is not priced by the active rule set.
pub(crate) fn note_ignored(ledger: &mut Ledger, rules: &RuleSet, what: &str) {
    tracing::warn!(rule_set = %rules.id, input = what, "input not priced by rule set");
    ledger.note(format!(
        "{} entered but not priced under the {} rule set.",
        what, rules.id
    ));
}

/// `1 hr`, `3 hrs`, `0.75 hrs`
pub(crate) fn per_hours(rate: f64) -> String {
    if rate == 1.0 {
        "1 hr".to_string()
    } else {
        format!("{} hrs", format_num(rate))
    }
}
