//! # Modifier Hours
//!
//! Secondary complexity modifiers found by reviewing plans, sections and
//! elevations, plus the lateral score from the previous stage.
//!
//! Every term is listed in the ledger even when it is zero, so a reviewer can
//! see that the condition was considered.

use serde::{Deserialize, Serialize};

use super::base_hours::{manual_items_row, note_ignored, per_hours};
use super::geometry::join_plus;
use super::lateral::LateralResult;
use crate::format::format_num;
use crate::ledger::{Ledger, LedgerValue};
use crate::rules::RuleSet;
use crate::scope::ScopeInput;
use crate::units::Hours;

/// Modifier hours by term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifierResult {
    pub discontinuities: Hours,
    pub moderate_spans: Hours,
    pub long_spans: Hours,
    pub vault_zones: Hours,
    pub plate_height_sets: Hours,
    pub voids_penetrations: Hours,
    pub cantilever_areas: Hours,
    /// Zero unless the rule set prices step runs
    pub foundation_step_runs: Hours,
    /// Zero unless the rule set prices pools
    pub pool: Hours,
    /// Zero unless the rule set prices specialty items
    pub specialty_details: Hours,
    /// Carried from the lateral stage
    pub lateral: Hours,
    pub total: Hours,
}

/// Sum every modifier term and fold in the lateral score.
pub fn aggregate(
    scope: &ScopeInput,
    lateral: &LateralResult,
    rules: &RuleSet,
    ledger: &mut Ledger,
) -> ModifierResult {
    ledger.heading("Step 4: Modifier Hours");

    let discontinuities = counted(
        ledger,
        "Discontinuities",
        scope.discontinuities,
        rules.discontinuity_hours,
    );
    let moderate_spans = counted(
        ledger,
        &rules.moderate_span.label(),
        scope.moderate_span_count,
        rules.moderate_span.hours,
    );
    let long_spans = counted(
        ledger,
        &rules.long_span.label(),
        scope.long_span_count,
        rules.long_span.hours,
    );
    let vault_zones = counted(ledger, "Vault zones", scope.vault_zones, rules.vault_zone_hours);

    let plate_extra = scope.plate_height_sets.saturating_sub(1);
    let plate_height_sets = f64::from(plate_extra) * rules.plate_height_set_hours;
    ledger.row(
        "Plate-height sets",
        format!(
            "({} − 1) × {} = {} × {}",
            scope.plate_height_sets,
            per_hours(rules.plate_height_set_hours),
            plate_extra,
            format_num(rules.plate_height_set_hours)
        ),
        LedgerValue::Hours(plate_height_sets),
    );

    let voids_penetrations = counted(
        ledger,
        "Voids / penetrations",
        scope.voids_penetrations,
        rules.void_penetration_hours,
    );
    let cantilever_areas = counted(
        ledger,
        "Cantilever areas",
        scope.cantilever_areas,
        rules.cantilever_area_hours,
    );

    let foundation_step_runs = match rules.foundation_step_run_hours {
        Some(rate) => counted(ledger, "Foundation step runs", scope.foundation_step_runs, rate),
        None => {
            if scope.foundation_step_runs > 0 {
                note_ignored(ledger, rules, "Foundation step runs");
            }
            0.0
        }
    };

    let pool = if rules.prices_pool {
        let hours = scope.pool_hours.unwrap_or(0.0);
        let detail = match scope.pool_hours {
            Some(h) => format!("manual: {} hrs", format_num(h)),
            None => "no".to_string(),
        };
        ledger.row("Pool", detail, LedgerValue::Hours(hours));
        hours
    } else {
        if scope.pool_hours.is_some() {
            note_ignored(ledger, rules, "Pool");
        }
        0.0
    };

    let specialty_details = if rules.prices_specialty_details {
        manual_items_row("Specialty details", &scope.specialty_details, ledger)
    } else {
        if !scope.specialty_details.is_empty() {
            note_ignored(ledger, rules, "Specialty details");
        }
        0.0
    };

    let lateral_hours = lateral.total.0;
    ledger.row("Lateral (from Step 3)", "", LedgerValue::Hours(lateral_hours));

    let mut terms = vec![
        discontinuities,
        moderate_spans,
        long_spans,
        vault_zones,
        plate_height_sets,
        voids_penetrations,
        cantilever_areas,
    ];
    if rules.foundation_step_run_hours.is_some() {
        terms.push(foundation_step_runs);
    }
    if rules.prices_pool {
        terms.push(pool);
    }
    if rules.prices_specialty_details {
        terms.push(specialty_details);
    }
    terms.push(lateral_hours);

    let total: f64 = terms.iter().sum();
    ledger.total("Modifier Hours Total", join_plus(terms), LedgerValue::Hours(total));

    tracing::debug!(total, lateral = lateral_hours, "modifiers aggregated");

    ModifierResult {
        discontinuities: Hours(discontinuities),
        moderate_spans: Hours(moderate_spans),
        long_spans: Hours(long_spans),
        vault_zones: Hours(vault_zones),
        plate_height_sets: Hours(plate_height_sets),
        voids_penetrations: Hours(voids_penetrations),
        cantilever_areas: Hours(cantilever_areas),
        foundation_step_runs: Hours(foundation_step_runs),
        pool: Hours(pool),
        specialty_details: Hours(specialty_details),
        lateral: lateral.total,
        total: Hours(total),
    }
}

/// `count × rate` row
fn counted(ledger: &mut Ledger, label: &str, count: u32, rate: f64) -> f64 {
    let hours = f64::from(count) * rate;
    ledger.row(
        label,
        format!("{} × {}", count, per_hours(rate)),
        LedgerValue::Hours(hours),
    );
    hours
}
