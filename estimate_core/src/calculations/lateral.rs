//! # Lateral Complexity
//!
//! Scores problematic brace lines: wall lines meant to resist wind/seismic
//! load that are so interrupted by openings that a standard braced panel is
//! hard to fit.
//!
//! ```text
//! weighted = Σ count[level] × weight[level]     for level 1..=stories
//! lateral  = per_story × stories + per_line × weighted
//! ```
//!
//! Weights rise with height (1.0, 1.5, 2.0, 2.5): a deficiency on an upper
//! level carries load down through every level beneath it.

use serde::{Deserialize, Serialize};

use super::geometry::join_plus;
use crate::format::format_num;
use crate::ledger::{Ledger, LedgerValue};
use crate::rules::RuleSet;
use crate::scope::ScopeInput;
use crate::units::Hours;

/// Lateral score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LateralResult {
    /// Per-story base hours
    pub base: Hours,
    /// Σ count × weight over active levels
    pub weighted_sum: f64,
    /// Base plus weighted brace-line hours
    pub total: Hours,
}

/// Score lateral complexity.
pub fn score(scope: &ScopeInput, rules: &RuleSet, ledger: &mut Ledger) -> LateralResult {
    let lat = &rules.lateral;
    ledger.heading("Step 3: Lateral Hours");
    ledger.note(format!(
        "{} hrs per level base + weighted problematic brace lines × {} hrs",
        format_num(lat.hours_per_story),
        format_num(lat.hours_per_weighted_line)
    ));

    let base = f64::from(scope.stories) * lat.hours_per_story;
    ledger.row(
        "Lateral base",
        format!(
            "{} level{} × {} hrs",
            scope.stories,
            if scope.stories > 1 { "s" } else { "" },
            format_num(lat.hours_per_story)
        ),
        LedgerValue::Hours(base),
    );

    let mut weighted = Vec::with_capacity(usize::from(scope.stories));
    for level in 1..=scope.stories {
        let count = scope.brace_lines(level);
        let weight = lat.weight(level);
        let value = f64::from(count) * weight;
        ledger.row(
            format!("Level {}", level),
            format!("L{}: {} × {:.1} = {}", level, count, weight, format_num(value)),
            LedgerValue::Number(value),
        );
        weighted.push(value);
    }

    let weighted_sum: f64 = weighted.iter().sum();
    ledger.row("Weighted sum", join_plus(weighted), LedgerValue::Number(weighted_sum));

    let total = base + lat.hours_per_weighted_line * weighted_sum;
    ledger.total(
        "Lateral Hours",
        format!(
            "{} + {} × {}",
            format_num(base),
            format_num(lat.hours_per_weighted_line),
            format_num(weighted_sum)
        ),
        LedgerValue::Hours(total),
    );

    tracing::debug!(stories = scope.stories, weighted_sum, total, "lateral scored");

    LateralResult {
        base: Hours(base),
        weighted_sum,
        total: Hours(total),
    }
}
