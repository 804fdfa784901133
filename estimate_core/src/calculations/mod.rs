//! # Estimate Pipeline
//!
//! Each stage follows the same pattern:
//!
//! - takes the [`ScopeInput`] snapshot and the previous stages' results
//! - appends its work to the [`Ledger`]
//! - returns a `*Result` summary for the next stage (JSON-serializable)
//!
//! Stages run in a fixed order and never read the ledger back:
//!
//! ```text
//! geometry → base_hours → lateral → modifiers → totals → fee
//! ```
//!
//! [`estimate`] is a pure function: the same snapshot and rule set always
//! produce an identical [`EstimateResult`].
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculations::estimate;
//! use estimate_core::rules::REVISED;
//! use estimate_core::scope::{LayerKey, ScopeInput};
//!
//! let mut scope = ScopeInput::new(1);
//! scope.corner_outlines.insert(LayerKey::Level(1), vec![8]);
//! scope.square_footage = 2200.0;
//!
//! let result = estimate(&scope, &REVISED);
//! assert!(result.total_hours_rounded.0 >= result.total_hours_exact.0);
//! println!("Quoted fee: ${:.2}", result.fee_rounded.0);
//! ```

pub mod base_hours;
pub mod fee;
pub mod geometry;
pub mod lateral;
pub mod modifiers;
pub mod totals;

use serde::{Deserialize, Serialize};

use crate::ledger::Ledger;
use crate::rules::{RuleSet, RuleSetId};
use crate::scope::ScopeInput;
use crate::units::{Dollars, DollarsPerHour, Hours};

pub use base_hours::BaseHoursResult;
pub use fee::FeeResult;
pub use geometry::GeometryResult;
pub use lateral::LateralResult;
pub use modifiers::ModifierResult;
pub use totals::TotalsResult;

/// Typed per-stage summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakdown {
    pub geometry: GeometryResult,
    pub base_hours: BaseHoursResult,
    pub lateral: LateralResult,
    pub modifiers: ModifierResult,
    pub totals: TotalsResult,
    pub fee: FeeResult,
}

/// Complete, itemized estimate.
///
/// ## JSON Example
///
/// ```json
/// {
///   "rule_set": "revised",
///   "ledger": [ { "kind": "heading", "text": "Step 1: Convert Corners to Squares" } ],
///   "breakdown": { "...": "..." },
///   "total_hours_exact": 13.0,
///   "total_hours_rounded": 14.0,
///   "fee_exact": 1950.0,
///   "fee_rounded": 2100.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateResult {
    /// Rule table that produced this estimate
    pub rule_set: RuleSetId,

    /// Ordered audit trail
    pub ledger: Ledger,

    /// Stage results
    pub breakdown: Breakdown,

    /// Hours after the liability multiplier, before rounding
    pub total_hours_exact: Hours,

    /// Hours rounded up to the billing increment
    pub total_hours_rounded: Hours,

    /// Exact hours × rate
    pub fee_exact: Dollars,

    /// Rounded hours × rate (the quoted fee)
    pub fee_rounded: Dollars,
}

/// Run the full pipeline against a rule table.
#[tracing::instrument(level = "debug", skip_all, fields(rule_set = %rules.id, stories = scope.stories))]
pub fn estimate(scope: &ScopeInput, rules: &RuleSet) -> EstimateResult {
    let mut ledger = Ledger::new();

    let geometry = geometry::reduce(scope, &mut ledger);
    let base_hours = base_hours::calculate(scope, &geometry, rules, &mut ledger);
    let lateral = lateral::score(scope, rules, &mut ledger);
    let modifiers = modifiers::aggregate(scope, &lateral, rules, &mut ledger);
    let totals = totals::assemble(
        base_hours.total,
        modifiers.total,
        scope.square_footage,
        rules,
        &mut ledger,
    );
    let fee = fee::calculate(&totals, DollarsPerHour(scope.dollar_per_hour), &mut ledger);

    tracing::debug!(
        exact = totals.exact.0,
        rounded = totals.rounded.0,
        fee = fee.rounded.0,
        line_items = ledger.len(),
        "estimate complete"
    );

    EstimateResult {
        rule_set: rules.id,
        total_hours_exact: totals.exact,
        total_hours_rounded: totals.rounded,
        fee_exact: fee.exact,
        fee_rounded: fee.rounded,
        ledger,
        breakdown: Breakdown {
            geometry,
            base_hours,
            lateral,
            modifiers,
            totals,
            fee,
        },
    }
}

/// Run the full pipeline against a built-in rule table.
pub fn estimate_with(scope: &ScopeInput, rule_set: RuleSetId) -> EstimateResult {
    estimate(scope, RuleSet::for_id(rule_set))
}
