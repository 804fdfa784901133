//! # Geometry Reduction
//!
//! Converts traced corner counts into squares, the unit-area proxy used by the
//! per-area labor rates.
//!
//! ```text
//! squares = max(corners / 2 − 1, 0)        per outline
//! ```
//!
//! A plain rectangle (4 corners) is one square; each extra pair of corners adds
//! one more. Outlines are summed per layer, framing levels are summed into
//! framing squares and the slab becomes foundation squares.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::calculations::geometry::squares_for_corners;
//!
//! assert_eq!(squares_for_corners(8.0), 3.0);
//! assert_eq!(squares_for_corners(0.0), 0.0);
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::format_num;
use crate::ledger::{Ledger, LedgerValue};
use crate::scope::{LayerKey, ScopeInput};
use crate::units::Squares;

const PIER_AND_BEAM_LABEL: &str = "Pier & Beam Floor Framing";

/// Squares for a single outline, clamped at zero.
pub fn squares_for_corners(corners: f64) -> f64 {
    (corners / 2.0 - 1.0).max(0.0)
}

/// Squares per layer and in aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryResult {
    /// Sum of outline squares for every layer implied by `stories`
    pub layer_squares: BTreeMap<LayerKey, Squares>,

    /// Slab squares
    pub foundation_squares: Squares,

    /// Sum over framing levels
    pub framing_squares: Squares,

    /// Pier-and-beam squares, `None` when pier and beam is absent
    pub pier_and_beam_squares: Option<Squares>,

    /// Foundation + framing + pier and beam
    pub total_squares: Squares,
}

/// Reduce every layer's outlines to squares and record the work.
pub fn reduce(scope: &ScopeInput, ledger: &mut Ledger) -> GeometryResult {
    ledger.heading("Step 1: Convert Corners to Squares");
    ledger.note("Formula per outline: Squares = (Corners ÷ 2) − 1");

    let mut layer_squares = BTreeMap::new();
    for key in scope.layer_keys() {
        let total = reduce_layer(&key.label(), scope.outlines(key), ledger);
        layer_squares.insert(key, total);
    }

    let pier_and_beam_squares = scope
        .pier_and_beam_present
        .then(|| reduce_layer(PIER_AND_BEAM_LABEL, &scope.pier_and_beam_corners, ledger));

    let foundation_squares = layer_squares
        .get(&LayerKey::Slab)
        .copied()
        .unwrap_or_default();
    let framing: Vec<Squares> = layer_squares
        .iter()
        .filter(|(key, _)| key.is_framing())
        .map(|(_, sq)| *sq)
        .collect();
    let framing_squares: Squares = framing.iter().copied().sum();
    let total_squares =
        foundation_squares + framing_squares + pier_and_beam_squares.unwrap_or_default();

    ledger.row(
        "Foundation Squares (slab)",
        "",
        LedgerValue::Squares(foundation_squares.0),
    );
    ledger.row(
        "Framing Squares",
        join_plus(framing.iter().map(|sq| sq.0)),
        LedgerValue::Squares(framing_squares.0),
    );
    if let Some(pb) = pier_and_beam_squares {
        ledger.row("Pier & Beam Squares", "", LedgerValue::Squares(pb.0));
    }
    ledger.row("Roof Count", "", LedgerValue::Count(scope.roof_count));

    let mut total_parts = vec![foundation_squares.0, framing_squares.0];
    total_parts.extend(pier_and_beam_squares.map(|sq| sq.0));
    ledger.total(
        "Total Squares",
        join_plus(total_parts),
        LedgerValue::Squares(total_squares.0),
    );

    tracing::debug!(
        foundation = foundation_squares.0,
        framing = framing_squares.0,
        total = total_squares.0,
        "geometry reduced"
    );

    GeometryResult {
        layer_squares,
        foundation_squares,
        framing_squares,
        pier_and_beam_squares,
        total_squares,
    }
}

/// One row per outline, then a summary row for the layer.
fn reduce_layer(label: &str, outlines: &[u32], ledger: &mut Ledger) -> Squares {
    let mut parts = Vec::with_capacity(outlines.len());
    for (idx, &corners) in outlines.iter().enumerate() {
        let sq = squares_for_corners(f64::from(corners));
        parts.push(sq);
        ledger.row(
            format!("{} · Outline {}", label, idx + 1),
            format!("({} ÷ 2) − 1", corners),
            LedgerValue::Squares(sq),
        );
    }

    let total: f64 = parts.iter().sum();
    let detail = if parts.len() > 1 {
        format!("sum = {}", join_plus(parts.iter().copied()))
    } else {
        String::new()
    };
    ledger.row(label, detail, LedgerValue::Squares(total));
    Squares(total)
}

pub(crate) fn join_plus(values: impl IntoIterator<Item = f64>) -> String {
    values
        .into_iter()
        .map(format_num)
        .collect::<Vec<_>>()
        .join(" + ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LineItem;

    #[test]
    fn test_squares_for_corners() {
        assert_eq!(squares_for_corners(4.0), 1.0);
        assert_eq!(squares_for_corners(6.0), 2.0);
        assert_eq!(squares_for_corners(8.0), 3.0);
        assert_eq!(squares_for_corners(2.0), 0.0);
        assert_eq!(squares_for_corners(0.0), 0.0);
        assert_eq!(squares_for_corners(5.0), 1.5);
    }

    #[test]
    fn test_single_story_rectangles() {
        let scope = ScopeInput::new(1);
        let mut ledger = Ledger::new();
        let geo = reduce(&scope, &mut ledger);

        assert_eq!(geo.foundation_squares, Squares(1.0));
        assert_eq!(geo.framing_squares, Squares(1.0));
        assert_eq!(geo.pier_and_beam_squares, None);
        assert_eq!(geo.total_squares, Squares(2.0));
    }

    #[test]
    fn test_multiple_outlines_and_levels() {
        let mut scope = ScopeInput::new(2);
        scope.corner_outlines.insert(LayerKey::Slab, vec![8, 4]);
        scope.corner_outlines.insert(LayerKey::Level(1), vec![10]);
        scope.corner_outlines.insert(LayerKey::Level(2), vec![6]);

        let mut ledger = Ledger::new();
        let geo = reduce(&scope, &mut ledger);

        assert_eq!(geo.layer_squares[&LayerKey::Slab], Squares(4.0));
        assert_eq!(geo.foundation_squares, Squares(4.0));
        // 4 + 2
        assert_eq!(geo.framing_squares, Squares(6.0));
        assert_eq!(geo.total_squares, Squares(10.0));

        let slab = ledger.find_row("Slab-on-Grade").unwrap();
        match slab {
            LineItem::Row { detail, value, .. } => {
                assert_eq!(detail, "sum = 3 + 1");
                assert_eq!(*value, LedgerValue::Squares(4.0));
            }
            _ => unreachable!(),
        }
        assert_eq!(
            ledger.find_row("Framing Squares").and_then(LineItem::value),
            Some(LedgerValue::Squares(6.0))
        );
    }

    #[test]
    fn test_pier_and_beam_included_only_when_present() {
        let mut scope = ScopeInput::new(1);
        scope.pier_and_beam_corners = vec![8];

        let mut ledger = Ledger::new();
        let geo = reduce(&scope, &mut ledger);
        assert_eq!(geo.pier_and_beam_squares, None);
        assert!(ledger.find_row(PIER_AND_BEAM_LABEL).is_none());

        scope.pier_and_beam_present = true;
        let mut ledger = Ledger::new();
        let geo = reduce(&scope, &mut ledger);
        assert_eq!(geo.pier_and_beam_squares, Some(Squares(3.0)));
        assert_eq!(geo.total_squares, Squares(5.0));
        assert!(ledger.find_row("Pier & Beam Squares").is_some());
    }

    #[test]
    fn test_roof_count_row_precedes_total() {
        let mut scope = ScopeInput::new(1);
        scope.roof_count = 3;
        let mut ledger = Ledger::new();
        reduce(&scope, &mut ledger);

        let labels: Vec<&str> = ledger.iter().filter_map(LineItem::label).collect();
        let roof = labels.iter().position(|l| *l == "Roof Count").unwrap();
        assert_eq!(labels[roof + 1], "Total Squares");
        assert_eq!(
            ledger.find_row("Roof Count").and_then(LineItem::value),
            Some(LedgerValue::Count(3))
        );
    }

    #[test]
    fn test_one_row_per_outline() {
        let mut scope = ScopeInput::new(1);
        scope.corner_outlines.insert(LayerKey::Level(1), vec![4, 6, 8]);
        let mut ledger = Ledger::new();
        reduce(&scope, &mut ledger);

        let outline_rows = ledger
            .iter()
            .filter_map(LineItem::label)
            .filter(|l| l.starts_with("Level 1 Ceiling / Floor Framing · Outline"))
            .count();
        assert_eq!(outline_rows, 3);
    }
}
