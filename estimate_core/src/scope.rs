//! # Scope Input
//!
//! [`ScopeInput`] is the immutable snapshot the estimation pipeline consumes:
//! building geometry as corner counts per layer, plus the counts and manual
//! hour items that drive complexity modifiers.
//!
//! A snapshot is normally produced by [`ScopeForm::normalize`](crate::form::ScopeForm::normalize),
//! which applies fallbacks and clamps. Library callers that build one by hand
//! can check it with [`ScopeInput::validate`].
//!
//! ## Layers
//!
//! ```text
//! slab     Slab-on-grade (foundation squares)
//! level1   Level 1 ceiling / floor framing
//! ...
//! levelN   Level N ceiling / floor framing, N = stories
//! ```
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "stories": 1,
//!   "square_footage": 2400.0,
//!   "corner_outlines": { "slab": [8], "level1": [8, 4] },
//!   "roof_count": 2,
//!   "dollar_per_hour": 150.0
//! }
//! ```
//!
//! Omitted fields take the same defaults as [`ScopeInput::new`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Highest supported story count
pub const MAX_STORIES: u8 = 4;

/// Corner count of a fresh outline (a plain rectangle)
pub const DEFAULT_CORNERS: u32 = 4;

/// Default billing rate in dollars per hour
pub const DEFAULT_DOLLAR_PER_HOUR: f64 = 150.0;

/// A structural plane whose outlines are traced for corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LayerKey {
    /// Slab-on-grade
    Slab,
    /// Ceiling / floor framing of a level (1-based)
    Level(u8),
}

impl LayerKey {
    /// Layers implied by a story count: slab, then level 1 through `stories`
    pub fn for_stories(stories: u8) -> Vec<LayerKey> {
        std::iter::once(LayerKey::Slab)
            .chain((1..=stories).map(LayerKey::Level))
            .collect()
    }

    /// True for framing levels (everything but the slab)
    pub fn is_framing(&self) -> bool {
        matches!(self, LayerKey::Level(_))
    }

    /// Human-readable layer name used in the ledger
    pub fn label(&self) -> String {
        match self {
            LayerKey::Slab => "Slab-on-Grade".to_string(),
            LayerKey::Level(n) => format!("Level {} Ceiling / Floor Framing", n),
        }
    }
}

impl fmt::Display for LayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayerKey::Slab => f.write_str("slab"),
            LayerKey::Level(n) => write!(f, "level{}", n),
        }
    }
}

impl FromStr for LayerKey {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        if key == "slab" {
            return Ok(LayerKey::Slab);
        }
        key.strip_prefix("level")
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| *n >= 1)
            .map(LayerKey::Level)
            .ok_or_else(|| {
                CalcError::invalid_input("corner_outlines", key, "Layer key must be 'slab' or 'levelN'")
            })
    }
}

impl TryFrom<String> for LayerKey {
    type Error = CalcError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LayerKey> for String {
    fn from(key: LayerKey) -> Self {
        key.to_string()
    }
}

/// A manually estimated line item (concrete detail or specialty item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailItem {
    /// What the hours are for
    pub description: String,
    /// Estimated hours (non-negative)
    pub hours: f64,
}

impl DetailItem {
    pub fn new(description: impl Into<String>, hours: f64) -> Self {
        DetailItem {
            description: description.into(),
            hours,
        }
    }
}

/// Retaining wall types by retained height.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetainingWalls {
    /// Wall types retaining 4–6 ft
    pub feet_4_to_6: u32,
    /// Wall types retaining 6–10 ft
    pub feet_6_to_10: u32,
    /// Wall types retaining 10–12 ft
    pub feet_10_to_12: u32,
    /// Manual hours for walls over 12 ft, `None` if there are none
    pub over_12_hours: Option<f64>,
}

impl RetainingWalls {
    /// True when nothing was entered
    pub fn is_empty(&self) -> bool {
        self.feet_4_to_6 == 0
            && self.feet_6_to_10 == 0
            && self.feet_10_to_12 == 0
            && self.over_12_hours.is_none()
    }
}

/// Immutable snapshot of everything an estimate is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeInput {
    /// Number of stories (1–4)
    pub stories: u8,

    /// Total floor area, drives the liability multiplier
    pub square_footage: f64,

    /// Corner counts per outline, one sequence per layer
    pub corner_outlines: BTreeMap<LayerKey, Vec<u32>>,

    /// Separate roof areas
    pub roof_count: u32,

    /// Distinct foundation elevations
    pub foundation_levels: u32,

    /// Distinct roof-framing elevations
    pub roof_levels: u32,

    pub minor_concrete_details: u32,
    pub major_concrete_details: u32,
    pub manual_concrete_details: Vec<DetailItem>,

    /// Billing rate
    pub dollar_per_hour: f64,

    /// Bearing walls or columns that do not stack between adjacent levels
    pub discontinuities: u32,

    /// Spans in the lower long-span bracket (16–24 ft under the revised rules)
    #[serde(alias = "span_16_to_24_count")]
    pub moderate_span_count: u32,

    /// Spans in the open-ended bracket (>24 ft under the revised rules)
    #[serde(alias = "span_over_24_count")]
    pub long_span_count: u32,

    pub vault_zones: u32,

    /// Distinct top-of-wall heights (at least 1)
    pub plate_height_sets: u32,

    pub voids_penetrations: u32,
    pub cantilever_areas: u32,

    /// Problematic brace line count per level (1–4); levels above
    /// `stories` are ignored
    pub problematic_brace_lines: BTreeMap<u8, u32>,

    pub specialty_details: Vec<DetailItem>,

    pub pier_and_beam_present: bool,
    /// Pier-and-beam floor outlines, meaningful only when present
    pub pier_and_beam_corners: Vec<u32>,

    pub retaining_walls: RetainingWalls,

    /// Foundation step-downs of 12 in. or more
    pub foundation_step_runs: u32,

    /// Manual pool hours, `None` if there is no pool
    pub pool_hours: Option<f64>,
}

impl ScopeInput {
    /// Create a snapshot for a building with the given number of stories
    /// (clamped to 1–4), one rectangular outline per layer and every other
    /// field at its form default.
    ///
    /// ```rust
    /// use estimate_core::scope::{LayerKey, ScopeInput};
    ///
    /// let scope = ScopeInput::new(2);
    /// assert_eq!(scope.corner_outlines.len(), 3);
    /// assert_eq!(scope.corner_outlines[&LayerKey::Level(2)], vec![4]);
    /// assert_eq!(scope.dollar_per_hour, 150.0);
    /// ```
    pub fn new(stories: u8) -> Self {
        let stories = stories.clamp(1, MAX_STORIES);
        ScopeInput {
            stories,
            square_footage: 0.0,
            corner_outlines: LayerKey::for_stories(stories)
                .into_iter()
                .map(|key| (key, vec![DEFAULT_CORNERS]))
                .collect(),
            roof_count: 1,
            foundation_levels: 1,
            roof_levels: 1,
            minor_concrete_details: 0,
            major_concrete_details: 0,
            manual_concrete_details: Vec::new(),
            dollar_per_hour: DEFAULT_DOLLAR_PER_HOUR,
            discontinuities: 0,
            moderate_span_count: 0,
            long_span_count: 0,
            vault_zones: 0,
            plate_height_sets: 1,
            voids_penetrations: 0,
            cantilever_areas: 0,
            problematic_brace_lines: BTreeMap::new(),
            specialty_details: Vec::new(),
            pier_and_beam_present: false,
            pier_and_beam_corners: vec![DEFAULT_CORNERS],
            retaining_walls: RetainingWalls::default(),
            foundation_step_runs: 0,
            pool_hours: None,
        }
    }

    /// Layers implied by `stories`
    pub fn layer_keys(&self) -> Vec<LayerKey> {
        LayerKey::for_stories(self.stories)
    }

    /// Outlines of a layer (empty slice if the layer is missing)
    pub fn outlines(&self, layer: LayerKey) -> &[u32] {
        self.corner_outlines
            .get(&layer)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Problematic brace lines on a level, 0 above `stories`
    pub fn brace_lines(&self, level: u8) -> u32 {
        if level == 0 || level > self.stories {
            return 0;
        }
        self.problematic_brace_lines.get(&level).copied().unwrap_or(0)
    }

    /// Check every invariant of a snapshot.
    ///
    /// The estimation pipeline never calls this; it is total over any
    /// snapshot. Use it when a snapshot was assembled by hand rather than
    /// through form normalization.
    pub fn validate(&self) -> CalcResult<()> {
        if !(1..=MAX_STORIES).contains(&self.stories) {
            return Err(CalcError::invalid_input(
                "stories",
                self.stories.to_string(),
                "Stories must be between 1 and 4",
            ));
        }

        if !self.square_footage.is_finite() || self.square_footage < 0.0 {
            return Err(CalcError::invalid_input(
                "square_footage",
                self.square_footage.to_string(),
                "Square footage must be a non-negative number",
            ));
        }

        if !self.dollar_per_hour.is_finite() || self.dollar_per_hour <= 0.0 {
            return Err(CalcError::invalid_input(
                "dollar_per_hour",
                self.dollar_per_hour.to_string(),
                "Rate must be positive",
            ));
        }

        if self.plate_height_sets < 1 {
            return Err(CalcError::invalid_input(
                "plate_height_sets",
                self.plate_height_sets.to_string(),
                "There is always at least one plate-height set",
            ));
        }

        let expected = self.layer_keys();
        for key in &expected {
            match self.corner_outlines.get(key) {
                None => return Err(CalcError::missing_field(format!("corner_outlines.{}", key))),
                Some(outlines) => validate_outlines(&format!("corner_outlines.{}", key), outlines)?,
            }
        }
        if let Some(extra) = self.corner_outlines.keys().find(|k| !expected.contains(k)) {
            return Err(CalcError::invalid_input(
                "corner_outlines",
                extra.to_string(),
                format!("Layer does not exist in a {}-story building", self.stories),
            ));
        }

        if self.pier_and_beam_present {
            validate_outlines("pier_and_beam_corners", &self.pier_and_beam_corners)?;
        }

        if let Some(level) = self.problematic_brace_lines.keys().find(|l| !(1..=MAX_STORIES).contains(l)) {
            return Err(CalcError::invalid_input(
                "problematic_brace_lines",
                level.to_string(),
                "Brace line levels run from 1 to 4",
            ));
        }

        validate_details("manual_concrete_details", &self.manual_concrete_details)?;
        validate_details("specialty_details", &self.specialty_details)?;

        if let Some(hours) = self.retaining_walls.over_12_hours {
            validate_hours("retaining_walls.over_12_hours", hours)?;
        }
        if let Some(hours) = self.pool_hours {
            validate_hours("pool_hours", hours)?;
        }

        Ok(())
    }
}

impl Default for ScopeInput {
    fn default() -> Self {
        ScopeInput::new(1)
    }
}

fn validate_outlines(field: &str, outlines: &[u32]) -> CalcResult<()> {
    if outlines.is_empty() {
        return Err(CalcError::invalid_input(field, "[]", "At least one outline is required"));
    }
    for (idx, &corners) in outlines.iter().enumerate() {
        if corners < DEFAULT_CORNERS || corners % 2 != 0 {
            return Err(CalcError::invalid_input(
                format!("{}[{}]", field, idx),
                corners.to_string(),
                "Corner count must be an even number of at least 4",
            ));
        }
    }
    Ok(())
}

fn validate_details(field: &str, details: &[DetailItem]) -> CalcResult<()> {
    for (idx, item) in details.iter().enumerate() {
        validate_hours(&format!("{}[{}].hours", field, idx), item.hours)?;
    }
    Ok(())
}

fn validate_hours(field: &str, hours: f64) -> CalcResult<()> {
    if !hours.is_finite() || hours < 0.0 {
        return Err(CalcError::invalid_input(
            field,
            hours.to_string(),
            "Hours must be a non-negative number",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_keys() {
        assert_eq!(
            LayerKey::for_stories(2),
            vec![LayerKey::Slab, LayerKey::Level(1), LayerKey::Level(2)]
        );
        assert!(LayerKey::Level(1).is_framing());
        assert!(!LayerKey::Slab.is_framing());
        assert!(LayerKey::Slab < LayerKey::Level(1));
        assert!(LayerKey::Level(2) < LayerKey::Level(3));
    }

    #[test]
    fn test_layer_key_parse_and_labels() {
        assert_eq!("slab".parse::<LayerKey>().unwrap(), LayerKey::Slab);
        assert_eq!("level3".parse::<LayerKey>().unwrap(), LayerKey::Level(3));
        assert!("level0".parse::<LayerKey>().is_err());
        assert!("roof".parse::<LayerKey>().is_err());

        assert_eq!(LayerKey::Slab.label(), "Slab-on-Grade");
        assert_eq!(LayerKey::Level(2).label(), "Level 2 Ceiling / Floor Framing");
    }

    #[test]
    fn test_new_matches_layer_invariant() {
        for stories in 1..=4 {
            let scope = ScopeInput::new(stories);
            assert_eq!(scope.corner_outlines.len(), usize::from(stories) + 1);
            assert!(scope.validate().is_ok());
        }
        assert_eq!(ScopeInput::new(9).stories, 4);
        assert_eq!(ScopeInput::new(0).stories, 1);
    }

    #[test]
    fn test_brace_lines_ignore_levels_above_stories() {
        let mut scope = ScopeInput::new(2);
        scope.problematic_brace_lines.insert(1, 2);
        scope.problematic_brace_lines.insert(3, 5);
        assert_eq!(scope.brace_lines(1), 2);
        assert_eq!(scope.brace_lines(2), 0);
        assert_eq!(scope.brace_lines(3), 0);
    }

    #[test]
    fn test_validate_rejects_bad_corners() {
        let mut scope = ScopeInput::new(1);
        scope.corner_outlines.insert(LayerKey::Level(1), vec![4, 7]);
        let err = scope.validate().unwrap_err();
        match err {
            CalcError::InvalidInput { field, .. } => assert_eq!(field, "corner_outlines.level1[1]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_missing_and_extra_layers() {
        let mut scope = ScopeInput::new(2);
        scope.corner_outlines.remove(&LayerKey::Level(2));
        assert_eq!(scope.validate().unwrap_err().error_code(), "MISSING_FIELD");

        let mut scope = ScopeInput::new(1);
        scope.corner_outlines.insert(LayerKey::Level(2), vec![4]);
        assert_eq!(scope.validate().unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_validate_rejects_bad_rate_and_hours() {
        let mut scope = ScopeInput::new(1);
        scope.dollar_per_hour = 0.0;
        assert!(scope.validate().is_err());

        let mut scope = ScopeInput::new(1);
        scope.specialty_details.push(DetailItem::new("Pool shell", -2.0));
        assert!(scope.validate().is_err());
    }

    #[test]
    fn test_serialization_with_defaults() {
        let json = r#"{
            "stories": 2,
            "corner_outlines": { "slab": [8], "level1": [8], "level2": [6, 4] },
            "span_16_to_24_count": 2,
            "problematic_brace_lines": { "1": 1, "2": 3 }
        }"#;
        let scope: ScopeInput = serde_json::from_str(json).unwrap();
        assert_eq!(scope.stories, 2);
        assert_eq!(scope.moderate_span_count, 2);
        assert_eq!(scope.outlines(LayerKey::Level(2)), &[6, 4]);
        assert_eq!(scope.brace_lines(2), 3);
        assert_eq!(scope.roof_count, 1);
        assert_eq!(scope.plate_height_sets, 1);
        assert!(scope.validate().is_ok());

        let out = serde_json::to_string(&scope).unwrap();
        assert!(out.contains("\"level2\":[6,4]"));
        let roundtrip: ScopeInput = serde_json::from_str(&out).unwrap();
        assert_eq!(roundtrip, scope);
    }
}
