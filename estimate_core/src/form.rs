//! # Form Normalization
//!
//! [`ScopeForm`] is the loosely typed shape that a form layer or a hand-edited
//! job file produces. Every field is optional and may hold a number, a numeric
//! string or a bool. [`ScopeForm::normalize`] turns it into a [`ScopeInput`]
//! the engine can price, and records every fallback it applied.
//!
//! ## Fallbacks
//!
//! | Field | Blank, unparsable or zero | Out of range |
//! |-------|---------------------------|--------------|
//! | `stories` | 1 | clamped to 1–4 |
//! | `roof_count`, `foundation_levels`, `roof_levels`, `plate_height_sets` | 1 | negative → minimum |
//! | other counts, `square_footage` | 0 | negative → 0 |
//! | `dollar_per_hour` | settings default (150) | non-positive → default |
//! | corner count | 4 | odd or < 4 kept, flagged |
//!
//! Numeric strings are read the way a browser form reads them: the leading
//! number is taken and any trailing text ignored (`"12 ft"` is 12).
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "stories": "2",
//!   "square_footage": 3400,
//!   "corner_outlines": { "slab": [8], "level1": ["8"], "level2": [6] },
//!   "pier_and_beam_present": "yes",
//!   "problematic_brace_lines": { "level2": 1 }
//! }
//! ```

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::format::format_num;
use crate::rules::RuleSet;
use crate::scope::{DetailItem, LayerKey, RetainingWalls, ScopeInput, DEFAULT_CORNERS, MAX_STORIES};
use crate::settings::EstimatorSettings;

/// Pool hours assumed when a pool is marked present without hours
pub const DEFAULT_POOL_HOURS: f64 = 12.0;

/// A single form value as entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Empty or whitespace-only text
    pub fn is_blank(&self) -> bool {
        matches!(self, RawValue::Text(s) if s.trim().is_empty())
    }

    /// Integer value, truncating decimals and ignoring trailing text.
    ///
    /// ```rust
    /// use estimate_core::form::RawValue;
    ///
    /// assert_eq!(RawValue::Text("12 ft".into()).parse_int(), Some(12));
    /// assert_eq!(RawValue::Number(3.9).parse_int(), Some(3));
    /// assert_eq!(RawValue::Text("n/a".into()).parse_int(), None);
    /// ```
    pub fn parse_int(&self) -> Option<i64> {
        match self {
            RawValue::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            RawValue::Text(s) => parse_int_prefix(s),
            _ => None,
        }
    }

    /// Real value, ignoring trailing text
    pub fn parse_float(&self) -> Option<f64> {
        match self {
            RawValue::Number(n) if n.is_finite() => Some(*n),
            RawValue::Text(s) => parse_float_prefix(s).filter(|x| x.is_finite()),
            _ => None,
        }
    }

    /// Yes/no toggle: `true`, `"yes"`, `"on"` or a non-zero number
    pub fn flag(&self) -> bool {
        match self {
            RawValue::Bool(b) => *b,
            RawValue::Number(n) => *n != 0.0,
            RawValue::Text(s) => matches!(
                s.trim().to_ascii_lowercase().as_str(),
                "yes" | "y" | "true" | "on" | "1"
            ),
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Bool(b) => write!(f, "{}", b),
            RawValue::Number(n) => write!(f, "{}", n),
            RawValue::Text(s) => write!(f, "\"{}\"", s),
        }
    }
}

impl From<u32> for RawValue {
    fn from(n: u32) -> Self {
        RawValue::Number(f64::from(n))
    }
}

impl From<f64> for RawValue {
    fn from(n: f64) -> Self {
        RawValue::Number(n)
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<bool> for RawValue {
    fn from(b: bool) -> Self {
        RawValue::Bool(b)
    }
}

/// Length of the `[+-]digits` run at the start of `s`
fn signed_digits_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        0
    } else {
        end + digits
    }
}

fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let len = signed_digits_len(s);
    if len == 0 {
        return None;
    }
    let digits = &s[..len];
    digits.parse::<i64>().ok().or_else(|| {
        // Out of i64 range; saturate in the direction of the sign
        Some(if digits.starts_with('-') { i64::MIN } else { i64::MAX })
    })
}

fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_digits = bytes[end..].iter().take_while(|b| b.is_ascii_digit()).count();
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = bytes[end + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if int_digits > 0 || frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits == 0 && frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e') | Some(b'E')) {
        let exp_len = signed_digits_len(&s[end + 1..]);
        if exp_len > 0 {
            end += 1 + exp_len;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// A manually estimated item as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailForm {
    pub description: String,
    pub hours: Option<RawValue>,
}

/// Retaining wall entries as entered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetainingWallsForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feet_4_to_6: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feet_6_to_10: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feet_10_to_12: Option<RawValue>,
    /// Walls over 12 ft present?
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_12_present: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over_12_hours: Option<RawValue>,
}

/// Loosely typed scope entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stories: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_footage: Option<RawValue>,
    pub corner_outlines: BTreeMap<String, Vec<RawValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_count: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_levels: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roof_levels: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_concrete_details: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_concrete_details: Option<RawValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub manual_concrete_details: Vec<DetailForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dollar_per_hour: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discontinuities: Option<RawValue>,
    #[serde(alias = "span_16_to_24_count", skip_serializing_if = "Option::is_none")]
    pub moderate_span_count: Option<RawValue>,
    #[serde(alias = "span_over_24_count", skip_serializing_if = "Option::is_none")]
    pub long_span_count: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vault_zones: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_height_sets: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voids_penetrations: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cantilever_areas: Option<RawValue>,
    /// Keyed by `"1"` or `"level1"`
    pub problematic_brace_lines: BTreeMap<String, RawValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub specialty_details: Vec<DetailForm>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pier_and_beam_present: Option<RawValue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pier_and_beam_corners: Vec<RawValue>,
    pub retaining_walls: RetainingWallsForm,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foundation_step_runs: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_present: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool_hours: Option<RawValue>,
}

/// What normalization did to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// Blank, unparsable or zero replaced by the field default
    Defaulted,
    /// Out-of-range value pulled into range
    Clamped,
    /// Raised to a required minimum
    Floored,
    /// Entry discarded
    Dropped,
    /// Kept as entered but suspicious
    Flagged,
}

impl fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdjustmentKind::Defaulted => "defaulted",
            AdjustmentKind::Clamped => "clamped",
            AdjustmentKind::Floored => "floored",
            AdjustmentKind::Dropped => "dropped",
            AdjustmentKind::Flagged => "flagged",
        };
        f.write_str(s)
    }
}

/// One fallback, clamp, floor or flag applied to a form entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Dotted path of the entry, e.g. `corner_outlines.level1[0]`
    pub field: String,
    pub kind: AdjustmentKind,
    pub message: String,
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.field, self.kind, self.message)
    }
}

/// A priced-ready snapshot plus the record of how it was derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScope {
    pub scope: ScopeInput,
    pub adjustments: Vec<Adjustment>,
}

impl NormalizedScope {
    /// True when every entry was used as given
    pub fn is_clean(&self) -> bool {
        self.adjustments.is_empty()
    }

    /// Adjustments of one kind
    pub fn of_kind(&self, kind: AdjustmentKind) -> impl Iterator<Item = &Adjustment> {
        self.adjustments.iter().filter(move |a| a.kind == kind)
    }
}

#[derive(Default)]
struct Normalizer {
    adjustments: Vec<Adjustment>,
}

impl Normalizer {
    fn adjust(&mut self, field: impl Into<String>, kind: AdjustmentKind, message: impl Into<String>) {
        self.adjustments.push(Adjustment {
            field: field.into(),
            kind,
            message: message.into(),
        });
    }

    fn count(&mut self, field: &str, raw: Option<&RawValue>, fallback: u32, min: u32) -> u32 {
        let Some(raw) = raw.filter(|r| !r.is_blank()) else {
            return fallback;
        };
        match raw.parse_int() {
            None => {
                self.adjust(
                    field,
                    AdjustmentKind::Defaulted,
                    format!("{} is not a number; using {}", raw, fallback),
                );
                fallback
            }
            Some(0) => {
                if fallback != 0 {
                    self.adjust(
                        field,
                        AdjustmentKind::Defaulted,
                        format!("0 treated as blank; using {}", fallback),
                    );
                }
                fallback
            }
            Some(n) if n < i64::from(min) => {
                self.adjust(
                    field,
                    AdjustmentKind::Clamped,
                    format!("{} is below the minimum; using {}", n, min),
                );
                min
            }
            Some(n) => u32::try_from(n).unwrap_or_else(|_| {
                self.adjust(field, AdjustmentKind::Clamped, format!("{} is too large", n));
                u32::MAX
            }),
        }
    }

    fn measure(&mut self, field: &str, raw: Option<&RawValue>) -> f64 {
        let Some(raw) = raw.filter(|r| !r.is_blank()) else {
            return 0.0;
        };
        match raw.parse_float() {
            None => {
                self.adjust(
                    field,
                    AdjustmentKind::Defaulted,
                    format!("{} is not a number; using 0", raw),
                );
                0.0
            }
            Some(x) if x < 0.0 => {
                self.adjust(
                    field,
                    AdjustmentKind::Clamped,
                    format!("{} is negative; using 0", format_num(x)),
                );
                0.0
            }
            Some(x) => x,
        }
    }

    fn rate(&mut self, raw: Option<&RawValue>, default_rate: f64) -> f64 {
        const FIELD: &str = "dollar_per_hour";
        let Some(raw) = raw.filter(|r| !r.is_blank()) else {
            return default_rate;
        };
        match raw.parse_float() {
            Some(x) if x > 0.0 => x,
            Some(x) if x < 0.0 => {
                self.adjust(
                    FIELD,
                    AdjustmentKind::Clamped,
                    format!("{} is negative; using ${}", format_num(x), format_num(default_rate)),
                );
                default_rate
            }
            _ => {
                self.adjust(
                    FIELD,
                    AdjustmentKind::Defaulted,
                    format!("{} is not a usable rate; using ${}", raw, format_num(default_rate)),
                );
                default_rate
            }
        }
    }

    fn corners(&mut self, field: &str, raw: &RawValue) -> u32 {
        let corners = self.count(field, Some(raw), DEFAULT_CORNERS, 0);
        if corners < DEFAULT_CORNERS || corners % 2 != 0 {
            self.adjust(
                field,
                AdjustmentKind::Flagged,
                format!(
                    "{} corners is not an even count of at least 4; priced as entered",
                    corners
                ),
            );
        }
        corners
    }

    fn outlines(&mut self, field: &str, raw: Option<&Vec<RawValue>>) -> Vec<u32> {
        match raw {
            Some(raw) if !raw.is_empty() => raw
                .iter()
                .enumerate()
                .map(|(idx, value)| self.corners(&format!("{}[{}]", field, idx), value))
                .collect(),
            _ => {
                self.adjust(
                    field,
                    AdjustmentKind::Defaulted,
                    "no outlines entered; using one 4-corner outline",
                );
                vec![DEFAULT_CORNERS]
            }
        }
    }

    fn details(&mut self, field: &str, raw: &[DetailForm]) -> Vec<DetailItem> {
        let mut items = Vec::with_capacity(raw.len());
        for (idx, entry) in raw.iter().enumerate() {
            let item_field = format!("{}[{}]", field, idx);
            let description = entry.description.trim();
            let hours = self.measure(&format!("{}.hours", item_field), entry.hours.as_ref());
            if description.is_empty() && hours == 0.0 {
                self.adjust(item_field, AdjustmentKind::Dropped, "blank item removed");
                continue;
            }
            items.push(DetailItem::new(description, hours));
        }
        items
    }

    fn stories(&mut self, raw: Option<&RawValue>) -> u8 {
        const FIELD: &str = "stories";
        let Some(raw) = raw.filter(|r| !r.is_blank()) else {
            return 1;
        };
        match raw.parse_int() {
            None | Some(0) => {
                self.adjust(
                    FIELD,
                    AdjustmentKind::Defaulted,
                    format!("{} is not a story count; using 1", raw),
                );
                1
            }
            Some(n) if !(1..=i64::from(MAX_STORIES)).contains(&n) => {
                let clamped = n.clamp(1, i64::from(MAX_STORIES));
                self.adjust(
                    FIELD,
                    AdjustmentKind::Clamped,
                    format!("{} is outside 1–{}; using {}", n, MAX_STORIES, clamped),
                );
                clamped as u8
            }
            Some(n) => n as u8,
        }
    }
}

/// Level number from a brace-line key (`"2"` or `"level2"`)
fn brace_level(key: &str) -> Option<u8> {
    let key = key.trim();
    key.strip_prefix("level")
        .unwrap_or(key)
        .parse::<u8>()
        .ok()
        .filter(|level| (1..=MAX_STORIES).contains(level))
}

impl ScopeForm {
    /// Apply fallbacks, clamps and the pier-and-beam concrete floor.
    ///
    /// ```rust
    /// use estimate_core::form::{AdjustmentKind, RawValue, ScopeForm};
    /// use estimate_core::rules::REVISED;
    /// use estimate_core::settings::EstimatorSettings;
    ///
    /// let mut form = ScopeForm::default();
    /// form.roof_count = Some(RawValue::Text("0".into()));
    ///
    /// let normalized = form.normalize(&REVISED, &EstimatorSettings::default());
    /// assert_eq!(normalized.scope.roof_count, 1);
    /// assert!(normalized
    ///     .of_kind(AdjustmentKind::Defaulted)
    ///     .any(|a| a.field == "roof_count"));
    /// ```
    pub fn normalize(&self, rules: &RuleSet, settings: &EstimatorSettings) -> NormalizedScope {
        let mut n = Normalizer::default();

        let stories = n.stories(self.stories.as_ref());
        let layer_keys = LayerKey::for_stories(stories);

        let mut corner_outlines = BTreeMap::new();
        for key in &layer_keys {
            let name = key.to_string();
            let outlines = n.outlines(&format!("corner_outlines.{}", name), self.corner_outlines.get(&name));
            corner_outlines.insert(*key, outlines);
        }
        for name in self.corner_outlines.keys() {
            let known = name
                .parse::<LayerKey>()
                .map(|key| layer_keys.contains(&key))
                .unwrap_or(false);
            if !known {
                n.adjust(
                    format!("corner_outlines.{}", name),
                    AdjustmentKind::Dropped,
                    format!("layer does not exist in a {}-story building", stories),
                );
            }
        }

        let mut problematic_brace_lines = BTreeMap::new();
        for (key, raw) in &self.problematic_brace_lines {
            let field = format!("problematic_brace_lines.{}", key);
            let count = n.count(&field, Some(raw), 0, 0);
            match brace_level(key) {
                None => n.adjust(field, AdjustmentKind::Dropped, "not a level from 1 to 4"),
                Some(level) if level > stories => {
                    if count > 0 {
                        n.adjust(
                            field,
                            AdjustmentKind::Dropped,
                            format!("level {} is above the top story ({})", level, stories),
                        );
                    }
                }
                Some(level) => match problematic_brace_lines.entry(level) {
                    Entry::Vacant(slot) => {
                        slot.insert(count);
                    }
                    Entry::Occupied(kept) => n.adjust(
                        field,
                        AdjustmentKind::Dropped,
                        format!("level {} already set to {}", level, kept.get()),
                    ),
                },
            }
        }

        let pier_and_beam_present = self.pier_and_beam_present.as_ref().is_some_and(RawValue::flag);
        let pier_and_beam_corners = if pier_and_beam_present {
            n.outlines("pier_and_beam_corners", Some(&self.pier_and_beam_corners))
        } else {
            vec![DEFAULT_CORNERS]
        };

        let walls = &self.retaining_walls;
        let over_12_present = walls.over_12_present.as_ref().is_some_and(RawValue::flag);
        let over_12_hours = if over_12_present {
            Some(n.measure("retaining_walls.over_12_hours", walls.over_12_hours.as_ref()))
        } else {
            if walls.over_12_hours.as_ref().and_then(RawValue::parse_float).unwrap_or(0.0) > 0.0 {
                n.adjust(
                    "retaining_walls.over_12_hours",
                    AdjustmentKind::Dropped,
                    "hours entered but walls over 12 ft not marked present",
                );
            }
            None
        };
        let retaining_walls = RetainingWalls {
            feet_4_to_6: n.count("retaining_walls.feet_4_to_6", walls.feet_4_to_6.as_ref(), 0, 0),
            feet_6_to_10: n.count("retaining_walls.feet_6_to_10", walls.feet_6_to_10.as_ref(), 0, 0),
            feet_10_to_12: n.count("retaining_walls.feet_10_to_12", walls.feet_10_to_12.as_ref(), 0, 0),
            over_12_hours,
        };

        let pool_present = self.pool_present.as_ref().is_some_and(RawValue::flag);
        let pool_hours = if pool_present {
            match self.pool_hours.as_ref() {
                None => Some(DEFAULT_POOL_HOURS),
                Some(raw) if raw.is_blank() => {
                    n.adjust("pool_hours", AdjustmentKind::Defaulted, "blank; using 0");
                    Some(0.0)
                }
                Some(raw) => Some(n.measure("pool_hours", Some(raw))),
            }
        } else {
            if self.pool_hours.as_ref().and_then(RawValue::parse_float).unwrap_or(0.0) > 0.0 {
                n.adjust("pool_hours", AdjustmentKind::Dropped, "hours entered but pool not marked present");
            }
            None
        };

        let mut scope = ScopeInput {
            stories,
            square_footage: n.measure("square_footage", self.square_footage.as_ref()),
            corner_outlines,
            roof_count: n.count("roof_count", self.roof_count.as_ref(), 1, 0),
            foundation_levels: n.count("foundation_levels", self.foundation_levels.as_ref(), 1, 0),
            roof_levels: n.count("roof_levels", self.roof_levels.as_ref(), 1, 0),
            minor_concrete_details: n.count("minor_concrete_details", self.minor_concrete_details.as_ref(), 0, 0),
            major_concrete_details: n.count("major_concrete_details", self.major_concrete_details.as_ref(), 0, 0),
            manual_concrete_details: n.details("manual_concrete_details", &self.manual_concrete_details),
            dollar_per_hour: n.rate(self.dollar_per_hour.as_ref(), settings.default_dollar_per_hour),
            discontinuities: n.count("discontinuities", self.discontinuities.as_ref(), 0, 0),
            moderate_span_count: n.count("moderate_span_count", self.moderate_span_count.as_ref(), 0, 0),
            long_span_count: n.count("long_span_count", self.long_span_count.as_ref(), 0, 0),
            vault_zones: n.count("vault_zones", self.vault_zones.as_ref(), 0, 0),
            plate_height_sets: n.count("plate_height_sets", self.plate_height_sets.as_ref(), 1, 1),
            voids_penetrations: n.count("voids_penetrations", self.voids_penetrations.as_ref(), 0, 0),
            cantilever_areas: n.count("cantilever_areas", self.cantilever_areas.as_ref(), 0, 0),
            problematic_brace_lines,
            specialty_details: n.details("specialty_details", &self.specialty_details),
            pier_and_beam_present,
            pier_and_beam_corners,
            retaining_walls,
            foundation_step_runs: n.count("foundation_step_runs", self.foundation_step_runs.as_ref(), 0, 0),
            pool_hours,
        };

        if !rules.meets_pier_and_beam_floor(&scope) {
            let deficit = rules
                .pier_and_beam_concrete_floor
                .saturating_sub(rules.concrete.priced_count(&scope));
            scope.minor_concrete_details = scope.minor_concrete_details.saturating_add(deficit);
            n.adjust(
                "minor_concrete_details",
                AdjustmentKind::Floored,
                format!(
                    "pier and beam needs at least {} concrete detail(s) for pier footings; raised to {}",
                    rules.pier_and_beam_concrete_floor, scope.minor_concrete_details
                ),
            );
        }

        NormalizedScope {
            scope,
            adjustments: n.adjustments,
        }
    }
}

impl From<&ScopeInput> for ScopeForm {
    fn from(scope: &ScopeInput) -> Self {
        let details = |items: &[DetailItem]| -> Vec<DetailForm> {
            items
                .iter()
                .map(|item| DetailForm {
                    description: item.description.clone(),
                    hours: Some(item.hours.into()),
                })
                .collect()
        };
        let walls = &scope.retaining_walls;

        ScopeForm {
            stories: Some(u32::from(scope.stories).into()),
            square_footage: Some(scope.square_footage.into()),
            corner_outlines: scope
                .corner_outlines
                .iter()
                .map(|(key, outlines)| (key.to_string(), outlines.iter().map(|&c| c.into()).collect()))
                .collect(),
            roof_count: Some(scope.roof_count.into()),
            foundation_levels: Some(scope.foundation_levels.into()),
            roof_levels: Some(scope.roof_levels.into()),
            minor_concrete_details: Some(scope.minor_concrete_details.into()),
            major_concrete_details: Some(scope.major_concrete_details.into()),
            manual_concrete_details: details(&scope.manual_concrete_details),
            dollar_per_hour: Some(scope.dollar_per_hour.into()),
            discontinuities: Some(scope.discontinuities.into()),
            moderate_span_count: Some(scope.moderate_span_count.into()),
            long_span_count: Some(scope.long_span_count.into()),
            vault_zones: Some(scope.vault_zones.into()),
            plate_height_sets: Some(scope.plate_height_sets.into()),
            voids_penetrations: Some(scope.voids_penetrations.into()),
            cantilever_areas: Some(scope.cantilever_areas.into()),
            problematic_brace_lines: scope
                .problematic_brace_lines
                .iter()
                .map(|(level, count)| (format!("level{}", level), (*count).into()))
                .collect(),
            specialty_details: details(&scope.specialty_details),
            pier_and_beam_present: Some(scope.pier_and_beam_present.into()),
            pier_and_beam_corners: if scope.pier_and_beam_present {
                scope.pier_and_beam_corners.iter().map(|&c| c.into()).collect()
            } else {
                Vec::new()
            },
            retaining_walls: RetainingWallsForm {
                feet_4_to_6: Some(walls.feet_4_to_6.into()),
                feet_6_to_10: Some(walls.feet_6_to_10.into()),
                feet_10_to_12: Some(walls.feet_10_to_12.into()),
                over_12_present: Some(walls.over_12_hours.is_some().into()),
                over_12_hours: walls.over_12_hours.map(RawValue::from),
            },
            foundation_step_runs: Some(scope.foundation_step_runs.into()),
            pool_present: Some(scope.pool_hours.is_some().into()),
            pool_hours: scope.pool_hours.map(RawValue::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculations::estimate;
    use crate::rules::{ORIGINAL, REVISED};
    use crate::units::Hours;

    fn text(s: &str) -> Option<RawValue> {
        Some(RawValue::from(s))
    }

    fn normalize(form: &ScopeForm) -> NormalizedScope {
        form.normalize(&REVISED, &EstimatorSettings::default())
    }

    #[test]
    fn test_parse_int_prefix() {
        assert_eq!(parse_int_prefix("12abc"), Some(12));
        assert_eq!(parse_int_prefix("  7"), Some(7));
        assert_eq!(parse_int_prefix("-3"), Some(-3));
        assert_eq!(parse_int_prefix("3.9"), Some(3));
        assert_eq!(parse_int_prefix("abc"), None);
        assert_eq!(parse_int_prefix("-"), None);
        assert_eq!(parse_int_prefix(""), None);
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float_prefix("2.5 hrs"), Some(2.5));
        assert_eq!(parse_float_prefix(".5"), Some(0.5));
        assert_eq!(parse_float_prefix("4."), Some(4.0));
        assert_eq!(parse_float_prefix("1e3"), Some(1000.0));
        assert_eq!(parse_float_prefix("1e"), Some(1.0));
        assert_eq!(parse_float_prefix("-12.25"), Some(-12.25));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("$150"), None);
    }

    #[test]
    fn test_flags() {
        assert!(RawValue::from("yes").flag());
        assert!(RawValue::from(" Yes ").flag());
        assert!(RawValue::from(true).flag());
        assert!(RawValue::from(1u32).flag());
        assert!(!RawValue::from("no").flag());
        assert!(!RawValue::from("").flag());
        assert!(!RawValue::from(0u32).flag());
    }

    #[test]
    fn test_empty_form_defaults() {
        let normalized = normalize(&ScopeForm::default());
        assert_eq!(normalized.scope, ScopeInput::new(1));
        // Only the missing outlines are reported
        assert_eq!(normalized.adjustments.len(), 2);
        assert!(normalized
            .adjustments
            .iter()
            .all(|a| a.kind == AdjustmentKind::Defaulted && a.field.starts_with("corner_outlines")));
    }

    #[test]
    fn test_zero_is_treated_as_blank() {
        let form = ScopeForm {
            stories: text("0"),
            roof_count: text("0"),
            foundation_levels: Some(0u32.into()),
            plate_height_sets: text("0"),
            discontinuities: text("0"),
            dollar_per_hour: text("0"),
            ..Default::default()
        };
        let normalized = normalize(&form);
        let scope = &normalized.scope;
        assert_eq!(scope.stories, 1);
        assert_eq!(scope.roof_count, 1);
        assert_eq!(scope.foundation_levels, 1);
        assert_eq!(scope.plate_height_sets, 1);
        assert_eq!(scope.discontinuities, 0);
        assert_eq!(scope.dollar_per_hour, 150.0);

        let defaulted: Vec<&str> = normalized
            .of_kind(AdjustmentKind::Defaulted)
            .map(|a| a.field.as_str())
            .collect();
        assert!(defaulted.contains(&"roof_count"));
        assert!(defaulted.contains(&"dollar_per_hour"));
        assert!(!defaulted.contains(&"discontinuities"));
    }

    #[test]
    fn test_negative_and_out_of_range() {
        let form = ScopeForm {
            stories: text("7"),
            square_footage: text("-1200"),
            vault_zones: text("-2"),
            dollar_per_hour: Some((-80.0).into()),
            ..Default::default()
        };
        let normalized = normalize(&form);
        let scope = &normalized.scope;
        assert_eq!(scope.stories, 4);
        assert_eq!(scope.square_footage, 0.0);
        assert_eq!(scope.vault_zones, 0);
        assert_eq!(scope.dollar_per_hour, 150.0);
        assert_eq!(normalized.of_kind(AdjustmentKind::Clamped).count(), 4);
    }

    #[test]
    fn test_settings_default_rate() {
        let settings = EstimatorSettings {
            default_dollar_per_hour: 175.0,
            ..Default::default()
        };
        let normalized = ScopeForm::default().normalize(&REVISED, &settings);
        assert_eq!(normalized.scope.dollar_per_hour, 175.0);
    }

    #[test]
    fn test_layers_align_with_stories() {
        let mut form = ScopeForm {
            stories: text("2"),
            ..Default::default()
        };
        form.corner_outlines.insert("slab".into(), vec!["8".into(), 6u32.into()]);
        form.corner_outlines.insert("level1".into(), vec![10u32.into()]);
        form.corner_outlines.insert("level3".into(), vec![6u32.into()]);

        let normalized = normalize(&form);
        let scope = &normalized.scope;
        assert_eq!(scope.outlines(LayerKey::Slab), &[8, 6]);
        assert_eq!(scope.outlines(LayerKey::Level(1)), &[10]);
        assert_eq!(scope.outlines(LayerKey::Level(2)), &[4]);
        assert!(!scope.corner_outlines.contains_key(&LayerKey::Level(3)));
        assert!(scope.validate().is_ok());

        assert!(normalized
            .of_kind(AdjustmentKind::Defaulted)
            .any(|a| a.field == "corner_outlines.level2"));
        assert!(normalized
            .of_kind(AdjustmentKind::Dropped)
            .any(|a| a.field == "corner_outlines.level3"));
    }

    #[test]
    fn test_odd_corners_kept_and_flagged() {
        let mut form = ScopeForm::default();
        form.corner_outlines.insert("slab".into(), vec![5u32.into()]);
        form.corner_outlines.insert("level1".into(), vec!["abc".into()]);

        let normalized = normalize(&form);
        assert_eq!(normalized.scope.outlines(LayerKey::Slab), &[5]);
        assert_eq!(normalized.scope.outlines(LayerKey::Level(1)), &[4]);
        let flagged: Vec<_> = normalized.of_kind(AdjustmentKind::Flagged).collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].field, "corner_outlines.slab[0]");
        assert!(normalized
            .of_kind(AdjustmentKind::Defaulted)
            .any(|a| a.field == "corner_outlines.level1[0]"));
    }

    #[test]
    fn test_brace_lines_above_stories_dropped() {
        let mut form = ScopeForm {
            stories: text("2"),
            ..Default::default()
        };
        form.problematic_brace_lines.insert("1".into(), 2u32.into());
        form.problematic_brace_lines.insert("level2".into(), "1".into());
        form.problematic_brace_lines.insert("level4".into(), 3u32.into());
        form.problematic_brace_lines.insert("roof".into(), 1u32.into());

        let normalized = normalize(&form);
        let lines = &normalized.scope.problematic_brace_lines;
        assert_eq!(lines.get(&1), Some(&2));
        assert_eq!(lines.get(&2), Some(&1));
        assert!(!lines.contains_key(&4));
        assert_eq!(normalized.of_kind(AdjustmentKind::Dropped).count(), 2);
    }

    #[test]
    fn test_duplicate_brace_level_keeps_first() {
        let mut form = ScopeForm {
            stories: text("2"),
            ..Default::default()
        };
        form.problematic_brace_lines.insert("1".into(), 3u32.into());
        form.problematic_brace_lines.insert("level1".into(), 0u32.into());

        let normalized = normalize(&form);
        assert_eq!(normalized.scope.problematic_brace_lines.get(&1), Some(&3));
        let dropped: Vec<_> = normalized.of_kind(AdjustmentKind::Dropped).collect();
        assert_eq!(dropped.len(), 1);
        assert_eq!(dropped[0].field, "problematic_brace_lines.level1");
        assert!(dropped[0].message.contains("already set to 3"));
    }

    #[test]
    fn test_pier_and_beam_floor_revised() {
        let form = ScopeForm {
            pier_and_beam_present: text("yes"),
            major_concrete_details: Some(2u32.into()),
            ..Default::default()
        };
        let normalized = normalize(&form);
        assert_eq!(normalized.scope.minor_concrete_details, 1);
        assert_eq!(normalized.scope.major_concrete_details, 2);
        assert_eq!(normalized.of_kind(AdjustmentKind::Floored).count(), 1);
        assert_eq!(normalized.scope.pier_and_beam_corners, vec![4]);
    }

    #[test]
    fn test_pier_and_beam_floor_original() {
        let form = ScopeForm {
            pier_and_beam_present: Some(true.into()),
            major_concrete_details: Some(2u32.into()),
            ..Default::default()
        };
        let normalized = form.normalize(&ORIGINAL, &EstimatorSettings::default());
        // minor + major already counts as two detail types
        assert_eq!(normalized.scope.minor_concrete_details, 0);
        assert_eq!(normalized.of_kind(AdjustmentKind::Floored).count(), 0);

        let form = ScopeForm {
            pier_and_beam_present: Some(true.into()),
            ..Default::default()
        };
        let normalized = form.normalize(&ORIGINAL, &EstimatorSettings::default());
        assert_eq!(normalized.scope.minor_concrete_details, 1);
    }

    #[test]
    fn test_pier_and_beam_through_engine() {
        let mut form = ScopeForm {
            pier_and_beam_present: text("yes"),
            pier_and_beam_corners: vec![2u32.into()],
            ..Default::default()
        };
        form.corner_outlines.insert("slab".into(), vec![2u32.into()]);
        form.corner_outlines.insert("level1".into(), vec![2u32.into()]);

        let normalized = normalize(&form);
        let result = estimate(&normalized.scope, &REVISED);
        assert_eq!(result.breakdown.base_hours.concrete, Hours(3.0));
    }

    #[test]
    fn test_pool_and_retaining_toggles() {
        let form = ScopeForm {
            pool_present: text("yes"),
            retaining_walls: RetainingWallsForm {
                feet_6_to_10: text("2"),
                over_12_present: text("no"),
                over_12_hours: text("6"),
                ..Default::default()
            },
            ..Default::default()
        };
        let normalized = form.normalize(&ORIGINAL, &EstimatorSettings::default());
        assert_eq!(normalized.scope.pool_hours, Some(DEFAULT_POOL_HOURS));
        assert_eq!(normalized.scope.retaining_walls.feet_6_to_10, 2);
        assert_eq!(normalized.scope.retaining_walls.over_12_hours, None);
        assert!(normalized
            .of_kind(AdjustmentKind::Dropped)
            .any(|a| a.field == "retaining_walls.over_12_hours"));

        let form = ScopeForm {
            pool_present: text("yes"),
            pool_hours: text("abc"),
            ..Default::default()
        };
        let normalized = normalize(&form);
        assert_eq!(normalized.scope.pool_hours, Some(0.0));
    }

    #[test]
    fn test_blank_pool_hours_price_nothing() {
        let form = ScopeForm {
            pool_present: text("yes"),
            pool_hours: text(""),
            ..Default::default()
        };
        let normalized = form.normalize(&ORIGINAL, &EstimatorSettings::default());
        assert_eq!(normalized.scope.pool_hours, Some(0.0));
        let defaulted: Vec<_> = normalized.of_kind(AdjustmentKind::Defaulted).collect();
        assert!(defaulted.iter().any(|a| a.field == "pool_hours"));
    }

    #[test]
    fn test_detail_items() {
        let form = ScopeForm {
            specialty_details: vec![
                DetailForm {
                    description: " Steel moment frame ".into(),
                    hours: text("6.5"),
                },
                DetailForm::default(),
                DetailForm {
                    description: "Elevator pit".into(),
                    hours: Some((-3.0).into()),
                },
            ],
            ..Default::default()
        };
        let normalized = normalize(&form);
        let items = &normalized.scope.specialty_details;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], DetailItem::new("Steel moment frame", 6.5));
        assert_eq!(items[1], DetailItem::new("Elevator pit", 0.0));
        assert!(normalized
            .of_kind(AdjustmentKind::Dropped)
            .any(|a| a.field == "specialty_details[1]"));
    }

    #[test]
    fn test_round_trip_from_scope_is_clean() {
        let mut scope = ScopeInput::new(3);
        scope.square_footage = 4200.0;
        scope.corner_outlines.insert(LayerKey::Level(2), vec![8, 6]);
        scope.minor_concrete_details = 2;
        scope.problematic_brace_lines.insert(3, 1);
        scope.specialty_details.push(DetailItem::new("Moment frame", 8.0));
        scope.pier_and_beam_present = true;
        scope.pier_and_beam_corners = vec![6];
        scope.pool_hours = Some(10.0);

        let form = ScopeForm::from(&scope);
        let normalized = normalize(&form);
        assert!(normalized.is_clean(), "{:?}", normalized.adjustments);
        assert_eq!(normalized.scope, scope);
    }

    #[test]
    fn test_deserialize_mixed_types() {
        let json = r#"{
            "stories": "2",
            "square_footage": 3400,
            "corner_outlines": { "slab": ["8"], "level1": [8], "level2": [6] },
            "roof_count": "2 roofs",
            "pier_and_beam_present": "yes",
            "pier_and_beam_corners": [4],
            "minor_concrete_details": 1,
            "span_16_to_24_count": "1",
            "problematic_brace_lines": { "level2": 1 }
        }"#;
        let form: ScopeForm = serde_json::from_str(json).unwrap();
        assert_eq!(form.stories, text("2"));
        assert_eq!(form.square_footage, Some(RawValue::Number(3400.0)));

        let normalized = normalize(&form);
        let scope = &normalized.scope;
        assert!(normalized.is_clean(), "{:?}", normalized.adjustments);
        assert_eq!(scope.stories, 2);
        assert_eq!(scope.roof_count, 2);
        assert_eq!(scope.moderate_span_count, 1);
        assert_eq!(scope.brace_lines(2), 1);
        assert!(scope.pier_and_beam_present);
        assert!(scope.validate().is_ok());
    }
}
