//! # Rule Tables
//!
//! All rates, thresholds and pricing schemes used by the calculation stages
//! live in a [`RuleSet`]. Two tables ship with the engine:
//!
//! | Rule set | Notes |
//! |----------|-------|
//! | [`RuleSetId::Revised`] | minor/major concrete details, 16–24 ft and >24 ft span brackets, specialty items (default) |
//! | [`RuleSetId::Original`] | flat rate per concrete detail type, retaining walls, foundation step runs, pool, 20–26 ft and >26 ft span brackets |
//!
//! Every estimate records the identifier of the table that produced it.
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::rules::{RuleSet, RuleSetId};
//!
//! let rules = RuleSet::for_id(RuleSetId::Revised);
//! assert_eq!(rules.framing_per_square, 3.0);
//! assert_eq!(rules.moderate_span.label(), "Spans 16–24 ft");
//!
//! let id: RuleSetId = "original".parse().unwrap();
//! assert_eq!(RuleSet::for_id(id).framing_per_square, 4.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CalcError;
use crate::format::format_num;
use crate::scope::ScopeInput;

/// Identifier of a built-in rule table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSetId {
    /// First formula set
    Original,
    /// Refined concrete categorization and span thresholds
    #[default]
    Revised,
}

impl RuleSetId {
    /// All built-in identifiers
    pub const ALL: [RuleSetId; 2] = [RuleSetId::Original, RuleSetId::Revised];

    /// Lowercase name used in files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleSetId::Original => "original",
            RuleSetId::Revised => "revised",
        }
    }
}

impl fmt::Display for RuleSetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSetId {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" | "v1" => Ok(RuleSetId::Original),
            "revised" | "v2" => Ok(RuleSetId::Revised),
            other => Err(CalcError::unknown_rule_set(
                other,
                RuleSetId::ALL.map(|id| id.as_str()).join(", "),
            )),
        }
    }
}

/// How concrete details are priced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum ConcreteScheme {
    /// Flat rate per distinct detail type. Minor and major counts are both
    /// treated as detail types; manual items are not priced.
    PerType { hours_per_type: f64 },
    /// Separate minor/major rates plus manually estimated items.
    MinorMajor { minor_hours: f64, major_hours: f64 },
}

impl ConcreteScheme {
    /// Count of priced concrete details for the pier-and-beam floor check
    pub fn priced_count(&self, scope: &ScopeInput) -> u32 {
        match self {
            ConcreteScheme::PerType { .. } => scope
                .minor_concrete_details
                .saturating_add(scope.major_concrete_details),
            ConcreteScheme::MinorMajor { .. } => scope.minor_concrete_details,
        }
    }
}

/// A clear-span bracket priced per occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpanBracket {
    /// Lower bound of the bracket in feet
    pub min_ft: f64,
    /// Upper bound in feet, `None` for an open-ended bracket
    pub max_ft: Option<f64>,
    /// Hours per span in this bracket
    pub hours: f64,
}

impl SpanBracket {
    /// Ledger label, e.g. `Spans 16–24 ft` or `Spans >24 ft`
    pub fn label(&self) -> String {
        match self.max_ft {
            Some(max) => format!("Spans {}–{} ft", format_num(self.min_ft), format_num(max)),
            None => format!("Spans >{} ft", format_num(self.min_ft)),
        }
    }
}

/// Retaining wall pricing by retained height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RetainingWallRates {
    /// Hours per 4–6 ft wall type
    pub feet_4_to_6: f64,
    /// Hours per 6–10 ft wall type
    pub feet_6_to_10: f64,
    /// Hours per 10–12 ft wall type
    pub feet_10_to_12: f64,
}

/// Lateral complexity scoring constants.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LateralRules {
    /// Base hours per story
    pub hours_per_story: f64,
    /// Hours per weighted problematic brace line
    pub hours_per_weighted_line: f64,
    /// Weight for levels 1 through 4
    pub level_weights: [f64; 4],
}

impl LateralRules {
    /// Weight for a 1-based level, 0 outside 1..=4
    pub fn weight(&self, level: u8) -> f64 {
        match level {
            1..=4 => self.level_weights[usize::from(level - 1)],
            _ => 0.0,
        }
    }
}

/// Liability (size) multiplier constants.
///
/// `multiplier = max((sqft − threshold) / scale + 1, 1)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LiabilityRules {
    /// Floor area at or below which the multiplier is 1
    pub threshold_sqft: f64,
    /// Floor area that adds 1.0 to the multiplier
    pub scale_sqft: f64,
}

impl LiabilityRules {
    /// Multiplier for a given floor area
    pub fn multiplier(&self, square_footage: f64) -> f64 {
        ((square_footage - self.threshold_sqft) / self.scale_sqft + 1.0).max(1.0)
    }
}

/// A complete rule table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSet {
    pub id: RuleSetId,

    /// Fixed setup cost per estimate
    pub setup_hours: f64,

    pub foundation_per_level: f64,
    pub foundation_per_square: f64,
    pub framing_per_square: f64,
    pub pier_and_beam_per_square: f64,
    pub roof_per_level: f64,
    pub roof_per_count: f64,

    pub concrete: ConcreteScheme,
    /// Minimum priced concrete details when pier and beam is present
    pub pier_and_beam_concrete_floor: u32,

    /// `None` when retaining walls are not priced
    pub retaining_walls: Option<RetainingWallRates>,

    pub lateral: LateralRules,

    pub discontinuity_hours: f64,
    pub moderate_span: SpanBracket,
    pub long_span: SpanBracket,
    pub vault_zone_hours: f64,
    /// Hours per plate-height set beyond the first
    pub plate_height_set_hours: f64,
    pub void_penetration_hours: f64,
    pub cantilever_area_hours: f64,
    /// `None` when foundation step runs are not priced
    pub foundation_step_run_hours: Option<f64>,
    pub prices_pool: bool,
    pub prices_specialty_details: bool,

    pub liability: LiabilityRules,
    /// Totals round up to a multiple of this many hours
    pub rounding_increment_hours: f64,
}

const LATERAL: LateralRules = LateralRules {
    hours_per_story: 2.0,
    hours_per_weighted_line: 4.0,
    level_weights: [1.0, 1.5, 2.0, 2.5],
};

const LIABILITY: LiabilityRules = LiabilityRules {
    threshold_sqft: 3000.0,
    scale_sqft: 10000.0,
};

/// Refined rule set (default)
pub static REVISED: RuleSet = RuleSet {
    id: RuleSetId::Revised,
    setup_hours: 4.0,
    foundation_per_level: 1.0,
    foundation_per_square: 1.0,
    framing_per_square: 3.0,
    pier_and_beam_per_square: 3.0,
    roof_per_level: 1.0,
    roof_per_count: 1.0,
    concrete: ConcreteScheme::MinorMajor {
        minor_hours: 3.0,
        major_hours: 6.0,
    },
    pier_and_beam_concrete_floor: 1,
    retaining_walls: None,
    lateral: LATERAL,
    discontinuity_hours: 4.0,
    moderate_span: SpanBracket {
        min_ft: 16.0,
        max_ft: Some(24.0),
        hours: 2.0,
    },
    long_span: SpanBracket {
        min_ft: 24.0,
        max_ft: None,
        hours: 6.0,
    },
    vault_zone_hours: 3.0,
    plate_height_set_hours: 2.0,
    void_penetration_hours: 1.5,
    cantilever_area_hours: 1.5,
    foundation_step_run_hours: None,
    prices_pool: false,
    prices_specialty_details: true,
    liability: LIABILITY,
    rounding_increment_hours: 2.0,
};

/// First formula set
pub static ORIGINAL: RuleSet = RuleSet {
    id: RuleSetId::Original,
    setup_hours: 4.0,
    foundation_per_level: 2.0,
    foundation_per_square: 1.0,
    framing_per_square: 4.0,
    pier_and_beam_per_square: 4.0,
    roof_per_level: 2.0,
    roof_per_count: 1.0,
    concrete: ConcreteScheme::PerType {
        hours_per_type: 4.0,
    },
    pier_and_beam_concrete_floor: 1,
    retaining_walls: Some(RetainingWallRates {
        feet_4_to_6: 4.0,
        feet_6_to_10: 6.0,
        feet_10_to_12: 8.0,
    }),
    lateral: LATERAL,
    discontinuity_hours: 4.0,
    moderate_span: SpanBracket {
        min_ft: 20.0,
        max_ft: Some(26.0),
        hours: 2.0,
    },
    long_span: SpanBracket {
        min_ft: 26.0,
        max_ft: None,
        hours: 6.0,
    },
    vault_zone_hours: 3.0,
    plate_height_set_hours: 2.0,
    void_penetration_hours: 1.5,
    cantilever_area_hours: 1.5,
    foundation_step_run_hours: Some(0.75),
    prices_pool: true,
    prices_specialty_details: false,
    liability: LIABILITY,
    rounding_increment_hours: 2.0,
};

impl RuleSet {
    /// Built-in table for an identifier
    pub fn for_id(id: RuleSetId) -> &'static RuleSet {
        match id {
            RuleSetId::Original => &ORIGINAL,
            RuleSetId::Revised => &REVISED,
        }
    }

    /// True when the pier-and-beam concrete floor is met (or not applicable)
    pub fn meets_pier_and_beam_floor(&self, scope: &ScopeInput) -> bool {
        !scope.pier_and_beam_present
            || self.concrete.priced_count(scope) >= self.pier_and_beam_concrete_floor
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        REVISED.clone()
    }
}
