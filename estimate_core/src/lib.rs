//! # estimate_core - Residential Structural Hour & Fee Estimator
//!
//! `estimate_core` turns a description of a house (corner counts per framing
//! layer, plus counts of the conditions that make structural design harder)
//! into an itemized labor-hour estimate and a fee. Every intermediate figure
//! is kept in an ordered ledger so the estimate can be audited line by line.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: the pipeline is a pure function of its input snapshot
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured error types at the edges; the engine itself
//!   never fails
//! - **Rule tables, not code paths**: rates and thresholds live in a
//!   [`rules::RuleSet`]
//!
//! ## Quick Start
//!
//! ```rust
//! use estimate_core::calculations::estimate;
//! use estimate_core::form::ScopeForm;
//! use estimate_core::rules::REVISED;
//! use estimate_core::settings::EstimatorSettings;
//!
//! let form: ScopeForm = serde_json::from_str(r#"{
//!     "stories": 1,
//!     "square_footage": 2200,
//!     "corner_outlines": { "slab": [8], "level1": [8] }
//! }"#).unwrap();
//!
//! let normalized = form.normalize(&REVISED, &EstimatorSettings::default());
//! let result = estimate(&normalized.scope, &REVISED);
//!
//! for item in &result.ledger {
//!     println!("{:?}", item);
//! }
//! println!("Fee: ${:.2}", result.fee_rounded.0);
//! ```
//!
//! ## Modules
//!
//! - [`scope`] - The immutable input snapshot
//! - [`form`] - Loosely typed form entries and normalization
//! - [`rules`] - Built-in rule tables
//! - [`calculations`] - The six pipeline stages and [`calculations::estimate`]
//! - [`ledger`] - Audit trail line items
//! - [`job`] - Job container and metadata
//! - [`file_io`] - Atomic job saves, version checks, settings discovery
//! - [`settings`] - Office defaults from TOML
//! - [`email`] - Follow-up proposal email template
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod email;
pub mod errors;
pub mod file_io;
pub mod form;
pub mod format;
pub mod job;
pub mod ledger;
pub mod rules;
pub mod scope;
pub mod settings;
pub mod units;

// Re-export commonly used types at crate root for convenience
pub use calculations::{estimate, estimate_with, EstimateResult};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_job, save_job};
pub use form::{Adjustment, AdjustmentKind, NormalizedScope, ScopeForm};
pub use job::{EstimateJob, JobMetadata};
pub use ledger::{Ledger, LedgerValue, LineItem};
pub use rules::{RuleSet, RuleSetId};
pub use scope::ScopeInput;
pub use settings::EstimatorSettings;
