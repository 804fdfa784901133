//! # Estimate Jobs
//!
//! An [`EstimateJob`] is what gets saved to disk: who the estimate is for,
//! which rule set to price it under, and the scope as entered. Estimates are
//! never stored; they are recomputed from the scope every time.
//!
//! Jobs serialize to `.estimate.json` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! EstimateJob
//! ├── meta: JobMetadata (version, job info, timestamps)
//! ├── rule_set: Option<RuleSetId> (falls back to settings)
//! └── scope: ScopeForm (entries as typed)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::job::EstimateJob;
//!
//! let job = EstimateJob::new("25-118", "Hillside Residence", "J. Alvarez", 2);
//! let json = serde_json::to_string_pretty(&job).unwrap();
//! assert!(json.contains("\"job_id\": \"25-118\""));
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::form::ScopeForm;
use crate::rules::{RuleSet, RuleSetId};
use crate::scope::ScopeInput;
use crate::settings::EstimatorSettings;

/// Current schema version for job files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Conventional job file extension
pub const JOB_EXTENSION: &str = "estimate.json";

/// Root job container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimateJob {
    pub meta: JobMetadata,

    /// Rule set override; `None` uses the settings default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_set: Option<RuleSetId>,

    /// Scope entries as typed
    #[serde(default)]
    pub scope: ScopeForm,
}

impl EstimateJob {
    /// Create a job whose scope is a template for the given story count:
    /// one rectangular outline per layer and every other entry at its
    /// default.
    ///
    /// ```rust
    /// use estimate_core::job::EstimateJob;
    ///
    /// let job = EstimateJob::new("25-001", "Client", "Preparer", 3);
    /// assert_eq!(job.scope.corner_outlines.len(), 4);
    /// assert!(job.rule_set.is_none());
    /// ```
    pub fn new(
        job_id: impl Into<String>,
        client: impl Into<String>,
        prepared_by: impl Into<String>,
        stories: u8,
    ) -> Self {
        let now = Utc::now();
        EstimateJob {
            meta: JobMetadata {
                version: SCHEMA_VERSION.to_string(),
                job_id: job_id.into(),
                client: client.into(),
                prepared_by: prepared_by.into(),
                created: now,
                modified: now,
            },
            rule_set: None,
            scope: ScopeForm::from(&ScopeInput::new(stories)),
        }
    }

    /// Rule table to price this job under
    pub fn rules(&self, settings: &EstimatorSettings) -> &'static RuleSet {
        RuleSet::for_id(self.rule_set.unwrap_or(settings.rule_set))
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }
}

impl Default for EstimateJob {
    fn default() -> Self {
        EstimateJob::new("", "", "", 1)
    }
}

/// Job metadata stored in the file header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    #[serde(default)]
    pub client: String,

    /// Person preparing the estimate
    #[serde(default)]
    pub prepared_by: String,

    /// When the job was created
    pub created: DateTime<Utc>,

    /// When the job was last modified
    pub modified: DateTime<Utc>,
}
