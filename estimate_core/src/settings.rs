//! # Estimator Settings
//!
//! Office-wide defaults loaded from an optional TOML file. Every field has a
//! default, so an empty or partial file is valid.
//!
//! ## TOML Example
//!
//! ```toml
//! rule_set = "revised"
//! default_dollar_per_hour = 165.0
//!
//! [email]
//! weeks_earliest = 3
//! weeks_latest = 5
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::rules::RuleSetId;
use crate::scope::DEFAULT_DOLLAR_PER_HOUR;

/// Defaults applied when a job or the command line does not say otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSettings {
    /// Rule set used when a job file has no override
    pub rule_set: RuleSetId,

    /// Rate substituted for a blank, zero or negative `dollar_per_hour`
    pub default_dollar_per_hour: f64,

    /// Follow-up email defaults
    pub email: EmailDefaults,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        EstimatorSettings {
            rule_set: RuleSetId::default(),
            default_dollar_per_hour: DEFAULT_DOLLAR_PER_HOUR,
            email: EmailDefaults::default(),
        }
    }
}

impl EstimatorSettings {
    /// Parse settings from TOML text. `origin` names the source in errors.
    ///
    /// ```rust
    /// use estimate_core::rules::RuleSetId;
    /// use estimate_core::settings::EstimatorSettings;
    ///
    /// let settings = EstimatorSettings::from_toml_str("rule_set = \"original\"", "inline").unwrap();
    /// assert_eq!(settings.rule_set, RuleSetId::Original);
    /// assert_eq!(settings.default_dollar_per_hour, 150.0);
    /// ```
    pub fn from_toml_str(text: &str, origin: &str) -> CalcResult<Self> {
        let settings: EstimatorSettings =
            toml::from_str(text).map_err(|e| CalcError::config_error(origin, e.to_string()))?;

        if !settings.default_dollar_per_hour.is_finite() || settings.default_dollar_per_hour <= 0.0 {
            return Err(CalcError::config_error(
                origin,
                format!(
                    "default_dollar_per_hour must be positive, got {}",
                    settings.default_dollar_per_hour
                ),
            ));
        }
        if settings.email.weeks_earliest > settings.email.weeks_latest {
            return Err(CalcError::config_error(
                origin,
                "email.weeks_earliest must not exceed email.weeks_latest",
            ));
        }

        Ok(settings)
    }
}

/// Defaults for the follow-up email template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailDefaults {
    /// Earliest turnaround in weeks
    pub weeks_earliest: u32,
    /// Latest turnaround in weeks
    pub weeks_latest: u32,
    /// Feasibility / pre-design site visit fee, 0 for N/A
    pub feasibility_fee: f64,
    /// Construction administration allowance, 0 for N/A
    pub ca_allowance: f64,
}

impl Default for EmailDefaults {
    fn default() -> Self {
        EmailDefaults {
            weeks_earliest: 4,
            weeks_latest: 6,
            feasibility_fee: 0.0,
            ca_allowance: 0.0,
        }
    }
}
