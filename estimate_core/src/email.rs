//! # Follow-up Email
//!
//! Fills a fixed proposal email with the quoted engineering fee, optional
//! feasibility and construction-administration figures, and the turnaround
//! window. Scope bullets stay as `[Item n]` placeholders for the author to
//! complete; nothing is generated from the estimate beyond the numbers.
//!
//! Two renderings share the same wording:
//! - plain text for terminals and plain-text mail clients
//! - HTML with inline styles only (webmail clients strip `<style>` blocks)
//!
//! ## Example
//!
//! ```rust
//! use estimate_core::email::{render_text, EmailOptions};
//! use estimate_core::units::Dollars;
//!
//! let options = EmailOptions::default();
//! let email = render_text(Dollars(2100.0), &options).unwrap();
//! assert!(email.contains("Engineering (Design + Permit Set): $2,100.00"));
//! assert!(email.contains("4–6 weeks"));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};
use crate::format::format_money;
use crate::settings::EmailDefaults;
use crate::units::Dollars;

/// Figures substituted into the email besides the engineering fee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailOptions {
    /// Feasibility / pre-design site visit fee, 0 for N/A
    pub feasibility_fee: f64,
    /// Construction administration allowance, 0 for N/A
    pub ca_allowance: f64,
    pub weeks_earliest: u32,
    pub weeks_latest: u32,
}

impl Default for EmailOptions {
    fn default() -> Self {
        EmailOptions::from(&EmailDefaults::default())
    }
}

impl From<&EmailDefaults> for EmailOptions {
    fn from(defaults: &EmailDefaults) -> Self {
        EmailOptions {
            feasibility_fee: defaults.feasibility_fee,
            ca_allowance: defaults.ca_allowance,
            weeks_earliest: defaults.weeks_earliest,
            weeks_latest: defaults.weeks_latest,
        }
    }
}

impl EmailOptions {
    fn validate(&self) -> CalcResult<()> {
        if self.weeks_earliest == 0 {
            return Err(CalcError::invalid_input(
                "weeks_earliest",
                "0",
                "Turnaround must be at least 1 week",
            ));
        }
        if self.weeks_earliest > self.weeks_latest {
            return Err(CalcError::invalid_input(
                "weeks_latest",
                self.weeks_latest.to_string(),
                format!("Latest turnaround is before the earliest ({} weeks)", self.weeks_earliest),
            ));
        }
        for (field, value) in [("feasibility_fee", self.feasibility_fee), ("ca_allowance", self.ca_allowance)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Fee must be non-negative"));
            }
        }
        Ok(())
    }

    /// `4 weeks` or `4–6 weeks`
    pub fn timeline(&self) -> String {
        if self.weeks_earliest == self.weeks_latest {
            format!("{} weeks", self.weeks_earliest)
        } else {
            format!("{}–{} weeks", self.weeks_earliest, self.weeks_latest)
        }
    }
}

const INCLUDED: [&str; 3] = [
    "Structural review + design of major framing/foundations and lateral stability using standard hardware",
    "Typical coordination for architectural integration + common permit comments",
    "Limited construction-phase support (RFIs/submittal review) and site observations, if requested",
];

const ASSUMPTIONS: [(&str, &str); 7] = [
    (
        "PDFs govern",
        "Engineering is based on the latest architect-issued, dimensioned PDF set. CAD/BIM (if provided) is non-governing and may not be reviewed; we do not verify CAD/PDF consistency.",
    ),
    (
        "Geometry lock",
        "Architectural geometry is assumed frozen upon engineering start. Any changes to footprint, levels, rooflines, openings, or structural layout after start may affect fee and schedule.",
    ),
    (
        "Connections",
        "Unless specifically detailed, connections use standard, commercially available hardware with published load data; custom/architectural connection design is excluded.",
    ),
    (
        "Guardrails",
        "Guardrail systems are assumed to be prescriptive or manufacturer-engineered; we design only the supporting framing and blocking.",
    ),
    (
        "Consultants",
        "Architectural, MEP, FP, civil, and geotechnical design are by others.",
    ),
    (
        "Site Access",
        "Site access must allow standard visual observation without special equipment or confined-space requirements.",
    ),
    (
        "Reimbursables",
        "Expenses such as municipal fees or specialty tools will be billed at cost with Client approval.",
    ),
];

const INTRO: &str = "My understanding of the scope is as follows: structural engineering services for [PROPOSED_SCOPE] at [PROJECT ADDRESS], including design and detailing for:";
const BUDGET_INTRO: &str =
    "Based on the current information, I believe your engineering budgets for this project should be as follows:";
const TIMELINE: &str = "Right now, we could have drawings ready in {{TIMELINE}}. However, that figure fluctuates along with our backlog. Once we have a signed contract and retainer, we can reserve you a spot on our schedule.";
const CLOSING: &str = "Please let me know if you’d like to move forward.";

const FEASIBILITY_LABEL: &str = "Feasibility";
const ENGINEERING_LABEL: &str = "Engineering (Design + Permit Set)";
const CA_LABEL: &str = "Construction Administration (CA) Allowance (optional)";

const SCOPE_PLACEHOLDERS: [&str; 3] = ["[Item 1]", "[Item 2]", "[Item 3]"];

/// `$1,500.00`, or `None` for a zero (N/A) figure
fn optional_money(amount: f64) -> Option<String> {
    (amount > 0.0).then(|| format!("${}", format_money(amount)))
}

/// Render the plain-text email.
pub fn render_text(engineering_fee: Dollars, options: &EmailOptions) -> CalcResult<String> {
    options.validate()?;

    let mut out = String::new();
    let bullet = |out: &mut String, text: &str| {
        out.push_str("  • ");
        out.push_str(text);
        out.push('\n');
    };

    out.push_str(INTRO);
    out.push('\n');
    for item in SCOPE_PLACEHOLDERS {
        bullet(&mut out, item);
    }

    out.push('\n');
    out.push_str(BUDGET_INTRO);
    out.push('\n');
    let feasibility = optional_money(options.feasibility_fee).unwrap_or_else(|| "N/A".to_string());
    bullet(&mut out, &format!("{}: {}", FEASIBILITY_LABEL, feasibility));
    bullet(
        &mut out,
        &format!("{}: ${}", ENGINEERING_LABEL, format_money(engineering_fee.0)),
    );
    let ca = optional_money(options.ca_allowance).unwrap_or_else(|| "N/A".to_string());
    bullet(&mut out, &format!("{}: {}", CA_LABEL, ca));

    out.push('\n');
    out.push_str(&TIMELINE.replace("{{TIMELINE}}", &options.timeline()));
    out.push_str("\n\n");

    out.push_str("What’s included (high level):\n");
    for item in INCLUDED {
        bullet(&mut out, item);
    }

    out.push('\n');
    out.push_str("Assumptions / qualifications (important):\n");
    for (title, text) in ASSUMPTIONS {
        bullet(&mut out, &format!("{}: {}", title, text));
    }

    out.push('\n');
    out.push_str(CLOSING);
    out.push('\n');
    Ok(out)
}

const DIV_OPEN: &str = r#"<div style="font-family: Arial, Helvetica, sans-serif; font-size: small; color: #000000; line-height: 1.5;">"#;
const P_FIRST: &str = r#"<p style="margin: 0 0 10px 0;">"#;
const P: &str = r#"<p style="margin: 10px 0;">"#;
const UL: &str = r#"<ul style="padding-left: 28px; margin: 8px 0;">"#;
const LI: &str = r#"<li style="margin-bottom: 4px; list-style-type: disc;">"#;

fn html_list<I, S>(out: &mut String, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    out.push_str(UL);
    out.push('\n');
    for item in items {
        out.push_str(LI);
        out.push_str(item.as_ref());
        out.push_str("</li>\n");
    }
    out.push_str("</ul>\n");
}

/// Render the HTML email (inline styles only).
pub fn render_html(engineering_fee: Dollars, options: &EmailOptions) -> CalcResult<String> {
    options.validate()?;

    let labeled = |label: &str, value: Option<String>| match value {
        Some(v) => format!("<b>{}:</b> {}", label, v),
        None => format!("<b>{}:</b> <i>N/A</i>", label),
    };

    let mut out = String::new();
    out.push_str(DIV_OPEN);
    out.push('\n');

    out.push_str(P_FIRST);
    out.push_str(INTRO);
    out.push_str("</p>\n");
    html_list(&mut out, SCOPE_PLACEHOLDERS);

    out.push_str(P);
    out.push_str(BUDGET_INTRO);
    out.push_str("</p>\n");
    html_list(
        &mut out,
        [
            labeled(FEASIBILITY_LABEL, optional_money(options.feasibility_fee)),
            labeled(ENGINEERING_LABEL, Some(format!("${}", format_money(engineering_fee.0)))),
            labeled(CA_LABEL, optional_money(options.ca_allowance)),
        ],
    );

    out.push_str(P);
    out.push_str(&TIMELINE.replace("{{TIMELINE}}", &format!("<b>{}</b>", options.timeline())));
    out.push_str("</p>\n");

    out.push_str(P);
    out.push_str("<b>What’s included (high level):</b></p>\n");
    html_list(&mut out, INCLUDED);

    out.push_str(P);
    out.push_str("<b>Assumptions / qualifications (important):</b></p>\n");
    html_list(
        &mut out,
        ASSUMPTIONS
            .iter()
            .map(|(title, text)| format!("<b>{}:</b> {}", title, text)),
    );

    out.push_str(P);
    out.push_str(CLOSING);
    out.push_str("</p>\n</div>\n");
    Ok(out)
}
