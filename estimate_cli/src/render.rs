//! Plain-text rendering of an estimate.

use std::fmt::Write;

use estimate_core::form::Adjustment;
use estimate_core::format::{format_money, format_num};
use estimate_core::job::JobMetadata;
use estimate_core::ledger::{Ledger, LineItem};
use estimate_core::EstimateResult;

const RULE: &str = "═══════════════════════════════════════════════════════════════════════════════════════";
const LABEL_WIDTH: usize = 42;
const DETAIL_WIDTH: usize = 30;
const VALUE_WIDTH: usize = 14;

/// One line per ledger item; emphasized rows are marked with `»`.
pub fn render_ledger(ledger: &Ledger) -> String {
    let mut out = String::new();
    for item in ledger {
        match item {
            LineItem::Heading { text } => {
                let _ = writeln!(out);
                let _ = writeln!(out, "{}", text);
                let _ = writeln!(out, "{}", "─".repeat(text.chars().count()));
            }
            LineItem::Note { text } => {
                let _ = writeln!(out, "  note: {}", text);
            }
            LineItem::Row {
                label,
                detail,
                value,
                emphasized,
            } => {
                let marker = if *emphasized { "»" } else { " " };
                let _ = writeln!(
                    out,
                    "{} {:<lw$} {:<dw$} {:>vw$}",
                    marker,
                    label,
                    detail,
                    value.to_string(),
                    lw = LABEL_WIDTH,
                    dw = DETAIL_WIDTH,
                    vw = VALUE_WIDTH
                );
            }
        }
    }
    out
}

/// Job header, input adjustments, ledger and summary banner.
pub fn render_report(meta: &JobMetadata, adjustments: &[Adjustment], result: &EstimateResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Job {}", if meta.job_id.is_empty() { "(unnumbered)" } else { meta.job_id.as_str() });
    if !meta.client.is_empty() {
        let _ = writeln!(out, "  Client:      {}", meta.client);
    }
    if !meta.prepared_by.is_empty() {
        let _ = writeln!(out, "  Prepared by: {}", meta.prepared_by);
    }
    let _ = writeln!(out, "  Rule set:    {}", result.rule_set);

    if !adjustments.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Input adjustments:");
        for adjustment in adjustments {
            let _ = writeln!(out, "  - {}", adjustment);
        }
    }

    out.push_str(&render_ledger(&result.ledger));
    out.push('\n');
    out.push_str(&render_summary(result));
    out
}

/// Banner with the four headline figures.
pub fn render_summary(result: &EstimateResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  ESTIMATE SUMMARY ({} rules)", result.rule_set);
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "  Total hours (exact):    {}", format_num(result.total_hours_exact.0));
    let _ = writeln!(out, "  Total hours (rounded):  {}", format_num(result.total_hours_rounded.0));
    let _ = writeln!(out, "  Fee (exact):            ${}", format_money(result.fee_exact.0));
    let _ = writeln!(out, "  Fee (rounded):          ${}", format_money(result.fee_rounded.0));
    let _ = writeln!(out, "{}", RULE);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimate_core::job::EstimateJob;
    use estimate_core::rules::REVISED;
    use estimate_core::scope::ScopeInput;

    #[test]
    fn test_ledger_lines() {
        let result = estimate_core::estimate(&ScopeInput::new(1), &REVISED);
        let text = render_ledger(&result.ledger);
        assert!(text.contains("Step 1: Convert Corners to Squares"));
        assert!(text.contains("note: Formula per outline"));
        let total = text
            .lines()
            .find(|line| line.contains("Fee (rounded hours)"))
            .unwrap();
        assert!(total.starts_with('»'));
        assert!(total.ends_with("$2,100.00"));
    }

    #[test]
    fn test_report_and_summary() {
        let job = EstimateJob::new("25-001", "Hillside", "J. Alvarez", 1);
        let result = estimate_core::estimate(&ScopeInput::new(1), &REVISED);
        let report = render_report(&job.meta, &[], &result);
        assert!(report.starts_with("Job 25-001"));
        assert!(report.contains("Client:      Hillside"));
        assert!(!report.contains("Input adjustments"));
        assert!(report.contains("Total hours (rounded):  14"));
        assert!(report.contains("Fee (rounded):          $2,100.00"));
    }
}
