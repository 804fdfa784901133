//! Subcommand handlers.

use std::path::Path;

use serde::Serialize;

use estimate_core::email::{render_html, render_text, EmailOptions};
use estimate_core::errors::{CalcError, CalcResult};
use estimate_core::file_io::{discover_settings, load_job, save_job, write_atomic};
use estimate_core::form::Adjustment;
use estimate_core::job::{EstimateJob, JobMetadata, JOB_EXTENSION};
use estimate_core::rules::{RuleSet, RuleSetId};
use estimate_core::settings::EstimatorSettings;
use estimate_core::{estimate, EstimateResult};

use crate::cli::{Cli, Commands};
use crate::render::render_report;

/// JSON shape printed by `calc --json`
#[derive(Serialize)]
struct CalcReport<'a> {
    job: &'a JobMetadata,
    adjustments: &'a [Adjustment],
    result: &'a EstimateResult,
}

/// Dispatch a parsed command line.
pub fn run(cli: &Cli) -> CalcResult<()> {
    let settings = discover_settings(cli.config.as_deref(), Path::new("."))?;

    match &cli.command {
        Commands::Calc {
            job,
            rules,
            json,
            output,
        } => calc(job, *rules, *json, output.as_deref(), &settings),
        Commands::New {
            file,
            stories,
            job_id,
            client,
            prepared_by,
            force,
        } => new_job(file, *stories, job_id.as_deref(), client, prepared_by, *force),
        Commands::Rules { rules } => print_rules(rules.unwrap_or(settings.rule_set)),
        Commands::Email {
            job,
            rules,
            feasibility,
            ca,
            weeks_earliest,
            weeks_latest,
            html,
        } => {
            let defaults = EmailOptions::from(&settings.email);
            let options = EmailOptions {
                feasibility_fee: feasibility.unwrap_or(defaults.feasibility_fee),
                ca_allowance: ca.unwrap_or(defaults.ca_allowance),
                weeks_earliest: weeks_earliest.unwrap_or(defaults.weeks_earliest),
                weeks_latest: weeks_latest.unwrap_or(defaults.weeks_latest),
            };
            email(job, *rules, &options, *html, &settings)
        }
    }
}

/// Load, normalize and price a job.
fn price_job(
    path: &Path,
    rules: Option<RuleSetId>,
    settings: &EstimatorSettings,
) -> CalcResult<(EstimateJob, Vec<Adjustment>, EstimateResult)> {
    let job = load_job(path)?;
    let rules = match rules {
        Some(id) => RuleSet::for_id(id),
        None => job.rules(settings),
    };

    let normalized = job.scope.normalize(rules, settings);
    for adjustment in &normalized.adjustments {
        tracing::warn!(
            field = %adjustment.field,
            kind = %adjustment.kind,
            "{}",
            adjustment.message
        );
    }

    let result = estimate(&normalized.scope, rules);
    tracing::info!(
        job_id = %job.meta.job_id,
        rule_set = %result.rule_set,
        hours = result.total_hours_rounded.0,
        fee = result.fee_rounded.0,
        "job priced"
    );
    Ok((job, normalized.adjustments, result))
}

fn calc(
    path: &Path,
    rules: Option<RuleSetId>,
    json: bool,
    output: Option<&Path>,
    settings: &EstimatorSettings,
) -> CalcResult<()> {
    let (job, adjustments, result) = price_job(path, rules, settings)?;

    let text = if json {
        let report = CalcReport {
            job: &job.meta,
            adjustments: &adjustments,
            result: &result,
        };
        serde_json::to_string_pretty(&report)?
    } else {
        render_report(&job.meta, &adjustments, &result)
    };

    match output {
        Some(out) => {
            write_atomic(out, text.as_bytes())?;
            println!("Wrote {}", out.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

/// Job number from a file name: `25-001.estimate.json` → `25-001`
fn job_id_from_path(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let suffix = format!(".{}", JOB_EXTENSION);
    match name.strip_suffix(&suffix) {
        Some(stem) => stem.to_string(),
        None => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    }
}

fn new_job(
    path: &Path,
    stories: u8,
    job_id: Option<&str>,
    client: &str,
    prepared_by: &str,
    force: bool,
) -> CalcResult<()> {
    if path.exists() && !force {
        return Err(CalcError::file_error(
            "create",
            path.display().to_string(),
            "file already exists (use --force to overwrite)",
        ));
    }

    let job_id = job_id.map(str::to_string).unwrap_or_else(|| job_id_from_path(path));
    let job = EstimateJob::new(job_id, client, prepared_by, stories);
    save_job(&job, path)?;

    println!("Created {} ({} stor{})", path.display(), stories, if stories == 1 { "y" } else { "ies" });
    Ok(())
}

fn print_rules(id: RuleSetId) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(RuleSet::for_id(id))?;
    println!("{}", json);
    Ok(())
}

fn email(
    path: &Path,
    rules: Option<RuleSetId>,
    options: &EmailOptions,
    html: bool,
    settings: &EstimatorSettings,
) -> CalcResult<()> {
    let (_, _, result) = price_job(path, rules, settings)?;
    let body = if html {
        render_html(result.fee_rounded, options)?
    } else {
        render_text(result.fee_rounded, options)?
    };
    print!("{}", body);
    Ok(())
}
