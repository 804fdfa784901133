//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use estimate_core::rules::RuleSetId;

/// Estimate - residential structural hour and fee estimator
#[derive(Parser, Debug)]
#[command(name = "estimate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv); overrides ESTIMATE_LOG
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (default: ./estimate.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Price a job file and print the itemized ledger
    Calc {
        /// Job file (*.estimate.json)
        job: PathBuf,

        /// Rule set to price under (revised, original)
        #[arg(long, value_name = "RULE_SET")]
        rules: Option<RuleSetId>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Write a template job file
    New {
        /// Path of the job file to create
        file: PathBuf,

        /// Number of stories (1-4)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=4))]
        stories: u8,

        /// Job number (default: file name)
        #[arg(long)]
        job_id: Option<String>,

        /// Client name
        #[arg(long, default_value = "")]
        client: String,

        /// Person preparing the estimate
        #[arg(long, default_value = "")]
        prepared_by: String,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print a rule table as JSON
    Rules {
        /// Rule set to print (default: settings)
        #[arg(long, value_name = "RULE_SET")]
        rules: Option<RuleSetId>,
    },

    /// Print the follow-up proposal email for a job
    Email {
        /// Job file (*.estimate.json)
        job: PathBuf,

        /// Rule set to price under (revised, original)
        #[arg(long, value_name = "RULE_SET")]
        rules: Option<RuleSetId>,

        /// Feasibility / pre-design site visit fee in dollars (0 = N/A)
        #[arg(long, value_name = "DOLLARS")]
        feasibility: Option<f64>,

        /// Construction administration allowance in dollars (0 = N/A)
        #[arg(long, value_name = "DOLLARS")]
        ca: Option<f64>,

        /// Earliest turnaround in weeks
        #[arg(long, value_name = "WEEKS")]
        weeks_earliest: Option<u32>,

        /// Latest turnaround in weeks
        #[arg(long, value_name = "WEEKS")]
        weeks_latest: Option<u32>,

        /// Emit HTML instead of plain text
        #[arg(long)]
        html: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_calc() {
        let cli = Cli::try_parse_from(["estimate", "-vv", "calc", "job.estimate.json", "--rules", "original", "--json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Calc { job, rules, json, output } => {
                assert_eq!(job, PathBuf::from("job.estimate.json"));
                assert_eq!(rules, Some(RuleSetId::Original));
                assert!(json);
                assert!(output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_rule_set_and_stories() {
        assert!(Cli::try_parse_from(["estimate", "rules", "--rules", "v9"]).is_err());
        assert!(Cli::try_parse_from(["estimate", "new", "a.estimate.json", "--stories", "5"]).is_err());
    }

    #[test]
    fn test_parse_email() {
        let cli = Cli::try_parse_from([
            "estimate",
            "email",
            "job.estimate.json",
            "--feasibility",
            "750",
            "--weeks-earliest",
            "3",
            "--html",
            "--config",
            "office.toml",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("office.toml")));
        match cli.command {
            Commands::Email {
                feasibility,
                weeks_earliest,
                weeks_latest,
                html,
                ..
            } => {
                assert_eq!(feasibility, Some(750.0));
                assert_eq!(weeks_earliest, Some(3));
                assert_eq!(weeks_latest, None);
                assert!(html);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
