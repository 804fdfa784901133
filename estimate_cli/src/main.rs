//! # Estimate CLI
//!
//! Command-line front end for `estimate_core`.
//!
//! ```text
//! estimate new 25-001.estimate.json --stories 2 --client "Hillside"
//! estimate calc 25-001.estimate.json
//! estimate calc 25-001.estimate.json --rules original --json -o result.json
//! estimate email 25-001.estimate.json --feasibility 750 --html
//! estimate rules --rules original
//! ```
//!
//! Logging goes to stderr; set `ESTIMATE_LOG` (e.g. `estimate_core=debug`)
//! or pass `-v`/`-vv`.

mod cli;
mod commands;
mod logging;
mod render;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match commands::run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.error_code(), "command failed");
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}
