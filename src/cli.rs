//! CLI entry logic.
//!
//! The binary takes a single positional argument: the path to the
//! configuration document. Configuration errors abort before any synthesis
//! with exit code 2 and no partial output; an oracle-requested termination
//! propagates the oracle's own status code.

use std::path::Path;

use tracing::{error, info};

use javabind_core::config::Config;
use javabind_core::error::JavabindResult;

use crate::oracle::AnalyzerOracle;
use crate::pipeline::{Pipeline, RunReport};

/// Load the configuration and run a full generation pass.
pub fn run_generate(config_path: &Path) -> JavabindResult<RunReport> {
    let config = Config::load(config_path)?;
    let oracle = AnalyzerOracle::discover()?;
    let report = Pipeline::new(&config, &oracle).run()?;
    summarize(&report);
    Ok(report)
}

fn summarize(report: &RunReport) {
    info!(
        rounds = report.rounds,
        files = report.files_written.len(),
        skipped = report.skipped.len(),
        unresolved = report.unresolved.len(),
        "generation complete"
    );
    for (fullname, reason) in &report.skipped {
        error!(declaration = %fullname, %reason, "skipped");
    }
    for name in &report.unresolved {
        error!(type_name = %name, "unresolved after fixed point");
    }
}
