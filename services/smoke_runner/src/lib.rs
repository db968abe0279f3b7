//! Smoke Test Runner
//!
//! Configures an execution context, resolves the litesvm_exp program and runs the
//! `litesvm_exp` suite against it.

pub mod config;
pub mod report;
pub mod suite;

pub use config::{Cli, Config};
pub use report::{ConsoleReporter, Reporter};
pub use suite::{run_suite, Case, CaseError, CaseOutcome, SuiteReport, SUITE_NAME};

use litesvm_exp_sdk::{
    descriptor::DEFAULT_IDL_PATH, ExecutionContext, ProgramDescriptor, SmokeError,
};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing::info;

/// Main entry point: configure, resolve, run the selected cases.
///
/// Only a context that cannot be configured is returned as an error; everything after
/// that is recorded in the report.
pub async fn run(config: &Config, reporter: &dyn Reporter) -> Result<SuiteReport, SmokeError> {
    let ctx = ExecutionContext::connect(&config.provider)?;

    let descriptor = match idl_path(config.provider.idl_path.as_deref(), Path::new(".")) {
        Some(path) => {
            info!("loading program descriptor from {}", path.display());
            ProgramDescriptor::from_idl_file(&path)
        }
        None => Ok(ProgramDescriptor::compiled()),
    };

    Ok(match descriptor {
        Ok(descriptor) => run_suite(&ctx, descriptor, &config.cases, reporter).await,
        Err(err) => {
            let report = SuiteReport::aborted(err);
            reporter.suite_finished(&report);
            report
        }
    })
}

/// IDL to describe the program with: the configured one, else the `anchor build`
/// output under `root` when present
pub fn idl_path(configured: Option<&Path>, root: &Path) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    let built = root.join(DEFAULT_IDL_PATH);
    built.is_file().then_some(built)
}

/// Print every case name, one per line, in run order
pub fn list_cases(out: &mut impl Write) -> io::Result<()> {
    for case in Case::ALL {
        writeln!(out, "{case}")?;
    }
    Ok(())
}

/// Process exit status for a finished run: 0 iff every selected case passed
pub fn exit_status(report: &SuiteReport) -> u8 {
    u8::from(!report.passed())
}
