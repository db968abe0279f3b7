//! Where suite progress and signatures are written

use crate::suite::{Case, CaseError, CaseOutcome, SuiteReport};
use litesvm_exp_sdk::TransactionReceipt;
use std::{
    fmt,
    io::{self, Stdout, Write},
    sync::{Mutex, PoisonError},
};
use tracing::{info, warn};

pub trait Reporter: Send + Sync {
    /// A case obtained a confirmed signature
    fn signature(&self, case: Case, receipt: &TransactionReceipt);

    fn case_finished(&self, outcome: &CaseOutcome);

    fn suite_finished(&self, report: &SuiteReport);
}

/// Mocha-style lines on stdout (or any writer), mirrored as tracing events
#[derive(Debug)]
pub struct ConsoleReporter<W = Stdout> {
    out: Mutex<W>,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn with_writer(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn line(&self, args: fmt::Arguments<'_>) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = writeln!(out, "{args}") {
            warn!("could not write suite output: {err}");
        }
    }
}

impl<W: Write + Send> Reporter for ConsoleReporter<W> {
    fn signature(&self, case: Case, receipt: &TransactionReceipt) {
        info!(%case, signature = %receipt.signature, "transaction confirmed");
        self.line(format_args!("Your transaction signature {}", receipt.signature));
    }

    fn case_finished(&self, outcome: &CaseOutcome) {
        match &outcome.result {
            Ok(()) => self.line(format_args!("  ok {}", outcome.case)),
            Err(err) => {
                let logs: &[String] = match err {
                    CaseError::Smoke(smoke) => smoke.logs(),
                    CaseError::Assertion(_) => &[],
                };
                warn!(case = %outcome.case, ?logs, "failed: {err}");
                self.line(format_args!("  FAILED {}: {err}", outcome.case));
                for log in logs {
                    self.line(format_args!("    {log}"));
                }
            }
        }
    }

    fn suite_finished(&self, report: &SuiteReport) {
        self.line(format_args!(""));
        if let Some(err) = &report.setup_error {
            self.line(format_args!("{}: could not start: {err}", report.suite));
            return;
        }
        self.line(format_args!("{}: {} passing", report.suite, report.passing()));
        if report.failing() > 0 {
            self.line(format_args!("{}: {} failing", report.suite, report.failing()));
        }
    }
}
