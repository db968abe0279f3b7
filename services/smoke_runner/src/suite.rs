//! The litesvm_exp smoke suite and its cases

use crate::report::Reporter;
use litesvm_exp_sdk::{
    ExecutionContext, ProgramDescriptor, ProgramHandle, SmokeError, TransactionReceipt,
};
use std::fmt;
use thiserror::Error;
use tracing::{error, info};

pub const SUITE_NAME: &str = "litesvm_exp";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    IsInitialized,
    CounterInitialized,
    CounterIncrements,
    CounterDecrements,
    RepeatCounterInitializationRejected,
}

#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Smoke(#[from] SmokeError),

    #[error("assertion failed: {0}")]
    Assertion(String),
}

impl Case {
    /// Every case, in run order
    pub const ALL: [Case; 5] = [
        Case::IsInitialized,
        Case::CounterInitialized,
        Case::CounterIncrements,
        Case::CounterDecrements,
        Case::RepeatCounterInitializationRejected,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Case::IsInitialized => "Is initialized!",
            Case::CounterInitialized => "Counter is initialized",
            Case::CounterIncrements => "Counter increments",
            Case::CounterDecrements => "Counter decrements",
            Case::RepeatCounterInitializationRejected => {
                "Repeat counter initialization is rejected"
            }
        }
    }

    pub fn from_name(name: &str) -> Option<Case> {
        Self::ALL.into_iter().find(|case| case.name() == name)
    }

    pub async fn run(
        self,
        program: &ProgramHandle<'_>,
        reporter: &dyn Reporter,
    ) -> Result<(), CaseError> {
        match self {
            Case::IsInitialized => {
                let receipt = program.initialize().await?;
                report_signature(self, &receipt, reporter)
            }
            Case::CounterInitialized => {
                let receipt = program.initialize_counter().await?;
                report_signature(self, &receipt, reporter)?;
                expect_count(program, 0).await
            }
            Case::CounterIncrements => {
                let before = program.fetch_counter().await?.count;
                let expected = before.checked_add(1).ok_or_else(|| {
                    CaseError::Assertion(format!("counter is saturated at {before}"))
                })?;
                let receipt = program.increment_counter().await?;
                report_signature(self, &receipt, reporter)?;
                expect_count(program, expected).await
            }
            Case::CounterDecrements => {
                let before = program.fetch_counter().await?.count;
                let expected = before
                    .checked_sub(1)
                    .ok_or_else(|| CaseError::Assertion("counter is already zero".to_string()))?;
                let receipt = program.decrement_counter().await?;
                report_signature(self, &receipt, reporter)?;
                expect_count(program, expected).await
            }
            Case::RepeatCounterInitializationRejected => {
                match program.fetch_counter().await {
                    Ok(_) => {}
                    Err(SmokeError::Account { .. }) => {
                        program.initialize_counter().await?;
                    }
                    Err(err) => return Err(err.into()),
                }

                match program.initialize_counter().await {
                    Ok(receipt) => Err(CaseError::Assertion(format!(
                        "second initialize_counter was confirmed as {}",
                        receipt.signature
                    ))),
                    Err(err) if err.is_already_initialized() => Ok(()),
                    Err(err) => Err(CaseError::Assertion(format!(
                        "expected an already-initialized rejection, got: {err}"
                    ))),
                }
            }
        }
    }
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn report_signature(
    case: Case,
    receipt: &TransactionReceipt,
    reporter: &dyn Reporter,
) -> Result<(), CaseError> {
    let signature = receipt.signature.to_string();
    if signature.is_empty() {
        return Err(CaseError::Assertion("empty transaction signature".to_string()));
    }
    reporter.signature(case, receipt);
    Ok(())
}

async fn expect_count(program: &ProgramHandle<'_>, expected: u64) -> Result<(), CaseError> {
    let actual = program.fetch_counter().await?.count;
    if actual != expected {
        return Err(CaseError::Assertion(format!(
            "counter is {actual}, expected {expected}"
        )));
    }
    Ok(())
}

#[derive(Debug)]
pub struct CaseOutcome {
    pub case: Case,
    pub result: Result<(), CaseError>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug)]
pub struct SuiteReport {
    pub suite: &'static str,
    /// Failure before any case could run, e.g. the program could not be resolved
    pub setup_error: Option<SmokeError>,
    pub outcomes: Vec<CaseOutcome>,
}

impl SuiteReport {
    pub fn aborted(error: SmokeError) -> Self {
        Self {
            suite: SUITE_NAME,
            setup_error: Some(error),
            outcomes: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.setup_error.is_none() && self.outcomes.iter().all(CaseOutcome::passed)
    }

    pub fn passing(&self) -> usize {
        self.outcomes.iter().filter(|o| o.passed()).count()
    }

    pub fn failing(&self) -> usize {
        self.outcomes.len() - self.passing()
    }

    pub fn outcome(&self, case: Case) -> Option<&CaseOutcome> {
        self.outcomes.iter().find(|o| o.case == case)
    }
}

/// Cases named in `names`, in suite order; all cases when `names` is empty
pub fn select_cases(names: &[String]) -> Result<Vec<Case>, SmokeError> {
    if names.is_empty() {
        return Ok(Case::ALL.to_vec());
    }

    for name in names {
        if Case::from_name(name).is_none() {
            return Err(SmokeError::Configuration(format!(
                "suite {SUITE_NAME} has no case {name:?}"
            )));
        }
    }

    Ok(Case::ALL
        .into_iter()
        .filter(|case| names.iter().any(|name| name == case.name()))
        .collect())
}

/// Resolve the program under `ctx` and run `cases` in order.
///
/// A failing case does not stop later ones; a failed resolution aborts the suite.
pub async fn run_suite(
    ctx: &ExecutionContext,
    descriptor: ProgramDescriptor,
    cases: &[Case],
    reporter: &dyn Reporter,
) -> SuiteReport {
    let program = match ProgramHandle::resolve(ctx, descriptor).await {
        Ok(program) => program,
        Err(err) => {
            error!("{SUITE_NAME}: {err}");
            let report = SuiteReport::aborted(err);
            reporter.suite_finished(&report);
            return report;
        }
    };

    let mut outcomes = Vec::with_capacity(cases.len());
    for &case in cases {
        info!(%case, "running");
        let outcome = CaseOutcome {
            case,
            result: case.run(&program, reporter).await,
        };
        reporter.case_finished(&outcome);
        outcomes.push(outcome);
    }

    let report = SuiteReport {
        suite: SUITE_NAME,
        setup_error: None,
        outcomes,
    };
    reporter.suite_finished(&report);
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_names_round_trip() {
        for case in Case::ALL {
            assert_eq!(Case::from_name(case.name()), Some(case));
        }
        assert_eq!(Case::from_name("is initialized"), None);
    }

    #[test]
    fn test_select_keeps_suite_order() {
        let cases = select_cases(&[
            "Counter decrements".to_string(),
            "Is initialized!".to_string(),
        ])
        .unwrap();
        assert_eq!(cases, vec![Case::IsInitialized, Case::CounterDecrements]);
    }

    #[test]
    fn test_select_all_by_default() {
        assert_eq!(select_cases(&[]).unwrap(), Case::ALL.to_vec());
    }

    #[test]
    fn test_select_unknown_case() {
        let err = select_cases(&["Is deployed!".to_string()]).unwrap_err();
        assert!(matches!(err, SmokeError::Configuration(_)));
    }

    #[test]
    fn test_aborted_report_fails() {
        let report = SuiteReport::aborted(SmokeError::Resolution("gone".to_string()));
        assert!(!report.passed());
        assert_eq!(report.passing(), 0);
        assert_eq!(report.failing(), 0);
    }
}
