//! Sequential, fail-fast check execution.

use crate::alert::AlertSender;
use crate::check::Check;
use crate::command::CommandRunner;
use crate::config::AlertConfig;
use crate::event_log::{EventLog, Severity};

/// Everything probes and actions need during a run.
pub struct RunContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub alerts: &'a dyn AlertSender,
    pub alert: &'a AlertConfig,
    pub log: &'a EventLog,
}

/// Result of running a sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every check passed
    AllPassed,
    /// The named check failed; later checks were not attempted
    Failed { check: String },
}

impl RunOutcome {
    pub fn passed(&self) -> bool {
        matches!(self, Self::AllPassed)
    }
}

/// Ordered list of checks.
#[derive(Debug, Clone, Default)]
pub struct TestRunner {
    checks: Vec<Check>,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a check to the end of the sequence.
    pub fn add(&mut self, check: Check) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Run checks in order, stopping at the first failure.
    ///
    /// Each check logs its outcome, then runs either its success actions or
    /// its fail actions (plus the alert, if eligible), never both.
    pub async fn run(&self, ctx: &RunContext<'_>) -> RunOutcome {
        for check in &self.checks {
            let passed = check.probe().evaluate(ctx).await;

            let (severity, verdict) = if passed {
                (Severity::Info, "passed")
            } else {
                (Severity::Error, "failed")
            };
            ctx.log
                .write(severity, &format!("test \"{}\" {}", check.name(), verdict));

            for action in check.actions_for(passed) {
                ctx.log.info(format!("executing {action}"));
                action.execute(ctx).await;
            }

            if !passed {
                return RunOutcome::Failed {
                    check: check.name().to_string(),
                };
            }
        }

        RunOutcome::AllPassed
    }
}

impl FromIterator<Check> for TestRunner {
    fn from_iter<I: IntoIterator<Item = Check>>(iter: I) -> Self {
        Self {
            checks: iter.into_iter().collect(),
        }
    }
}
