// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Named check results and the assertions that produce them

use crate::error::{Result, VerifyError};
use std::fmt;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub outcome: Outcome,
}

/// Results of one suite. Every check is recorded; a failing check never
/// prevents the ones after it from running.
#[derive(Debug, Clone)]
pub struct Report {
    suite: String,
    checks: Vec<CheckResult>,
}

impl Report {
    pub fn new(suite: impl Into<String>) -> Self {
        Self {
            suite: suite.into(),
            checks: Vec::new(),
        }
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    /// Record the result of a named check
    pub fn record(&mut self, name: &str, result: Result<()>) {
        let outcome = match result {
            Ok(()) => {
                info!(suite = %self.suite, check = name, "PASS");
                Outcome::Passed
            }
            Err(e) => {
                error!(suite = %self.suite, check = name, "FAIL: {}", e);
                Outcome::Failed(e.to_string())
            }
        };
        self.checks.push(CheckResult {
            name: name.to_string(),
            outcome,
        });
    }

    pub fn checks(&self) -> &[CheckResult] {
        &self.checks
    }

    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.checks.iter().find(|c| c.name == name).map(|c| &c.outcome)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.checks
            .iter()
            .filter(|c| matches!(c.outcome, Outcome::Failed(_)))
    }

    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.failures().count();
        writeln!(
            f,
            "{}: {} passed, {} failed",
            self.suite,
            self.checks.len() - failed,
            failed
        )?;
        for check in &self.checks {
            match &check.outcome {
                Outcome::Passed => writeln!(f, "  PASS {}", check.name)?,
                Outcome::Failed(reason) => writeln!(f, "  FAIL {}: {}", check.name, reason)?,
            }
        }
        Ok(())
    }
}

/// Fail unless `value` is non-empty
pub fn assert_not_empty(value: &str, message: &str) -> Result<()> {
    if value.is_empty() {
        return Err(VerifyError::Assertion(message.to_string()));
    }
    Ok(())
}

/// Fail unless `actual` equals `expected`
pub fn assert_equal<T>(expected: T, actual: T, message: &str) -> Result<()>
where
    T: PartialEq + fmt::Debug,
{
    if expected != actual {
        return Err(VerifyError::Assertion(format!(
            "{}: expected {:?}, actual {:?}",
            message, expected, actual
        )));
    }
    Ok(())
}

/// Fail unless the strings are equal ignoring case
pub fn assert_equal_ignore_case(expected: &str, actual: &str, message: &str) -> Result<()> {
    assert_equal(expected.to_lowercase(), actual.to_lowercase(), message)
}
