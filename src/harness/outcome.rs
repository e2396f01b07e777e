use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Pass,
    /// An assertion ran and did not hold.
    Fail,
    /// Deliberately not executed.
    Skip,
    /// Anything else went wrong: an unexpected throw, a panic, a timeout, or
    /// the realm could not be set up.
    Error,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pass => "PASS",
            Status::Fail => "FAIL",
            Status::Skip => "SKIP",
            Status::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The result of one assertion call inside a test body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionOutcome {
    /// Which helper recorded it: `assert.throws`, `assert.sameValue` or
    /// `reportCompare`.
    pub assertion: String,
    pub passed: bool,
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

impl FailureDetail {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            expected: None,
            actual: None,
        }
    }
}

impl From<&AssertionOutcome> for FailureDetail {
    fn from(outcome: &AssertionOutcome) -> Self {
        Self {
            message: outcome.message.clone(),
            expected: outcome.expected.clone(),
            actual: outcome.actual.clone(),
        }
    }
}

/// The outcome of running one test case. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: String,
    pub status: Status,
    pub detail: Option<FailureDetail>,
    pub outcomes: Vec<AssertionOutcome>,
    pub elapsed_ms: u64,
}

impl ExecutionResult {
    pub fn skipped(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Status::Skip,
            detail: Some(FailureDetail::message(reason)),
            outcomes: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn errored(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Status::Error,
            detail: Some(FailureDetail::message(message)),
            outcomes: Vec::new(),
            elapsed_ms: 0,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Pass | Status::Skip)
    }
}
