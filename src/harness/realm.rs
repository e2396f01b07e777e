//! The isolated evaluation context a test body runs in.
//!
//! A [`Realm`] is the body's whole view of the world: it gates the engine's
//! API surface behind capabilities and provides the assertion helpers
//! (`assert.throws`, `assert.sameValue`, `reportCompare`). Each run gets a
//! fresh realm, so outcomes from one test can never leak into another.

use std::fmt::Debug;

use serde::Serialize;
use thiserror::Error;

use super::config::Capabilities;
use super::outcome::AssertionOutcome;
use crate::temporal::{EngineError, EngineResult, ErrorKind};

/// The executable body of a test.
pub type TestBody = fn(&mut Realm) -> Result<(), Thrown>;

/// An assertion that did not hold. Aborts the body like a thrown
/// `Test262Error`.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{message}")]
pub struct AssertionFailure {
    pub message: String,
    pub expected: Option<String>,
    pub actual: Option<String>,
}

/// Whatever escapes a test body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Thrown {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("Test262Error: {0}")]
    Assertion(#[from] AssertionFailure),
    /// The realm lacks a binding the body needs. Never an expected failure.
    #[error(transparent)]
    Setup(EngineError),
}

#[derive(Debug)]
pub struct Realm {
    capabilities: Capabilities,
    outcomes: Vec<AssertionOutcome>,
    completed: bool,
}

impl Realm {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            capabilities,
            outcomes: Vec::new(),
            completed: false,
        }
    }

    /// Looks up a global binding. A capability the host lacks is a
    /// `ReferenceError`, as reading an undeclared global would be.
    pub fn require(&self, capability: &str) -> Result<(), Thrown> {
        if self.capabilities.contains(capability) {
            return Ok(());
        }
        Err(Thrown::Setup(EngineError::reference(format!(
            "{capability} is not defined"
        ))))
    }

    /// Calls `thunk` and expects it to fail with an error of exactly `kind`.
    pub fn assert_throws<T: Debug>(
        &mut self,
        kind: ErrorKind,
        thunk: impl FnOnce() -> EngineResult<T>,
        message: &str,
    ) -> Result<(), Thrown> {
        let (passed, actual, detail) = match thunk() {
            Err(err) if err.kind() == kind => (true, err.kind().to_string(), String::new()),
            Err(err) => (
                false,
                err.kind().to_string(),
                format!("Expected a {kind} but got a {}", err.kind()),
            ),
            Ok(value) => (
                false,
                format!("no exception (returned {value:?})"),
                format!("Expected a {kind} to be thrown but no exception was thrown at all"),
            ),
        };
        self.record("assert.throws", passed, message, detail, kind.to_string(), actual)
    }

    /// Expects `actual` and `expected` to be the same value.
    pub fn assert_same_value<T: PartialEq + Debug>(
        &mut self,
        actual: T,
        expected: T,
        message: &str,
    ) -> Result<(), Thrown> {
        let passed = actual == expected;
        let detail = if passed {
            String::new()
        } else {
            format!("Expected SameValue(«{actual:?}», «{expected:?}») to be true")
        };
        self.record(
            "assert.sameValue",
            passed,
            message,
            detail,
            format!("{expected:?}"),
            format!("{actual:?}"),
        )
    }

    /// Records whether `expected == actual` and marks the body as having run
    /// to completion. Does not abort the body on mismatch.
    pub fn report_compare<T: PartialEq + Debug>(&mut self, expected: T, actual: T) {
        let passed = expected == actual;
        self.outcomes.push(AssertionOutcome {
            assertion: "reportCompare".to_string(),
            passed,
            message: if passed {
                String::new()
            } else {
                "reportCompare values differ".to_string()
            },
            expected: Some(format!("{expected:?}")),
            actual: Some(format!("{actual:?}")),
        });
        self.completed = true;
    }

    pub fn outcomes(&self) -> &[AssertionOutcome] {
        &self.outcomes
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    /// Consumes the realm, returning its recorded outcomes and whether the
    /// completion sentinel was reached.
    pub fn into_parts(self) -> (Vec<AssertionOutcome>, bool) {
        (self.outcomes, self.completed)
    }

    fn record(
        &mut self,
        assertion: &str,
        passed: bool,
        message: &str,
        detail: String,
        expected: String,
        actual: String,
    ) -> Result<(), Thrown> {
        let message = match (message.is_empty(), detail.is_empty()) {
            (_, true) => message.to_string(),
            (true, false) => detail,
            (false, false) => format!("{detail} {message}"),
        };
        self.outcomes.push(AssertionOutcome {
            assertion: assertion.to_string(),
            passed,
            message: message.clone(),
            expected: Some(expected.clone()),
            actual: Some(actual.clone()),
        });
        if passed {
            return Ok(());
        }
        Err(Thrown::Assertion(AssertionFailure {
            message,
            expected: Some(expected),
            actual: Some(actual),
        }))
    }
}
