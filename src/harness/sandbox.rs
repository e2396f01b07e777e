//! Isolated execution of a single test body.
//!
//! Every run builds a fresh [`Realm`] on a dedicated thread. The caller waits
//! for the thread's report with a timeout, so a body that hangs or panics is
//! classified as `Error` without taking the harness down with it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::config::Capabilities;
use super::loader::TestCase;
use super::metadata::Negative;
use super::outcome::{AssertionOutcome, ExecutionResult, FailureDetail, Status};
use super::realm::{Realm, TestBody, Thrown};

// ============================================================================
// TYPES
// ============================================================================

/// What came back from the test thread.
#[derive(Debug)]
enum RunOutcome {
    Finished {
        result: Result<(), Thrown>,
        outcomes: Vec<AssertionOutcome>,
        completed: bool,
    },
    Panicked {
        message: String,
        outcomes: Vec<AssertionOutcome>,
    },
    TimedOut,
    SetupFailed(String),
}

/// A classified run. `invertible` is false for infrastructure failures
/// (timeouts, thread or realm setup, panics), which a `fails` directive must
/// not turn into a pass.
#[derive(Debug)]
struct Verdict {
    result: ExecutionResult,
    invertible: bool,
}

impl Verdict {
    fn of_body(result: ExecutionResult) -> Self {
        Self {
            result,
            invertible: true,
        }
    }

    fn of_harness(result: ExecutionResult) -> Self {
        Self {
            result,
            invertible: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sandbox {
    capabilities: Capabilities,
    timeout: Duration,
}

// ============================================================================
// EXECUTION
// ============================================================================

impl Sandbox {
    pub fn new(capabilities: Capabilities, timeout: Duration) -> Self {
        Self {
            capabilities,
            timeout,
        }
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Runs `body` as the executable part of `case`.
    pub fn execute(&self, case: &TestCase, body: Option<TestBody>) -> ExecutionResult {
        let started = std::time::Instant::now();
        let Some(body) = body else {
            warn!(id = %case.id, "no body registered");
            return ExecutionResult::errored(
                &case.id,
                format!("no executable body bound to {}", case.id),
            );
        };

        let run = self.run_isolated(case, body);
        let Verdict {
            mut result,
            invertible,
        } = self.classify(case, run);
        if invertible && case.reftest.expects_failure(&self.capabilities) {
            result = expect_failure(result);
        }
        result.elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(id = %case.id, status = %result.status, elapsed_ms = result.elapsed_ms, "executed");
        result
    }

    fn run_isolated(&self, case: &TestCase, body: TestBody) -> RunOutcome {
        let (tx, rx) = mpsc::channel();
        let capabilities = self.capabilities.clone();
        let spawned = thread::Builder::new()
            .name(format!("test:{}", case.id))
            .spawn(move || {
                let mut realm = Realm::new(capabilities);
                let result = panic::catch_unwind(AssertUnwindSafe(|| body(&mut realm)));
                let (outcomes, completed) = realm.into_parts();
                let outcome = match result {
                    Ok(result) => RunOutcome::Finished {
                        result,
                        outcomes,
                        completed,
                    },
                    Err(payload) => RunOutcome::Panicked {
                        message: panic_message(payload.as_ref()),
                        outcomes,
                    },
                };
                // The receiver is gone once the run timed out.
                let _ = tx.send(outcome);
            });
        if let Err(err) = spawned {
            return RunOutcome::SetupFailed(format!("failed to start test thread: {err}"));
        }

        match rx.recv_timeout(self.timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => RunOutcome::TimedOut,
            Err(RecvTimeoutError::Disconnected) => RunOutcome::Panicked {
                message: "test thread exited without reporting".to_string(),
                outcomes: Vec::new(),
            },
        }
    }

    // ========================================================================
    // CLASSIFICATION
    // ========================================================================

    fn classify(&self, case: &TestCase, run: RunOutcome) -> Verdict {
        let (result, outcomes, completed) = match run {
            RunOutcome::TimedOut => {
                return Verdict::of_harness(ExecutionResult::errored(
                    &case.id,
                    format!("timed out after {} ms", self.timeout.as_millis()),
                ))
            }
            RunOutcome::SetupFailed(message) => {
                return Verdict::of_harness(ExecutionResult::errored(&case.id, message))
            }
            RunOutcome::Panicked { message, outcomes } => {
                return Verdict::of_harness(build(
                    case,
                    Status::Error,
                    Some(FailureDetail::message(format!("test body panicked: {message}"))),
                    outcomes,
                ))
            }
            RunOutcome::Finished {
                result,
                outcomes,
                completed,
            } => (result, outcomes, completed),
        };

        if let Err(Thrown::Setup(err)) = &result {
            let detail = FailureDetail::message(format!("realm setup failed: {err}"));
            return Verdict::of_harness(build(case, Status::Error, Some(detail), outcomes));
        }

        if let Some(negative) = &case.metadata.negative {
            if negative.phase != "runtime" {
                let detail = FailureDetail::message(format!(
                    "negative phase `{}` is not supported",
                    negative.phase
                ));
                return Verdict::of_harness(build(case, Status::Error, Some(detail), outcomes));
            }
            let (status, detail) = classify_negative(negative, result);
            return Verdict::of_body(build(case, status, detail, outcomes));
        }

        let (status, detail) = match result {
            Err(Thrown::Assertion(failure)) => (
                Status::Fail,
                Some(FailureDetail {
                    message: failure.message,
                    expected: failure.expected,
                    actual: failure.actual,
                }),
            ),
            Err(Thrown::Engine(err) | Thrown::Setup(err)) => (
                Status::Error,
                Some(FailureDetail::message(format!("Uncaught {err}"))),
            ),
            Ok(()) => match outcomes.iter().find(|o| !o.passed) {
                Some(failed) => (Status::Fail, Some(FailureDetail::from(failed))),
                None if case.has_sentinel && !completed => (
                    Status::Error,
                    Some(FailureDetail::message(
                        "test did not run to completion: reportCompare(0, 0) was never reached",
                    )),
                ),
                None => (Status::Pass, None),
            },
        };
        Verdict::of_body(build(case, status, detail, outcomes))
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn build(
    case: &TestCase,
    status: Status,
    detail: Option<FailureDetail>,
    outcomes: Vec<AssertionOutcome>,
) -> ExecutionResult {
    ExecutionResult {
        id: case.id.clone(),
        status,
        detail,
        outcomes,
        elapsed_ms: 0,
    }
}

/// Classifies a `runtime` negative test.
fn classify_negative(
    negative: &Negative,
    result: Result<(), Thrown>,
) -> (Status, Option<FailureDetail>) {
    match result {
        Err(Thrown::Engine(err)) if err.kind().as_str() == negative.error_type => (Status::Pass, None),
        Err(Thrown::Engine(err) | Thrown::Setup(err)) => (
            Status::Fail,
            Some(FailureDetail {
                message: format!("Expected a {} but got {err}", negative.error_type),
                expected: Some(negative.error_type.clone()),
                actual: Some(err.kind().to_string()),
            }),
        ),
        Err(Thrown::Assertion(failure)) => (
            Status::Fail,
            Some(FailureDetail {
                message: failure.message,
                expected: failure.expected,
                actual: failure.actual,
            }),
        ),
        Ok(()) => (
            Status::Fail,
            Some(FailureDetail {
                message: format!(
                    "Expected a {} to be thrown but the test completed normally",
                    negative.error_type
                ),
                expected: Some(negative.error_type.clone()),
                actual: None,
            }),
        ),
    }
}

/// Applies a `fails` directive: failures are expected, passes are not.
fn expect_failure(result: ExecutionResult) -> ExecutionResult {
    match result.status {
        Status::Fail | Status::Error => ExecutionResult {
            status: Status::Pass,
            detail: None,
            ..result
        },
        Status::Pass => ExecutionResult {
            status: Status::Fail,
            detail: Some(FailureDetail::message(
                "unexpected pass: test is marked as failing",
            )),
            ..result
        },
        Status::Skip => result,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::loader::parse_test_source;
    use crate::temporal::{EngineError, ErrorKind};
    use std::path::Path;

    fn case(header: &str, extra_meta: &str, sentinel: bool) -> TestCase {
        let source = format!(
            "{header}\n/*---\ndescription: sandbox test\n{extra_meta}---*/\n{}",
            if sentinel { "reportCompare(0, 0);\n" } else { "" }
        );
        parse_test_source("t.js", Path::new("t.js"), source).unwrap()
    }

    fn sandbox() -> Sandbox {
        Sandbox::new(Capabilities::host(), Duration::from_secs(5))
    }

    fn passes(realm: &mut Realm) -> Result<(), Thrown> {
        realm.assert_throws(
            ErrorKind::Range,
            || -> Result<(), EngineError> { Err(EngineError::range("x")) },
            "",
        )?;
        realm.report_compare(0, 0);
        Ok(())
    }

    fn fails(realm: &mut Realm) -> Result<(), Thrown> {
        realm.assert_throws(ErrorKind::Range, || Ok(1), "should throw")?;
        realm.report_compare(0, 0);
        Ok(())
    }

    fn throws_range(_: &mut Realm) -> Result<(), Thrown> {
        Err(EngineError::range("uncaught").into())
    }

    fn stops_early(_: &mut Realm) -> Result<(), Thrown> {
        Ok(())
    }

    fn panics(_: &mut Realm) -> Result<(), Thrown> {
        panic!("kaboom")
    }

    fn hangs(_: &mut Realm) -> Result<(), Thrown> {
        thread::sleep(Duration::from_secs(2));
        Ok(())
    }

    fn needs_intl(realm: &mut Realm) -> Result<(), Thrown> {
        realm.require("Intl")?;
        realm.report_compare(0, 0);
        Ok(())
    }

    fn compare_mismatch(realm: &mut Realm) -> Result<(), Thrown> {
        realm.report_compare(0, 1);
        Ok(())
    }

    #[test]
    fn passing_body_passes() {
        let result = sandbox().execute(&case("", "", true), Some(passes));
        assert_eq!(result.status, Status::Pass);
        assert_eq!(result.outcomes.len(), 2);
        assert!(result.detail.is_none());
    }

    #[test]
    fn failed_assertion_is_fail() {
        let result = sandbox().execute(&case("", "", true), Some(fails));
        assert_eq!(result.status, Status::Fail);
        let detail = result.detail.unwrap();
        assert_eq!(detail.expected.as_deref(), Some("RangeError"));
        assert_eq!(result.outcomes.len(), 1);
    }

    #[test]
    fn uncaught_engine_error_is_error() {
        let result = sandbox().execute(&case("", "", true), Some(throws_range));
        assert_eq!(result.status, Status::Error);
        assert!(result.detail.unwrap().message.contains("Uncaught RangeError"));
    }

    #[test]
    fn missing_sentinel_call_is_error() {
        let result = sandbox().execute(&case("", "", true), Some(stops_early));
        assert_eq!(result.status, Status::Error);
        // without a sentinel in the file there is nothing to reach
        let result = sandbox().execute(&case("", "", false), Some(stops_early));
        assert_eq!(result.status, Status::Pass);
    }

    #[test]
    fn report_compare_mismatch_is_fail() {
        let result = sandbox().execute(&case("", "", true), Some(compare_mismatch));
        assert_eq!(result.status, Status::Fail);
    }

    #[test]
    fn panic_is_error() {
        let result = sandbox().execute(&case("", "", true), Some(panics));
        assert_eq!(result.status, Status::Error);
        assert!(result.detail.unwrap().message.contains("kaboom"));
    }

    #[test]
    fn timeout_is_error() {
        let sandbox = Sandbox::new(Capabilities::host(), Duration::from_millis(50));
        let result = sandbox.execute(&case("", "", true), Some(hangs));
        assert_eq!(result.status, Status::Error);
        assert!(result.detail.unwrap().message.starts_with("timed out"));
    }

    #[test]
    fn unbound_body_is_error() {
        let result = sandbox().execute(&case("", "", true), None);
        assert_eq!(result.status, Status::Error);
    }

    #[test]
    fn negative_runtime_expectation() {
        let meta = "negative:\n  phase: runtime\n  type: RangeError\n";
        let result = sandbox().execute(&case("", meta, false), Some(throws_range));
        assert_eq!(result.status, Status::Pass);
        let result = sandbox().execute(&case("", meta, false), Some(stops_early));
        assert_eq!(result.status, Status::Fail);

        let parse_phase = "negative:\n  phase: parse\n  type: SyntaxError\n";
        let result = sandbox().execute(&case("", parse_phase, false), Some(stops_early));
        assert_eq!(result.status, Status::Error);
    }

    #[test]
    fn fails_directive_inverts_outcome() {
        let marked = case("// |reftest| fails", "", true);
        assert_eq!(sandbox().execute(&marked, Some(fails)).status, Status::Pass);
        assert_eq!(sandbox().execute(&marked, Some(passes)).status, Status::Fail);
    }

    #[test]
    fn fails_directive_keeps_timeouts_as_errors() {
        let marked = case("// |reftest| fails", "", true);
        let sandbox = Sandbox::new(Capabilities::host(), Duration::from_millis(50));
        let result = sandbox.execute(&marked, Some(hangs));
        assert_eq!(result.status, Status::Error);
        assert!(result.detail.unwrap().message.starts_with("timed out"));
    }

    #[test]
    fn fails_directive_keeps_missing_capabilities_as_errors() {
        let marked = case("// |reftest| fails", "", true);
        let result = sandbox().execute(&marked, Some(needs_intl));
        assert_eq!(result.status, Status::Error);
        assert!(result
            .detail
            .unwrap()
            .message
            .contains("ReferenceError: Intl is not defined"));
    }

    #[test]
    fn fails_directive_keeps_panics_as_errors() {
        let marked = case("// |reftest| fails", "", true);
        assert_eq!(sandbox().execute(&marked, Some(panics)).status, Status::Error);
    }

    #[test]
    fn fails_directive_inverts_uncaught_engine_errors() {
        let marked = case("// |reftest| fails", "", true);
        assert_eq!(sandbox().execute(&marked, Some(throws_range)).status, Status::Pass);
    }
}
