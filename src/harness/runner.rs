use std::path::PathBuf;

use rayon::prelude::*;
use tracing::{info, info_span};

use super::config::HarnessConfig;
use super::loader::{load_suite, skip_reason, TestCase};
use super::outcome::ExecutionResult;
use super::reftest::Directive;
use super::registry::BodyRegistry;
use super::reporter::Reporter;
use super::sandbox::Sandbox;
use crate::errors::{HarnessError, ParseError};

/// Everything a suite run produced.
#[derive(Debug)]
pub struct RunReport {
    pub reporter: Reporter,
    /// Files that could not be loaded; they have no result.
    pub parse_errors: Vec<(PathBuf, ParseError)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.parse_errors.is_empty() && !self.reporter.summary().has_failures()
    }
}

/// Drives loaded test cases through skip decision, sandbox and reporter.
#[derive(Debug)]
pub struct Runner {
    config: HarnessConfig,
    registry: BodyRegistry,
}

impl Runner {
    pub fn new(config: HarnessConfig, registry: BodyRegistry) -> Self {
        Self { config, registry }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs a single case. Skipped cases never reach the sandbox.
    pub fn run_case(&self, case: &TestCase) -> ExecutionResult {
        let _span = info_span!("test", id = %case.id).entered();
        let capabilities = &self.config.capabilities;
        if let Some(reason) = skip_reason(case, capabilities, self.config.filter.as_deref()) {
            info!(%reason, "skipped");
            return ExecutionResult::skipped(&case.id, reason);
        }
        let timeout = self
            .config
            .timeout_for(case.reftest.has(&Directive::Slow));
        let sandbox = Sandbox::new(capabilities.clone(), timeout);
        sandbox.execute(case, self.registry.get(&case.id))
    }

    /// Runs `cases` on the worker pool, recording into `reporter`.
    pub fn run_cases(&self, cases: &[TestCase], reporter: &Reporter) -> Result<(), HarnessError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.jobs.max(1))
            .thread_name(|i| format!("harness-worker-{i}"))
            .build()?;
        pool.install(|| {
            cases
                .par_iter()
                .for_each(|case| reporter.record(self.run_case(case)));
        });
        Ok(())
    }

    /// Loads the configured suite root and runs every case in it.
    pub fn run_suite(&self) -> Result<RunReport, HarnessError> {
        let root = &self.config.test_root;
        let suite = load_suite(root)?;
        info!(
            root = %root.display(),
            cases = suite.cases.len(),
            parse_errors = suite.errors.len(),
            jobs = self.config.jobs,
            "running suite"
        );
        let reporter = Reporter::new();
        self.run_cases(&suite.cases, &reporter)?;
        let summary = reporter.summary();
        info!(
            passed = summary.passed,
            failed = summary.failed,
            skipped = summary.skipped,
            errored = summary.errored,
            "suite finished"
        );
        Ok(RunReport {
            reporter,
            parse_errors: suite.errors,
        })
    }
}
