use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::outcome::{ExecutionResult, Status};

/// Counts of results by status.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub errored: usize,
}

impl Summary {
    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.errored > 0
    }

    pub fn total(&self) -> usize {
        self.passed + self.failed + self.skipped + self.errored
    }

    /// Percentage of executed (non-skipped) tests that passed.
    pub fn success_rate(&self) -> f64 {
        let executed = self.total() - self.skipped;
        if executed == 0 {
            return 0.0;
        }
        (self.passed as f64 / executed as f64) * 100.0
    }

    fn count(&mut self, status: Status) {
        match status {
            Status::Pass => self.passed += 1,
            Status::Fail => self.failed += 1,
            Status::Skip => self.skipped += 1,
            Status::Error => self.errored += 1,
        }
    }
}

/// Collects one result per test id. Safe to share between worker threads.
#[derive(Debug, Default)]
pub struct Reporter {
    results: Mutex<BTreeMap<String, ExecutionResult>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `result`, replacing any earlier result for the same id.
    pub fn record(&self, result: ExecutionResult) {
        self.lock().insert(result.id.clone(), result);
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for result in self.lock().values() {
            summary.count(result.status);
        }
        summary
    }

    /// All results, ordered by id.
    pub fn results(&self) -> Vec<ExecutionResult> {
        self.lock().values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Option<ExecutionResult> {
        self.lock().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, ExecutionResult>> {
        // A panic while holding the lock leaves the map itself consistent.
        self.results
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: &str, status: Status) -> ExecutionResult {
        ExecutionResult {
            id: id.to_string(),
            status,
            detail: None,
            outcomes: Vec::new(),
            elapsed_ms: 0,
        }
    }

    #[test]
    fn rerecording_overwrites() {
        let reporter = Reporter::new();
        reporter.record(result("a.js", Status::Fail));
        reporter.record(result("a.js", Status::Pass));
        assert_eq!(reporter.len(), 1);
        assert_eq!(reporter.get("a.js").unwrap().status, Status::Pass);
    }

    #[test]
    fn summary_counts_by_status() {
        let reporter = Reporter::new();
        reporter.record(result("a.js", Status::Pass));
        reporter.record(result("b.js", Status::Fail));
        reporter.record(result("c.js", Status::Skip));
        reporter.record(result("d.js", Status::Error));
        reporter.record(result("e.js", Status::Pass));
        let summary = reporter.summary();
        assert_eq!(
            summary,
            Summary {
                passed: 2,
                failed: 1,
                skipped: 1,
                errored: 1,
            }
        );
        assert_eq!(summary.total(), 5);
        assert!(summary.has_failures());
        assert_eq!(summary.success_rate(), 50.0);
    }

    #[test]
    fn results_are_ordered_by_id() {
        let reporter = Reporter::new();
        reporter.record(result("b.js", Status::Pass));
        reporter.record(result("a.js", Status::Pass));
        let ids: Vec<_> = reporter.results().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["a.js", "b.js"]);
    }

    #[test]
    fn concurrent_records_are_all_kept() {
        let reporter = Reporter::new();
        std::thread::scope(|scope| {
            for i in 0..8 {
                let reporter = &reporter;
                scope.spawn(move || reporter.record(result(&format!("{i}.js"), Status::Pass)));
            }
        });
        assert_eq!(reporter.summary().passed, 8);
    }
}
