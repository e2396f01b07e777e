//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

pub const HOURS_IN_DAY: &str = "built-ins/Temporal/ZonedDateTime/prototype/hoursInDay";
pub const OUT_OF_RANGE: &str = "getoffsetnanosecondsfor-out-of-range-forward-offset-shift.js";
pub const EXACTLY_24_HOURS: &str = "getoffsetnanosecondsfor-forward-offset-shift-exactly-24-hours.js";
pub const UTC: &str = "timezone-utc.js";

pub fn bundled_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("suite")
}

pub fn test_id(file: &str) -> String {
    format!("{HOURS_IN_DAY}/{file}")
}

/// A scratch suite root holding copies of bundled test files.
pub struct ScratchSuite {
    dir: TempDir,
}

impl ScratchSuite {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn with_bundled(files: &[&str]) -> Self {
        let suite = Self::new();
        for file in files {
            suite.copy_bundled(file);
        }
        suite
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn copy_bundled(&self, file: &str) {
        let id = test_id(file);
        let source = fs::read_to_string(bundled_root().join(&id)).unwrap();
        self.write(&id, &source);
    }

    pub fn write(&self, id: &str, source: &str) {
        let path = self.dir.path().join(id);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, source).unwrap();
    }
}
