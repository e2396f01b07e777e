use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::HarnessError;

const DEFAULT_TIMEOUT_MS: u64 = 10_000;
const SLOW_TIMEOUT_FACTOR: u32 = 4;

/// Named pieces of global API surface a realm exposes, e.g. `Temporal`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Capabilities(BTreeSet<String>);

impl Capabilities {
    /// Everything the bundled engine implements.
    pub fn host() -> Self {
        ["Temporal"].into_iter().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn remove(&mut self, name: &str) -> bool {
        self.0.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for Capabilities {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Configuration for discovery, execution and reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    pub test_root: PathBuf,
    pub capabilities: Capabilities,
    /// Worker threads; tests run in parallel across them.
    pub jobs: usize,
    pub timeout_ms: u64,
    pub use_colors: bool,
    /// Case-insensitive substring a test id must contain to run.
    pub filter: Option<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_root: PathBuf::from("suite"),
            capabilities: Capabilities::host(),
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            use_colors: atty::is(atty::Stream::Stderr),
            filter: None,
        }
    }
}

impl HarnessConfig {
    /// Loads a YAML config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, HarnessError> {
        let content = fs::read_to_string(path).map_err(|source| HarnessError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content).map_err(|source| HarnessError::ConfigInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Timeout for one test; tests marked `slow` get a longer budget.
    pub fn timeout_for(&self, slow: bool) -> Duration {
        if slow {
            self.timeout() * SLOW_TIMEOUT_FACTOR
        } else {
            self.timeout()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_exposes_temporal() {
        let config = HarnessConfig::default();
        assert!(config.capabilities.contains("Temporal"));
        assert!(config.jobs >= 1);
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn yaml_overrides_only_given_keys() {
        let config = HarnessConfig::from_yaml("capabilities: []\ntimeout_ms: 250\n").unwrap();
        assert!(!config.capabilities.contains("Temporal"));
        assert_eq!(config.timeout_for(false), Duration::from_millis(250));
        assert_eq!(config.timeout_for(true), Duration::from_millis(1000));
        assert_eq!(config.test_root, PathBuf::from("suite"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(HarnessConfig::from_yaml("retries: 3\n").is_err());
    }
}
