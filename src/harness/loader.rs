use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use miette::NamedSource;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::config::Capabilities;
use super::metadata::Metadata;
use super::reftest::{Condition, DirectiveError, Reftest};
use crate::errors::{span, HarnessError, ParseError, SourceArc};

const METADATA_OPEN: &str = "/*---";
const METADATA_CLOSE: &str = "---*/";
const REFTEST_MARKER: &str = "|reftest|";

static SENTINEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"reportCompare\(\s*0\s*,\s*0\s*\)").expect("valid regex"));

// ============================================================================
// TYPES
// ============================================================================

/// A loaded test file. Immutable once loaded.
#[derive(Debug, Clone, Serialize)]
pub struct TestCase {
    /// Path relative to the suite root, `/`-separated.
    pub id: String,
    pub path: PathBuf,
    pub metadata: Metadata,
    pub reftest: Reftest,
    pub body: String,
    /// Whether the body ends in the `reportCompare(0, 0)` completion sentinel.
    pub has_sentinel: bool,
}

impl TestCase {
    pub fn skip_condition(&self) -> Option<Condition> {
        self.reftest.skip_condition()
    }

    pub fn description(&self) -> &str {
        self.metadata.description()
    }
}

/// Every test file under a root, loaded. Files that fail to parse are kept
/// apart so the rest of the suite can still run.
#[derive(Debug, Default)]
pub struct Suite {
    pub cases: Vec<TestCase>,
    pub errors: Vec<(PathBuf, ParseError)>,
}

// ============================================================================
// DISCOVERY
// ============================================================================

/// Returns true for files the loader treats as tests.
fn is_test_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".js")
        && !name.ends_with("_FIXTURE.js")
        && name != "shell.js"
        && name != "browser.js"
}

/// Recursively scans a directory for test files.
///
/// The returned list of files is sorted to ensure deterministic execution order.
pub fn discover_test_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, HarnessError> {
    let root = root.as_ref();
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|source| HarnessError::Walk {
            root: root.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !is_test_file(entry.path()) {
            continue;
        }
        files.push(entry.path().to_path_buf());
    }
    files.sort();
    debug!(root = %root.display(), count = files.len(), "discovered test files");
    Ok(files)
}

/// Loads every test file under `root`.
pub fn load_suite<P: AsRef<Path>>(root: P) -> Result<Suite, HarnessError> {
    let root = root.as_ref();
    let mut suite = Suite::default();
    for path in discover_test_files(root)? {
        match load_test_case(root, &path) {
            Ok(case) => suite.cases.push(case),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to load test file");
                suite.errors.push((path, err));
            }
        }
    }
    Ok(suite)
}

// ============================================================================
// PARSING
// ============================================================================

/// Reads and parses the test file at `path`; its id is taken relative to
/// `root`.
pub fn load_test_case(root: &Path, path: &Path) -> Result<TestCase, ParseError> {
    let source = fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_test_source(&test_id(root, path), path, source)
}

/// Derives the id of a test file: its path relative to `root` with `/`
/// separators.
pub fn test_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Parses test file contents.
pub fn parse_test_source(id: &str, path: &Path, source: String) -> Result<TestCase, ParseError> {
    let src: SourceArc = Arc::new(NamedSource::new(path.display().to_string(), source.clone()));

    let reftest = parse_reftest_header(&source, &src)?;

    let Some(open) = source.find(METADATA_OPEN) else {
        return Err(ParseError::MissingMetadata {
            src,
            span: span(0, first_line_end(&source)),
        });
    };
    let yaml_start = open + METADATA_OPEN.len();
    let Some(close_rel) = source[yaml_start..].find(METADATA_CLOSE) else {
        return Err(ParseError::UnterminatedMetadata {
            src,
            span: span(open, yaml_start),
        });
    };
    let yaml_end = yaml_start + close_rel;
    let block_span = span(open, yaml_end + METADATA_CLOSE.len());

    let metadata: Metadata = serde_yaml::from_str(&source[yaml_start..yaml_end]).map_err(|err| {
        let label = match err.location() {
            Some(loc) => {
                let at = (yaml_start + loc.index()).min(yaml_end);
                span(at, (at + 1).min(yaml_end))
            }
            None => block_span,
        };
        ParseError::InvalidMetadata {
            message: err.to_string(),
            src: src.clone(),
            span: label,
        }
    })?;

    if metadata.description.as_deref().map_or(true, |d| d.trim().is_empty()) {
        return Err(ParseError::MissingKey {
            key: "description",
            src,
            span: block_span,
        });
    }

    let body = source[yaml_end + METADATA_CLOSE.len()..].to_string();
    let has_sentinel = SENTINEL.is_match(&body);
    debug!(id, features = ?metadata.features, has_sentinel, "loaded test case");

    Ok(TestCase {
        id: id.to_string(),
        path: path.to_path_buf(),
        metadata,
        reftest,
        body,
        has_sentinel,
    })
}

fn first_line_end(source: &str) -> usize {
    source.find('\n').unwrap_or(source.len())
}

fn parse_reftest_header(source: &str, src: &SourceArc) -> Result<Reftest, ParseError> {
    let line = &source[..first_line_end(source)];
    let Some(marker) = line.find(REFTEST_MARKER) else {
        return Ok(Reftest::default());
    };
    if !line[..marker].trim_start().starts_with("//") {
        return Ok(Reftest::default());
    }
    let offset = marker + REFTEST_MARKER.len();
    Reftest::parse(&line[offset..]).map_err(|err| match err {
        DirectiveError::Unknown {
            directive,
            start,
            end,
        } => ParseError::UnknownDirective {
            directive,
            src: src.clone(),
            span: span(offset + start, offset + end),
        },
        DirectiveError::Condition {
            condition,
            start,
            end,
        } => ParseError::UnsupportedCondition {
            condition,
            src: src.clone(),
            span: span(offset + start, offset + end),
        },
    })
}

// ============================================================================
// SKIP DECISION
// ============================================================================

/// Decides whether `case` should be skipped, and why.
///
/// Checked in order: the header's skip predicate, declared features the
/// host does not provide, and the id filter.
pub fn skip_reason(
    case: &TestCase,
    capabilities: &Capabilities,
    filter: Option<&str>,
) -> Option<String> {
    if let Some(condition) = case.reftest.triggered_skip(capabilities) {
        let mut reason = format!("skip-if({condition})");
        if let Some(comment) = &case.reftest.comment {
            reason.push_str(" -- ");
            reason.push_str(comment);
        }
        return Some(reason);
    }
    if let Some(missing) = case
        .metadata
        .features
        .iter()
        .find(|feature| !capabilities.contains(feature))
    {
        return Some(format!("Unsupported feature: {missing}"));
    }
    if let Some(f) = filter {
        if !case.id.to_lowercase().contains(&f.to_lowercase()) {
            return Some(format!("Filtered out by substring: {f}"));
        }
    }
    None
}
