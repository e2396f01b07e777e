//! Handles all user-facing output for the CLI.
//!
//! Everything renders into a `WriteColor` so the same code drives the
//! terminal and the in-memory buffers used by tests.

use std::io::{self, Write};
use std::path::PathBuf;

use difference::{Changeset, Difference};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::errors::ParseError;
use crate::harness::{Capabilities, ExecutionResult, Status, Summary, TestCase};

// ============================================================================
// STREAMS AND COLORS
// ============================================================================

pub fn stdout(use_colors: bool) -> StandardStream {
    StandardStream::stdout(color_choice(use_colors))
}

fn color_choice(use_colors: bool) -> ColorChoice {
    if use_colors {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Pass => Color::Green,
        Status::Fail => Color::Red,
        Status::Skip => Color::Yellow,
        Status::Error => Color::Magenta,
    }
}

fn write_colored(out: &mut dyn WriteColor, text: &str, color: Color) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{text}")?;
    out.reset()
}

// ============================================================================
// RUN REPORTS
// ============================================================================

/// One line per result; failures and errors get their detail and a diff.
pub fn print_results(out: &mut dyn WriteColor, results: &[ExecutionResult]) -> io::Result<()> {
    for result in results {
        write_colored(out, result.status.as_str(), status_color(result.status))?;
        write!(out, ": {}", result.id)?;
        match (&result.status, &result.detail) {
            (Status::Skip, Some(detail)) => writeln!(out, " ({})", detail.message)?,
            (Status::Fail | Status::Error, Some(detail)) => {
                writeln!(out)?;
                writeln!(out, "  Error: {}", detail.message)?;
                if let (Some(expected), Some(actual)) = (&detail.expected, &detail.actual) {
                    writeln!(out, "  Diff:")?;
                    print_diff(out, expected, actual)?;
                }
            }
            _ => writeln!(out)?,
        }
    }
    Ok(())
}

/// Line diff of an expected and an actual value.
pub fn print_diff(out: &mut dyn WriteColor, expected: &str, actual: &str) -> io::Result<()> {
    let changeset = Changeset::new(expected, actual, "\n");
    for diff in &changeset.diffs {
        match diff {
            Difference::Same(x) => {
                out.reset()?;
                writeln!(out, "    {x}")?;
            }
            Difference::Rem(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                writeln!(out, "  - expected: {x}")?;
            }
            Difference::Add(x) => {
                out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                writeln!(out, "  + actual:   {x}")?;
            }
        }
    }
    out.reset()
}

pub fn print_summary(out: &mut dyn WriteColor, summary: &Summary) -> io::Result<()> {
    write!(out, "\nTest summary: total {}, ", summary.total())?;
    write_colored(out, "passed", Color::Green)?;
    write!(out, " {}, ", summary.passed)?;
    write_colored(out, "failed", Color::Red)?;
    write!(out, " {}, ", summary.failed)?;
    write_colored(out, "skipped", Color::Yellow)?;
    write!(out, " {}, ", summary.skipped)?;
    write_colored(out, "errored", Color::Magenta)?;
    writeln!(out, " {}", summary.errored)?;
    writeln!(out, "Success rate: {:.1}%", summary.success_rate())
}

/// Renders each parse error as a full diagnostic on stderr.
pub fn print_parse_errors(errors: Vec<(PathBuf, ParseError)>) {
    for (path, error) in errors {
        let report = miette::Report::new(error);
        eprintln!("{}:\n{report:?}", path.display());
    }
}

// ============================================================================
// JSON OUTPUT
// ============================================================================

#[derive(Debug, Serialize)]
pub struct JsonParseError {
    pub path: PathBuf,
    pub message: String,
}

/// Machine-readable run report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub summary: Summary,
    pub results: &'a [ExecutionResult],
    pub parse_errors: Vec<JsonParseError>,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        summary: Summary,
        results: &'a [ExecutionResult],
        parse_errors: &[(PathBuf, ParseError)],
    ) -> Self {
        Self {
            summary,
            results,
            parse_errors: parse_errors
                .iter()
                .map(|(path, error)| JsonParseError {
                    path: path.clone(),
                    message: error.to_string(),
                })
                .collect(),
        }
    }
}

pub fn write_json<W: Write>(out: W, report: &JsonReport<'_>) -> serde_json::Result<()> {
    serde_json::to_writer_pretty(out, report)
}

// ============================================================================
// LISTING AND INSPECTION
// ============================================================================

/// Test ids, marking those without a bound body.
pub fn print_listing(
    out: &mut dyn WriteColor,
    cases: &[TestCase],
    is_bound: impl Fn(&str) -> bool,
) -> io::Result<()> {
    if cases.is_empty() {
        writeln!(out, "  No tests found.")?;
        return Ok(());
    }
    for case in cases {
        write!(out, "  {}", case.id)?;
        if !is_bound(&case.id) {
            write!(out, " ")?;
            write_colored(out, "(no body)", Color::Yellow)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "\n{} tests", cases.len())
}

/// Metadata and skip decision of one test under `capabilities`.
pub fn print_case(
    out: &mut dyn WriteColor,
    case: &TestCase,
    capabilities: &Capabilities,
    skip: Option<&str>,
    bound: bool,
) -> io::Result<()> {
    let metadata = &case.metadata;
    writeln!(out, "id:          {}", case.id)?;
    writeln!(out, "path:        {}", case.path.display())?;
    if let Some(esid) = &metadata.esid {
        writeln!(out, "esid:        {esid}")?;
    }
    writeln!(out, "description: {}", case.description())?;
    if !metadata.features.is_empty() {
        writeln!(out, "features:    {}", metadata.features.join(", "))?;
    }
    if !metadata.flags.is_empty() {
        writeln!(out, "flags:       {}", metadata.flags.join(", "))?;
    }
    if !metadata.includes.is_empty() {
        writeln!(out, "includes:    {}", metadata.includes.join(", "))?;
    }
    if let Some(negative) = &metadata.negative {
        writeln!(out, "negative:    {} {}", negative.phase, negative.error_type)?;
    }
    if let Some(condition) = case.skip_condition() {
        writeln!(out, "skip-if:     {condition}")?;
    }
    writeln!(out, "sentinel:    {}", case.has_sentinel)?;
    writeln!(out, "body:        {}", if bound { "bound" } else { "unbound" })?;
    let host: Vec<&str> = capabilities.iter().collect();
    writeln!(out, "host:        [{}]", host.join(", "))?;
    write!(out, "decision:    ")?;
    match skip {
        Some(reason) => {
            write_colored(out, "SKIP", Color::Yellow)?;
            writeln!(out, " ({reason})")
        }
        None => {
            write_colored(out, "RUN", Color::Green)?;
            writeln!(out)
        }
    }
}
