//! The main entry point for all CLI commands.
//!
//! Commands resolve a `HarnessConfig` from defaults, an optional YAML file and
//! flags, then hand off to the harness and render what comes back.

pub mod args;
pub mod output;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use tracing_subscriber::EnvFilter;

pub use args::{CapabilityArgs, Command, HarnessArgs, RunArgs};

use crate::errors::HarnessError;
use crate::harness::{
    load_suite, load_test_case, skip_reason, BodyRegistry, Capabilities, HarnessConfig, Runner,
};

// ============================================================================
// MAIN ENTRY POINT
// ============================================================================

/// Installs the `tracing` subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "temporal_harness=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs the parsed command, exiting with status 1 if anything failed.
pub fn run(args: HarnessArgs) {
    match execute(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("{:?}", miette::Report::new(e));
            process::exit(1);
        }
    }
}

/// Returns whether the command succeeded.
pub fn execute(args: HarnessArgs) -> Result<bool, HarnessError> {
    let no_color = args.no_color;
    match args.command {
        Command::Run(run_args) => run_suite(run_args, no_color),
        Command::List { root, config } => {
            let config = resolve_config(config.as_deref(), root)?;
            list_suite(&config, no_color)
        }
        Command::Show {
            file,
            root,
            config,
            capabilities,
        } => {
            let mut config = resolve_config(config.as_deref(), root)?;
            apply_capabilities(&mut config.capabilities, &capabilities);
            show_case(&config, &file, no_color)
        }
    }
}

// ============================================================================
// CONFIGURATION
// ============================================================================

fn resolve_config(path: Option<&Path>, root: Option<PathBuf>) -> Result<HarnessConfig, HarnessError> {
    let mut config = match path {
        Some(path) => HarnessConfig::load(path)?,
        None => HarnessConfig::default(),
    };
    if let Some(root) = root {
        config.test_root = root;
    }
    Ok(config)
}

fn apply_capabilities(capabilities: &mut Capabilities, args: &CapabilityArgs) {
    for name in &args.with {
        capabilities.insert(name.as_str());
    }
    for name in &args.without {
        capabilities.remove(name);
    }
}

fn apply_flags(config: &mut HarnessConfig, args: &RunArgs, no_color: bool) {
    apply_capabilities(&mut config.capabilities, &args.capabilities);
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    if args.filter.is_some() {
        config.filter = args.filter.clone();
    }
    if no_color {
        config.use_colors = false;
    }
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_suite(args: RunArgs, no_color: bool) -> Result<bool, HarnessError> {
    let mut config = resolve_config(args.config.as_deref(), args.root.clone())?;
    apply_flags(&mut config, &args, no_color);
    let use_colors = config.use_colors;

    let runner = Runner::new(config, BodyRegistry::builtin());
    let report = runner.run_suite()?;
    let success = report.is_success();
    let results = report.reporter.results();
    let summary = report.reporter.summary();

    if args.json {
        let json = output::JsonReport::new(summary, &results, &report.parse_errors);
        let mut stdout = std::io::stdout().lock();
        output::write_json(&mut stdout, &json)?;
        writeln!(stdout)?;
    } else {
        let mut out = output::stdout(use_colors);
        output::print_results(&mut out, &results)?;
        output::print_summary(&mut out, &summary)?;
        out.flush()?;
    }
    output::print_parse_errors(report.parse_errors);
    Ok(success)
}

fn list_suite(config: &HarnessConfig, no_color: bool) -> Result<bool, HarnessError> {
    let suite = load_suite(&config.test_root)?;
    let registry = BodyRegistry::builtin();
    let mut out = output::stdout(config.use_colors && !no_color);
    output::print_listing(&mut out, &suite.cases, |id| registry.get(id).is_some())?;
    out.flush()?;
    let success = suite.errors.is_empty();
    output::print_parse_errors(suite.errors);
    Ok(success)
}

fn show_case(config: &HarnessConfig, file: &Path, no_color: bool) -> Result<bool, HarnessError> {
    let case = load_test_case(&config.test_root, file)?;
    let skip = skip_reason(&case, &config.capabilities, None);
    let bound = BodyRegistry::builtin().get(&case.id).is_some();
    let mut out = output::stdout(config.use_colors && !no_color);
    output::print_case(&mut out, &case, &config.capabilities, skip.as_deref(), bound)?;
    out.flush()?;
    Ok(true)
}
