//! Defines the command-line arguments and subcommands for the harness CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "temporal-harness",
    version,
    about = "Runs test262-style conformance tests against the Temporal engine."
)]
pub struct HarnessArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Log harness internals to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// An enumeration of all available CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Discover, run and report every test under a suite root.
    Run(RunArgs),
    /// List the test ids under a suite root and whether each has a body.
    List {
        /// The suite root. Defaults to the configured root.
        root: Option<PathBuf>,
        /// Read settings from a YAML config file.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Parse one test file and print its metadata and skip decision.
    Show {
        /// The path to the test file.
        #[arg(required = true)]
        file: PathBuf,
        /// The suite root the test id is taken relative to. Defaults to the
        /// configured root.
        #[arg(long)]
        root: Option<PathBuf>,
        /// Read settings from a YAML config file.
        #[arg(long)]
        config: Option<PathBuf>,
        #[command(flatten)]
        capabilities: CapabilityArgs,
    },
}

/// Adjustments to the host capability set.
#[derive(Debug, Default, Args)]
pub struct CapabilityArgs {
    /// Add a host capability (repeatable).
    #[arg(long = "capability", value_name = "NAME")]
    pub with: Vec<String>,

    /// Remove a host capability (repeatable).
    #[arg(long = "without-capability", value_name = "NAME")]
    pub without: Vec<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// The suite root. Defaults to the configured root.
    pub root: Option<PathBuf>,

    /// Read settings from a YAML config file.
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub capabilities: CapabilityArgs,

    /// Number of worker threads.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Per-test timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Only run tests whose id contains this substring.
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Print the results as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}
