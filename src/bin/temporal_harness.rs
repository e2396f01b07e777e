// Conformance runner for the Temporal engine.
// Usage: temporal-harness run [ROOT] [--capability NAME] [--json]

use clap::Parser;
use temporal_harness::cli::{self, HarnessArgs};

fn main() {
    let args = HarnessArgs::parse();
    cli::init_tracing(args.verbose);
    cli::run(args);
}
