//! Harness error types.
//!
//! Loader failures are `miette` diagnostics that carry the offending file as
//! their source code, so the CLI can point at the exact line of a malformed
//! metadata block. Everything a test body does wrong is *not* an error of this
//! module: those become statuses in an `ExecutionResult`.

use std::path::PathBuf;
use std::sync::Arc;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

pub type SourceArc = Arc<NamedSource<String>>;

/// A test file could not be turned into a `TestCase`.
#[derive(Debug, Error, Diagnostic)]
pub enum ParseError {
    #[error("failed to read test file {}", path.display())]
    #[diagnostic(code(harness::parse::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("missing /*--- ... ---*/ metadata block")]
    #[diagnostic(
        code(harness::parse::missing_metadata),
        help("every test file declares esid, description and features in a leading /*--- ---*/ comment")
    )]
    MissingMetadata {
        #[source_code]
        src: SourceArc,
        #[label("expected the metadata block before the test body")]
        span: SourceSpan,
    },

    #[error("unterminated metadata block")]
    #[diagnostic(code(harness::parse::unterminated_metadata))]
    UnterminatedMetadata {
        #[source_code]
        src: SourceArc,
        #[label("opened here, never closed with ---*/")]
        span: SourceSpan,
    },

    #[error("invalid metadata: {message}")]
    #[diagnostic(code(harness::parse::invalid_metadata))]
    InvalidMetadata {
        message: String,
        #[source_code]
        src: SourceArc,
        #[label("{message}")]
        span: SourceSpan,
    },

    #[error("metadata is missing required key `{key}`")]
    #[diagnostic(code(harness::parse::missing_key))]
    MissingKey {
        key: &'static str,
        #[source_code]
        src: SourceArc,
        #[label("declared here")]
        span: SourceSpan,
    },

    #[error("unrecognized reftest directive `{directive}`")]
    #[diagnostic(
        code(harness::parse::unknown_directive),
        help("known directives: skip, skip-if(..), fails, fails-if(..), random, slow, module, async")
    )]
    UnknownDirective {
        directive: String,
        #[source_code]
        src: SourceArc,
        #[label("unknown directive")]
        span: SourceSpan,
    },

    #[error("unsupported reftest condition `{condition}`")]
    #[diagnostic(
        code(harness::parse::unsupported_condition),
        help("conditions are `true`, `false` or `[!]this.hasOwnProperty('Name')`")
    )]
    UnsupportedCondition {
        condition: String,
        #[source_code]
        src: SourceArc,
        #[label("cannot evaluate this condition")]
        span: SourceSpan,
    },
}

/// Failures of the harness itself, outside any single test file.
#[derive(Debug, Error, Diagnostic)]
pub enum HarnessError {
    #[error("failed to walk test directory {}", root.display())]
    #[diagnostic(code(harness::discovery))]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to read config file {}", path.display())]
    #[diagnostic(code(harness::config::io))]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    #[diagnostic(code(harness::config::invalid))]
    ConfigInvalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error("failed to start worker pool")]
    #[diagnostic(code(harness::pool))]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write report")]
    #[diagnostic(code(harness::report))]
    Report(#[from] serde_json::Error),

    #[error("failed to write output")]
    #[diagnostic(code(harness::output))]
    Output(#[from] std::io::Error),
}

/// Converts a byte range into a `SourceSpan`.
pub fn span(start: usize, end: usize) -> SourceSpan {
    SourceSpan::new(start.into(), end.saturating_sub(start))
}
