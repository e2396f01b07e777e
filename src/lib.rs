//! A test262-style conformance harness and the minimal Temporal engine it
//! exercises.

pub mod cli;
pub mod errors;
pub mod harness;
pub mod suite;
pub mod temporal;

pub use errors::{HarnessError, ParseError};
pub use harness::{
    BodyRegistry, ExecutionResult, HarnessConfig, Realm, Reporter, RunReport, Runner, Status,
    Summary, TestCase, Thrown,
};
