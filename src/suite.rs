//! Native bodies for the bundled conformance suite under `suite/`.
//!
//! Each body is the executable rendition of one test file and is registered
//! under that file's id.

pub mod hours_in_day;

use crate::harness::BodyRegistry;

/// Registers every bundled body into `registry`.
pub fn register(registry: &mut BodyRegistry) {
    hours_in_day::register(registry);
}
