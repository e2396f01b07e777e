//! Conformance test harness
//!
//! Runs test262-style test files against the engine in [`crate::temporal`].
//!
//! # Architecture
//!
//! 1. **Discovery**: find `.js` test files under a suite root ([`loader`])
//! 2. **Loading**: parse the reftest header and the `/*--- ---*/` metadata block
//! 3. **Skip decision**: evaluate the skip predicate and declared features
//!    against the configured capabilities
//! 4. **Execution**: run the body bound to the test id in a fresh [`Realm`]
//!    on its own thread, under a timeout ([`sandbox`])
//! 5. **Reporting**: record exactly one [`ExecutionResult`] per test id
//!    ([`reporter`])
//!
//! # Test Format
//!
//! ```text
//! // |reftest| skip-if(!this.hasOwnProperty('Temporal')) -- reason
//! /*---
//! esid: sec-temporal.zoneddatetime.prototype.hoursinday
//! description: What the test checks
//! features: [Temporal]
//! ---*/
//! ...body...
//! reportCompare(0, 0);
//! ```
//!
//! Bodies are native functions registered in a [`BodyRegistry`] under the
//! test id, the file's path relative to the suite root.

pub mod config;
pub mod loader;
pub mod metadata;
pub mod outcome;
pub mod realm;
pub mod reftest;
pub mod registry;
pub mod reporter;
pub mod runner;
pub mod sandbox;

pub use config::{Capabilities, HarnessConfig};
pub use loader::{discover_test_files, load_suite, load_test_case, skip_reason, Suite, TestCase};
pub use metadata::{Metadata, Negative};
pub use outcome::{AssertionOutcome, ExecutionResult, FailureDetail, Status};
pub use realm::{AssertionFailure, Realm, TestBody, Thrown};
pub use reftest::{Condition, Directive, Reftest};
pub use registry::BodyRegistry;
pub use reporter::{Reporter, Summary};
pub use runner::{RunReport, Runner};
pub use sandbox::Sandbox;
