//! Temporal date/time engine
//!
//! The subset of a Temporal-style engine that conformance tests in this crate
//! exercise: exact instants, ISO date-times, a pluggable time-zone capability
//! and zoned date-times whose day length depends on the zone's transitions.
//!
//! Errors are classified the way the test suite observes them, by
//! [`ErrorKind`], so that `assert_throws(ErrorKind::Range, ..)` can be checked
//! without looking at messages.

pub mod datetime;
pub mod disambiguate;
pub mod error;
pub mod instant;
pub mod timezone;
pub mod zoned;

pub use datetime::PlainDateTime;
pub use disambiguate::{disambiguate_possible_instants, instant_for, Disambiguation};
pub use error::{EngineError, EngineResult, ErrorKind};
pub use instant::Instant;
pub use timezone::{FixedOffset, TimeZone, Utc};
pub use zoned::ZonedDateTime;

/// Nanoseconds in one 24-hour day.
pub const NS_PER_DAY: i128 = 86_400_000_000_000;

/// Nanoseconds in one hour.
pub const NS_PER_HOUR: i128 = 3_600_000_000_000;
