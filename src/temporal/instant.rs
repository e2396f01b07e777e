use std::fmt;

use super::{datetime::PlainDateTime, EngineError, EngineResult, NS_PER_DAY};

/// Largest representable epoch nanosecond value (100 million days).
pub const NS_MAX_INSTANT: i128 = 100_000_000 * NS_PER_DAY;
/// Smallest representable epoch nanosecond value.
pub const NS_MIN_INSTANT: i128 = -NS_MAX_INSTANT;

/// An exact point on the timeline, in nanoseconds since 1970-01-01T00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    epoch_nanoseconds: i128,
}

impl Instant {
    pub fn from_epoch_nanoseconds(epoch_nanoseconds: i128) -> EngineResult<Self> {
        if !is_valid_epoch_nanoseconds(epoch_nanoseconds) {
            return Err(EngineError::range(format!(
                "epoch nanoseconds {epoch_nanoseconds} outside of the supported instant range"
            )));
        }
        Ok(Self { epoch_nanoseconds })
    }

    pub fn epoch_nanoseconds(&self) -> i128 {
        self.epoch_nanoseconds
    }

    /// Adds a signed nanosecond amount, failing if the result leaves the
    /// instant range.
    pub fn add_nanoseconds(&self, nanoseconds: i128) -> EngineResult<Self> {
        let sum = self
            .epoch_nanoseconds
            .checked_add(nanoseconds)
            .ok_or_else(|| EngineError::range("instant arithmetic overflowed"))?;
        Self::from_epoch_nanoseconds(sum)
    }

    pub fn subtract_nanoseconds(&self, nanoseconds: i128) -> EngineResult<Self> {
        self.add_nanoseconds(-nanoseconds)
    }

    /// The UTC wall-clock reading of this instant.
    pub fn to_utc_date_time(&self) -> PlainDateTime {
        PlainDateTime::from_utc_epoch_nanoseconds(self.epoch_nanoseconds)
    }
}

/// Whether `epoch_nanoseconds` lies in the closed instant range.
pub fn is_valid_epoch_nanoseconds(epoch_nanoseconds: i128) -> bool {
    (NS_MIN_INSTANT..=NS_MAX_INSTANT).contains(&epoch_nanoseconds)
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Z", self.to_utc_date_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_is_closed() {
        assert!(Instant::from_epoch_nanoseconds(NS_MAX_INSTANT).is_ok());
        assert!(Instant::from_epoch_nanoseconds(NS_MIN_INSTANT).is_ok());
        assert!(Instant::from_epoch_nanoseconds(NS_MAX_INSTANT + 1).is_err());
        assert!(Instant::from_epoch_nanoseconds(NS_MIN_INSTANT - 1).is_err());
    }

    #[test]
    fn arithmetic_checks_range() {
        let max = Instant::from_epoch_nanoseconds(NS_MAX_INSTANT).unwrap();
        let err = max.add_nanoseconds(1).unwrap_err();
        assert_eq!(err.kind, crate::temporal::ErrorKind::Range);
        assert_eq!(
            max.subtract_nanoseconds(1).unwrap().epoch_nanoseconds(),
            NS_MAX_INSTANT - 1
        );
    }

    #[test]
    fn displays_as_utc() {
        let epoch = Instant::from_epoch_nanoseconds(0).unwrap();
        assert_eq!(epoch.to_string(), "1970-01-01T00:00:00Z");
        let later = Instant::from_epoch_nanoseconds(43_200_000_000_001).unwrap();
        assert_eq!(later.to_string(), "1970-01-01T12:00:00.000000001Z");
    }
}
