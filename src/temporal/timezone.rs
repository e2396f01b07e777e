//! The time-zone capability.
//!
//! A zone is anything that can report its UTC offset at an instant and list
//! the instants a wall-clock reading may denote. Built-in zones implement the
//! trait directly; a custom zone can wrap a built-in one and override only the
//! operations it cares about.
//!
//! Callers inside the engine never use the trait methods directly. They go
//! through [`offset_nanoseconds_for`] and [`possible_instants_for`], which
//! validate what an arbitrary implementation hands back.

use std::fmt;

use super::{datetime::PlainDateTime, EngineError, EngineResult, Instant, NS_PER_DAY};

pub trait TimeZone: fmt::Debug {
    fn id(&self) -> &str;

    /// UTC offset in nanoseconds in effect at `instant`.
    fn offset_nanoseconds_for(&self, instant: &Instant) -> EngineResult<i64>;

    /// Every instant whose wall-clock reading in this zone is `date_time`,
    /// in ascending order. Empty inside a gap, several inside an overlap.
    fn possible_instants_for(&self, date_time: &PlainDateTime) -> EngineResult<Vec<Instant>>;
}

/// Coordinated Universal Time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utc;

impl TimeZone for Utc {
    fn id(&self) -> &str {
        "UTC"
    }

    fn offset_nanoseconds_for(&self, _instant: &Instant) -> EngineResult<i64> {
        Ok(0)
    }

    fn possible_instants_for(&self, date_time: &PlainDateTime) -> EngineResult<Vec<Instant>> {
        let instant = Instant::from_epoch_nanoseconds(date_time.utc_epoch_nanoseconds())?;
        Ok(vec![instant])
    }
}

/// A zone with a constant offset from UTC, e.g. `+05:30`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedOffset {
    id: String,
    offset_nanoseconds: i64,
}

impl FixedOffset {
    /// Builds a zone from a whole-minute offset. The offset must be strictly
    /// less than a day in magnitude.
    pub fn from_minutes(minutes: i32) -> EngineResult<Self> {
        if minutes.unsigned_abs() >= 24 * 60 {
            return Err(EngineError::range(format!(
                "offset of {minutes} minutes is out of range"
            )));
        }
        let sign = if minutes < 0 { '-' } else { '+' };
        let abs = minutes.unsigned_abs();
        Ok(Self {
            id: format!("{sign}{:02}:{:02}", abs / 60, abs % 60),
            offset_nanoseconds: minutes as i64 * 60_000_000_000,
        })
    }
}

impl TimeZone for FixedOffset {
    fn id(&self) -> &str {
        &self.id
    }

    fn offset_nanoseconds_for(&self, _instant: &Instant) -> EngineResult<i64> {
        Ok(self.offset_nanoseconds)
    }

    fn possible_instants_for(&self, date_time: &PlainDateTime) -> EngineResult<Vec<Instant>> {
        let epoch_ns = date_time.utc_epoch_nanoseconds() - self.offset_nanoseconds as i128;
        Ok(vec![Instant::from_epoch_nanoseconds(epoch_ns)?])
    }
}

/// Asks `zone` for its offset at `instant`, rejecting offsets of a day or
/// more.
pub fn offset_nanoseconds_for(zone: &dyn TimeZone, instant: &Instant) -> EngineResult<i64> {
    let offset = zone.offset_nanoseconds_for(instant)?;
    if (offset as i128).abs() >= NS_PER_DAY {
        return Err(EngineError::range(format!(
            "offset {offset}ns returned by time zone {} is out of range",
            zone.id()
        )));
    }
    Ok(offset)
}

/// Asks `zone` for the candidate instants of `date_time`, rejecting any that
/// lie more than a day away from the wall-clock reading taken as UTC.
pub fn possible_instants_for(
    zone: &dyn TimeZone,
    date_time: &PlainDateTime,
) -> EngineResult<Vec<Instant>> {
    let candidates = zone.possible_instants_for(date_time)?;
    let utc = date_time.utc_epoch_nanoseconds();
    for candidate in &candidates {
        if (candidate.epoch_nanoseconds() - utc).abs() > NS_PER_DAY {
            return Err(EngineError::range(format!(
                "time zone {} returned {candidate} for {date_time}, more than a day away",
                zone.id()
            )));
        }
    }
    Ok(candidates)
}

/// The wall-clock reading of `instant` in `zone`.
pub fn plain_date_time_for(zone: &dyn TimeZone, instant: &Instant) -> EngineResult<PlainDateTime> {
    let offset = offset_nanoseconds_for(zone, instant)?;
    Ok(PlainDateTime::from_utc_epoch_nanoseconds(
        instant.epoch_nanoseconds() + offset as i128,
    ))
}
