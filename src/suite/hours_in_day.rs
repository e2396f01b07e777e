//! `Temporal.ZonedDateTime.prototype.hoursInDay`

use std::rc::Rc;

use crate::harness::{BodyRegistry, Realm, Thrown};
use crate::temporal::{
    EngineResult, ErrorKind, Instant, PlainDateTime, TimeZone, Utc, ZonedDateTime, NS_PER_HOUR,
};

const DIR: &str = "built-ins/Temporal/ZonedDateTime/prototype/hoursInDay";

pub fn register(registry: &mut BodyRegistry) {
    registry.register(
        format!("{DIR}/getoffsetnanosecondsfor-out-of-range-forward-offset-shift.js"),
        out_of_range_forward_offset_shift,
    );
    registry.register(
        format!("{DIR}/getoffsetnanosecondsfor-forward-offset-shift-exactly-24-hours.js"),
        forward_offset_shift_exactly_24_hours,
    );
    registry.register(format!("{DIR}/timezone-utc.js"), timezone_utc);
}

/// A zone at -12:00 until 1970-01-01T12:00Z and at +12:00 plus
/// `excess_ns` afterwards, with 1970-01-01 missing from the local calendar.
/// Everything it does not override comes from UTC.
#[derive(Debug)]
pub struct ShiftedOffsetZone {
    utc: Utc,
    shift_epoch_ns: i128,
    excess_ns: i64,
}

impl ShiftedOffsetZone {
    pub fn new(excess_ns: i64) -> Self {
        Self {
            utc: Utc,
            shift_epoch_ns: 12 * NS_PER_HOUR,
            excess_ns,
        }
    }

    /// Offsets 24 hours and one nanosecond apart.
    pub fn longer_than_24_hours() -> Self {
        Self::new(1)
    }

    /// Offsets exactly 24 hours apart.
    pub fn exactly_24_hours() -> Self {
        Self::new(0)
    }

    fn forward_offset(&self) -> i64 {
        12 * NS_PER_HOUR as i64 + self.excess_ns
    }
}

impl TimeZone for ShiftedOffsetZone {
    fn id(&self) -> &str {
        "TestTimeZone"
    }

    fn offset_nanoseconds_for(&self, instant: &Instant) -> EngineResult<i64> {
        if instant.epoch_nanoseconds() < self.shift_epoch_ns {
            return Ok(-12 * NS_PER_HOUR as i64);
        }
        Ok(self.forward_offset())
    }

    fn possible_instants_for(&self, date_time: &PlainDateTime) -> EngineResult<Vec<Instant>> {
        let Some(&utc) = self.utc.possible_instants_for(date_time)?.first() else {
            return Ok(Vec::new());
        };
        let (year, month, day) = (date_time.year(), date_time.month(), date_time.day());
        if year < 1970 {
            return Ok(vec![utc.subtract_nanoseconds(12 * NS_PER_HOUR)?]);
        }
        if (year, month, day) == (1970, 1, 1) {
            return Ok(Vec::new());
        }
        Ok(vec![utc.add_nanoseconds(self.forward_offset() as i128)?])
    }
}

fn out_of_range_forward_offset_shift(realm: &mut Realm) -> Result<(), Thrown> {
    realm.require("Temporal")?;
    let zone = Rc::new(ShiftedOffsetZone::longer_than_24_hours());
    let instance = ZonedDateTime::new(0, zone)?;
    realm.assert_throws(
        ErrorKind::Range,
        || instance.hours_in_day(),
        "RangeError should be thrown",
    )?;
    realm.report_compare(0, 0);
    Ok(())
}

fn forward_offset_shift_exactly_24_hours(realm: &mut Realm) -> Result<(), Thrown> {
    realm.require("Temporal")?;
    let zone = Rc::new(ShiftedOffsetZone::exactly_24_hours());
    let instance = ZonedDateTime::new(0, zone)?;
    realm.assert_same_value(instance.hours_in_day()?, 72.0, "day spans both offset shifts")?;
    realm.report_compare(0, 0);
    Ok(())
}

fn timezone_utc(realm: &mut Realm) -> Result<(), Thrown> {
    realm.require("Temporal")?;
    for epoch_ns in [0, -1, 1_000_000_000_000_000_000, -1_000_000_000_000_000_000] {
        let instance = ZonedDateTime::new(epoch_ns, Rc::new(Utc))?;
        realm.assert_same_value(
            instance.hours_in_day()?,
            24.0,
            &format!("hoursInDay at {epoch_ns}"),
        )?;
    }
    realm.report_compare(0, 0);
    Ok(())
}
