use std::fmt;

use super::{
    instant::{NS_MAX_INSTANT, NS_MIN_INSTANT},
    EngineError, EngineResult, NS_PER_DAY,
};

const NS_PER_SECOND: i128 = 1_000_000_000;

/// A wall-clock ISO 8601 date and time without any time zone attached.
///
/// Every constructed value is within the representable limits, i.e. its UTC
/// reading is less than one day away from the instant range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlainDateTime {
    year: i32,
    month: u8,
    day: u8,
    hour: u8,
    minute: u8,
    second: u8,
    millisecond: u16,
    microsecond: u16,
    nanosecond: u16,
}

impl PlainDateTime {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
        microsecond: u16,
        nanosecond: u16,
    ) -> EngineResult<Self> {
        if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
            return Err(EngineError::range(format!(
                "invalid ISO date {year}-{month:02}-{day:02}"
            )));
        }
        if hour > 23 || minute > 59 || second > 59 {
            return Err(EngineError::range(format!(
                "invalid time {hour:02}:{minute:02}:{second:02}"
            )));
        }
        if millisecond > 999 || microsecond > 999 || nanosecond > 999 {
            return Err(EngineError::range("invalid sub-second field"));
        }
        let value = Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
            microsecond,
            nanosecond,
        };
        value.check_within_limits()?;
        Ok(value)
    }

    /// Midnight at the start of the given date.
    pub fn date(year: i32, month: u8, day: u8) -> EngineResult<Self> {
        Self::new(year, month, day, 0, 0, 0, 0, 0, 0)
    }

    /// Reads a UTC epoch nanosecond value as a wall-clock date-time.
    pub fn from_utc_epoch_nanoseconds(epoch_nanoseconds: i128) -> Self {
        let days = epoch_nanoseconds.div_euclid(NS_PER_DAY);
        let mut rem = epoch_nanoseconds.rem_euclid(NS_PER_DAY);
        let (year, month, day) = civil_from_days(days as i64);

        let subsec = (rem % NS_PER_SECOND) as u32;
        rem /= NS_PER_SECOND;
        Self {
            year,
            month,
            day,
            hour: (rem / 3600) as u8,
            minute: (rem / 60 % 60) as u8,
            second: (rem % 60) as u8,
            millisecond: (subsec / 1_000_000) as u16,
            microsecond: (subsec / 1_000 % 1_000) as u16,
            nanosecond: (subsec % 1_000) as u16,
        }
    }

    /// The epoch nanoseconds this wall-clock reading denotes in UTC.
    pub fn utc_epoch_nanoseconds(&self) -> i128 {
        let days = days_from_civil(self.year, self.month, self.day) as i128;
        let seconds = self.hour as i128 * 3600 + self.minute as i128 * 60 + self.second as i128;
        let subsec = self.millisecond as i128 * 1_000_000
            + self.microsecond as i128 * 1_000
            + self.nanosecond as i128;
        days * NS_PER_DAY + seconds * NS_PER_SECOND + subsec
    }

    /// Shifts the wall-clock reading by a signed number of nanoseconds,
    /// balancing into the date.
    pub fn add_nanoseconds(&self, nanoseconds: i128) -> EngineResult<Self> {
        let shifted = self
            .utc_epoch_nanoseconds()
            .checked_add(nanoseconds)
            .ok_or_else(|| EngineError::range("date-time arithmetic overflowed"))?;
        let value = Self::from_utc_epoch_nanoseconds(shifted);
        value.check_within_limits()?;
        Ok(value)
    }

    /// Adds whole calendar days, keeping the time of day.
    pub fn add_days(&self, days: i64) -> EngineResult<Self> {
        self.add_nanoseconds(days as i128 * NS_PER_DAY)
    }

    /// The same date with the time of day set to midnight.
    pub fn start_of_day(&self) -> Self {
        Self {
            hour: 0,
            minute: 0,
            second: 0,
            millisecond: 0,
            microsecond: 0,
            nanosecond: 0,
            ..*self
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u8 {
        self.month
    }

    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }

    pub fn millisecond(&self) -> u16 {
        self.millisecond
    }

    pub fn microsecond(&self) -> u16 {
        self.microsecond
    }

    pub fn nanosecond(&self) -> u16 {
        self.nanosecond
    }

    fn check_within_limits(&self) -> EngineResult<()> {
        let ns = self.utc_epoch_nanoseconds();
        if ns <= NS_MIN_INSTANT - NS_PER_DAY || ns >= NS_MAX_INSTANT + NS_PER_DAY {
            return Err(EngineError::range(format!(
                "date-time {self} outside of the representable range"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PlainDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if (0..=9999).contains(&self.year) {
            write!(f, "{:04}", self.year)?;
        } else {
            let sign = if self.year < 0 { '-' } else { '+' };
            write!(f, "{sign}{:06}", self.year.unsigned_abs())?;
        }
        write!(
            f,
            "-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.month, self.day, self.hour, self.minute, self.second
        )?;
        let subsec = self.millisecond as u32 * 1_000_000
            + self.microsecond as u32 * 1_000
            + self.nanosecond as u32;
        if subsec != 0 {
            let digits = format!("{subsec:09}");
            write!(f, ".{}", digits.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Days since 1970-01-01 of a proleptic Gregorian date.
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = year as i64 - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = month as i64;
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> (i32, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = (yoe + era * 400 + i64::from(month <= 2)) as i32;
    (year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_is_1970_01_01() {
        let dt = PlainDateTime::from_utc_epoch_nanoseconds(0);
        assert_eq!(dt, PlainDateTime::date(1970, 1, 1).unwrap());
        assert_eq!(dt.utc_epoch_nanoseconds(), 0);
    }

    #[test]
    fn negative_epoch_reads_previous_day() {
        let dt = PlainDateTime::from_utc_epoch_nanoseconds(-43_200_000_000_000);
        assert_eq!(dt.to_string(), "1969-12-31T12:00:00");
        assert_eq!(dt.utc_epoch_nanoseconds(), -43_200_000_000_000);
    }

    #[test]
    fn leap_day_and_century_rules() {
        assert!(PlainDateTime::date(2024, 2, 29).is_ok());
        assert!(PlainDateTime::date(1900, 2, 29).is_err());
        assert!(PlainDateTime::date(2000, 2, 29).is_ok());
        let march = PlainDateTime::date(2000, 2, 29).unwrap().add_days(1).unwrap();
        assert_eq!((march.month(), march.day()), (3, 1));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(PlainDateTime::date(2020, 13, 1).is_err());
        assert!(PlainDateTime::date(2020, 4, 31).is_err());
        assert!(PlainDateTime::new(2020, 1, 1, 24, 0, 0, 0, 0, 0).is_err());
        assert!(PlainDateTime::new(2020, 1, 1, 0, 0, 0, 1000, 0, 0).is_err());
    }

    #[test]
    fn limits_are_one_day_past_instant_range() {
        assert!(PlainDateTime::date(-271821, 4, 19).is_err());
        assert!(PlainDateTime::new(-271821, 4, 19, 0, 0, 0, 0, 0, 1).is_ok());
        assert!(PlainDateTime::date(275760, 9, 13).is_ok());
        assert!(PlainDateTime::date(275760, 9, 14).is_err());
    }

    #[test]
    fn add_nanoseconds_balances_into_date() {
        let dt = PlainDateTime::date(1970, 1, 1).unwrap();
        let back = dt.add_nanoseconds(-1).unwrap();
        assert_eq!(back.to_string(), "1969-12-31T23:59:59.999999999");
        assert_eq!(back.start_of_day(), PlainDateTime::date(1969, 12, 31).unwrap());
    }

    #[test]
    fn round_trips_far_dates() {
        for days in [-100_000_000_i64, -719_468, -1, 0, 59, 10_957, 100_000_000] {
            let (y, m, d) = civil_from_days(days);
            assert_eq!(days_from_civil(y, m, d), days);
        }
    }

    #[test]
    fn extended_years_display_with_sign() {
        let dt = PlainDateTime::date(-1, 1, 1).unwrap();
        assert_eq!(dt.to_string(), "-000001-01-01T00:00:00");
        let dt = PlainDateTime::date(12345, 6, 7).unwrap();
        assert_eq!(dt.to_string(), "+012345-06-07T00:00:00");
    }
}
