use std::rc::Rc;

use super::{
    disambiguate::{instant_for, Disambiguation},
    timezone::{offset_nanoseconds_for, plain_date_time_for},
    EngineResult, Instant, PlainDateTime, TimeZone, NS_PER_HOUR,
};

/// An exact instant viewed through a time zone.
#[derive(Debug, Clone)]
pub struct ZonedDateTime {
    instant: Instant,
    zone: Rc<dyn TimeZone>,
}

impl ZonedDateTime {
    pub fn new(epoch_nanoseconds: i128, zone: Rc<dyn TimeZone>) -> EngineResult<Self> {
        Ok(Self {
            instant: Instant::from_epoch_nanoseconds(epoch_nanoseconds)?,
            zone,
        })
    }

    pub fn epoch_nanoseconds(&self) -> i128 {
        self.instant.epoch_nanoseconds()
    }

    pub fn instant(&self) -> Instant {
        self.instant
    }

    pub fn time_zone(&self) -> &Rc<dyn TimeZone> {
        &self.zone
    }

    pub fn offset_nanoseconds(&self) -> EngineResult<i64> {
        offset_nanoseconds_for(self.zone.as_ref(), &self.instant)
    }

    /// The wall-clock reading in this zone.
    pub fn plain_date_time(&self) -> EngineResult<PlainDateTime> {
        plain_date_time_for(self.zone.as_ref(), &self.instant)
    }

    /// The first instant of the local calendar day.
    pub fn start_of_day(&self) -> EngineResult<Self> {
        let midnight = self.plain_date_time()?.start_of_day();
        let instant = instant_for(self.zone.as_ref(), &midnight, Disambiguation::Compatible)?;
        Ok(Self {
            instant,
            zone: Rc::clone(&self.zone),
        })
    }

    /// Length in hours of the local calendar day containing this instant,
    /// measured between consecutive local midnights.
    pub fn hours_in_day(&self) -> EngineResult<f64> {
        let zone = self.zone.as_ref();
        let today = self.plain_date_time()?.start_of_day();
        let tomorrow = today.add_days(1)?;
        let today_instant = instant_for(zone, &today, Disambiguation::Compatible)?;
        let tomorrow_instant = instant_for(zone, &tomorrow, Disambiguation::Compatible)?;
        let diff = tomorrow_instant.epoch_nanoseconds() - today_instant.epoch_nanoseconds();
        Ok(diff as f64 / NS_PER_HOUR as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{FixedOffset, Utc, NS_PER_DAY};

    #[test]
    fn utc_days_are_24_hours() {
        let zdt = ZonedDateTime::new(1_234_567_890_000_000_000, Rc::new(Utc)).unwrap();
        assert_eq!(zdt.hours_in_day().unwrap(), 24.0);
    }

    #[test]
    fn fixed_offset_shifts_the_local_date() {
        let zone = Rc::new(FixedOffset::from_minutes(-12 * 60).unwrap());
        let zdt = ZonedDateTime::new(0, zone).unwrap();
        assert_eq!(zdt.plain_date_time().unwrap().to_string(), "1969-12-31T12:00:00");
        assert_eq!(zdt.offset_nanoseconds().unwrap(), -43_200_000_000_000);
        assert_eq!(zdt.hours_in_day().unwrap(), 24.0);

        let start = zdt.start_of_day().unwrap();
        assert_eq!(start.epoch_nanoseconds(), -NS_PER_DAY + 12 * NS_PER_HOUR);
    }

    #[test]
    fn rejects_out_of_range_epoch() {
        assert!(ZonedDateTime::new(i128::MAX, Rc::new(Utc)).is_err());
    }
}
