use serde::{Deserialize, Serialize};

use super::{
    datetime::PlainDateTime,
    instant::is_valid_epoch_nanoseconds,
    timezone::{offset_nanoseconds_for, possible_instants_for},
    EngineError, EngineResult, Instant, TimeZone, NS_PER_DAY,
};

/// How to pick an instant for a wall-clock reading that a zone maps to zero
/// or several instants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disambiguation {
    /// Earlier instant in an overlap, later wall-clock time in a gap.
    #[default]
    Compatible,
    Earlier,
    Later,
    Reject,
}

/// Resolves `date_time` in `zone` to exactly one instant.
pub fn instant_for(
    zone: &dyn TimeZone,
    date_time: &PlainDateTime,
    disambiguation: Disambiguation,
) -> EngineResult<Instant> {
    let candidates = possible_instants_for(zone, date_time)?;
    disambiguate_possible_instants(zone, &candidates, date_time, disambiguation)
}

/// Picks one instant out of `candidates`, the zone's answer for `date_time`.
///
/// With no candidates the reading falls into a gap. The size of the gap is
/// estimated from the offsets one day either side of the reading; a shift of
/// more than a day is a RangeError.
pub fn disambiguate_possible_instants(
    zone: &dyn TimeZone,
    candidates: &[Instant],
    date_time: &PlainDateTime,
    disambiguation: Disambiguation,
) -> EngineResult<Instant> {
    match (candidates, disambiguation) {
        ([only], _) => return Ok(*only),
        ([_, _, ..], Disambiguation::Reject) => {
            return Err(EngineError::range(format!(
                "{date_time} is ambiguous in time zone {}",
                zone.id()
            )))
        }
        ([first, _, ..], Disambiguation::Compatible | Disambiguation::Earlier) => {
            return Ok(*first)
        }
        ([.., last], Disambiguation::Later) => return Ok(*last),
        _ => {}
    }

    if disambiguation == Disambiguation::Reject {
        return Err(EngineError::range(format!(
            "{date_time} does not exist in time zone {}",
            zone.id()
        )));
    }

    let epoch_ns = date_time.utc_epoch_nanoseconds();
    let day_before = probe_instant(epoch_ns - NS_PER_DAY)?;
    let day_after = probe_instant(epoch_ns + NS_PER_DAY)?;
    let offset_before = offset_nanoseconds_for(zone, &day_before)? as i128;
    let offset_after = offset_nanoseconds_for(zone, &day_after)? as i128;
    let shift = offset_after - offset_before;
    if shift.abs() > NS_PER_DAY {
        return Err(EngineError::range(format!(
            "UTC offset shift of {shift}ns in time zone {} is longer than a day",
            zone.id()
        )));
    }

    if disambiguation == Disambiguation::Earlier {
        let earlier = date_time.add_nanoseconds(-shift)?;
        let candidates = possible_instants_for(zone, &earlier)?;
        return candidates.first().copied().ok_or_else(|| {
            EngineError::range(format!(
                "time zone {} has no instant for {earlier}",
                zone.id()
            ))
        });
    }

    let later = date_time.add_nanoseconds(shift)?;
    let candidates = possible_instants_for(zone, &later)?;
    candidates.last().copied().ok_or_else(|| {
        EngineError::range(format!("time zone {} has no instant for {later}", zone.id()))
    })
}

fn probe_instant(epoch_ns: i128) -> EngineResult<Instant> {
    if !is_valid_epoch_nanoseconds(epoch_ns) {
        return Err(EngineError::range(
            "date-time too close to the edge of the instant range to disambiguate",
        ));
    }
    Instant::from_epoch_nanoseconds(epoch_ns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::temporal::{ErrorKind, NS_PER_HOUR};

    /// Springs forward by an hour at 1970-01-01T02:00 local and falls back by
    /// an hour at 1970-01-11T02:00 local.
    #[derive(Debug)]
    struct OneHourTransitions;

    const SPRING: i128 = 2 * NS_PER_HOUR;
    const FALL: i128 = 10 * NS_PER_DAY + NS_PER_HOUR;

    impl TimeZone for OneHourTransitions {
        fn id(&self) -> &str {
            "Test/Transitions"
        }

        fn offset_nanoseconds_for(&self, instant: &Instant) -> EngineResult<i64> {
            let ns = instant.epoch_nanoseconds();
            Ok(if (SPRING..FALL).contains(&ns) {
                NS_PER_HOUR as i64
            } else {
                0
            })
        }

        fn possible_instants_for(&self, date_time: &PlainDateTime) -> EngineResult<Vec<Instant>> {
            let utc = date_time.utc_epoch_nanoseconds();
            let mut out = Vec::new();
            for offset in [NS_PER_HOUR, 0] {
                let instant = Instant::from_epoch_nanoseconds(utc - offset)?;
                if self.offset_nanoseconds_for(&instant)? as i128 == offset {
                    out.push(instant);
                }
            }
            Ok(out)
        }
    }

    fn local(day: u8, hour: u8, minute: u8) -> PlainDateTime {
        PlainDateTime::new(1970, 1, day, hour, minute, 0, 0, 0, 0).unwrap()
    }

    #[test]
    fn single_candidate_is_returned_for_every_mode() {
        let dt = local(1, 12, 0);
        for mode in [
            Disambiguation::Compatible,
            Disambiguation::Earlier,
            Disambiguation::Later,
            Disambiguation::Reject,
        ] {
            let instant = instant_for(&OneHourTransitions, &dt, mode).unwrap();
            assert_eq!(instant.epoch_nanoseconds(), 11 * NS_PER_HOUR);
        }
    }

    #[test]
    fn gap_moves_forward_for_compatible_and_later() {
        let dt = local(1, 2, 30);
        for mode in [Disambiguation::Compatible, Disambiguation::Later] {
            let instant = instant_for(&OneHourTransitions, &dt, mode).unwrap();
            // 03:30 at +01:00
            assert_eq!(
                instant.epoch_nanoseconds(),
                2 * NS_PER_HOUR + 30 * 60_000_000_000
            );
        }
    }

    #[test]
    fn gap_moves_back_for_earlier() {
        let instant =
            instant_for(&OneHourTransitions, &local(1, 2, 30), Disambiguation::Earlier).unwrap();
        // 01:30 at +00:00
        assert_eq!(
            instant.epoch_nanoseconds(),
            NS_PER_HOUR + 30 * 60_000_000_000
        );
    }

    #[test]
    fn overlap_picks_by_mode() {
        let dt = local(11, 1, 30);
        let earlier = instant_for(&OneHourTransitions, &dt, Disambiguation::Earlier).unwrap();
        let compatible =
            instant_for(&OneHourTransitions, &dt, Disambiguation::Compatible).unwrap();
        let later = instant_for(&OneHourTransitions, &dt, Disambiguation::Later).unwrap();
        assert_eq!(earlier, compatible);
        assert_eq!(
            later.epoch_nanoseconds() - earlier.epoch_nanoseconds(),
            NS_PER_HOUR
        );
    }

    #[test]
    fn reject_fails_in_gap_and_overlap() {
        for dt in [local(1, 2, 30), local(11, 1, 30)] {
            let err = instant_for(&OneHourTransitions, &dt, Disambiguation::Reject).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Range);
        }
    }

    #[derive(Debug)]
    struct EmptyWithShift(i64);

    impl TimeZone for EmptyWithShift {
        fn id(&self) -> &str {
            "Test/Empty"
        }

        fn offset_nanoseconds_for(&self, instant: &Instant) -> EngineResult<i64> {
            Ok(if instant.epoch_nanoseconds() < 0 {
                -(NS_PER_DAY as i64) / 2
            } else {
                self.0
            })
        }

        fn possible_instants_for(&self, _date_time: &PlainDateTime) -> EngineResult<Vec<Instant>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn shift_longer_than_a_day_is_a_range_error() {
        let zone = EmptyWithShift(NS_PER_DAY as i64 / 2 + 1);
        let err = instant_for(&zone, &local(1, 0, 0), Disambiguation::Compatible).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Range);
        assert!(err.message.contains("longer than a day"), "{}", err.message);
    }

    #[test]
    fn empty_requery_is_a_range_error() {
        let zone = EmptyWithShift(NS_PER_DAY as i64 / 2);
        for mode in [Disambiguation::Earlier, Disambiguation::Later] {
            let err = instant_for(&zone, &local(1, 0, 0), mode).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Range);
            assert!(err.message.contains("has no instant"), "{}", err.message);
        }
    }
}
