use time::{format_description::well_known::Rfc3339, OffsetDateTime, PrimitiveDateTime};

const SECONDS_PER_DAY: i64 = 86_400;

pub(crate) fn primitive_now_utc() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_utc();
    PrimitiveDateTime::new(now.date(), now.time())
}

pub(crate) fn format_primitive(value: PrimitiveDateTime) -> String {
    value.assume_utc().format(&Rfc3339).unwrap_or_else(|_| value.assume_utc().to_string())
}

/// Whole days until `deadline`, rounded up. 0 covers a deadline that is due
/// later today or was passed within the last day; negative means it expired
/// more than a day ago.
pub(crate) fn days_until(deadline: PrimitiveDateTime, now: PrimitiveDateTime) -> i64 {
    let seconds = (deadline.assume_utc() - now.assume_utc()).whole_seconds();
    seconds.div_euclid(SECONDS_PER_DAY) + i64::from(seconds.rem_euclid(SECONDS_PER_DAY) != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration, Time};

    fn at(year: i32, month: time::Month, day: u8, hour: u8) -> PrimitiveDateTime {
        let date = Date::from_calendar_date(year, month, day).unwrap();
        PrimitiveDateTime::new(date, Time::from_hms(hour, 0, 0).unwrap())
    }

    #[test]
    fn format_primitive_outputs_utc_z() {
        let value = at(2025, time::Month::January, 2, 10);
        assert_eq!(format_primitive(value), "2025-01-02T10:00:00Z");
    }

    #[test]
    fn days_until_rounds_up_partial_days() {
        let now = at(2026, time::Month::March, 10, 12);
        assert_eq!(days_until(now + Duration::hours(6), now), 1);
        assert_eq!(days_until(now + Duration::hours(30), now), 2);
        assert_eq!(days_until(now + Duration::days(2), now), 2);
    }

    #[test]
    fn days_until_zero_covers_the_expiry_day() {
        let now = at(2026, time::Month::March, 10, 12);
        assert_eq!(days_until(now, now), 0);
        assert_eq!(days_until(now - Duration::hours(2), now), 0);
    }

    #[test]
    fn days_until_negative_once_a_full_day_past() {
        let now = at(2026, time::Month::March, 10, 12);
        assert_eq!(days_until(now - Duration::hours(30), now), -1);
        assert_eq!(days_until(now - Duration::days(3), now), -3);
    }
}
