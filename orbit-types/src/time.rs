//! UTC instants and the time arithmetic used around TLE epochs

use chrono::{DateTime, Duration, NaiveDate, Utc};

pub type UtcTimestamp = DateTime<Utc>;

pub const MINUTES_PER_DAY: f64 = 1440.0;
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Julian date of 1970-01-01T00:00:00Z
pub const UNIX_EPOCH_JULIAN_DATE: f64 = 2_440_587.5;

/// Two-digit TLE years below this pivot belong to the 2000s
const TWO_DIGIT_YEAR_PIVOT: u32 = 57;

/// Expand a two-digit epoch year, 57..=99 are 19xx and 00..=56 are 20xx
pub fn expand_two_digit_year(yy: u32) -> i32 {
    if yy < TWO_DIGIT_YEAR_PIVOT {
        2000 + yy as i32
    } else {
        1900 + yy as i32
    }
}

/// The instant `day_of_year` days into `year`, where day 1.0 is January 1st at 00:00 UTC.
///
/// Resolution is one microsecond. Returns `None` for days outside [1, 367).
pub fn epoch_from_year_and_day(year: i32, day_of_year: f64) -> Option<UtcTimestamp> {
    if !day_of_year.is_finite() || !(1.0..367.0).contains(&day_of_year) {
        return None;
    }
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?
        .and_hms_opt(0, 0, 0)?
        .and_utc();
    let micros = ((day_of_year - 1.0) * SECONDS_PER_DAY * 1e6).round() as i64;
    jan1.checked_add_signed(Duration::microseconds(micros))
}

/// Minutes elapsed from `from` to `to`, negative when `to` precedes `from`.
///
/// This is a continuous difference of the two instants, so month and year
/// boundaries between them need no special handling.
pub fn minutes_between(from: UtcTimestamp, to: UtcTimestamp) -> f64 {
    let dt = to.signed_duration_since(from);
    match dt.num_nanoseconds() {
        Some(ns) => ns as f64 / 60e9,
        None => dt.num_milliseconds() as f64 / 60e3,
    }
}

/// Julian date (UTC) of an instant
pub fn julian_date(t: UtcTimestamp) -> f64 {
    let secs = t.timestamp();
    let whole_days = secs.div_euclid(86_400) as f64;
    let day_secs = secs.rem_euclid(86_400) as f64 + f64::from(t.timestamp_subsec_nanos()) * 1e-9;
    UNIX_EPOCH_JULIAN_DATE + whole_days + day_secs / SECONDS_PER_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn utc(s: &str) -> UtcTimestamp {
        s.parse().unwrap()
    }

    #[test]
    fn two_digit_years() {
        assert_eq!(expand_two_digit_year(57), 1957);
        assert_eq!(expand_two_digit_year(99), 1999);
        assert_eq!(expand_two_digit_year(0), 2000);
        assert_eq!(expand_two_digit_year(56), 2056);
    }

    #[test]
    fn day_of_year_epochs() {
        assert_eq!(
            epoch_from_year_and_day(2023, 1.0),
            Some(utc("2023-01-01T00:00:00Z"))
        );
        assert_eq!(
            epoch_from_year_and_day(2008, 264.5),
            Some(utc("2008-09-20T12:00:00Z"))
        );
        // Leap year, last day
        assert_eq!(
            epoch_from_year_and_day(2024, 366.75),
            Some(utc("2024-12-31T18:00:00Z"))
        );
        assert_eq!(epoch_from_year_and_day(2023, 0.5), None);
        assert_eq!(epoch_from_year_and_day(2023, 367.0), None);
        assert_eq!(epoch_from_year_and_day(2023, f64::NAN), None);
    }

    #[test]
    fn minutes_across_year_boundary() {
        let from = utc("2023-12-31T23:00:00Z");
        let to = utc("2024-01-01T01:30:00Z");
        assert_relative_eq!(minutes_between(from, to), 150.0);
        assert_relative_eq!(minutes_between(to, from), -150.0);
    }

    #[test]
    fn minutes_across_month_boundary() {
        let from = utc("2024-02-28T12:00:00Z");
        let to = utc("2024-03-01T12:00:00Z");
        // 2024 is a leap year
        assert_relative_eq!(minutes_between(from, to), 2.0 * MINUTES_PER_DAY);
    }

    #[test]
    fn julian_dates() {
        assert_relative_eq!(julian_date(utc("2000-01-01T12:00:00Z")), 2_451_545.0);
        assert_relative_eq!(julian_date(utc("1970-01-01T00:00:00Z")), 2_440_587.5);
        assert_relative_eq!(
            julian_date(utc("1969-12-31T18:00:00Z")),
            2_440_587.25,
            epsilon = 1e-9
        );
    }
}
