//! Period window computation.

use super::{Frequency, PeriodError, PeriodResult};
use crate::clock::Clock;
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Half-open window of one recurrence period.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct PeriodRange {
    /// Canonical period key, e.g. `2025-W02`.
    pub key: String,
    /// Inclusive start at 00:00 local time.
    pub start: NaiveDateTime,
    /// Exclusive end at 00:00 local time; the next period's start.
    pub end_exclusive: NaiveDateTime,
}

impl PeriodRange {
    pub fn contains(&self, at: NaiveDateTime) -> bool {
        self.start <= at && at < self.end_exclusive
    }
}

/// Computes the period of `frequency` that contains `at`.
///
/// | frequency | key | window |
/// |---|---|---|
/// | daily | `YYYY-MM-DD` | the day |
/// | weekly | `YYYY-Www` (ISO week-year) | Monday + 7 days |
/// | monthly | `YYYY-MM` | first of month to first of next |
/// | semiannual | `YYYY-H1` / `YYYY-H2` | Jan 1 to Jul 1 / Jul 1 to Jan 1 |
///
/// # Errors
/// - `OutOfRange` when a boundary is not representable (calendar edges only).
pub fn period_range(frequency: Frequency, at: NaiveDateTime) -> PeriodResult<PeriodRange> {
    let date = at.date();
    let (key, start, end) = match frequency {
        Frequency::Daily => {
            let end = boundary(date.checked_add_days(Days::new(1)), at)?;
            (date.format("%Y-%m-%d").to_string(), date, end)
        }
        Frequency::Weekly => {
            let iso = date.iso_week();
            let back = u64::from(date.weekday().num_days_from_monday());
            let monday = boundary(date.checked_sub_days(Days::new(back)), at)?;
            let end = boundary(monday.checked_add_days(Days::new(7)), at)?;
            (format!("{:04}-W{:02}", iso.year(), iso.week()), monday, end)
        }
        Frequency::Monthly => {
            let (year, month) = (date.year(), date.month());
            let start = boundary(NaiveDate::from_ymd_opt(year, month, 1), at)?;
            let end = if month == 12 {
                NaiveDate::from_ymd_opt(year + 1, 1, 1)
            } else {
                NaiveDate::from_ymd_opt(year, month + 1, 1)
            };
            (
                format!("{year:04}-{month:02}"),
                start,
                boundary(end, at)?,
            )
        }
        Frequency::Semiannual => {
            let year = date.year();
            let (half, start, end) = if date.month() <= 6 {
                (
                    1,
                    NaiveDate::from_ymd_opt(year, 1, 1),
                    NaiveDate::from_ymd_opt(year, 7, 1),
                )
            } else {
                (
                    2,
                    NaiveDate::from_ymd_opt(year, 7, 1),
                    NaiveDate::from_ymd_opt(year + 1, 1, 1),
                )
            };
            (
                format!("{year:04}-H{half}"),
                boundary(start, at)?,
                boundary(end, at)?,
            )
        }
    };

    Ok(PeriodRange {
        key,
        start: start.and_time(NaiveTime::MIN),
        end_exclusive: end.and_time(NaiveTime::MIN),
    })
}

/// String-typed variant of [`period_range`] for persisted frequency values.
///
/// # Errors
/// - `InvalidFrequency` when `frequency` is not a known value.
pub fn period_range_for(frequency: &str, at: NaiveDateTime) -> PeriodResult<PeriodRange> {
    period_range(frequency.parse()?, at)
}

/// Returns only the key of the period containing "now".
pub fn period_key(frequency: Frequency, clock: &dyn Clock) -> PeriodResult<String> {
    period_range(frequency, clock.now()).map(|range| range.key)
}

fn boundary(date: Option<NaiveDate>, at: NaiveDateTime) -> PeriodResult<NaiveDate> {
    date.ok_or(PeriodError::OutOfRange(at))
}

#[cfg(test)]
mod tests {
    use super::{period_key, period_range, period_range_for};
    use crate::clock::FixedClock;
    use crate::period::{Frequency, PeriodError};
    use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};

    fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
        at(year, month, day, 0, 0)
    }

    #[test]
    fn weekly_midweek_reference() {
        let range = period_range(Frequency::Weekly, at(2025, 1, 8, 0, 0)).unwrap();
        assert_eq!(range.key, "2025-W02");
        assert_eq!(range.start, midnight(2025, 1, 6));
        assert_eq!(range.end_exclusive, midnight(2025, 1, 13));
    }

    #[test]
    fn semiannual_second_half() {
        let range = period_range(Frequency::Semiannual, at(2025, 8, 1, 0, 0)).unwrap();
        assert_eq!(range.key, "2025-H2");
        assert_eq!(range.start, midnight(2025, 7, 1));
        assert_eq!(range.end_exclusive, midnight(2026, 1, 1));
    }

    #[test]
    fn semiannual_first_half_ends_on_july_first() {
        let range = period_range(Frequency::Semiannual, at(2025, 6, 30, 23, 59)).unwrap();
        assert_eq!(range.key, "2025-H1");
        assert_eq!(range.start, midnight(2025, 1, 1));
        assert_eq!(range.end_exclusive, midnight(2025, 7, 1));
    }

    #[test]
    fn daily_handles_leap_day() {
        let range = period_range(Frequency::Daily, at(2024, 2, 29, 18, 5)).unwrap();
        assert_eq!(range.key, "2024-02-29");
        assert_eq!(range.start, midnight(2024, 2, 29));
        assert_eq!(range.end_exclusive, midnight(2024, 3, 1));
    }

    #[test]
    fn monthly_december_rolls_into_next_year() {
        let range = period_range(Frequency::Monthly, at(2025, 12, 31, 23, 59)).unwrap();
        assert_eq!(range.key, "2025-12");
        assert_eq!(range.start, midnight(2025, 12, 1));
        assert_eq!(range.end_exclusive, midnight(2026, 1, 1));
    }

    #[test]
    fn weekly_uses_iso_week_year_across_new_year() {
        let range = period_range(Frequency::Weekly, at(2024, 12, 31, 12, 0)).unwrap();
        assert_eq!(range.key, "2025-W01");
        assert_eq!(range.start, midnight(2024, 12, 30));

        let range = period_range(Frequency::Weekly, at(2021, 1, 3, 12, 0)).unwrap();
        assert_eq!(range.key, "2020-W53");
        assert_eq!(range.start, midnight(2020, 12, 28));
        assert_eq!(range.end_exclusive, midnight(2021, 1, 4));
    }

    #[test]
    fn window_boundaries_are_half_open() {
        let start = period_range(Frequency::Weekly, midnight(2025, 1, 13)).unwrap();
        assert_eq!(start.key, "2025-W03");

        let before = period_range(Frequency::Weekly, midnight(2025, 1, 13) - Duration::seconds(1))
            .unwrap();
        assert_eq!(before.key, "2025-W02");
        assert_eq!(before.end_exclusive, start.start);
    }

    #[test]
    fn every_window_contains_its_instant_and_is_stable() {
        let mut instant = at(2023, 11, 20, 3, 17);
        let stop = at(2026, 2, 10, 0, 0);
        while instant < stop {
            for frequency in Frequency::ALL {
                let first = period_range(frequency, instant).unwrap();
                let second = period_range(frequency, instant).unwrap();
                assert_eq!(first, second);
                assert!(
                    first.contains(instant),
                    "{frequency} window {first:?} misses {instant}"
                );
                match frequency {
                    Frequency::Weekly => {
                        assert_eq!(first.start.weekday(), Weekday::Mon);
                        assert_eq!(first.end_exclusive - first.start, Duration::days(7));
                    }
                    Frequency::Semiannual => {
                        assert_eq!(first.start.day(), 1);
                        assert!(first.start.month() == 1 || first.start.month() == 7);
                    }
                    Frequency::Monthly => assert_eq!(first.start.day(), 1),
                    Frequency::Daily => {
                        assert_eq!(first.end_exclusive - first.start, Duration::days(1))
                    }
                }
            }
            instant += Duration::minutes(7 * 60 + 13);
        }
    }

    #[test]
    fn string_frequency_is_validated() {
        let err = period_range_for("fortnightly", midnight(2025, 1, 1)).unwrap_err();
        assert_eq!(err, PeriodError::InvalidFrequency("fortnightly".to_string()));

        let range = period_range_for("monthly", midnight(2025, 3, 9)).unwrap();
        assert_eq!(range.key, "2025-03");
    }

    #[test]
    fn calendar_edge_reports_out_of_range() {
        let err = period_range(Frequency::Daily, NaiveDateTime::MAX).unwrap_err();
        assert!(matches!(err, PeriodError::OutOfRange(_)));
    }

    #[test]
    fn period_key_uses_clock_now() {
        let clock = FixedClock::new(at(2025, 8, 1, 10, 0));
        assert_eq!(period_key(Frequency::Semiannual, &clock).unwrap(), "2025-H2");
        assert_eq!(period_key(Frequency::Daily, &clock).unwrap(), "2025-08-01");
    }
}
