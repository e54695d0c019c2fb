//! Event start times and the named date buckets used by the listing filter.
//!
//! All values are local wall-clock times. Buckets are half-open intervals
//! `[start, end)` anchored at local midnight of the reference "now".

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::LocalTimestamp;

/// Date format accepted from the submission form.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a submitted `YYYY-MM-DD` date.
pub fn parse_event_date(value: &str) -> Result<NaiveDate, CoreError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| CoreError::Validation(format!("Invalid date '{}'", value.trim())))
}

/// Parse an optional submitted time. Blank or missing means midnight.
///
/// Accepts `HH:MM` (what time inputs send) and `HH:MM:SS`.
pub fn parse_event_time(value: Option<&str>) -> Result<NaiveTime, CoreError> {
    let raw = match value.map(str::trim) {
        None | Some("") => return Ok(NaiveTime::MIN),
        Some(raw) => raw,
    };
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| CoreError::Validation(format!("Invalid time '{raw}'")))
}

/// Combine a date and an optional time into the stored start timestamp.
pub fn combine_start(date: NaiveDate, time: NaiveTime) -> LocalTimestamp {
    date.and_time(time)
}

/// Named, half-open time windows for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateBucket {
    Today,
    Tomorrow,
    ThisWeek,
    ThisWeekend,
    NextWeek,
    NextMonth,
}

impl DateBucket {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Tomorrow => "tomorrow",
            Self::ThisWeek => "this-week",
            Self::ThisWeekend => "this-weekend",
            Self::NextWeek => "next-week",
            Self::NextMonth => "next-month",
        }
    }

    /// Parse the `when` query parameter. Missing or empty means no bucket.
    pub fn parse(value: Option<&str>) -> Result<Option<Self>, CoreError> {
        let bucket = match value.map(str::trim) {
            None | Some("") => return Ok(None),
            Some("today") => Self::Today,
            Some("tomorrow") => Self::Tomorrow,
            Some("this-week") => Self::ThisWeek,
            Some("this-weekend") => Self::ThisWeekend,
            Some("next-week") => Self::NextWeek,
            Some("next-month") => Self::NextMonth,
            Some(other) => {
                return Err(CoreError::Validation(format!(
                    "Unknown date filter '{other}'"
                )))
            }
        };
        Ok(Some(bucket))
    }

    /// The `[start, end)` window for this bucket relative to `now`.
    ///
    /// Weeks start on Monday. "This weekend" runs from the upcoming
    /// Saturday to the following Monday; on a Sunday it is the weekend
    /// already in progress.
    pub fn range(self, now: NaiveDateTime) -> Option<(LocalTimestamp, LocalTimestamp)> {
        let today = now.date();
        let from_monday = i64::from(today.weekday().num_days_from_monday());
        let next_monday = today + Duration::days(7 - from_monday);

        let (start, end) = match self {
            Self::Today => (today, today + Duration::days(1)),
            Self::Tomorrow => (today + Duration::days(1), today + Duration::days(2)),
            Self::ThisWeek => (today, next_monday),
            Self::ThisWeekend => {
                let saturday = if today.weekday() == Weekday::Sun {
                    today - Duration::days(1)
                } else {
                    today + Duration::days(5 - from_monday)
                };
                (saturday, saturday + Duration::days(2))
            }
            Self::NextWeek => (next_monday, next_monday + Duration::days(7)),
            Self::NextMonth => {
                let first_of_next = today
                    .with_day(1)?
                    .checked_add_months(Months::new(1))?;
                let first_after = first_of_next.checked_add_months(Months::new(1))?;
                (first_of_next, first_after)
            }
        };

        Some((midnight(start), midnight(end)))
    }

    /// Whether `at` falls inside this bucket relative to `now`.
    pub fn contains(self, now: NaiveDateTime, at: LocalTimestamp) -> bool {
        self.range(now)
            .is_some_and(|(start, end)| start <= at && at < end)
    }
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn blank_time_defaults_to_midnight() {
        let date = parse_event_date("2024-06-10").unwrap();
        let time = parse_event_time(Some("  ")).unwrap();
        assert_eq!(combine_start(date, time), at(2024, 6, 10, 0, 0));
        assert_eq!(parse_event_time(None).unwrap(), NaiveTime::MIN);
    }

    #[test]
    fn accepts_both_time_formats() {
        assert_eq!(
            parse_event_time(Some("19:30")).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 0).unwrap()
        );
        assert_eq!(
            parse_event_time(Some("19:30:15")).unwrap(),
            NaiveTime::from_hms_opt(19, 30, 15).unwrap()
        );
        assert!(parse_event_time(Some("7pm")).is_err());
        assert!(parse_event_date("06/10/2024").is_err());
    }

    #[test]
    fn today_and_tomorrow_are_disjoint() {
        // 2024-06-10 is a Monday.
        let now = at(2024, 6, 10, 0, 0);
        let event = at(2024, 6, 10, 10, 0);
        assert!(DateBucket::Today.contains(now, event));
        assert!(!DateBucket::Tomorrow.contains(now, event));
    }

    #[test]
    fn end_of_bucket_is_exclusive() {
        let now = at(2024, 6, 10, 15, 0);
        assert!(!DateBucket::Today.contains(now, at(2024, 6, 11, 0, 0)));
        assert!(DateBucket::Tomorrow.contains(now, at(2024, 6, 11, 0, 0)));
        // Earlier on the same day still counts as today.
        assert!(DateBucket::Today.contains(now, at(2024, 6, 10, 8, 0)));
    }

    #[test]
    fn this_week_runs_until_next_monday() {
        // Wednesday.
        let now = at(2024, 6, 12, 9, 0);
        assert!(DateBucket::ThisWeek.contains(now, at(2024, 6, 16, 23, 59)));
        assert!(!DateBucket::ThisWeek.contains(now, at(2024, 6, 17, 0, 0)));
        assert!(DateBucket::NextWeek.contains(now, at(2024, 6, 17, 0, 0)));
        assert!(!DateBucket::NextWeek.contains(now, at(2024, 6, 24, 0, 0)));
    }

    #[test]
    fn this_weekend_from_weekday() {
        // Wednesday -> Saturday 15th to Monday 17th.
        let now = at(2024, 6, 12, 9, 0);
        let (start, end) = DateBucket::ThisWeekend.range(now).unwrap();
        assert_eq!(start, at(2024, 6, 15, 0, 0));
        assert_eq!(end, at(2024, 6, 17, 0, 0));
    }

    #[test]
    fn this_weekend_on_saturday_and_sunday() {
        let saturday = at(2024, 6, 15, 12, 0);
        let sunday = at(2024, 6, 16, 12, 0);
        let expected = (at(2024, 6, 15, 0, 0), at(2024, 6, 17, 0, 0));
        assert_eq!(DateBucket::ThisWeekend.range(saturday).unwrap(), expected);
        assert_eq!(DateBucket::ThisWeekend.range(sunday).unwrap(), expected);
    }

    #[test]
    fn next_month_handles_year_end() {
        let now = at(2024, 12, 20, 9, 0);
        let (start, end) = DateBucket::NextMonth.range(now).unwrap();
        assert_eq!(start, at(2025, 1, 1, 0, 0));
        assert_eq!(end, at(2025, 2, 1, 0, 0));
    }

    #[test]
    fn next_month_from_the_31st() {
        let now = at(2024, 1, 31, 9, 0);
        let (start, end) = DateBucket::NextMonth.range(now).unwrap();
        assert_eq!(start, at(2024, 2, 1, 0, 0));
        assert_eq!(end, at(2024, 3, 1, 0, 0));
    }

    #[test]
    fn parse_bucket_names() {
        assert_eq!(DateBucket::parse(None).unwrap(), None);
        assert_eq!(
            DateBucket::parse(Some("this-weekend")).unwrap(),
            Some(DateBucket::ThisWeekend)
        );
        assert!(DateBucket::parse(Some("yesterday")).is_err());
        for bucket in [
            DateBucket::Today,
            DateBucket::Tomorrow,
            DateBucket::ThisWeek,
            DateBucket::ThisWeekend,
            DateBucket::NextWeek,
            DateBucket::NextMonth,
        ] {
            assert_eq!(DateBucket::parse(Some(bucket.as_str())).unwrap(), Some(bucket));
        }
    }
}
