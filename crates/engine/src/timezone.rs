//! Region labels to fixed UTC offsets, and the local day/week/month windows
//! derived from them.
//!
//! All calendar math runs on the offset-shifted instant and the result is
//! shifted back, so the host timezone never leaks into a window.

use chrono::{DateTime, Datelike, Days, Duration, Months, NaiveDate, NaiveTime, Utc};

/// Supported region labels and their offset from UTC in minutes.
///
/// Countries spanning several zones are listed once per zone, disambiguated
/// by the label itself.
const REGIONS: &[(&str, i32)] = &[
    ("India", 330),
    ("Sri Lanka", 330),
    ("Nepal", 345),
    ("Bangladesh", 360),
    ("Pakistan", 300),
    ("Afghanistan", 270),
    ("Iran", 210),
    ("United Arab Emirates", 240),
    ("Saudi Arabia", 180),
    ("Qatar", 180),
    ("Israel", 120),
    ("Egypt", 120),
    ("South Africa", 120),
    ("Kenya", 180),
    ("Nigeria", 60),
    ("Turkey", 180),
    ("Russia (Moscow, UTC+3)", 180),
    ("United Kingdom", 0),
    ("Ireland", 0),
    ("Portugal", 0),
    ("France", 60),
    ("Germany", 60),
    ("Italy", 60),
    ("Spain", 60),
    ("Netherlands", 60),
    ("Sweden", 60),
    ("Poland", 60),
    ("Greece", 120),
    ("Myanmar", 390),
    ("Thailand", 420),
    ("Vietnam", 420),
    ("Indonesia (Western, UTC+7)", 420),
    ("Indonesia (Central, UTC+8)", 480),
    ("Indonesia (Eastern, UTC+9)", 540),
    ("Singapore", 480),
    ("Malaysia", 480),
    ("Philippines", 480),
    ("China", 480),
    ("Hong Kong", 480),
    ("Taiwan", 480),
    ("Japan", 540),
    ("South Korea", 540),
    ("Australia (Western, UTC+8)", 480),
    ("Australia (Central, UTC+9:30)", 570),
    ("Australia (Eastern, UTC+10)", 600),
    ("New Zealand", 720),
    ("Brazil (Brasilia, UTC-3)", -180),
    ("Argentina", -180),
    ("Chile", -240),
    ("Colombia", -300),
    ("Peru", -300),
    ("Mexico (Central, UTC-6)", -360),
    ("Canada (Newfoundland, UTC-3:30)", -210),
    ("Canada (Atlantic, UTC-4)", -240),
    ("Canada (Eastern, UTC-5)", -300),
    ("Canada (Central, UTC-6)", -360),
    ("Canada (Mountain, UTC-7)", -420),
    ("Canada (Pacific, UTC-8)", -480),
    ("United States (Eastern, UTC-5)", -300),
    ("United States (Central, UTC-6)", -360),
    ("United States (Mountain, UTC-7)", -420),
    ("United States (Pacific, UTC-8)", -480),
    ("United States (Alaska, UTC-9)", -540),
    ("United States (Hawaii, UTC-10)", -600),
];

/// Offset in minutes for a stored region label. Unknown or unset labels
/// resolve to UTC.
pub fn offset_minutes(region: Option<&str>) -> i32 {
    let Some(region) = region.map(str::trim).filter(|r| !r.is_empty()) else {
        return 0;
    };
    REGIONS
        .iter()
        .find(|(label, _)| label.eq_ignore_ascii_case(region))
        .map(|(_, offset)| *offset)
        .unwrap_or(0)
}

/// Every label accepted by [`offset_minutes`], in table order.
pub fn supported_regions() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().map(|(label, _)| *label)
}

/// Inclusive `[start, end]` range of UTC instants.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn start_ms(&self) -> i64 {
        self.start.timestamp_millis()
    }

    pub fn end_ms(&self) -> i64 {
        self.end.timestamp_millis()
    }
}

/// The local day, week (Sunday to Saturday) and month containing an instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Windows {
    pub day: Window,
    pub week: Window,
    pub month: Window,
}

impl Windows {
    pub fn at(now: DateTime<Utc>, offset_minutes: i32) -> Self {
        let offset = Duration::minutes(i64::from(offset_minutes));
        let local_date = (now + offset).date_naive();

        let day_start = local_date;
        let day_next = local_date + Days::new(1);

        let week_start =
            local_date - Days::new(u64::from(local_date.weekday().num_days_from_sunday()));
        let week_next = week_start + Days::new(7);

        let month_start = local_date - Days::new(u64::from(local_date.day0()));
        let month_next = month_start + Months::new(1);

        Self {
            day: window(day_start, day_next, offset),
            week: window(week_start, week_next, offset),
            month: window(month_start, month_next, offset),
        }
    }
}

/// Local `[start, next)` dates to an inclusive UTC window ending one
/// millisecond before `next`.
fn window(start: NaiveDate, next: NaiveDate, offset: Duration) -> Window {
    let to_utc = |date: NaiveDate| date.and_time(NaiveTime::MIN).and_utc() - offset;
    Window {
        start: to_utc(start),
        end: to_utc(next) - Duration::milliseconds(1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn lookup_is_case_insensitive_and_defaults_to_utc() {
        assert_eq!(offset_minutes(Some("india")), 330);
        assert_eq!(offset_minutes(Some("  United States (Eastern, UTC-5) ")), -300);
        assert_eq!(offset_minutes(Some("Atlantis")), 0);
        assert_eq!(offset_minutes(Some("")), 0);
        assert_eq!(offset_minutes(None), 0);
    }

    #[test]
    fn every_listed_region_resolves() {
        for label in supported_regions() {
            let expected = REGIONS.iter().find(|(l, _)| *l == label).unwrap().1;
            assert_eq!(offset_minutes(Some(label)), expected);
        }
    }

    #[test]
    fn positive_offset_moves_instant_into_next_local_month() {
        // 2024-02-01T00:30 in UTC+5:30.
        let windows = Windows::at(at("2024-01-31T19:00:00Z"), 330);
        assert_eq!(windows.month.start, at("2024-01-31T18:30:00Z"));
        assert_eq!(windows.month.end, at("2024-02-29T18:29:59.999Z"));
        assert!(windows.month.contains(at("2024-01-31T19:00:00Z")));
        assert_eq!(windows.day.start, at("2024-01-31T18:30:00Z"));
        assert_eq!(windows.day.end, at("2024-02-01T18:29:59.999Z"));
    }

    #[test]
    fn month_end_is_inclusive_to_the_millisecond() {
        let windows = Windows::at(at("2024-03-15T12:00:00Z"), 0);
        let last = at("2024-03-31T23:59:59.999Z");
        assert!(windows.month.contains(last));
        assert!(!windows.month.contains(last + Duration::milliseconds(1)));
        assert!(windows.month.contains(at("2024-03-01T00:00:00Z")));
        assert!(!windows.month.contains(at("2024-02-29T23:59:59.999Z")));
    }

    #[test]
    fn week_runs_sunday_to_saturday() {
        // Wednesday 2024-05-15.
        let windows = Windows::at(at("2024-05-15T10:00:00Z"), 0);
        assert_eq!(windows.week.start, at("2024-05-12T00:00:00Z"));
        assert_eq!(windows.week.end, at("2024-05-18T23:59:59.999Z"));

        // A Sunday starts its own week.
        let sunday = Windows::at(at("2024-05-12T00:00:00Z"), 0);
        assert_eq!(sunday.week.start, at("2024-05-12T00:00:00Z"));
    }

    #[test]
    fn negative_offset_keeps_previous_local_day() {
        // 2024-01-01T03:00Z is still New Year's Eve in UTC-5.
        let windows = Windows::at(at("2024-01-01T03:00:00Z"), -300);
        assert_eq!(windows.day.start, at("2023-12-31T05:00:00Z"));
        assert_eq!(windows.month.start, at("2023-12-01T05:00:00Z"));
        assert_eq!(windows.month.end, at("2024-01-01T04:59:59.999Z"));
    }

    #[test]
    fn december_rolls_into_january() {
        let windows = Windows::at(at("2024-12-20T00:00:00Z"), 0);
        assert_eq!(windows.month.end, at("2024-12-31T23:59:59.999Z"));
    }
}
