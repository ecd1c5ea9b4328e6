//! Time-range arithmetic shared by slot generation and scheduling.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

/// Parse an "HH:MM" clock time.
pub fn parse_hhmm(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").ok()
}

/// Combine a calendar date and a clock time.
pub fn at(date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    date.and_time(time)
}

/// A half-open interval `[start, end)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn on(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Self {
        Self::new(at(date, start), at(date, end))
    }

    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when the ranges overlap or sit closer than `rest` apart.
    pub fn clashes(&self, other: &TimeRange, rest: Duration) -> bool {
        self.start < other.end + rest && other.start < self.end + rest
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(date: NaiveDate, from: &str, to: &str) -> TimeRange {
        TimeRange::on(date, parse_hhmm(from).unwrap(), parse_hhmm(to).unwrap())
    }

    #[test]
    fn parses_clock_times() {
        assert_eq!(parse_hhmm("08:30"), NaiveTime::from_hms_opt(8, 30, 0));
        assert_eq!(parse_hhmm(" 23:05 "), NaiveTime::from_hms_opt(23, 5, 0));
        assert_eq!(parse_hhmm("8h30"), None);
    }

    #[test]
    fn back_to_back_ranges_do_not_overlap_but_clash() {
        let d = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        let a = range(d, "09:00", "10:00");
        let b = range(d, "10:00", "11:00");
        assert!(!a.overlaps(&b));
        assert!(a.clashes(&b, Duration::minutes(60)));
        assert!(!a.clashes(&b, Duration::zero()));
    }

    #[test]
    fn one_full_slot_gap_is_enough_rest() {
        let d = NaiveDate::from_ymd_opt(2026, 5, 2).unwrap();
        let a = range(d, "09:00", "10:00");
        let c = range(d, "11:00", "12:00");
        assert!(!a.clashes(&c, Duration::minutes(60)));
        assert!(!c.clashes(&a, Duration::minutes(60)));
        assert!(a.clashes(&range(d, "10:30", "11:30"), Duration::minutes(60)));
    }
}
