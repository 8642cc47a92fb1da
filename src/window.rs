// SRDFA Reporter - Daily replication throughput collector
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Trailing 24-hour collection window.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone};

/// Length of every collection window.
pub const WINDOW_MS: i64 = 24 * 60 * 60 * 1000;

/// The `[yesterday midnight, today midnight)` window of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start_ms: i64,
    end_ms: i64,
    period: NaiveDate,
}

impl TimeWindow {
    /// Compute the window ending at midnight of `now`'s date, in `now`'s zone.
    pub fn compute<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let end = start_of_day(&now.timezone(), today);
        let start = end.clone() - Duration::hours(24);

        Self {
            start_ms: start.timestamp_millis(),
            end_ms: end.timestamp_millis(),
            period: today.pred_opt().unwrap_or(NaiveDate::MIN),
        }
    }

    /// Window for the current local date.
    pub fn yesterday() -> Self {
        Self::compute(&Local::now())
    }

    /// Window start as epoch milliseconds.
    pub fn start_millis(&self) -> i64 {
        self.start_ms
    }

    /// Window end (exclusive) as epoch milliseconds.
    pub fn end_millis(&self) -> i64 {
        self.end_ms
    }

    /// The day being reported on.
    pub fn period(&self) -> NaiveDate {
        self.period
    }
}

/// First instant of `date` in `tz`.
///
/// Midnight can fall in a DST gap in a few zones; the first hour that exists
/// is used instead, and UTC as a last resort.
fn start_of_day<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    (0..24)
        .filter_map(|hour| date.and_hms_opt(hour, 0, 0))
        .find_map(|local| tz.from_local_datetime(&local).earliest())
        .unwrap_or_else(|| tz.from_utc_datetime(&date.and_time(NaiveTime::default())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_window_is_exactly_one_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 12).unwrap();
        let window = TimeWindow::compute(&now);
        assert_eq!(window.end_millis() - window.start_millis(), WINDOW_MS);
    }

    #[test]
    fn test_window_end_is_midnight_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 13, 45, 12).unwrap();
        let window = TimeWindow::compute(&now);

        let midnight = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(window.end_millis(), midnight.timestamp_millis());
        assert_eq!(window.end_millis(), 1_710_460_800_000);
        assert_eq!(window.start_millis(), 1_710_374_400_000);
    }

    #[test]
    fn test_window_at_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        let window = TimeWindow::compute(&now);
        assert_eq!(window.end_millis(), now.timestamp_millis());
    }

    #[test]
    fn test_window_just_before_midnight() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 23, 59, 59).unwrap();
        let window = TimeWindow::compute(&now);
        let midnight = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert_eq!(window.end_millis(), midnight.timestamp_millis());
    }

    #[test]
    fn test_window_respects_offset() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 15, 1, 30, 0).unwrap();
        let window = TimeWindow::compute(&now);

        // 2024-03-15 00:00 at UTC+2 is 2024-03-14 22:00 UTC
        let expected = Utc.with_ymd_and_hms(2024, 3, 14, 22, 0, 0).unwrap();
        assert_eq!(window.end_millis(), expected.timestamp_millis());
        assert_eq!(window.period(), NaiveDate::from_ymd_opt(2024, 3, 14).unwrap());
    }

    #[test]
    fn test_period_is_previous_day() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let window = TimeWindow::compute(&now);
        assert_eq!(window.period(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_window_across_year_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 6, 0, 0).unwrap();
        let window = TimeWindow::compute(&now);
        let start = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        assert_eq!(window.start_millis(), start.timestamp_millis());
        assert_eq!(window.period(), NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
    }

    #[test]
    fn test_window_over_a_year_of_days() {
        let mut day = Utc.with_ymd_and_hms(2023, 1, 1, 17, 0, 0).unwrap();
        for _ in 0..366 {
            let window = TimeWindow::compute(&day);
            assert_eq!(window.end_millis() - window.start_millis(), WINDOW_MS);
            assert_eq!(window.end_millis() % WINDOW_MS, 0);
            assert!(window.start_millis() < window.end_millis());
            day += Duration::hours(24);
        }
    }
}
