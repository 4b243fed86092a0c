//! Daily open/closed tallies for a burndown chart.
//!
//! Every day is judged at its last second (23:59:59 UTC). An issue created
//! by then is visible that day; a visible issue whose `closed_at` is also at
//! or before that second is closed, any other visible issue is open.

use crate::github::GitHubIssue;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Offset of 23:59:59 from midnight.
const END_OF_DAY_SECS: i64 = 24 * 60 * 60 - 1;

/// Counts for a single day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub open: usize,
    pub closed: usize,
}

/// Parallel per-day series, ordered by date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyCounts {
    pub dates: Vec<NaiveDate>,
    pub open_count: Vec<usize>,
    pub closed_count: Vec<usize>,
}

impl DailyCounts {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DayCount> + '_ {
        self.dates
            .iter()
            .zip(&self.open_count)
            .zip(&self.closed_count)
            .map(|((&date, &open), &closed)| DayCount { date, open, closed })
    }

    /// The most recent day, if any.
    pub fn latest(&self) -> Option<DayCount> {
        self.iter().last()
    }

    fn push(&mut self, day: DayCount) {
        self.dates.push(day.date);
        self.open_count.push(day.open);
        self.closed_count.push(day.closed);
    }
}

/// The last instant counted for `date`.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc() + Duration::seconds(END_OF_DAY_SECS)
}

/// Every calendar day from `start` through `end`, both included.
///
/// Empty when `start` is after `end`.
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}

/// Tallies open and closed issues for each day of `[start, end]`.
///
/// Instead of rescanning every issue per day, the creation times and the
/// "closed and visible" times (`max(created_at, closed_at)`) are sorted once,
/// and each day becomes two binary searches. The result is identical to the
/// per-day scan.
pub fn daily_counts(issues: &[GitHubIssue], start: NaiveDate, end: NaiveDate) -> DailyCounts {
    let mut created: Vec<DateTime<Utc>> = issues.iter().map(|issue| issue.created_at).collect();
    created.sort_unstable();

    let mut closed_visible: Vec<DateTime<Utc>> = issues
        .iter()
        .filter_map(|issue| issue.closed_at.map(|closed_at| closed_at.max(issue.created_at)))
        .collect();
    closed_visible.sort_unstable();

    let mut counts = DailyCounts::default();
    for date in date_range(start, end) {
        let day_end = end_of_day(date);
        let visible = created.partition_point(|&at| at <= day_end);
        let closed = closed_visible.partition_point(|&at| at <= day_end);
        counts.push(DayCount {
            date,
            open: visible - closed,
            closed,
        });
    }

    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue(
        number: u64,
        created_at: DateTime<Utc>,
        closed_at: Option<DateTime<Utc>>,
    ) -> GitHubIssue {
        GitHubIssue {
            number,
            created_at,
            closed_at,
        }
    }

    /// Straightforward per-day scan the sweep must agree with.
    fn scan(issues: &[GitHubIssue], start: NaiveDate, end: NaiveDate) -> DailyCounts {
        let mut counts = DailyCounts::default();
        for date in date_range(start, end) {
            let day_end = end_of_day(date);
            let mut open = 0;
            let mut closed = 0;
            for issue in issues.iter().filter(|issue| issue.created_at <= day_end) {
                match issue.closed_at {
                    Some(closed_at) if closed_at <= day_end => closed += 1,
                    _ => open += 1,
                }
            }
            counts.push(DayCount { date, open, closed });
        }
        counts
    }

    #[test]
    fn test_end_of_day() {
        assert_eq!(
            end_of_day(date(2024, 1, 10)),
            Utc.with_ymd_and_hms(2024, 1, 10, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_date_range_is_inclusive_and_consecutive() {
        let range = date_range(date(2024, 2, 27), date(2024, 3, 2));
        assert_eq!(
            range,
            vec![
                date(2024, 2, 27),
                date(2024, 2, 28),
                date(2024, 2, 29),
                date(2024, 3, 1),
                date(2024, 3, 2),
            ]
        );

        let start = date(2023, 3, 1);
        let end = date(2024, 3, 1);
        let year = date_range(start, end);
        assert_eq!(year.len() as i64, (end - start).num_days() + 1);
        assert!(year.windows(2).all(|w| w[1] == w[0].succ_opt().unwrap()));
    }

    #[test]
    fn test_date_range_edges() {
        assert_eq!(date_range(date(2024, 1, 1), date(2024, 1, 1)), vec![date(2024, 1, 1)]);
        assert!(date_range(date(2024, 1, 2), date(2024, 1, 1)).is_empty());
    }

    #[test]
    fn test_issue_lifecycle() {
        let issues = vec![issue(
            1,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 1, 10, 15, 0, 0).unwrap()),
        )];

        let counts = daily_counts(&issues, date(2023, 12, 31), date(2024, 1, 11));
        let day = |d: NaiveDate| counts.iter().find(|c| c.date == d).unwrap();

        assert_eq!((day(date(2023, 12, 31)).open, day(date(2023, 12, 31)).closed), (0, 0));
        assert_eq!((day(date(2024, 1, 1)).open, day(date(2024, 1, 1)).closed), (1, 0));
        assert_eq!((day(date(2024, 1, 5)).open, day(date(2024, 1, 5)).closed), (1, 0));
        assert_eq!((day(date(2024, 1, 9)).open, day(date(2024, 1, 9)).closed), (1, 0));
        assert_eq!((day(date(2024, 1, 10)).open, day(date(2024, 1, 10)).closed), (0, 1));
        assert_eq!((day(date(2024, 1, 11)).open, day(date(2024, 1, 11)).closed), (0, 1));
    }

    #[test]
    fn test_end_of_day_boundary_is_inclusive() {
        let issues = vec![
            issue(
                1,
                Utc.with_ymd_and_hms(2024, 1, 1, 23, 59, 59).unwrap(),
                Some(Utc.with_ymd_and_hms(2024, 1, 2, 23, 59, 59).unwrap()),
            ),
            issue(
                2,
                Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
                Some(Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap()),
            ),
        ];

        let counts = daily_counts(&issues, date(2024, 1, 1), date(2024, 1, 3));

        assert_eq!(counts.open_count, vec![1, 1, 0]);
        assert_eq!(counts.closed_count, vec![0, 1, 2]);
    }

    #[test]
    fn test_never_closed_issue_stays_open() {
        let issues = vec![issue(1, Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(), None)];

        let counts = daily_counts(&issues, date(2024, 1, 1), date(2024, 1, 6));

        assert_eq!(counts.open_count, vec![0, 0, 1, 1, 1, 1]);
        assert_eq!(counts.closed_count, vec![0; 6]);
    }

    #[test]
    fn test_issue_created_after_range_is_ignored() {
        let issues = vec![issue(1, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(), None)];

        let counts = daily_counts(&issues, date(2024, 1, 1), date(2024, 1, 31));

        assert_eq!(counts.len(), 31);
        assert!(counts.iter().all(|day| day.open == 0 && day.closed == 0));
    }

    #[test]
    fn test_closed_before_created_only_counts_once_visible() {
        // Inconsistent data still follows the visibility rule.
        let issues = vec![issue(
            1,
            Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(),
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()),
        )];

        let counts = daily_counts(&issues, date(2024, 1, 1), date(2024, 1, 4));

        assert_eq!(counts, scan(&issues, date(2024, 1, 1), date(2024, 1, 4)));
        assert_eq!(counts.closed_count, vec![0, 0, 1, 1]);
    }

    #[test]
    fn test_empty_inputs() {
        let counts = daily_counts(&[], date(2024, 1, 1), date(2024, 1, 2));
        assert_eq!(counts.open_count, vec![0, 0]);
        assert_eq!(counts.closed_count, vec![0, 0]);

        let none = daily_counts(&[], date(2024, 1, 2), date(2024, 1, 1));
        assert!(none.is_empty());
        assert!(none.latest().is_none());
    }

    #[test]
    fn test_sweep_matches_scan() {
        let base = Utc.with_ymd_and_hms(2023, 12, 20, 0, 0, 0).unwrap();
        // Deterministic spread of creation times and lifetimes, including
        // never-closed issues and same-second closes.
        let issues: Vec<GitHubIssue> = (0..200u64)
            .map(|n| {
                let created_at = base + Duration::minutes((n * 487 % 50_000) as i64);
                let closed_at = match n % 5 {
                    0 => None,
                    1 => Some(created_at),
                    _ => Some(created_at + Duration::minutes((n * 733 % 30_000) as i64)),
                };
                issue(n, created_at, closed_at)
            })
            .collect();

        let start = date(2023, 12, 15);
        let end = date(2024, 2, 15);
        let counts = daily_counts(&issues, start, end);

        assert_eq!(counts, scan(&issues, start, end));

        for day in counts.iter() {
            let created_by_then = issues
                .iter()
                .filter(|issue| issue.created_at <= end_of_day(day.date))
                .count();
            assert!(day.open + day.closed <= created_by_then);
        }
    }

    #[test]
    fn test_latest() {
        let issues = vec![issue(1, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(), None)];
        let counts = daily_counts(&issues, date(2024, 1, 1), date(2024, 1, 3));
        assert_eq!(
            counts.latest(),
            Some(DayCount {
                date: date(2024, 1, 3),
                open: 1,
                closed: 0
            })
        );
    }
}
