//! Rolling lookback windows charted on every run.
//!
//! Window bounds are UTC calendar dates: the window ends on today's date and
//! starts the lookback before it. Day boundaries are then applied by the
//! counter, so a window never depends on the time of day the run started.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};

/// How far back a window reaches from today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookback {
    Days(u64),
    /// Calendar years: 2024-02-29 minus one year is 2023-02-28.
    Years(u32),
}

/// A named window, independent of any particular "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSpec {
    pub label: &'static str,
    pub title: &'static str,
    pub file_name: &'static str,
    pub lookback: Lookback,
}

/// The charted windows, in the order they are rendered.
pub const WINDOWS: [WindowSpec; 4] = [
    WindowSpec {
        label: "7d",
        title: "Last 7 Days",
        file_name: "burndown-7d.png",
        lookback: Lookback::Days(7),
    },
    WindowSpec {
        label: "30d",
        title: "Last 30 Days",
        file_name: "burndown-30d.png",
        lookback: Lookback::Days(30),
    },
    WindowSpec {
        label: "90d",
        title: "Last 90 Days",
        file_name: "burndown-90d.png",
        lookback: Lookback::Days(90),
    },
    WindowSpec {
        label: "1y",
        title: "Last Year",
        file_name: "burndown-1y.png",
        lookback: Lookback::Years(1),
    },
];

/// A window pinned to concrete dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub spec: WindowSpec,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WindowSpec {
    /// Pins the window to the calendar date of `now`.
    ///
    /// Returns `None` only if the start would fall outside chrono's date range.
    pub fn resolve(&self, now: DateTime<Utc>) -> Option<Window> {
        let end = now.date_naive();
        let start = match self.lookback {
            Lookback::Days(days) => end.checked_sub_days(Days::new(days))?,
            Lookback::Years(years) => end.checked_sub_months(Months::new(years.checked_mul(12)?))?,
        };
        Some(Window {
            spec: *self,
            start,
            end,
        })
    }
}
