use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{util::days_in_year_month, Date, Duration, Month};

/// The closed set of rollup resolutions. Each kind carries its own
/// storage mapping (target table, window column names), so an unsupported
/// kind is unrepresentable rather than a runtime default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodKind {
    Weekly,
    Monthly,
    Annual,
}

#[derive(Debug, thiserror::Error)]
#[error("unknown period kind '{0}', expected weekly, monthly or annual")]
pub struct UnknownPeriodKind(String);

impl FromStr for PeriodKind {
    type Err = UnknownPeriodKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "annual" => Ok(Self::Annual),
            other => Err(UnknownPeriodKind(other.to_string())),
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        })
    }
}

impl PeriodKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Weekly => "weekly_aggregates",
            Self::Monthly => "monthly_aggregates",
            Self::Annual => "annual_aggregates",
        }
    }

    pub fn start_column(self) -> &'static str {
        match self {
            Self::Weekly => "week_start",
            Self::Monthly => "month_start",
            Self::Annual => "year_start",
        }
    }

    pub fn end_column(self) -> &'static str {
        match self {
            Self::Weekly => "week_end",
            Self::Monthly => "month_end",
            Self::Annual => "year_end",
        }
    }

    /// Calendar-aligned window containing `anchor`: Monday..Sunday,
    /// first..last of month, or Jan 1..Dec 31.
    pub fn containing(self, anchor: Date) -> (Date, Date) {
        match self {
            Self::Weekly => {
                let monday =
                    anchor - Duration::days(i64::from(anchor.weekday().number_days_from_monday()));
                (monday, monday + Duration::days(6))
            }
            Self::Monthly => month_window(anchor.year(), anchor.month()),
            Self::Annual => (
                calendar_date(anchor.year(), Month::January, 1),
                calendar_date(anchor.year(), Month::December, 31),
            ),
        }
    }

    /// Shift a calendar-aligned window back by one unit of this kind.
    pub fn previous(self, start: Date, end: Date) -> (Date, Date) {
        match self {
            Self::Weekly => (start - Duration::days(7), end - Duration::days(7)),
            Self::Monthly => {
                let (year, month) = previous_month(start.year(), start.month());
                month_window(year, month)
            }
            Self::Annual => (
                calendar_date(start.year() - 1, Month::January, 1),
                calendar_date(start.year() - 1, Month::December, 31),
            ),
        }
    }

    /// The comparable window one year earlier. Weekly windows shift by 52
    /// whole weeks so they stay Monday-aligned; monthly windows map to the
    /// same month of the previous year; annual windows to the previous
    /// year (identical to [`Self::previous`]).
    pub fn year_earlier(self, start: Date, end: Date) -> (Date, Date) {
        match self {
            Self::Weekly => (start - Duration::days(364), end - Duration::days(364)),
            Self::Monthly => month_window(start.year() - 1, start.month()),
            Self::Annual => self.previous(start, end),
        }
    }
}

/// `date` minus one calendar month, day clamped to the target month's
/// length (2025-03-31 → 2025-02-28).
pub fn month_before(date: Date) -> Date {
    let (year, month) = previous_month(date.year(), date.month());
    clamped_date(year, month, date.day())
}

/// `date` minus one calendar year, Feb 29 clamped to Feb 28.
pub fn year_before(date: Date) -> Date {
    clamped_date(date.year() - 1, date.month(), date.day())
}

fn previous_month(year: i32, month: Month) -> (i32, Month) {
    match month {
        Month::January => (year - 1, Month::December),
        other => (year, other.previous()),
    }
}

fn month_window(year: i32, month: Month) -> (Date, Date) {
    (
        calendar_date(year, month, 1),
        calendar_date(year, month, days_in_year_month(year, month)),
    )
}

fn clamped_date(year: i32, month: Month, day: u8) -> Date {
    calendar_date(year, month, day.min(days_in_year_month(year, month)))
}

fn calendar_date(year: i32, month: Month, day: u8) -> Date {
    // Components are derived from an existing Date, so they are in range.
    Date::from_calendar_date(year, month, day).expect("in-range calendar date")
}
