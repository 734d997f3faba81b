use std::sync::Arc;

use anyhow::Result;
use meter_client::domain::period::{month_before, year_before};
use meter_client::domain::{DailyAggregate, PeriodAggregate, PeriodKind};
use meter_client::stores::AggregateStore;
use serde::Serialize;
use time::{Date, Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increase,
    Decrease,
    Stable,
    /// The current period itself has no aggregate.
    NoData,
    /// The prior period is missing or zero, so no ratio exists.
    NoComparison,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Delta {
    pub absolute: Option<f64>,
    pub percentage: Option<f64>,
    pub trend: Trend,
}

/// Period-over-period delta on consumption totals. Never divides by zero:
/// a missing or zero previous value yields no percentage and a
/// `NoComparison` trend.
pub fn delta(current: Option<f64>, previous: Option<f64>) -> Delta {
    let Some(current) = current else {
        return Delta {
            absolute: None,
            percentage: None,
            trend: Trend::NoData,
        };
    };
    let Some(previous) = previous else {
        return Delta {
            absolute: None,
            percentage: None,
            trend: Trend::NoComparison,
        };
    };

    let absolute = current - previous;
    if previous == 0.0 {
        return Delta {
            absolute: Some(absolute),
            percentage: None,
            trend: Trend::NoComparison,
        };
    }

    let trend = if absolute > 0.0 {
        Trend::Increase
    } else if absolute < 0.0 {
        Trend::Decrease
    } else {
        Trend::Stable
    };
    Delta {
        absolute: Some(absolute),
        percentage: Some(absolute / previous * 100.0),
        trend,
    }
}

/// One day against its four comparable prior days.
#[derive(Debug, Clone, Serialize)]
pub struct DailyComparison {
    pub meter_id: i64,
    pub date: Date,
    pub current: Option<DailyAggregate>,
    pub previous_day: Option<DailyAggregate>,
    pub previous_week: Option<DailyAggregate>,
    pub previous_month: Option<DailyAggregate>,
    pub previous_year: Option<DailyAggregate>,
    pub day_over_day: Delta,
    pub week_over_week: Delta,
    pub month_over_month: Delta,
    pub year_over_year: Delta,
}

/// A calendar-aligned period against the prior period and the comparable
/// period one year earlier. `year_over_year` is `None` for annual
/// windows, where it would duplicate `period_over_period`.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodComparison {
    pub meter_id: i64,
    pub kind: PeriodKind,
    pub period_start: Date,
    pub period_end: Date,
    pub current: Option<PeriodAggregate>,
    pub previous_period: Option<PeriodAggregate>,
    pub previous_year: Option<PeriodAggregate>,
    pub period_over_period: Delta,
    pub year_over_year: Option<Delta>,
}

pub struct ComparisonEngine {
    aggregates: Arc<dyn AggregateStore>,
}

impl ComparisonEngine {
    pub fn new(aggregates: Arc<dyn AggregateStore>) -> Self {
        Self { aggregates }
    }

    pub async fn daily_comparison(&self, meter_id: i64, date: Date) -> Result<DailyComparison> {
        let current = self.aggregates.fetch_daily(meter_id, date).await?;
        let previous_day = self
            .aggregates
            .fetch_daily(meter_id, date - Duration::days(1))
            .await?;
        let previous_week = self
            .aggregates
            .fetch_daily(meter_id, date - Duration::days(7))
            .await?;
        let previous_month = self
            .aggregates
            .fetch_daily(meter_id, month_before(date))
            .await?;
        let previous_year = self
            .aggregates
            .fetch_daily(meter_id, year_before(date))
            .await?;

        let current_total = daily_total(current.as_ref());
        Ok(DailyComparison {
            meter_id,
            date,
            day_over_day: delta(current_total, daily_total(previous_day.as_ref())),
            week_over_week: delta(current_total, daily_total(previous_week.as_ref())),
            month_over_month: delta(current_total, daily_total(previous_month.as_ref())),
            year_over_year: delta(current_total, daily_total(previous_year.as_ref())),
            current,
            previous_day,
            previous_week,
            previous_month,
            previous_year,
        })
    }

    /// Compares the calendar window of `kind` containing `anchor`. The
    /// prior windows are whole-window shifts so weekly comparisons stay
    /// Mon–Sun against Mon–Sun.
    pub async fn period_comparison(
        &self,
        kind: PeriodKind,
        meter_id: i64,
        anchor: Date,
    ) -> Result<PeriodComparison> {
        let (start, end) = kind.containing(anchor);
        let current = self
            .aggregates
            .fetch_period(kind, meter_id, start, end)
            .await?;

        let (prev_start, prev_end) = kind.previous(start, end);
        let previous_period = self
            .aggregates
            .fetch_period(kind, meter_id, prev_start, prev_end)
            .await?;

        let previous_year = match kind {
            PeriodKind::Annual => None,
            PeriodKind::Weekly | PeriodKind::Monthly => {
                let (year_start, year_end) = kind.year_earlier(start, end);
                self.aggregates
                    .fetch_period(kind, meter_id, year_start, year_end)
                    .await?
            }
        };

        let current_total = period_total(current.as_ref());
        Ok(PeriodComparison {
            meter_id,
            kind,
            period_start: start,
            period_end: end,
            period_over_period: delta(current_total, period_total(previous_period.as_ref())),
            year_over_year: match kind {
                PeriodKind::Annual => None,
                PeriodKind::Weekly | PeriodKind::Monthly => Some(delta(
                    current_total,
                    period_total(previous_year.as_ref()),
                )),
            },
            current,
            previous_period,
            previous_year,
        })
    }

    pub async fn weekly_comparison(&self, meter_id: i64, anchor: Date) -> Result<PeriodComparison> {
        self.period_comparison(PeriodKind::Weekly, meter_id, anchor).await
    }

    pub async fn monthly_comparison(&self, meter_id: i64, anchor: Date) -> Result<PeriodComparison> {
        self.period_comparison(PeriodKind::Monthly, meter_id, anchor).await
    }

    pub async fn annual_comparison(&self, meter_id: i64, anchor: Date) -> Result<PeriodComparison> {
        self.period_comparison(PeriodKind::Annual, meter_id, anchor).await
    }
}

fn daily_total(aggregate: Option<&DailyAggregate>) -> Option<f64> {
    aggregate.map(|a| a.total_consumption)
}

fn period_total(aggregate: Option<&PeriodAggregate>) -> Option<f64> {
    aggregate.map(|a| a.total_consumption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemoryStore;
    use time::macros::date;

    #[test]
    fn increase_with_percentage() {
        let d = delta(Some(100.0), Some(80.0));
        assert_eq!(d.absolute, Some(20.0));
        assert_eq!(d.percentage, Some(25.0));
        assert_eq!(d.trend, Trend::Increase);
    }

    #[test]
    fn decrease_and_stable() {
        assert_eq!(delta(Some(60.0), Some(80.0)).trend, Trend::Decrease);
        let stable = delta(Some(80.0), Some(80.0));
        assert_eq!(stable.trend, Trend::Stable);
        assert_eq!(stable.absolute, Some(0.0));
        assert_eq!(stable.percentage, Some(0.0));
    }

    #[test]
    fn missing_previous_is_no_comparison() {
        let d = delta(Some(100.0), None);
        assert_eq!(d.absolute, None);
        assert_eq!(d.percentage, None);
        assert_eq!(d.trend, Trend::NoComparison);
    }

    #[test]
    fn zero_previous_never_divides() {
        let d = delta(Some(100.0), Some(0.0));
        assert_eq!(d.absolute, Some(100.0));
        assert_eq!(d.percentage, None);
        assert_eq!(d.trend, Trend::NoComparison);
    }

    #[test]
    fn missing_current_is_no_data() {
        assert_eq!(delta(None, Some(80.0)).trend, Trend::NoData);
        assert_eq!(delta(None, None).trend, Trend::NoData);
    }

    fn daily(meter_id: i64, date: Date, total: f64) -> DailyAggregate {
        DailyAggregate {
            meter_id,
            aggregate_date: date,
            total_consumption: total,
            peak_consumption: total,
            off_peak_consumption: 0.0,
            min_reading: 0.0,
            max_reading: total,
            reading_count: 1,
        }
    }

    #[tokio::test]
    async fn daily_comparison_clamps_month_arithmetic() {
        let store = Arc::new(MemoryStore::default());
        store.add_daily(daily(1, date!(2025 - 03 - 31), 100.0));
        // 2025-03-31 minus one month lands on Feb 28, not an invalid Feb 31.
        store.add_daily(daily(1, date!(2025 - 02 - 28), 80.0));

        let engine = ComparisonEngine::new(store.clone());
        let cmp = engine.daily_comparison(1, date!(2025 - 03 - 31)).await.unwrap();

        assert_eq!(cmp.month_over_month.absolute, Some(20.0));
        assert_eq!(cmp.month_over_month.percentage, Some(25.0));
        assert_eq!(cmp.month_over_month.trend, Trend::Increase);
        assert_eq!(cmp.day_over_day.trend, Trend::NoComparison);
    }

    fn period(meter_id: i64, start: Date, end: Date, total: f64) -> PeriodAggregate {
        PeriodAggregate {
            meter_id,
            period_start: start,
            period_end: end,
            total_consumption: total,
            peak_consumption: total,
            off_peak_consumption: 0.0,
            min_daily_consumption: 0.0,
            max_daily_consumption: total,
            day_count: 7,
            reading_count: 7,
        }
    }

    #[tokio::test]
    async fn weekly_comparison_shifts_the_whole_window() {
        let store = Arc::new(MemoryStore::default());
        let kind = PeriodKind::Weekly;
        let (start, end) = kind.containing(date!(2025 - 11 - 12));
        let (prev_start, prev_end) = kind.previous(start, end);
        let agg_current = period(1, start, end, 70.0);
        let agg_prev = period(1, prev_start, prev_end, 140.0);
        store.upsert_period(kind, &agg_current).await.unwrap();
        store.upsert_period(kind, &agg_prev).await.unwrap();

        let engine = ComparisonEngine::new(store.clone());
        let cmp = engine.weekly_comparison(1, date!(2025 - 11 - 12)).await.unwrap();

        assert_eq!(cmp.period_start, date!(2025 - 11 - 10));
        assert_eq!(cmp.period_end, date!(2025 - 11 - 16));
        assert_eq!(cmp.period_over_period.absolute, Some(-70.0));
        assert_eq!(cmp.period_over_period.percentage, Some(-50.0));
        assert_eq!(cmp.period_over_period.trend, Trend::Decrease);
        // No data one year back.
        assert_eq!(cmp.year_over_year.unwrap().trend, Trend::NoComparison);
    }

    #[tokio::test]
    async fn annual_comparison_has_single_delta() {
        let store = Arc::new(MemoryStore::default());
        let kind = PeriodKind::Annual;
        let (start, end) = kind.containing(date!(2025 - 06 - 01));
        let agg = period(1, start, end, 1000.0);
        store.upsert_period(kind, &agg).await.unwrap();

        let engine = ComparisonEngine::new(store.clone());
        let cmp = engine.annual_comparison(1, date!(2025 - 06 - 01)).await.unwrap();

        assert!(cmp.year_over_year.is_none());
        assert_eq!(cmp.period_over_period.trend, Trend::NoComparison);
    }
}
