use serde::Serialize;
use time::Date;

/// Per-meter, per-day rollup of raw readings. Upserted on every daily
/// aggregation run; never written for a meter-day with zero readings.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct DailyAggregate {
    pub meter_id: i64,
    pub aggregate_date: Date,
    pub total_consumption: f64,
    pub peak_consumption: f64,
    /// total − peak; may go negative when overlapping readings inflate the
    /// peak-window sum. Stored signed, never clamped.
    pub off_peak_consumption: f64,
    pub min_reading: f64,
    pub max_reading: f64,
    pub reading_count: i64,
}

/// Weekly/monthly/annual rollup of daily aggregates. The same shape backs
/// all three tables; the storage mapping comes from
/// [`crate::domain::PeriodKind`].
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct PeriodAggregate {
    pub meter_id: i64,
    pub period_start: Date,
    pub period_end: Date,
    pub total_consumption: f64,
    pub peak_consumption: f64,
    pub off_peak_consumption: f64,
    pub min_daily_consumption: f64,
    pub max_daily_consumption: f64,
    /// Daily rows actually present in the window, not the calendar span.
    pub day_count: i64,
    pub reading_count: i64,
}

/// Sums over the daily rows present in a window, as returned by the
/// aggregate store. `min`/`max` are NULL (None) only when `day_count` is
/// zero, in which case the store reports the whole rollup as absent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, sqlx::FromRow)]
pub struct DailyRollup {
    pub total_consumption: f64,
    pub peak_consumption: f64,
    pub off_peak_consumption: f64,
    pub min_daily_consumption: Option<f64>,
    pub max_daily_consumption: Option<f64>,
    pub day_count: i64,
    pub reading_count: i64,
}
