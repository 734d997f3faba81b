use anyhow::Result;
use sqlx::PgPool;
use time::Date;

use crate::domain::{ReadingStats, PEAK_END, PEAK_START};

/// Count/sum/min/max of raw readings for one meter-day. The core never
/// reads raw rows individually; this single aggregate query is its whole
/// view of the reading store.
pub async fn daily_stats(pool: &PgPool, meter_id: i64, date: Date) -> Result<ReadingStats> {
    let stats = sqlx::query_as::<_, ReadingStats>(
        r#"
        SELECT
            COUNT(value)            AS reading_count,
            COALESCE(SUM(value), 0) AS total,
            MIN(value)              AS min_reading,
            MAX(value)              AS max_reading
        FROM raw_readings
        WHERE meter_id = $1
          AND reading_date = $2
        "#,
    )
    .bind(meter_id)
    .bind(date)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}

/// Sum of readings falling in the peak window for one meter-day. Readings
/// with a NULL time (daily-granularity feeds) count as peak.
pub async fn peak_window_total(pool: &PgPool, meter_id: i64, date: Date) -> Result<f64> {
    let (total,): (f64,) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(value), 0)
        FROM raw_readings
        WHERE meter_id = $1
          AND reading_date = $2
          AND (reading_time IS NULL
               OR (reading_time >= $3 AND reading_time <= $4))
        "#,
    )
    .bind(meter_id)
    .bind(date)
    .bind(PEAK_START)
    .bind(PEAK_END)
    .fetch_one(pool)
    .await?;

    Ok(total)
}
