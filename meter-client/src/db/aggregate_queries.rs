use anyhow::Result;
use sqlx::PgPool;
use time::Date;

use crate::domain::{DailyAggregate, DailyRollup, PeriodAggregate, PeriodKind};

/// Insert-or-overwrite the daily aggregate keyed by (meter, date).
/// Re-applying with unchanged inputs is a no-op value-wise, which is what
/// makes aggregation runs idempotent.
pub async fn upsert_daily(pool: &PgPool, aggregate: &DailyAggregate) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO daily_aggregates
            (meter_id, aggregate_date, total_consumption, peak_consumption,
             off_peak_consumption, min_reading, max_reading, reading_count)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (meter_id, aggregate_date) DO UPDATE SET
            total_consumption    = EXCLUDED.total_consumption,
            peak_consumption     = EXCLUDED.peak_consumption,
            off_peak_consumption = EXCLUDED.off_peak_consumption,
            min_reading          = EXCLUDED.min_reading,
            max_reading          = EXCLUDED.max_reading,
            reading_count        = EXCLUDED.reading_count
        "#,
    )
    .bind(aggregate.meter_id)
    .bind(aggregate.aggregate_date)
    .bind(aggregate.total_consumption)
    .bind(aggregate.peak_consumption)
    .bind(aggregate.off_peak_consumption)
    .bind(aggregate.min_reading)
    .bind(aggregate.max_reading)
    .bind(aggregate.reading_count)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn fetch_daily(
    pool: &PgPool,
    meter_id: i64,
    date: Date,
) -> Result<Option<DailyAggregate>> {
    let row = sqlx::query_as::<_, DailyAggregate>(
        r#"
        SELECT meter_id, aggregate_date, total_consumption, peak_consumption,
               off_peak_consumption, min_reading, max_reading, reading_count
        FROM daily_aggregates
        WHERE meter_id = $1
          AND aggregate_date = $2
        "#,
    )
    .bind(meter_id)
    .bind(date)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Sum the daily rows present in [start, end]. Returns `None` when the
/// window holds no rows at all, so callers can tell "no data" apart from
/// "computed to zero".
pub async fn daily_rollup(
    pool: &PgPool,
    meter_id: i64,
    start: Date,
    end: Date,
) -> Result<Option<DailyRollup>> {
    let rollup = sqlx::query_as::<_, DailyRollup>(
        r#"
        SELECT
            COALESCE(SUM(total_consumption), 0)    AS total_consumption,
            COALESCE(SUM(peak_consumption), 0)     AS peak_consumption,
            COALESCE(SUM(off_peak_consumption), 0) AS off_peak_consumption,
            MIN(total_consumption)                 AS min_daily_consumption,
            MAX(total_consumption)                 AS max_daily_consumption,
            COUNT(*)                               AS day_count,
            -- SUM over BIGINT widens to NUMERIC; narrow it back for decoding
            COALESCE(SUM(reading_count), 0)::BIGINT AS reading_count
        FROM daily_aggregates
        WHERE meter_id = $1
          AND aggregate_date BETWEEN $2 AND $3
        "#,
    )
    .bind(meter_id)
    .bind(start)
    .bind(end)
    .fetch_one(pool)
    .await?;

    Ok((rollup.day_count > 0).then_some(rollup))
}

/// Upsert a period aggregate into the table named by `kind`. Identifiers
/// are interpolated from the closed enum's metadata, never from input.
pub async fn upsert_period(pool: &PgPool, kind: PeriodKind, aggregate: &PeriodAggregate) -> Result<()> {
    let sql = format!(
        "INSERT INTO {table} \
            (meter_id, {start_col}, {end_col}, total_consumption, peak_consumption, \
             off_peak_consumption, min_daily_consumption, max_daily_consumption, \
             day_count, reading_count) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
         ON CONFLICT (meter_id, {start_col}, {end_col}) DO UPDATE SET \
            total_consumption     = EXCLUDED.total_consumption, \
            peak_consumption      = EXCLUDED.peak_consumption, \
            off_peak_consumption  = EXCLUDED.off_peak_consumption, \
            min_daily_consumption = EXCLUDED.min_daily_consumption, \
            max_daily_consumption = EXCLUDED.max_daily_consumption, \
            day_count             = EXCLUDED.day_count, \
            reading_count         = EXCLUDED.reading_count",
        table = kind.table(),
        start_col = kind.start_column(),
        end_col = kind.end_column(),
    );

    sqlx::query(&sql)
        .bind(aggregate.meter_id)
        .bind(aggregate.period_start)
        .bind(aggregate.period_end)
        .bind(aggregate.total_consumption)
        .bind(aggregate.peak_consumption)
        .bind(aggregate.off_peak_consumption)
        .bind(aggregate.min_daily_consumption)
        .bind(aggregate.max_daily_consumption)
        .bind(aggregate.day_count)
        .bind(aggregate.reading_count)
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn fetch_period(
    pool: &PgPool,
    kind: PeriodKind,
    meter_id: i64,
    start: Date,
    end: Date,
) -> Result<Option<PeriodAggregate>> {
    let sql = format!(
        "SELECT meter_id, {start_col} AS period_start, {end_col} AS period_end, \
                total_consumption, peak_consumption, off_peak_consumption, \
                min_daily_consumption, max_daily_consumption, day_count, reading_count \
         FROM {table} \
         WHERE meter_id = $1 AND {start_col} = $2 AND {end_col} = $3",
        table = kind.table(),
        start_col = kind.start_column(),
        end_col = kind.end_column(),
    );

    let row = sqlx::query_as::<_, PeriodAggregate>(&sql)
        .bind(meter_id)
        .bind(start)
        .bind(end)
        .fetch_optional(pool)
        .await?;

    Ok(row)
}
