use anyhow::Result;
use sqlx::PgPool;

use crate::domain::{NewSwitchingAnalysis, SwitchingAnalysisRecord};

/// Append one analysis to the audit history. Rows are never updated.
pub async fn insert_analysis(pool: &PgPool, analysis: &NewSwitchingAnalysis) -> Result<i64> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO switching_analyses
            (meter_id, current_tariff_id, recommended_tariff_id, period_start,
             period_end, current_cost, recommended_cost, potential_savings,
             savings_percent, detail)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING id
        "#,
    )
    .bind(analysis.meter_id)
    .bind(analysis.current_tariff_id)
    .bind(analysis.recommended_tariff_id)
    .bind(analysis.period_start)
    .bind(analysis.period_end)
    .bind(analysis.current_cost)
    .bind(analysis.recommended_cost)
    .bind(analysis.potential_savings)
    .bind(analysis.savings_percent)
    .bind(&analysis.detail)
    .fetch_one(pool)
    .await?;

    Ok(id)
}

/// Most-recent-first history for one meter, bounded by `limit`.
pub async fn recent_analyses(
    pool: &PgPool,
    meter_id: i64,
    limit: i64,
) -> Result<Vec<SwitchingAnalysisRecord>> {
    let rows = sqlx::query_as::<_, SwitchingAnalysisRecord>(
        r#"
        SELECT id, meter_id, current_tariff_id, recommended_tariff_id,
               period_start, period_end, current_cost, recommended_cost,
               potential_savings, savings_percent, detail, created_at
        FROM switching_analyses
        WHERE meter_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(meter_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
