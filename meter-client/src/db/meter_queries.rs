use anyhow::Result;
use sqlx::PgPool;

use crate::domain::MeterRef;

/// All active meters, in stable id order.
pub async fn active_meters(pool: &PgPool) -> Result<Vec<MeterRef>> {
    let rows = sqlx::query_as::<_, MeterRef>(
        r#"
        SELECT id, external_identifier
        FROM meters
        WHERE is_active
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
