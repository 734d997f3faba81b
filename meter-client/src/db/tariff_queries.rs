use anyhow::Result;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;

use crate::domain::TariffDefinition;

const TARIFF_COLUMNS: &str = "id, name, supplier_id, energy_type, unit_rate, standing_charge, \
                              peak_rate, off_peak_rate, weekend_rate, valid_from, valid_to, is_active";

pub async fn tariff_by_id(pool: &PgPool, id: i64) -> Result<Option<TariffDefinition>> {
    let row = sqlx::query_as::<_, TariffDefinition>(&format!(
        "SELECT {TARIFF_COLUMNS} FROM tariffs WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Active tariffs valid on `valid_on`, optionally narrowed by energy type
/// and with one tariff excluded (the analysis' current tariff). Ordered by
/// name so downstream ranking ties break deterministically.
pub async fn active_tariffs(
    pool: &PgPool,
    energy_type: Option<&str>,
    exclude_tariff: Option<i64>,
    valid_on: Date,
) -> Result<Vec<TariffDefinition>> {
    let mut builder = QueryBuilder::<Postgres>::new(format!(
        "SELECT {TARIFF_COLUMNS} FROM tariffs WHERE is_active AND valid_from <= "
    ));
    builder.push_bind(valid_on);
    builder.push(" AND (valid_to IS NULL OR valid_to >= ");
    builder.push_bind(valid_on);
    builder.push(")");

    if let Some(energy_type) = energy_type {
        builder.push(" AND energy_type = ");
        builder.push_bind(energy_type);
    }
    if let Some(exclude_tariff) = exclude_tariff {
        builder.push(" AND id <> ");
        builder.push_bind(exclude_tariff);
    }
    builder.push(" ORDER BY name");

    let rows = builder
        .build_query_as::<TariffDefinition>()
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Best-effort "current tariff" for a meter: no explicit meter→tariff
/// assignment exists, so the join goes through the meter's supplier and
/// energy type, taking the most recently started tariff valid on the date.
pub async fn infer_meter_tariff(
    pool: &PgPool,
    meter_id: i64,
    valid_on: Date,
) -> Result<Option<TariffDefinition>> {
    let row = sqlx::query_as::<_, TariffDefinition>(&format!(
        "SELECT t.id, t.name, t.supplier_id, t.energy_type, t.unit_rate, t.standing_charge, \
                t.peak_rate, t.off_peak_rate, t.weekend_rate, t.valid_from, t.valid_to, t.is_active \
         FROM tariffs t \
         JOIN meters m ON m.supplier_id = t.supplier_id AND m.energy_type = t.energy_type \
         WHERE m.id = $1 \
           AND t.is_active \
           AND t.valid_from <= $2 \
           AND (t.valid_to IS NULL OR t.valid_to >= $2) \
         ORDER BY t.valid_from DESC \
         LIMIT 1"
    ))
    .bind(meter_id)
    .bind(valid_on)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
