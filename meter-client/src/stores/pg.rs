use anyhow::Result;
use sqlx::PgPool;
use time::Date;

use crate::db::{
    aggregate_queries, meter_queries, reading_queries, switching_queries, tariff_queries,
};
use crate::domain::{
    DailyAggregate, DailyRollup, MeterRef, NewSwitchingAnalysis, PeriodAggregate, PeriodKind,
    ReadingStats, SwitchingAnalysisRecord, TariffDefinition,
};
use crate::stores::{AggregateStore, MeterRegistry, ReadingStore, SwitchingStore, TariffRegistry};

/// The one Postgres handle behind every store trait. Cheap to clone; all
/// clones share the underlying pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl MeterRegistry for PgStore {
    async fn active_meters(&self) -> Result<Vec<MeterRef>> {
        meter_queries::active_meters(&self.pool).await
    }
}

#[async_trait::async_trait]
impl ReadingStore for PgStore {
    async fn daily_stats(&self, meter_id: i64, date: Date) -> Result<ReadingStats> {
        reading_queries::daily_stats(&self.pool, meter_id, date).await
    }

    async fn peak_window_total(&self, meter_id: i64, date: Date) -> Result<f64> {
        reading_queries::peak_window_total(&self.pool, meter_id, date).await
    }
}

#[async_trait::async_trait]
impl AggregateStore for PgStore {
    async fn upsert_daily(&self, aggregate: &DailyAggregate) -> Result<()> {
        aggregate_queries::upsert_daily(&self.pool, aggregate).await
    }

    async fn fetch_daily(&self, meter_id: i64, date: Date) -> Result<Option<DailyAggregate>> {
        aggregate_queries::fetch_daily(&self.pool, meter_id, date).await
    }

    async fn daily_rollup(
        &self,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<DailyRollup>> {
        aggregate_queries::daily_rollup(&self.pool, meter_id, start, end).await
    }

    async fn upsert_period(&self, kind: PeriodKind, aggregate: &PeriodAggregate) -> Result<()> {
        aggregate_queries::upsert_period(&self.pool, kind, aggregate).await
    }

    async fn fetch_period(
        &self,
        kind: PeriodKind,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<PeriodAggregate>> {
        aggregate_queries::fetch_period(&self.pool, kind, meter_id, start, end).await
    }
}

#[async_trait::async_trait]
impl TariffRegistry for PgStore {
    async fn tariff_by_id(&self, id: i64) -> Result<Option<TariffDefinition>> {
        tariff_queries::tariff_by_id(&self.pool, id).await
    }

    async fn active_tariffs(
        &self,
        energy_type: Option<&str>,
        exclude_tariff: Option<i64>,
        valid_on: Date,
    ) -> Result<Vec<TariffDefinition>> {
        tariff_queries::active_tariffs(&self.pool, energy_type, exclude_tariff, valid_on).await
    }

    async fn infer_meter_tariff(
        &self,
        meter_id: i64,
        valid_on: Date,
    ) -> Result<Option<TariffDefinition>> {
        tariff_queries::infer_meter_tariff(&self.pool, meter_id, valid_on).await
    }
}

#[async_trait::async_trait]
impl SwitchingStore for PgStore {
    async fn insert_analysis(&self, analysis: &NewSwitchingAnalysis) -> Result<i64> {
        switching_queries::insert_analysis(&self.pool, analysis).await
    }

    async fn recent_analyses(
        &self,
        meter_id: i64,
        limit: i64,
    ) -> Result<Vec<SwitchingAnalysisRecord>> {
        switching_queries::recent_analyses(&self.pool, meter_id, limit).await
    }
}
