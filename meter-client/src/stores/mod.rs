//! Storage seams between the analytics engines and Postgres.
//!
//! Each trait covers one external collaborator. [`PgStore`] is the single
//! concrete handle: constructed once around a pool, cloned into every
//! engine, implementing all of the traits.

mod pg;

use anyhow::Result;
use time::Date;

use crate::domain::{
    DailyAggregate, DailyRollup, MeterRef, NewSwitchingAnalysis, PeriodAggregate, PeriodKind,
    ReadingStats, SwitchingAnalysisRecord, TariffDefinition,
};

pub use pg::PgStore;

#[async_trait::async_trait]
pub trait MeterRegistry: Send + Sync {
    async fn active_meters(&self) -> Result<Vec<MeterRef>>;
}

/// Read-only aggregate view of the raw reading store.
#[async_trait::async_trait]
pub trait ReadingStore: Send + Sync {
    async fn daily_stats(&self, meter_id: i64, date: Date) -> Result<ReadingStats>;
    async fn peak_window_total(&self, meter_id: i64, date: Date) -> Result<f64>;
}

/// Owner of the daily and period aggregate tables. Upsert-by-key is the
/// only write mode.
#[async_trait::async_trait]
pub trait AggregateStore: Send + Sync {
    async fn upsert_daily(&self, aggregate: &DailyAggregate) -> Result<()>;
    async fn fetch_daily(&self, meter_id: i64, date: Date) -> Result<Option<DailyAggregate>>;

    /// Sums over daily rows in [start, end]; `None` when the window holds
    /// no rows.
    async fn daily_rollup(
        &self,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<DailyRollup>>;

    async fn upsert_period(&self, kind: PeriodKind, aggregate: &PeriodAggregate) -> Result<()>;
    async fn fetch_period(
        &self,
        kind: PeriodKind,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<PeriodAggregate>>;
}

#[async_trait::async_trait]
pub trait TariffRegistry: Send + Sync {
    async fn tariff_by_id(&self, id: i64) -> Result<Option<TariffDefinition>>;

    async fn active_tariffs(
        &self,
        energy_type: Option<&str>,
        exclude_tariff: Option<i64>,
        valid_on: Date,
    ) -> Result<Vec<TariffDefinition>>;

    /// Best-effort current tariff via the supplier + energy-type +
    /// validity join; `None` when nothing matches.
    async fn infer_meter_tariff(
        &self,
        meter_id: i64,
        valid_on: Date,
    ) -> Result<Option<TariffDefinition>>;
}

/// Append-only switching-analysis audit history.
#[async_trait::async_trait]
pub trait SwitchingStore: Send + Sync {
    async fn insert_analysis(&self, analysis: &NewSwitchingAnalysis) -> Result<i64>;
    async fn recent_analyses(
        &self,
        meter_id: i64,
        limit: i64,
    ) -> Result<Vec<SwitchingAnalysisRecord>>;
}
