//! In-memory store fakes for engine tests. They substitute for Postgres
//! at the store-trait seam and mirror the SQL semantics the engines rely
//! on (NULL min/max on empty sets, rollups absent for empty windows).

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::{bail, Result};
use meter_client::domain::{
    DailyAggregate, DailyRollup, MeterRef, NewSwitchingAnalysis, PeriodAggregate, PeriodKind,
    ReadingStats, SwitchingAnalysisRecord, TariffDefinition, PEAK_END, PEAK_START,
};
use meter_client::stores::{
    AggregateStore, MeterRegistry, ReadingStore, SwitchingStore, TariffRegistry,
};
use time::{Date, OffsetDateTime, Time};

#[derive(Debug, Clone, Copy)]
pub struct FakeReading {
    pub time: Option<Time>,
    pub value: f64,
}

#[derive(Default)]
pub struct MemoryStore {
    pub meters: Vec<MeterRef>,
    pub readings: Mutex<HashMap<(i64, Date), Vec<FakeReading>>>,
    pub daily: Mutex<HashMap<(i64, Date), DailyAggregate>>,
    pub periods: Mutex<HashMap<(PeriodKind, i64, Date, Date), PeriodAggregate>>,
    pub tariffs: Vec<TariffDefinition>,
    /// meter id -> (supplier id, energy type), backing tariff inference.
    pub meter_suppliers: HashMap<i64, (i64, String)>,
    pub analyses: Mutex<Vec<SwitchingAnalysisRecord>>,
    /// Meters whose reading-store queries fail, for fault-isolation tests.
    pub failing_meters: Vec<i64>,
}

impl MemoryStore {
    pub fn with_meter(mut self, id: i64, external_identifier: &str) -> Self {
        self.meters.push(MeterRef {
            id,
            external_identifier: external_identifier.to_string(),
        });
        self
    }

    pub fn with_tariff(mut self, tariff: TariffDefinition) -> Self {
        self.tariffs.push(tariff);
        self
    }

    pub fn add_reading(&self, meter_id: i64, date: Date, time: Option<Time>, value: f64) {
        self.readings
            .lock()
            .unwrap()
            .entry((meter_id, date))
            .or_default()
            .push(FakeReading { time, value });
    }

    pub fn add_daily(&self, aggregate: DailyAggregate) {
        self.daily
            .lock()
            .unwrap()
            .insert((aggregate.meter_id, aggregate.aggregate_date), aggregate);
    }

    pub fn daily_row(&self, meter_id: i64, date: Date) -> Option<DailyAggregate> {
        self.daily.lock().unwrap().get(&(meter_id, date)).cloned()
    }

    pub fn period_row(
        &self,
        kind: PeriodKind,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Option<PeriodAggregate> {
        self.periods
            .lock()
            .unwrap()
            .get(&(kind, meter_id, start, end))
            .cloned()
    }
}

#[async_trait::async_trait]
impl MeterRegistry for MemoryStore {
    async fn active_meters(&self) -> Result<Vec<MeterRef>> {
        Ok(self.meters.clone())
    }
}

#[async_trait::async_trait]
impl ReadingStore for MemoryStore {
    async fn daily_stats(&self, meter_id: i64, date: Date) -> Result<ReadingStats> {
        if self.failing_meters.contains(&meter_id) {
            bail!("injected reading-store failure");
        }
        let readings = self.readings.lock().unwrap();
        let rows = readings.get(&(meter_id, date)).cloned().unwrap_or_default();
        Ok(ReadingStats {
            reading_count: rows.len() as i64,
            total: rows.iter().map(|r| r.value).sum(),
            min_reading: rows.iter().map(|r| r.value).reduce(f64::min),
            max_reading: rows.iter().map(|r| r.value).reduce(f64::max),
        })
    }

    async fn peak_window_total(&self, meter_id: i64, date: Date) -> Result<f64> {
        if self.failing_meters.contains(&meter_id) {
            bail!("injected reading-store failure");
        }
        let readings = self.readings.lock().unwrap();
        let total = readings
            .get(&(meter_id, date))
            .map(|rows| {
                rows.iter()
                    .filter(|r| r.time.is_none_or(|t| (PEAK_START..=PEAK_END).contains(&t)))
                    .map(|r| r.value)
                    .sum()
            })
            .unwrap_or(0.0);
        Ok(total)
    }
}

#[async_trait::async_trait]
impl AggregateStore for MemoryStore {
    async fn upsert_daily(&self, aggregate: &DailyAggregate) -> Result<()> {
        self.add_daily(aggregate.clone());
        Ok(())
    }

    async fn fetch_daily(&self, meter_id: i64, date: Date) -> Result<Option<DailyAggregate>> {
        Ok(self.daily_row(meter_id, date))
    }

    async fn daily_rollup(
        &self,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<DailyRollup>> {
        let daily = self.daily.lock().unwrap();
        let rows: Vec<&DailyAggregate> = daily
            .iter()
            .filter(|((id, date), _)| *id == meter_id && (start..=end).contains(date))
            .map(|(_, row)| row)
            .collect();
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(DailyRollup {
            total_consumption: rows.iter().map(|r| r.total_consumption).sum(),
            peak_consumption: rows.iter().map(|r| r.peak_consumption).sum(),
            off_peak_consumption: rows.iter().map(|r| r.off_peak_consumption).sum(),
            min_daily_consumption: rows
                .iter()
                .map(|r| r.total_consumption)
                .reduce(f64::min),
            max_daily_consumption: rows
                .iter()
                .map(|r| r.total_consumption)
                .reduce(f64::max),
            day_count: rows.len() as i64,
            reading_count: rows.iter().map(|r| r.reading_count).sum(),
        }))
    }

    async fn upsert_period(&self, kind: PeriodKind, aggregate: &PeriodAggregate) -> Result<()> {
        self.periods.lock().unwrap().insert(
            (
                kind,
                aggregate.meter_id,
                aggregate.period_start,
                aggregate.period_end,
            ),
            aggregate.clone(),
        );
        Ok(())
    }

    async fn fetch_period(
        &self,
        kind: PeriodKind,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<Option<PeriodAggregate>> {
        Ok(self.period_row(kind, meter_id, start, end))
    }
}

#[async_trait::async_trait]
impl TariffRegistry for MemoryStore {
    async fn tariff_by_id(&self, id: i64) -> Result<Option<TariffDefinition>> {
        Ok(self.tariffs.iter().find(|t| t.id == id).cloned())
    }

    async fn active_tariffs(
        &self,
        energy_type: Option<&str>,
        exclude_tariff: Option<i64>,
        valid_on: Date,
    ) -> Result<Vec<TariffDefinition>> {
        let mut tariffs: Vec<TariffDefinition> = self
            .tariffs
            .iter()
            .filter(|t| t.is_active && t.is_valid_on(valid_on))
            .filter(|t| energy_type.is_none_or(|et| t.energy_type == et))
            .filter(|t| exclude_tariff != Some(t.id))
            .cloned()
            .collect();
        tariffs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(tariffs)
    }

    async fn infer_meter_tariff(
        &self,
        meter_id: i64,
        valid_on: Date,
    ) -> Result<Option<TariffDefinition>> {
        let Some((supplier_id, energy_type)) = self.meter_suppliers.get(&meter_id) else {
            return Ok(None);
        };
        Ok(self
            .tariffs
            .iter()
            .filter(|t| {
                t.is_active
                    && t.supplier_id == *supplier_id
                    && t.energy_type == *energy_type
                    && t.is_valid_on(valid_on)
            })
            .max_by_key(|t| t.valid_from)
            .cloned())
    }
}

#[async_trait::async_trait]
impl SwitchingStore for MemoryStore {
    async fn insert_analysis(&self, analysis: &NewSwitchingAnalysis) -> Result<i64> {
        let mut analyses = self.analyses.lock().unwrap();
        let id = analyses.len() as i64 + 1;
        analyses.push(SwitchingAnalysisRecord {
            id,
            meter_id: analysis.meter_id,
            current_tariff_id: analysis.current_tariff_id,
            recommended_tariff_id: analysis.recommended_tariff_id,
            period_start: analysis.period_start,
            period_end: analysis.period_end,
            current_cost: analysis.current_cost,
            recommended_cost: analysis.recommended_cost,
            potential_savings: analysis.potential_savings,
            savings_percent: analysis.savings_percent,
            detail: analysis.detail.clone(),
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(id)
    }

    async fn recent_analyses(
        &self,
        meter_id: i64,
        limit: i64,
    ) -> Result<Vec<SwitchingAnalysisRecord>> {
        Ok(self
            .analyses
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|a| a.meter_id == meter_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

/// A flat-rate tariff for tests; TOU rates are absent unless set.
pub fn flat_tariff(id: i64, name: &str, unit_rate: f64, standing_charge: f64) -> TariffDefinition {
    TariffDefinition {
        id,
        name: name.to_string(),
        supplier_id: 1,
        energy_type: "electricity".to_string(),
        unit_rate,
        standing_charge,
        peak_rate: None,
        off_peak_rate: None,
        weekend_rate: None,
        valid_from: time::macros::date!(2020 - 01 - 01),
        valid_to: None,
        is_active: true,
    }
}
