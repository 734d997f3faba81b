use std::sync::Arc;

use anyhow::Result;
use meter_client::domain::{DailyAggregate, ReadingStats};
use meter_client::stores::{AggregateStore, MeterRegistry, ReadingStore};
use time::Date;

use crate::batch::AggregationSummary;

/// Rolls raw readings into per-meter daily aggregates. One run covers one
/// date across every active meter; re-running on unchanged readings
/// reproduces identical rows (keyed upsert).
pub struct DailyAggregator {
    meters: Arc<dyn MeterRegistry>,
    readings: Arc<dyn ReadingStore>,
    aggregates: Arc<dyn AggregateStore>,
}

impl DailyAggregator {
    pub fn new(
        meters: Arc<dyn MeterRegistry>,
        readings: Arc<dyn ReadingStore>,
        aggregates: Arc<dyn AggregateStore>,
    ) -> Self {
        Self {
            meters,
            readings,
            aggregates,
        }
    }

    pub async fn aggregate(&self, date: Date) -> Result<AggregationSummary> {
        let meters = self.meters.active_meters().await?;
        let mut summary = AggregationSummary::new(meters.len());

        for meter in &meters {
            match self.aggregate_meter(meter.id, date).await {
                Ok(true) => {
                    summary.record_with_data();
                    metrics::counter!("meters_aggregated_total").increment(1);
                }
                Ok(false) => {
                    summary.record_without_data();
                    metrics::counter!("meters_without_data_total").increment(1);
                }
                Err(e) => {
                    tracing::warn!(
                        meter = %meter.external_identifier,
                        date = %date,
                        error = %e,
                        "daily aggregation failed for meter, continuing"
                    );
                    metrics::counter!("aggregation_meter_errors_total").increment(1);
                    summary.record_failure(format!(
                        "meter {}: {e:#}",
                        meter.external_identifier
                    ));
                }
            }
        }

        tracing::info!(
            date = %date,
            total = summary.total_meters,
            with_data = summary.meters_with_data,
            without_data = summary.meters_without_data,
            errors = summary.errors,
            "daily aggregation run complete"
        );
        Ok(summary)
    }

    /// Returns false when the meter has no readings on `date`; no row is
    /// written in that case, so row absence stays a diagnostic signal.
    async fn aggregate_meter(&self, meter_id: i64, date: Date) -> Result<bool> {
        let stats = self.readings.daily_stats(meter_id, date).await?;
        if stats.reading_count == 0 {
            return Ok(false);
        }
        let peak_total = self.readings.peak_window_total(meter_id, date).await?;
        let aggregate = build_daily_aggregate(meter_id, date, &stats, peak_total);
        self.aggregates.upsert_daily(&aggregate).await?;
        Ok(true)
    }
}

/// Pure assembly of a daily row. Only called with `reading_count > 0`, so
/// the min/max stats are present.
pub fn build_daily_aggregate(
    meter_id: i64,
    date: Date,
    stats: &ReadingStats,
    peak_total: f64,
) -> DailyAggregate {
    DailyAggregate {
        meter_id,
        aggregate_date: date,
        total_consumption: stats.total,
        peak_consumption: peak_total,
        off_peak_consumption: stats.total - peak_total,
        min_reading: stats.min_reading.unwrap_or_default(),
        max_reading: stats.max_reading.unwrap_or_default(),
        reading_count: stats.reading_count,
    }
}
