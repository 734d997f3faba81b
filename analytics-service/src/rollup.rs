use std::sync::Arc;

use anyhow::Result;
use meter_client::domain::{DailyRollup, PeriodAggregate, PeriodKind};
use meter_client::stores::{AggregateStore, MeterRegistry};
use time::Date;

use crate::batch::AggregationSummary;
use crate::error::AnalyticsError;

/// Rolls daily aggregates into weekly/monthly/annual rows. The target
/// table and window columns come from the `PeriodKind` metadata, so every
/// kind is handled or the program does not compile.
pub struct PeriodAggregator {
    meters: Arc<dyn MeterRegistry>,
    aggregates: Arc<dyn AggregateStore>,
}

impl PeriodAggregator {
    pub fn new(meters: Arc<dyn MeterRegistry>, aggregates: Arc<dyn AggregateStore>) -> Self {
        Self { meters, aggregates }
    }

    pub async fn aggregate(
        &self,
        kind: PeriodKind,
        start: Date,
        end: Date,
    ) -> Result<AggregationSummary> {
        if start > end {
            return Err(AnalyticsError::InvalidRange { start, end }.into());
        }

        let meters = self.meters.active_meters().await?;
        let mut summary = AggregationSummary::new(meters.len());

        for meter in &meters {
            match self.aggregate_meter(kind, meter.id, start, end).await {
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
                        kind = %kind,
                        start = %start,
                        end = %end,
                        error = %e,
                        "period rollup failed for meter, continuing"
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
            kind = %kind,
            start = %start,
            end = %end,
            total = summary.total_meters,
            with_data = summary.meters_with_data,
            without_data = summary.meters_without_data,
            errors = summary.errors,
            "period rollup run complete"
        );
        Ok(summary)
    }

    async fn aggregate_meter(
        &self,
        kind: PeriodKind,
        meter_id: i64,
        start: Date,
        end: Date,
    ) -> Result<bool> {
        let Some(rollup) = self.aggregates.daily_rollup(meter_id, start, end).await? else {
            return Ok(false);
        };
        let aggregate = build_period_aggregate(meter_id, start, end, &rollup);
        self.aggregates.upsert_period(kind, &aggregate).await?;
        Ok(true)
    }
}

/// Pure assembly of a period row from the daily sums. Only called when the
/// window holds at least one daily row, so min/max are present.
pub fn build_period_aggregate(
    meter_id: i64,
    start: Date,
    end: Date,
    rollup: &DailyRollup,
) -> PeriodAggregate {
    PeriodAggregate {
        meter_id,
        period_start: start,
        period_end: end,
        total_consumption: rollup.total_consumption,
        peak_consumption: rollup.peak_consumption,
        off_peak_consumption: rollup.off_peak_consumption,
        min_daily_consumption: rollup.min_daily_consumption.unwrap_or_default(),
        max_daily_consumption: rollup.max_daily_consumption.unwrap_or_default(),
        day_count: rollup.day_count,
        reading_count: rollup.reading_count,
    }
}
