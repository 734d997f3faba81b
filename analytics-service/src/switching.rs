use std::cmp::Ordering;
use std::sync::Arc;

use anyhow::Result;
use meter_client::domain::{NewSwitchingAnalysis, SwitchingAnalysisRecord, TariffDefinition};
use meter_client::stores::{AggregateStore, SwitchingStore, TariffRegistry};
use serde::Serialize;
use time::{Date, Duration};

use crate::error::AnalyticsError;
use crate::tariff_cost::{calculate_period_cost, CostResult};

/// An alternative tariff priced against the analysis window, with its
/// savings relative to the current tariff. Negative savings mean the
/// alternative is more expensive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTariff {
    pub tariff_id: i64,
    pub tariff_name: String,
    pub cost: CostResult,
    pub potential_savings: f64,
    pub savings_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwitchingReport {
    pub meter_id: i64,
    pub period_start: Date,
    pub period_end: Date,
    /// Daily rows present in the window, not the calendar span.
    pub days_analyzed: i64,
    pub consumption: f64,
    pub current: CostResult,
    /// Best savings first; ties broken by tariff name.
    pub alternatives: Vec<RankedTariff>,
    /// The top alternative, only when it strictly saves money.
    pub recommendation: Option<RankedTariff>,
}

/// Structured outcome of one analysis call. Missing data is an answer
/// here, not an error; hard failures are reserved for configuration
/// problems such as an unknown current tariff.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SwitchingOutcome {
    NoData {
        meter_id: i64,
        period_start: Date,
        period_end: Date,
    },
    NoCurrentTariff {
        meter_id: i64,
        as_of: Date,
    },
    Analyzed(SwitchingReport),
}

pub struct SwitchingAnalyzer {
    aggregates: Arc<dyn AggregateStore>,
    tariffs: Arc<dyn TariffRegistry>,
    history: Arc<dyn SwitchingStore>,
}

impl SwitchingAnalyzer {
    pub fn new(
        aggregates: Arc<dyn AggregateStore>,
        tariffs: Arc<dyn TariffRegistry>,
        history: Arc<dyn SwitchingStore>,
    ) -> Self {
        Self {
            aggregates,
            tariffs,
            history,
        }
    }

    /// Price the meter's consumption over [start, end] on the current
    /// tariff and every active alternative, rank the alternatives by
    /// savings, and append the result to the audit history when
    /// `persist` is set.
    pub async fn analyze(
        &self,
        meter_id: i64,
        current_tariff_id: i64,
        start: Date,
        end: Date,
        energy_type: Option<&str>,
        persist: bool,
    ) -> Result<SwitchingOutcome> {
        if start > end {
            return Err(AnalyticsError::InvalidRange { start, end }.into());
        }
        let current_tariff = self
            .tariffs
            .tariff_by_id(current_tariff_id)
            .await?
            .ok_or(AnalyticsError::TariffNotFound(current_tariff_id))?;

        let Some(rollup) = self.aggregates.daily_rollup(meter_id, start, end).await? else {
            metrics::counter!("switching_analyses_total", "outcome" => "no_data").increment(1);
            return Ok(SwitchingOutcome::NoData {
                meter_id,
                period_start: start,
                period_end: end,
            });
        };

        let consumption = rollup.total_consumption;
        let days_analyzed = rollup.day_count;
        let current = calculate_period_cost(&current_tariff, consumption, days_analyzed);

        let candidates = self
            .tariffs
            .active_tariffs(energy_type, Some(current_tariff_id), end)
            .await?;
        let alternatives = rank_alternatives(&current, &candidates, consumption, days_analyzed);
        let recommendation = alternatives
            .first()
            .filter(|best| best.potential_savings > 0.0)
            .cloned();

        let report = SwitchingReport {
            meter_id,
            period_start: start,
            period_end: end,
            days_analyzed,
            consumption,
            current,
            alternatives,
            recommendation,
        };

        if persist {
            let record = audit_record(&report, current_tariff_id)?;
            let id = self.history.insert_analysis(&record).await?;
            tracing::info!(
                meter_id,
                analysis_id = id,
                recommended = ?record.recommended_tariff_id,
                "switching analysis persisted"
            );
        }
        metrics::counter!("switching_analyses_total", "outcome" => "analyzed").increment(1);

        Ok(SwitchingOutcome::Analyzed(report))
    }

    /// Convenience wrapper over a trailing window of `window_days` ending
    /// at `date`, inferring the current tariff from supplier, energy type
    /// and validity.
    pub async fn detailed_analysis(
        &self,
        meter_id: i64,
        date: Date,
        window_days: i64,
    ) -> Result<SwitchingOutcome> {
        let start = date - Duration::days(window_days - 1);
        let Some(current) = self.tariffs.infer_meter_tariff(meter_id, date).await? else {
            metrics::counter!("switching_analyses_total", "outcome" => "no_tariff").increment(1);
            return Ok(SwitchingOutcome::NoCurrentTariff {
                meter_id,
                as_of: date,
            });
        };
        self.analyze(
            meter_id,
            current.id,
            start,
            date,
            Some(current.energy_type.as_str()),
            true,
        )
        .await
    }

    pub async fn history(&self, meter_id: i64, limit: i64) -> Result<Vec<SwitchingAnalysisRecord>> {
        self.history.recent_analyses(meter_id, limit).await
    }
}

/// Price every candidate and sort by savings, best first. The sort is
/// stable with a name tie-break, so equal-cost tariffs keep a
/// deterministic order.
pub fn rank_alternatives(
    current: &CostResult,
    candidates: &[TariffDefinition],
    consumption: f64,
    days_analyzed: i64,
) -> Vec<RankedTariff> {
    let mut ranked: Vec<RankedTariff> = candidates
        .iter()
        .map(|tariff| {
            let cost = calculate_period_cost(tariff, consumption, days_analyzed);
            let potential_savings = current.total_cost - cost.total_cost;
            let savings_percent = if current.total_cost != 0.0 {
                potential_savings / current.total_cost * 100.0
            } else {
                0.0
            };
            RankedTariff {
                tariff_id: tariff.id,
                tariff_name: tariff.name.clone(),
                cost,
                potential_savings,
                savings_percent,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.potential_savings
            .partial_cmp(&a.potential_savings)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.tariff_name.cmp(&b.tariff_name))
    });
    ranked
}

fn audit_record(report: &SwitchingReport, current_tariff_id: i64) -> Result<NewSwitchingAnalysis> {
    let recommendation = report.recommendation.as_ref();
    Ok(NewSwitchingAnalysis {
        meter_id: report.meter_id,
        current_tariff_id,
        recommended_tariff_id: recommendation.map(|r| r.tariff_id),
        period_start: report.period_start,
        period_end: report.period_end,
        current_cost: report.current.total_cost,
        recommended_cost: recommendation.map(|r| r.cost.total_cost),
        potential_savings: recommendation.map(|r| r.potential_savings),
        savings_percent: recommendation.map(|r| r.savings_percent),
        detail: serde_json::to_string(report)?,
    })
}
