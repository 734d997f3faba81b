use serde::Serialize;
use time::{Date, OffsetDateTime};

/// A switching analysis to be appended to the audit history. Rows are
/// write-once; `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSwitchingAnalysis {
    pub meter_id: i64,
    pub current_tariff_id: i64,
    pub recommended_tariff_id: Option<i64>,
    pub period_start: Date,
    pub period_end: Date,
    pub current_cost: f64,
    pub recommended_cost: Option<f64>,
    pub potential_savings: Option<f64>,
    pub savings_percent: Option<f64>,
    /// Full report serialized as JSON text.
    pub detail: String,
}

/// An audit row read back most-recent-first.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SwitchingAnalysisRecord {
    pub id: i64,
    pub meter_id: i64,
    pub current_tariff_id: i64,
    pub recommended_tariff_id: Option<i64>,
    pub period_start: Date,
    pub period_end: Date,
    pub current_cost: f64,
    pub recommended_cost: Option<f64>,
    pub potential_savings: Option<f64>,
    pub savings_percent: Option<f64>,
    pub detail: String,
    pub created_at: OffsetDateTime,
}
