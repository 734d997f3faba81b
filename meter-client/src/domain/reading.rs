use time::{macros::time, Time};

/// Peak-window bounds, inclusive. Readings without a time component
/// (daily-granularity feeds) also count as peak.
pub const PEAK_START: Time = time!(07:00:00);
pub const PEAK_END: Time = time!(23:00:00);

/// Count/sum/min/max over one meter-day of raw readings.
///
/// `min_reading`/`max_reading` are `None` exactly when `reading_count` is
/// zero; SQL MIN/MAX over an empty set are NULL.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct ReadingStats {
    pub reading_count: i64,
    pub total: f64,
    pub min_reading: Option<f64>,
    pub max_reading: Option<f64>,
}
