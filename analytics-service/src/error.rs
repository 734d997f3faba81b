use time::Date;

/// Argument and configuration failures that abort a single invocation.
/// Per-meter failures never surface here; they land in the batch
/// summary's error list instead.
#[derive(thiserror::Error, Debug)]
pub enum AnalyticsError {
    #[error("invalid period range: {start} is after {end}")]
    InvalidRange { start: Date, end: Date },
    #[error("tariff {0} not found")]
    TariffNotFound(i64),
}
