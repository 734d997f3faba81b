use serde::Serialize;

/// Active-meter listing as exposed by the meter registry. The core never
/// reads meter rows beyond this projection.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MeterRef {
    pub id: i64,
    /// MPAN-style external identifier, used in diagnostics.
    pub external_identifier: String,
}
