use serde::Serialize;

/// Outcome of one batch aggregation run, folded over the active-meter
/// list. A single meter's failure is recorded here and never aborts the
/// remaining meters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationSummary {
    pub total_meters: usize,
    pub meters_with_data: usize,
    pub meters_without_data: usize,
    pub errors: usize,
    /// Failure messages in meter-processing order.
    pub error_messages: Vec<String>,
}

impl AggregationSummary {
    pub fn new(total_meters: usize) -> Self {
        Self {
            total_meters,
            ..Self::default()
        }
    }

    pub fn record_with_data(&mut self) {
        self.meters_with_data += 1;
    }

    pub fn record_without_data(&mut self) {
        self.meters_without_data += 1;
    }

    pub fn record_failure(&mut self, message: String) {
        self.errors += 1;
        self.error_messages.push(message);
    }
}
