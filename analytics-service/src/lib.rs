pub mod batch;
pub mod comparison;
pub mod config;
pub mod daily;
pub mod error;
pub mod metrics_server;
pub mod observability;
pub mod rollup;
pub mod switching;
pub mod tariff_cost;

#[cfg(test)]
pub mod testutil;

pub use batch::AggregationSummary;
pub use error::AnalyticsError;
