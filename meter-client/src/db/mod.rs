pub mod aggregate_queries;
pub mod meter_queries;
pub mod reading_queries;
pub mod switching_queries;
pub mod tariff_queries;
