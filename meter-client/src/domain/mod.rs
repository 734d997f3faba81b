pub mod aggregate;
pub mod meter;
pub mod period;
pub mod reading;
pub mod switching;
pub mod tariff;

pub use aggregate::{DailyAggregate, DailyRollup, PeriodAggregate};
pub use meter::MeterRef;
pub use period::{PeriodKind, UnknownPeriodKind};
pub use reading::{ReadingStats, PEAK_END, PEAK_START};
pub use switching::{NewSwitchingAnalysis, SwitchingAnalysisRecord};
pub use tariff::TariffDefinition;
