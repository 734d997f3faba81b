use serde::Serialize;
use time::Date;

/// A supplier tariff as read from the tariff registry. Peak/off-peak and
/// weekend rates are optional; a tariff with none of them is flat-rate.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct TariffDefinition {
    pub id: i64,
    pub name: String,
    pub supplier_id: i64,
    pub energy_type: String,
    /// Price per unit of consumption.
    pub unit_rate: f64,
    /// Fixed recurring fee per day, independent of consumption.
    pub standing_charge: f64,
    pub peak_rate: Option<f64>,
    pub off_peak_rate: Option<f64>,
    pub weekend_rate: Option<f64>,
    pub valid_from: Date,
    pub valid_to: Option<Date>,
    pub is_active: bool,
}

impl TariffDefinition {
    pub fn is_valid_on(&self, date: Date) -> bool {
        self.valid_from <= date && self.valid_to.is_none_or(|until| date <= until)
    }

    pub fn has_time_of_use_rates(&self) -> bool {
        self.peak_rate.is_some() || self.off_peak_rate.is_some() || self.weekend_rate.is_some()
    }
}
