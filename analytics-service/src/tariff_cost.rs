use std::collections::BTreeMap;

use meter_client::domain::TariffDefinition;
use serde::Serialize;

/// One priced bucket in a cost breakdown. `quantity` is consumption for
/// unit buckets and a day count for the standing charge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostComponent {
    pub label: String,
    pub quantity: f64,
    pub rate: f64,
    pub cost: f64,
}

/// Priced consumption against one tariff. Derived on demand; persisted
/// only inside a switching-analysis detail payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostResult {
    pub tariff_id: i64,
    pub tariff_name: String,
    pub consumption: f64,
    pub unit_cost: f64,
    pub standing_charge_cost: f64,
    pub total_cost: f64,
    pub breakdown: Vec<CostComponent>,
}

/// Time-of-use consumption split for tariffs with bucket rates. A flat
/// tariff prices the same whichever bucket the consumption sits in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ConsumptionSplit {
    pub peak: f64,
    pub off_peak: f64,
    pub weekend: f64,
}

impl ConsumptionSplit {
    pub fn total(&self) -> f64 {
        self.peak + self.off_peak + self.weekend
    }
}

/// Flat pricing with a single standing charge.
pub fn calculate_cost(tariff: &TariffDefinition, consumption: f64) -> CostResult {
    calculate_period_cost(tariff, consumption, 1)
}

/// Flat pricing with the standing charge prorated over `days` (the
/// switching analyzer's `days_analyzed`).
pub fn calculate_period_cost(tariff: &TariffDefinition, consumption: f64, days: i64) -> CostResult {
    let unit_cost = consumption * tariff.unit_rate;
    let standing_charge_cost = tariff.standing_charge * days as f64;
    CostResult {
        tariff_id: tariff.id,
        tariff_name: tariff.name.clone(),
        consumption,
        unit_cost,
        standing_charge_cost,
        total_cost: unit_cost + standing_charge_cost,
        breakdown: vec![
            CostComponent {
                label: "unit".to_string(),
                quantity: consumption,
                rate: tariff.unit_rate,
                cost: unit_cost,
            },
            standing_charge_component(tariff, days),
        ],
    }
}

/// Time-of-use pricing: each bucket at its own rate where the tariff
/// defines one, falling back to the unit rate where it does not. With a
/// flat tariff every bucket collapses onto the unit rate, so this is the
/// general form of [`calculate_cost`].
pub fn calculate_cost_split(
    tariff: &TariffDefinition,
    split: &ConsumptionSplit,
    days: i64,
) -> CostResult {
    let buckets = [
        ("peak", split.peak, tariff.peak_rate),
        ("off_peak", split.off_peak, tariff.off_peak_rate),
        ("weekend", split.weekend, tariff.weekend_rate),
    ];

    let mut breakdown = Vec::with_capacity(buckets.len() + 1);
    let mut unit_cost = 0.0;
    for (label, quantity, bucket_rate) in buckets {
        if quantity == 0.0 {
            continue;
        }
        let rate = bucket_rate.unwrap_or(tariff.unit_rate);
        let cost = quantity * rate;
        unit_cost += cost;
        breakdown.push(CostComponent {
            label: label.to_string(),
            quantity,
            rate,
            cost,
        });
    }
    breakdown.push(standing_charge_component(tariff, days));

    let standing_charge_cost = tariff.standing_charge * days as f64;
    CostResult {
        tariff_id: tariff.id,
        tariff_name: tariff.name.clone(),
        consumption: split.total(),
        unit_cost,
        standing_charge_cost,
        total_cost: unit_cost + standing_charge_cost,
        breakdown,
    }
}

/// Price one consumption figure against every tariff, keyed by tariff id.
pub fn compare_tariffs(
    tariffs: &[TariffDefinition],
    consumption: f64,
) -> BTreeMap<i64, CostResult> {
    tariffs
        .iter()
        .map(|tariff| (tariff.id, calculate_cost(tariff, consumption)))
        .collect()
}

fn standing_charge_component(tariff: &TariffDefinition, days: i64) -> CostComponent {
    CostComponent {
        label: "standing_charge".to_string(),
        quantity: days as f64,
        rate: tariff.standing_charge,
        cost: tariff.standing_charge * days as f64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::flat_tariff;

    #[test]
    fn flat_cost_is_unit_plus_standing_charge() {
        let tariff = flat_tariff(1, "Standard", 0.25, 0.50);
        let cost = calculate_cost(&tariff, 100.0);
        assert_eq!(cost.unit_cost, 25.0);
        assert_eq!(cost.standing_charge_cost, 0.50);
        assert_eq!(cost.total_cost, 25.50);
        assert_eq!(cost.breakdown.len(), 2);
    }

    #[test]
    fn period_cost_prorates_standing_charge_by_days() {
        let tariff = flat_tariff(1, "Standard", 0.25, 0.50);
        let cost = calculate_period_cost(&tariff, 100.0, 90);
        assert_eq!(cost.unit_cost, 25.0);
        assert_eq!(cost.standing_charge_cost, 45.0);
        assert_eq!(cost.total_cost, 70.0);
    }

    #[test]
    fn split_prices_buckets_at_their_rates() {
        let mut tariff = flat_tariff(2, "Economy", 0.20, 0.0);
        tariff.peak_rate = Some(0.30);
        tariff.off_peak_rate = Some(0.10);

        let split = ConsumptionSplit {
            peak: 60.0,
            off_peak: 40.0,
            weekend: 0.0,
        };
        let cost = calculate_cost_split(&tariff, &split, 1);
        assert_eq!(cost.unit_cost, 60.0 * 0.30 + 40.0 * 0.10);
        assert_eq!(cost.consumption, 100.0);
        // Two consumption buckets plus the standing charge.
        assert_eq!(cost.breakdown.len(), 3);
    }

    #[test]
    fn missing_bucket_rate_falls_back_to_unit_rate() {
        let mut tariff = flat_tariff(3, "PeakOnly", 0.20, 0.0);
        tariff.peak_rate = Some(0.40);

        let split = ConsumptionSplit {
            peak: 10.0,
            off_peak: 10.0,
            weekend: 10.0,
        };
        let cost = calculate_cost_split(&tariff, &split, 1);
        assert_eq!(cost.unit_cost, 10.0 * 0.40 + 10.0 * 0.20 + 10.0 * 0.20);
    }

    #[test]
    fn flat_tariff_split_matches_flat_pricing() {
        let tariff = flat_tariff(4, "Flat", 0.25, 0.45);
        let split = ConsumptionSplit {
            peak: 70.0,
            off_peak: 30.0,
            weekend: 0.0,
        };
        let bucketed = calculate_cost_split(&tariff, &split, 1);
        let flat = calculate_cost(&tariff, 100.0);
        assert_eq!(bucketed.total_cost, flat.total_cost);
    }

    #[test]
    fn compare_tariffs_maps_by_id() {
        let tariffs = vec![
            flat_tariff(1, "A", 0.25, 0.0),
            flat_tariff(2, "B", 0.20, 0.0),
        ];
        let costs = compare_tariffs(&tariffs, 100.0);
        assert_eq!(costs[&1].total_cost, 25.0);
        assert_eq!(costs[&2].total_cost, 20.0);
    }
}
