//! Mock provider implementations.
//!
//! Every provider is a deterministic function of the registration: the
//! plate seeds a small hash and all derived fields come from that seed, so
//! repeated lookups of the same plate agree. These stand in for the real
//! DVLA/MOT/HPI/valuation services and share their call shapes.

use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate};

use super::{
    HistoryCheck, HistoryFlags, MotAndTax, MotEntry, MotResult, MotTaxLookup, Recall,
    RecallLookup, ValuationEstimator, ValuationRange, VehicleCondition, VehicleLookup,
    VehicleSummary,
};
use crate::plate::Registration;

/// Bonus applied when the network is short of the model ("we need this car").
pub const STOCK_PRIORITY_BONUS: u32 = 500;
/// Bonus for completing the deal the same day.
pub const SAME_DAY_BONUS: u32 = 200;
/// Spread between the best and worst network offer.
pub const NETWORK_SPREAD: u32 = 800;
/// Floor below which no offer is made.
pub const MIN_VALUATION: u32 = 100;

struct VehicleTemplate {
    make: &'static str,
    model: &'static str,
    body_style: &'static str,
    segment: &'static str,
}

/// Fleet of template vehicles the mock directory draws from.
const VEHICLE_TEMPLATES: &[VehicleTemplate] = &[
    VehicleTemplate { make: "BMW", model: "3 Series", body_style: "saloon", segment: "executive" },
    VehicleTemplate { make: "BMW", model: "5 Series", body_style: "saloon", segment: "executive" },
    VehicleTemplate { make: "BMW", model: "X3", body_style: "suv", segment: "family" },
    VehicleTemplate { make: "BMW", model: "4 Series", body_style: "coupe", segment: "performance" },
    VehicleTemplate { make: "BMW", model: "i4", body_style: "saloon", segment: "ev" },
    VehicleTemplate { make: "MINI", model: "Cooper", body_style: "hatchback", segment: "city" },
    VehicleTemplate { make: "MINI", model: "Countryman", body_style: "suv", segment: "family" },
    VehicleTemplate { make: "BMW", model: "Z4", body_style: "convertible", segment: "performance" },
];

struct RecallTemplate {
    id: &'static str,
    summary: &'static str,
    is_open: bool,
}

/// Catalogue the mock recall service draws from.
const RECALL_CATALOGUE: &[RecallTemplate] = &[
    RecallTemplate {
        id: "R-2023-001",
        summary: "Airbag inflator may degrade - replace module",
        is_open: true,
    },
    RecallTemplate {
        id: "R-2022-012",
        summary: "Steering column fixing bolts check",
        is_open: false,
    },
    RecallTemplate {
        id: "R-2024-007",
        summary: "High-voltage battery software update",
        is_open: true,
    },
    RecallTemplate {
        id: "R-2021-103",
        summary: "EGR cooler inspection",
        is_open: false,
    },
];

/// FNV-1a over the compact plate. Stable across runs, so the same
/// registration always resolves to the same mocked vehicle.
fn seed_for(registration: &Registration) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in registration.compact().bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// All five mock providers in one struct.
///
/// Relative dates (MOT due, tax expiry) hang off `today`, captured at
/// construction so one session sees consistent dates.
pub struct MockProviders {
    today: NaiveDate,
}

impl MockProviders {
    /// Uses the current local date for relative MOT/tax dates.
    pub fn new() -> Self {
        Self {
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Fixed reference date, for deterministic tests.
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Default for MockProviders {
    fn default() -> Self {
        Self::new()
    }
}

impl VehicleLookup for MockProviders {
    fn lookup_vehicle(&self, registration: &Registration) -> Result<Option<VehicleSummary>> {
        // Q-prefix plates mark vehicles of undetermined origin; the mock
        // directory holds no record for them.
        if registration.compact().starts_with('Q') {
            return Ok(None);
        }

        let seed = seed_for(registration);
        let template = &VEHICLE_TEMPLATES[(seed % VEHICLE_TEMPLATES.len() as u64) as usize];
        let year = self.today.year() - 2 - ((seed >> 8) % 9) as i32;
        let mileage = 18_000 + ((seed >> 16) % 80_000) as u32;
        let vin = format!("WBA8B{:012X}", seed & 0xFFFF_FFFF_FFFF);

        Ok(Some(VehicleSummary {
            make: template.make.to_string(),
            model: template.model.to_string(),
            year,
            mileage,
            vin,
            body_style: template.body_style.to_string(),
            segment: template.segment.to_string(),
        }))
    }
}

impl MotTaxLookup for MockProviders {
    fn lookup_mot_and_tax(&self, registration: &Registration) -> Result<Option<MotAndTax>> {
        let seed = seed_for(registration);
        let mileage_now = 18_000 + ((seed >> 16) % 80_000) as u32;

        // One test per year, newest first, mileage walking backwards.
        let mut history = Vec::with_capacity(3);
        for k in 1..=3u32 {
            let date = self.today - Duration::days(365 * k as i64 + (seed % 30) as i64);
            let result = match (seed >> (k * 7)) % 6 {
                0 => MotResult::Advisory,
                5 => MotResult::Fail,
                _ => MotResult::Pass,
            };
            let mileage = mileage_now.saturating_sub(k * (6_000 + (seed % 2_000) as u32));
            history.push(MotEntry {
                date,
                result,
                mileage,
            });
        }

        Ok(Some(MotAndTax {
            mot_next_due: self.today + Duration::days(60 + (seed % 240) as i64),
            tax_expiry: self.today + Duration::days(14 + (seed % 90) as i64),
            history,
        }))
    }
}

impl RecallLookup for MockProviders {
    fn lookup_recalls(&self, registration: &Registration) -> Result<Vec<Recall>> {
        let seed = seed_for(registration);
        let recalls = RECALL_CATALOGUE
            .iter()
            .enumerate()
            .filter(|(i, _)| (seed >> (i * 5)) % 3 == 0)
            .map(|(_, template)| Recall {
                id: template.id.to_string(),
                summary: template.summary.to_string(),
                is_open: template.is_open,
            })
            .collect();
        Ok(recalls)
    }
}

impl HistoryCheck for MockProviders {
    fn history_flags(&self, registration: &Registration) -> Result<Option<HistoryFlags>> {
        let seed = seed_for(registration);
        let mileage_anomaly = seed % 7 == 0;
        let note = mileage_anomaly.then(|| {
            format!(
                "Mileage shows a {} jump in the {} record",
                3_000 + (seed % 5_000),
                self.today.year() - 2
            )
        });
        Ok(Some(HistoryFlags {
            write_off: seed % 23 == 0,
            theft: seed % 31 == 0,
            mileage_anomaly,
            note,
        }))
    }
}

impl ValuationEstimator for MockProviders {
    fn estimate_value(
        &self,
        vehicle: &VehicleSummary,
        condition: VehicleCondition,
    ) -> Result<ValuationRange> {
        let age = (self.today.year() - vehicle.year).max(0);
        let base = 25_000.0 - f64::from(age) * 2_000.0 - f64::from(vehicle.mileage) / 10.0;
        let mid = (base * condition.multiplier()).max(f64::from(MIN_VALUATION)) as u32;

        Ok(ValuationRange {
            low: mid.saturating_sub(NETWORK_SPREAD).max(MIN_VALUATION),
            mid,
            high: mid + STOCK_PRIORITY_BONUS + SAME_DAY_BONUS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::normalize;

    fn providers() -> MockProviders {
        MockProviders::with_today(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap())
    }

    #[test]
    fn test_lookups_are_deterministic() {
        let plate = normalize("AB12 CDE").unwrap();
        let providers = providers();
        let first = providers.lookup_vehicle(&plate).unwrap().unwrap();
        let second = providers.lookup_vehicle(&plate).unwrap().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_q_plate_has_no_record() {
        let plate = normalize("QB12 CDE").unwrap();
        assert!(providers().lookup_vehicle(&plate).unwrap().is_none());
    }

    #[test]
    fn test_spacing_does_not_change_the_vehicle() {
        let providers = providers();
        let spaced = providers
            .lookup_vehicle(&normalize("AB12 CDE").unwrap())
            .unwrap()
            .unwrap();
        let compact = providers
            .lookup_vehicle(&normalize("ab12cde").unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(spaced, compact);
    }

    #[test]
    fn test_providers_total_over_odd_plates() {
        let providers = providers();
        for raw in ["AAAAA", "99999", "WBA8B12345", "ZZ99ZZZ"] {
            let plate = normalize(raw).unwrap();
            providers.lookup_vehicle(&plate).unwrap();
            assert!(providers.lookup_mot_and_tax(&plate).unwrap().is_some());
            providers.lookup_recalls(&plate).unwrap();
            assert!(providers.history_flags(&plate).unwrap().is_some());
        }
    }

    #[test]
    fn test_mot_history_is_newest_first() {
        let plate = normalize("KT68 XYZ").unwrap();
        let mot = providers().lookup_mot_and_tax(&plate).unwrap().unwrap();
        assert_eq!(mot.history.len(), 3);
        for pair in mot.history.windows(2) {
            assert!(pair[0].date > pair[1].date);
        }
        assert!(mot.mot_next_due > mot.history[0].date);
    }

    #[test]
    fn test_valuation_tracks_condition() {
        let providers = providers();
        let plate = normalize("AB12 CDE").unwrap();
        let vehicle = providers.lookup_vehicle(&plate).unwrap().unwrap();

        let poor = providers
            .estimate_value(&vehicle, VehicleCondition::Poor)
            .unwrap();
        let good = providers
            .estimate_value(&vehicle, VehicleCondition::Good)
            .unwrap();
        let excellent = providers
            .estimate_value(&vehicle, VehicleCondition::Excellent)
            .unwrap();

        assert!(poor.mid <= good.mid);
        assert!(good.mid <= excellent.mid);
    }

    #[test]
    fn test_valuation_band_is_ordered_and_floored() {
        let providers = providers();
        let vehicle = VehicleSummary {
            make: "BMW".to_string(),
            model: "3 Series".to_string(),
            year: 2004,
            mileage: 95_000,
            vin: "WBA8B000000000000".to_string(),
            body_style: "saloon".to_string(),
            segment: "executive".to_string(),
        };
        let range = providers
            .estimate_value(&vehicle, VehicleCondition::Poor)
            .unwrap();
        assert!(range.low <= range.mid);
        assert!(range.mid < range.high);
        assert!(range.mid >= MIN_VALUATION, "old high-mileage cars still get the floor");
    }

    #[test]
    fn test_recalls_come_from_the_catalogue() {
        let providers = providers();
        for raw in ["AB12CDE", "KT68XYZ", "ZZ99ZZZ"] {
            let plate = normalize(raw).unwrap();
            for recall in providers.lookup_recalls(&plate).unwrap() {
                assert!(
                    RECALL_CATALOGUE
                        .iter()
                        .any(|t| t.id == recall.id && t.is_open == recall.is_open)
                );
            }
        }
    }
}
