//! Vehicle data providers.
//!
//! One trait per external collaborator, so a production build swaps any of
//! them for a real service client without touching the report assembler.
//! "Not found" is an explicit `Ok(None)`; errors are reserved for the
//! lookup itself failing.

pub mod mock;

pub use mock::MockProviders;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::plate::Registration;

/// How long a produced offer stays valid.
pub const VALUATION_VALIDITY_HOURS: u32 = 48;

/// Overall vehicle condition, as judged by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VehicleCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl VehicleCondition {
    /// Factor applied to the base valuation.
    pub fn multiplier(self) -> f64 {
        match self {
            VehicleCondition::Excellent => 1.05,
            VehicleCondition::Good => 1.0,
            VehicleCondition::Fair => 0.9,
            VehicleCondition::Poor => 0.8,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VehicleCondition::Excellent => "excellent",
            VehicleCondition::Good => "good",
            VehicleCondition::Fair => "fair",
            VehicleCondition::Poor => "poor",
        }
    }
}

impl fmt::Display for VehicleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for VehicleCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "excellent" => Ok(VehicleCondition::Excellent),
            "good" => Ok(VehicleCondition::Good),
            "fair" => Ok(VehicleCondition::Fair),
            "poor" => Ok(VehicleCondition::Poor),
            other => Err(format!(
                "unknown condition {:?} (expected excellent, good, fair or poor)",
                other
            )),
        }
    }
}

/// Core vehicle record as held by the licensing authority.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSummary {
    pub make: String,
    pub model: String,
    pub year: i32,
    pub mileage: u32,
    pub vin: String,
    /// Body style tag, lowercase ("saloon", "suv", ...). Feeds buyer matching.
    pub body_style: String,
    /// Market segment tag, lowercase ("executive", "family", ...).
    pub segment: String,
}

impl VehicleSummary {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.make, self.model)
    }
}

/// Outcome of a single MOT test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MotResult {
    Pass,
    Advisory,
    Fail,
}

impl MotResult {
    pub fn is_pass(self) -> bool {
        self == MotResult::Pass
    }

    pub fn label(self) -> &'static str {
        match self {
            MotResult::Pass => "Pass",
            MotResult::Advisory => "Advisory",
            MotResult::Fail => "Fail",
        }
    }
}

/// Single MOT test record.
#[derive(Debug, Clone, Serialize)]
pub struct MotEntry {
    pub date: NaiveDate,
    pub result: MotResult,
    pub mileage: u32,
}

/// MOT due date, tax expiry, and test history (newest first).
#[derive(Debug, Clone, Serialize)]
pub struct MotAndTax {
    pub mot_next_due: NaiveDate,
    pub tax_expiry: NaiveDate,
    pub history: Vec<MotEntry>,
}

/// Manufacturer safety recall tied to the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recall {
    pub id: String,
    pub summary: String,
    pub is_open: bool,
}

/// Write-off, theft, and mileage-discrepancy indicators.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryFlags {
    pub write_off: bool,
    pub theft: bool,
    pub mileage_anomaly: bool,
    pub note: Option<String>,
}

impl HistoryFlags {
    pub fn has_issues(&self) -> bool {
        self.write_off || self.theft || self.mileage_anomaly
    }

    pub fn issue_count(&self) -> usize {
        [self.write_off, self.theft, self.mileage_anomaly]
            .iter()
            .filter(|&&flag| flag)
            .count()
    }
}

/// Low/mid/high trade-in price band, in whole pounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValuationRange {
    pub low: u32,
    pub mid: u32,
    pub high: u32,
}

pub trait VehicleLookup {
    /// `registration → summary | not-found`
    fn lookup_vehicle(&self, registration: &Registration) -> Result<Option<VehicleSummary>>;
}

pub trait MotTaxLookup {
    /// `registration → (MOT history, tax status) | not-found`
    fn lookup_mot_and_tax(&self, registration: &Registration) -> Result<Option<MotAndTax>>;
}

pub trait RecallLookup {
    /// `registration-or-VIN → set of recalls` (possibly empty)
    fn lookup_recalls(&self, registration: &Registration) -> Result<Vec<Recall>>;
}

pub trait HistoryCheck {
    /// `registration → (write-off flag, theft flag, mileage-anomaly flag)`
    fn history_flags(&self, registration: &Registration) -> Result<Option<HistoryFlags>>;
}

pub trait ValuationEstimator {
    /// `(make, model, year, mileage, condition) → (low, mid, high)`
    fn estimate_value(
        &self,
        vehicle: &VehicleSummary,
        condition: VehicleCondition,
    ) -> Result<ValuationRange>;
}
