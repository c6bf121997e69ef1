//! Vehicle report assembly.
//!
//! Invokes each data provider for a normalized registration and merges the
//! results into one display-ready structure. A provider failing or finding
//! nothing marks its section absent; it never aborts the rest of the
//! report.

pub mod export;
pub mod render;

use anyhow::Result;
use serde::Serialize;

use crate::plate::Registration;
use crate::providers::{
    HistoryCheck, HistoryFlags, MotAndTax, MotTaxLookup, Recall, RecallLookup,
    ValuationEstimator, ValuationRange, VehicleCondition, VehicleLookup, VehicleSummary,
};

/// Everything known about one vehicle, assembled fresh per interaction.
///
/// Absent sections (`None`) mean the corresponding provider had no record
/// or failed; partial reports are a valid, expected outcome.
#[derive(Debug, Clone, Serialize)]
pub struct VehicleReport {
    pub registration: Registration,
    pub condition: VehicleCondition,
    pub summary: Option<VehicleSummary>,
    pub mot_and_tax: Option<MotAndTax>,
    pub recalls: Option<Vec<Recall>>,
    pub history: Option<HistoryFlags>,
    pub valuation: Option<ValuationRange>,
}

impl VehicleReport {
    /// Category tags used for buyer matching; empty when the summary is
    /// absent.
    pub fn category_tags(&self) -> Vec<&str> {
        self.summary
            .as_ref()
            .map(|s| vec![s.body_style.as_str(), s.segment.as_str()])
            .unwrap_or_default()
    }

    pub fn open_recall_count(&self) -> usize {
        self.recalls
            .as_ref()
            .map(|recalls| recalls.iter().filter(|r| r.is_open).count())
            .unwrap_or(0)
    }

    /// True when every provider came back empty.
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
            && self.mot_and_tax.is_none()
            && self.recalls.is_none()
            && self.history.is_none()
            && self.valuation.is_none()
    }
}

/// Builds a report by invoking each provider in turn.
///
/// Total: individual provider errors are logged and leave their section
/// absent. The valuation needs a summary, so it is skipped (not errored)
/// when the vehicle has no record.
pub fn assemble_report<P>(
    registration: &Registration,
    providers: &P,
    condition: VehicleCondition,
) -> VehicleReport
where
    P: VehicleLookup + MotTaxLookup + RecallLookup + HistoryCheck + ValuationEstimator,
{
    let summary = section("vehicle", registration, providers.lookup_vehicle(registration));
    let mot_and_tax = section(
        "MOT/tax",
        registration,
        providers.lookup_mot_and_tax(registration),
    );
    let recalls = section(
        "recall",
        registration,
        providers.lookup_recalls(registration).map(Some),
    );
    let history = section(
        "history",
        registration,
        providers.history_flags(registration),
    );

    let valuation = summary.as_ref().and_then(|vehicle| {
        section(
            "valuation",
            registration,
            providers.estimate_value(vehicle, condition).map(Some),
        )
    });

    VehicleReport {
        registration: registration.clone(),
        condition,
        summary,
        mot_and_tax,
        recalls,
        history,
        valuation,
    }
}

/// Unwraps one provider result, logging failures and mapping them to an
/// absent section.
fn section<T>(label: &str, registration: &Registration, result: Result<Option<T>>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            crate::log(&format!(
                "{} lookup failed for {}: {:#}",
                label, registration, e
            ));
            None
        }
    }
}
