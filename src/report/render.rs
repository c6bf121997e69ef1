//! Terminal rendering of an assembled report.
//!
//! The CLI counterpart of the original card-based summary page: plate
//! banner, section blocks, status badges, and the offer band.

use super::VehicleReport;
use crate::providers::VALUATION_VALIDITY_HOURS;

/// Renders the full report as display-ready text.
pub fn render_report(report: &VehicleReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("\n  ==[ {} ]==\n\n", report.registration));

    render_summary(&mut out, report);
    render_mot_and_tax(&mut out, report);
    render_recalls(&mut out, report);
    render_status(&mut out, report);
    render_valuation(&mut out, report);

    out
}

fn render_summary(out: &mut String, report: &VehicleReport) {
    out.push_str("Vehicle summary\n");
    match &report.summary {
        Some(vehicle) => {
            out.push_str(&format!(
                "  Make & model: {}\n  Year: {}    Mileage: {} miles\n  VIN: {}\n",
                vehicle.display_name(),
                vehicle.year,
                format_thousands(vehicle.mileage),
                vehicle.vin
            ));
        }
        None => out.push_str("  no record found for this registration\n"),
    }
    out.push('\n');
}

fn render_mot_and_tax(out: &mut String, report: &VehicleReport) {
    out.push_str("MOT & tax\n");
    match &report.mot_and_tax {
        Some(mot) => {
            out.push_str(&format!(
                "  Next MOT due: {}    Tax expires: {}\n",
                mot.mot_next_due, mot.tax_expiry
            ));
            for entry in &mot.history {
                let marker = if entry.result.is_pass() { "ok " } else { "!! " };
                out.push_str(&format!(
                    "  {}{}  {:<8}  {} miles\n",
                    marker,
                    entry.date,
                    entry.result.label(),
                    format_thousands(entry.mileage)
                ));
            }
        }
        None => out.push_str("  unavailable\n"),
    }
    out.push('\n');
}

fn render_recalls(out: &mut String, report: &VehicleReport) {
    match &report.recalls {
        Some(recalls) => {
            out.push_str(&format!(
                "Recalls ({} total, {} open)\n",
                recalls.len(),
                report.open_recall_count()
            ));
            if recalls.is_empty() {
                out.push_str("  no recalls recorded for this vehicle\n");
            }
            for recall in recalls {
                let status = if recall.is_open { "[OPEN]  " } else { "[closed]" };
                out.push_str(&format!("  {} {}  {}\n", status, recall.id, recall.summary));
            }
        }
        None => out.push_str("Recalls\n  unavailable\n"),
    }
    out.push('\n');
}

fn render_status(out: &mut String, report: &VehicleReport) {
    let mut badges: Vec<String> = Vec::new();
    if let Some(flags) = &report.history {
        if flags.write_off {
            badges.push("WRITE-OFF".to_string());
        }
        if flags.theft {
            badges.push("THEFT RECORD".to_string());
        }
        if flags.mileage_anomaly {
            badges.push("MILEAGE ANOMALY".to_string());
        }
    }
    let open = report.open_recall_count();
    if open > 0 {
        badges.push(format!("{} OPEN RECALL(S)", open));
    }

    match &report.history {
        None => out.push_str("Status: history check unavailable\n"),
        Some(flags) => {
            if badges.is_empty() {
                out.push_str("Status: no issues found\n");
            } else {
                out.push_str(&format!("Status: {}\n", badges.join(", ")));
            }
            if let Some(note) = &flags.note {
                out.push_str(&format!("  note: {}\n", note));
            }
        }
    }
    out.push('\n');
}

fn render_valuation(out: &mut String, report: &VehicleReport) {
    out.push_str(&format!("Valuation ({} condition)\n", report.condition));
    match &report.valuation {
        Some(range) => {
            out.push_str(&format!(
                "  £{} - £{}   (mid £{})\n  Offer valid for {} hours\n",
                format_thousands(range.low),
                format_thousands(range.high),
                format_thousands(range.mid),
                VALUATION_VALIDITY_HOURS
            ));
        }
        None => out.push_str("  unavailable\n"),
    }
}

/// Formats an integer with thousands separators: 54000 -> "54,000".
pub fn format_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::normalize;
    use crate::providers::{MockProviders, VehicleCondition};
    use crate::report::assemble_report;
    use chrono::NaiveDate;

    fn report_for(raw: &str) -> VehicleReport {
        let providers =
            MockProviders::with_today(NaiveDate::from_ymd_opt(2026, 8, 5).unwrap());
        assemble_report(&normalize(raw).unwrap(), &providers, VehicleCondition::Good)
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(54_000), "54,000");
        assert_eq!(format_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_render_contains_plate_and_sections() {
        let text = render_report(&report_for("AB12 CDE"));
        assert!(text.contains("==[ AB12 CDE ]=="));
        assert!(text.contains("Vehicle summary"));
        assert!(text.contains("MOT & tax"));
        assert!(text.contains("Valuation (good condition)"));
        assert!(text.contains("Offer valid for 48 hours"));
    }

    #[test]
    fn test_render_marks_absent_summary() {
        let text = render_report(&report_for("QB12 CDE"));
        assert!(text.contains("no record found for this registration"));
        // Valuation cannot exist without a summary.
        assert!(text.contains("Valuation (good condition)\n  unavailable"));
    }
}
