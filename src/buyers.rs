//! Trade buyer matching against the static network directory.
//!
//! Both tables are fixed at compile time and read-only; the matcher is a
//! pure function over them plus the report's category tags.

use serde::Serialize;

use crate::report::VehicleReport;

/// A trade buyer in the network, with the vehicle categories they buy.
#[derive(Debug, Clone)]
pub struct BuyerProfile {
    pub name: &'static str,
    /// Lowercase category tags, matched against the report's tags.
    pub specialties: &'static [&'static str],
    pub location: &'static str,
}

/// One dealership in the network.
#[derive(Debug, Clone)]
pub struct LocationRecord {
    pub name: &'static str,
    pub region: &'static str,
}

/// Buyer directory. Order matters: ties in the match score are broken by
/// position in this table.
pub static BUYERS: [BuyerProfile; 8] = [
    BuyerProfile { name: "John Smith", specialties: &["saloon", "executive"], location: "Sytner Birmingham" },
    BuyerProfile { name: "Priya Patel", specialties: &["suv", "family"], location: "Sytner Manchester" },
    BuyerProfile { name: "Marcus Webb", specialties: &["coupe", "convertible", "performance"], location: "Sytner London Park Lane" },
    BuyerProfile { name: "Sarah Ogunleye", specialties: &["hatchback", "city"], location: "Sytner Bristol" },
    BuyerProfile { name: "Tom Harrington", specialties: &["estate", "family"], location: "Sytner Leeds" },
    BuyerProfile { name: "Elena Novak", specialties: &["ev", "hybrid"], location: "Sytner Solihull" },
    BuyerProfile { name: "Dave Kowalski", specialties: &["classic", "convertible"], location: "Sytner York" },
    BuyerProfile { name: "Aisha Rahman", specialties: &["saloon", "ev", "executive"], location: "Sytner Nottingham" },
];

/// Dealership directory used for buyer locations and booking validation.
pub static LOCATIONS: [LocationRecord; 22] = [
    LocationRecord { name: "Sytner Birmingham", region: "West Midlands" },
    LocationRecord { name: "Sytner Solihull", region: "West Midlands" },
    LocationRecord { name: "Sytner Coventry", region: "West Midlands" },
    LocationRecord { name: "Sytner Wolverhampton", region: "West Midlands" },
    LocationRecord { name: "Sytner Manchester", region: "North West" },
    LocationRecord { name: "Sytner Liverpool", region: "North West" },
    LocationRecord { name: "Sytner Preston", region: "North West" },
    LocationRecord { name: "Sytner Chester", region: "North West" },
    LocationRecord { name: "Sytner Leeds", region: "Yorkshire" },
    LocationRecord { name: "Sytner Sheffield", region: "Yorkshire" },
    LocationRecord { name: "Sytner York", region: "Yorkshire" },
    LocationRecord { name: "Sytner Hull", region: "Yorkshire" },
    LocationRecord { name: "Sytner Newcastle", region: "North East" },
    LocationRecord { name: "Sytner Nottingham", region: "East Midlands" },
    LocationRecord { name: "Sytner Leicester", region: "East Midlands" },
    LocationRecord { name: "Sytner Northampton", region: "East Midlands" },
    LocationRecord { name: "Sytner London Park Lane", region: "London" },
    LocationRecord { name: "Sytner Chigwell", region: "London" },
    LocationRecord { name: "Sytner Bristol", region: "South West" },
    LocationRecord { name: "Sytner Cardiff", region: "Wales" },
    LocationRecord { name: "Sytner Southampton", region: "South East" },
    LocationRecord { name: "Sytner Maidstone", region: "South East" },
];

/// Looks up a dealership by name, case-insensitively.
pub fn location_by_name(name: &str) -> Option<&'static LocationRecord> {
    LOCATIONS
        .iter()
        .find(|location| location.name.eq_ignore_ascii_case(name))
}

/// One scored buyer in the ranked result.
#[derive(Debug, Clone, Serialize)]
pub struct BuyerMatch {
    pub name: &'static str,
    pub location: &'static str,
    pub score: usize,
}

/// Scores every buyer against the report's category tags.
///
/// Score is the count of shared tags. The full table always comes back,
/// ordered by non-increasing score; equal scores keep table order (the
/// sort is stable). A report with no tags yields all buyers at score 0 in
/// table order.
pub fn match_buyers(report: &VehicleReport) -> Vec<BuyerMatch> {
    let tags = report.category_tags();

    let mut matches: Vec<BuyerMatch> = BUYERS
        .iter()
        .map(|buyer| BuyerMatch {
            name: buyer.name,
            location: buyer.location,
            score: buyer
                .specialties
                .iter()
                .filter(|&&specialty| tags.contains(&specialty))
                .count(),
        })
        .collect();

    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::normalize;
    use crate::providers::{ValuationRange, VehicleCondition, VehicleSummary};
    use crate::report::VehicleReport;

    fn report_with_tags(body_style: &str, segment: &str) -> VehicleReport {
        VehicleReport {
            registration: normalize("AB12CDE").unwrap(),
            condition: VehicleCondition::Good,
            summary: Some(VehicleSummary {
                make: "BMW".to_string(),
                model: "X3".to_string(),
                year: 2020,
                mileage: 40_000,
                vin: "WBA8B000000000000".to_string(),
                body_style: body_style.to_string(),
                segment: segment.to_string(),
            }),
            mot_and_tax: None,
            recalls: None,
            history: None,
            valuation: Some(ValuationRange { low: 17_000, mid: 17_800, high: 18_500 }),
        }
    }

    fn report_without_summary() -> VehicleReport {
        VehicleReport {
            registration: normalize("QB12CDE").unwrap(),
            condition: VehicleCondition::Good,
            summary: None,
            mot_and_tax: None,
            recalls: None,
            history: None,
            valuation: None,
        }
    }

    #[test]
    fn test_suv_family_report_ranks_suv_buyer_first() {
        let matches = match_buyers(&report_with_tags("suv", "family"));
        assert_eq!(matches.len(), BUYERS.len());
        assert_eq!(matches[0].name, "Priya Patel");
        assert_eq!(matches[0].score, 2);
    }

    #[test]
    fn test_scores_never_increase_down_the_ranking() {
        let matches = match_buyers(&report_with_tags("saloon", "executive"));
        for pair in matches.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[test]
    fn test_equal_scores_keep_table_order() {
        // Both saloon/executive specialists score 2; John Smith is listed
        // first in the table and must stay ahead.
        let matches = match_buyers(&report_with_tags("saloon", "executive"));
        let john = matches.iter().position(|m| m.name == "John Smith").unwrap();
        let aisha = matches.iter().position(|m| m.name == "Aisha Rahman").unwrap();
        assert_eq!(matches[john].score, matches[aisha].score);
        assert!(john < aisha);
    }

    #[test]
    fn test_no_tags_yields_full_table_in_order() {
        let matches = match_buyers(&report_without_summary());
        assert_eq!(matches.len(), 8);
        for (position, buyer_match) in matches.iter().enumerate() {
            assert_eq!(buyer_match.score, 0);
            assert_eq!(buyer_match.name, BUYERS[position].name);
        }
    }

    #[test]
    fn test_location_lookup_is_case_insensitive() {
        assert!(location_by_name("sytner birmingham").is_some());
        assert!(location_by_name("Sytner Atlantis").is_none());
    }

    #[test]
    fn test_directory_is_consistent() {
        assert_eq!(LOCATIONS.len(), 22);
        assert_eq!(BUYERS.len(), 8);
        // Every buyer sits at a dealership that exists in the directory.
        for buyer in &BUYERS {
            assert!(
                location_by_name(buyer.location).is_some(),
                "{} has unknown location {}",
                buyer.name,
                buyer.location
            );
        }
    }
}
