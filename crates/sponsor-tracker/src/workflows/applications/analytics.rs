//! Dashboard summary over one user's applications.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicationListing, ApplicationStatus};

pub const TOP_REGION_LIMIT: usize = 5;
const UNKNOWN_TOWN: &str = "Unknown";
const NO_REGION: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub town: String,
    pub applications: usize,
    pub offers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub total: usize,
    /// Whole percentage of applications that reached an interview.
    pub interview_rate: u32,
    /// Whole percentage of applications that ended in an offer.
    pub offer_rate: u32,
    pub top_region: String,
    pub status_counts: BTreeMap<&'static str, usize>,
    pub top_regions: Vec<RegionCount>,
    pub follow_ups_due: usize,
}

/// Listings are expected newest first; region ties resolve to whichever town
/// appears first in that order.
pub fn summarize(listings: &[ApplicationListing], now: DateTime<Utc>) -> ApplicationSummary {
    let total = listings.len();

    let mut status_counts: BTreeMap<&'static str, usize> = ApplicationStatus::ALL
        .iter()
        .map(|status| (status.label(), 0))
        .collect();
    let mut regions: Vec<RegionCount> = Vec::new();
    let mut interviews = 0;
    let mut offers = 0;
    let mut follow_ups_due = 0;

    for listing in listings {
        let application = &listing.application;
        *status_counts.entry(application.status.label()).or_default() += 1;
        if application.status.reached_interview() {
            interviews += 1;
        }
        if application.status.is_offer() {
            offers += 1;
        }
        if !application.follow_up_completed
            && application.follow_up_date.is_some_and(|due| due <= now)
        {
            follow_ups_due += 1;
        }

        let town = listing
            .company
            .town
            .as_deref()
            .filter(|town| !town.trim().is_empty())
            .unwrap_or(UNKNOWN_TOWN);
        let position = match regions.iter().position(|region| region.town == town) {
            Some(position) => position,
            None => {
                regions.push(RegionCount {
                    town: town.to_string(),
                    applications: 0,
                    offers: 0,
                });
                regions.len() - 1
            }
        };
        regions[position].applications += 1;
        if application.status.is_offer() {
            regions[position].offers += 1;
        }
    }

    // Stable sorts keep first-encountered order among equal counts.
    let top_region = {
        let mut by_offers: Vec<&RegionCount> = regions.iter().collect();
        by_offers.sort_by(|a, b| b.offers.cmp(&a.offers));
        by_offers
            .first()
            .map(|region| region.town.clone())
            .unwrap_or_else(|| NO_REGION.to_string())
    };
    regions.sort_by(|a, b| b.applications.cmp(&a.applications));
    regions.truncate(TOP_REGION_LIMIT);

    ApplicationSummary {
        total,
        interview_rate: percentage(interviews, total),
        offer_rate: percentage(offers, total),
        top_region,
        status_counts,
        top_regions: regions,
        follow_ups_due,
    }
}

fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}
