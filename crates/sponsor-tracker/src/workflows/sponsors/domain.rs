use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Identifier wrapper for directory and ad-hoc companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub i64);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sponsor licence rating. Legacy rows may carry arbitrary text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SponsorRating {
    A,
    B,
    Other(String),
}

impl SponsorRating {
    pub fn as_str(&self) -> &str {
        match self {
            SponsorRating::A => "A",
            SponsorRating::B => "B",
            SponsorRating::Other(label) => label,
        }
    }
}

impl From<String> for SponsorRating {
    fn from(value: String) -> Self {
        match value.as_str() {
            "A" => SponsorRating::A,
            "B" => SponsorRating::B,
            _ => SponsorRating::Other(value),
        }
    }
}

impl From<&str> for SponsorRating {
    fn from(value: &str) -> Self {
        SponsorRating::from(value.to_string())
    }
}

impl From<SponsorRating> for String {
    fn from(value: SponsorRating) -> Self {
        match value {
            SponsorRating::Other(label) => label,
            known => known.as_str().to_string(),
        }
    }
}

/// A company from the sponsor register, or one created ad hoc by a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
    pub town: Option<String>,
    pub route: Option<String>,
    pub rating: Option<SponsorRating>,
    pub full_rating: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub logo_url: Option<String>,
    pub is_external: bool,
}

/// Inline company details for tracking an application outside the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalCompany {
    pub name: String,
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// One parsed register row ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorRecord {
    pub name: String,
    pub town: Option<String>,
    pub route: Option<String>,
    pub rating: SponsorRating,
    pub full_rating: Option<String>,
}

/// Directory search filters. Town and route match case-insensitive substrings,
/// rating matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompanyQuery {
    #[serde(default)]
    pub town: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for CompanyQuery {
    fn default() -> Self {
        Self {
            town: None,
            route: None,
            rating: None,
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl CompanyQuery {
    /// Drops blank filters and clamps paging into the supported range.
    pub fn normalized(mut self) -> Self {
        let keep = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        self.town = keep(self.town);
        self.route = keep(self.route);
        self.rating = keep(self.rating);
        self.page = self.page.max(1);
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(total: u64, page: u32, limit: u32) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: total.div_ceil(u64::from(limit.max(1))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyPage {
    pub companies: Vec<Company>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ImportStatus {
    Success,
    Failed,
}

impl ImportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ImportStatus::Success => "SUCCESS",
            ImportStatus::Failed => "FAILED",
        }
    }
}

/// Audit row written for every register import attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportLogEntry {
    pub filename: String,
    pub status: ImportStatus,
    pub count: Option<u64>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratings_round_trip_through_strings() {
        assert_eq!(SponsorRating::from("A"), SponsorRating::A);
        assert_eq!(SponsorRating::from("B"), SponsorRating::B);
        assert_eq!(
            SponsorRating::from("Worker (A rating)"),
            SponsorRating::Other("Worker (A rating)".to_string())
        );
        assert_eq!(String::from(SponsorRating::B), "B");

        let json = serde_json::to_string(&Some(SponsorRating::A)).unwrap();
        assert_eq!(json, "\"A\"");
    }

    #[test]
    fn query_normalization_clamps_paging_and_drops_blank_filters() {
        let query = CompanyQuery {
            town: Some("  ".to_string()),
            route: Some(" Skilled Worker ".to_string()),
            rating: None,
            page: 0,
            limit: 10_000,
        }
        .normalized();

        assert_eq!(query.town, None);
        assert_eq!(query.route.as_deref(), Some("Skilled Worker"));
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.offset(), 0);
    }

    #[test]
    fn pagination_rounds_total_pages_up() {
        let pagination = Pagination::new(101, 3, 50);
        assert_eq!(pagination.total_pages, 3);
        assert_eq!(Pagination::new(0, 1, 50).total_pages, 0);
    }
}
