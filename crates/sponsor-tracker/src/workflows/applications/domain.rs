use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::UserId;
use crate::dates::{deserialize_optional_timestamp, deserialize_patch_timestamp};
use crate::workflows::sponsors::{Company, CompanyId, ExternalCompany};

/// Identifier wrapper for tracked applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of an application. The predictor, the timeline rule and
/// the dashboard summary all read this one enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    Applied,
    Interview,
    Offer,
    Rejected,
    NoResponse,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 6] = [
        ApplicationStatus::Applied,
        ApplicationStatus::Interview,
        ApplicationStatus::Offer,
        ApplicationStatus::Rejected,
        ApplicationStatus::NoResponse,
        ApplicationStatus::Withdrawn,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "APPLIED",
            ApplicationStatus::Interview => "INTERVIEW",
            ApplicationStatus::Offer => "OFFER",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::NoResponse => "NO_RESPONSE",
            ApplicationStatus::Withdrawn => "WITHDRAWN",
        }
    }

    /// Progressed past the applied stage. Rejections count: the heuristic
    /// cannot tell a post-interview rejection from a straight one.
    pub const fn reached_interview(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Interview | ApplicationStatus::Offer | ApplicationStatus::Rejected
        )
    }

    pub const fn is_offer(self) -> bool {
        matches!(self, ApplicationStatus::Offer)
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        ApplicationStatus::Applied
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown application status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == value)
            .ok_or_else(|| UnknownStatus(value.to_string()))
    }
}

/// Stored application row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: ApplicationId,
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub role: String,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub follow_up_completed: bool,
    pub notes: Option<String>,
    pub salary: Option<String>,
    pub external_website: Option<String>,
    pub cv_version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Origin of a timeline entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelineEntryKind {
    InitialNote,
    StatusChange,
    Manual,
}

impl TimelineEntryKind {
    pub const fn label(self) -> &'static str {
        match self {
            TimelineEntryKind::InitialNote => "initial_note",
            TimelineEntryKind::StatusChange => "status_change",
            TimelineEntryKind::Manual => "manual",
        }
    }
}

impl FromStr for TimelineEntryKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "initial_note" => Ok(TimelineEntryKind::InitialNote),
            "status_change" => Ok(TimelineEntryKind::StatusChange),
            "manual" => Ok(TimelineEntryKind::Manual),
            other => Err(format!("unknown timeline entry kind '{other}'")),
        }
    }
}

/// Append-only timeline row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationUpdate {
    pub id: i64,
    pub application_id: ApplicationId,
    pub kind: TimelineEntryKind,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Which company an application is tracked against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompanyTarget {
    /// A company already in the directory.
    #[serde(rename_all = "camelCase")]
    Existing { company_id: CompanyId },
    /// A company outside the register, created together with the application.
    External(ExternalCompany),
}

/// Body of `POST /api/applications`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicationRequest {
    pub company: CompanyTarget,
    pub role: String,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub follow_up_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub external_website: Option<String>,
    #[serde(default)]
    pub cv_version: Option<String>,
}

/// Body of `PUT /api/applications/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPatch {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub status: Option<ApplicationStatus>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub salary: Option<String>,
    #[serde(default)]
    pub external_website: Option<String>,
    #[serde(default)]
    pub cv_version: Option<String>,
    #[serde(default, deserialize_with = "deserialize_patch_timestamp")]
    pub follow_up_date: Option<Option<DateTime<Utc>>>,
    #[serde(default)]
    pub follow_up_completed: Option<bool>,
}

/// Body of `POST /api/applications/{id}/updates`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ManualNoteRequest {
    pub note: String,
}

/// Single-application read model: the row, its company and its timeline
/// (newest entry first).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub company: Company,
    pub updates: Vec<ApplicationUpdate>,
}

/// List read model: the row with its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListing {
    #[serde(flatten)]
    pub application: Application,
    pub company: Company,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("role must not be blank")]
    BlankRole,
    #[error("note must not be blank")]
    BlankNote,
    #[error("company name must not be blank")]
    BlankCompanyName,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_labels_parse_back() {
        for status in ApplicationStatus::ALL {
            assert_eq!(status.label().parse::<ApplicationStatus>(), Ok(status));
        }
        assert_eq!(
            "Interviewing".parse::<ApplicationStatus>(),
            Err(UnknownStatus("Interviewing".to_string()))
        );
    }

    #[test]
    fn status_serializes_in_screaming_snake_case() {
        assert_eq!(
            serde_json::to_value(ApplicationStatus::NoResponse).unwrap(),
            json!("NO_RESPONSE")
        );
        assert!(serde_json::from_value::<ApplicationStatus>(json!("Offer")).is_err());
    }

    #[test]
    fn create_request_distinguishes_company_variants() {
        let existing: NewApplicationRequest = serde_json::from_value(json!({
            "company": { "kind": "existing", "companyId": 12 },
            "role": "Data Engineer",
            "appliedDate": "2025-01-06"
        }))
        .expect("existing company payload");
        assert_eq!(
            existing.company,
            CompanyTarget::Existing {
                company_id: CompanyId(12)
            }
        );
        assert!(existing.applied_date.is_some());
        assert_eq!(existing.status, None);

        let external: NewApplicationRequest = serde_json::from_value(json!({
            "company": { "kind": "external", "name": "Stealth Startup", "logoUrl": "https://x.test/logo.png" },
            "role": "Platform Engineer",
            "status": "INTERVIEW",
            "followUpDate": ""
        }))
        .expect("external company payload");
        match external.company {
            CompanyTarget::External(company) => {
                assert_eq!(company.name, "Stealth Startup");
                assert_eq!(company.logo_url.as_deref(), Some("https://x.test/logo.png"));
            }
            other => panic!("expected external company, got {other:?}"),
        }
        assert_eq!(external.status, Some(ApplicationStatus::Interview));
        assert_eq!(external.follow_up_date, None);
    }

    #[test]
    fn create_request_rejects_malformed_dates_and_statuses() {
        let bad_date = serde_json::from_value::<NewApplicationRequest>(json!({
            "company": { "kind": "existing", "companyId": 1 },
            "role": "Analyst",
            "appliedDate": "yesterday"
        }));
        assert!(bad_date.is_err());

        let bad_status = serde_json::from_value::<NewApplicationRequest>(json!({
            "company": { "kind": "existing", "companyId": 1 },
            "role": "Analyst",
            "status": "Interviewing"
        }));
        assert!(bad_status.is_err());
    }

    #[test]
    fn patch_distinguishes_missing_and_null_follow_up() {
        let untouched: ApplicationPatch = serde_json::from_value(json!({})).unwrap();
        assert_eq!(untouched.follow_up_date, None);

        let cleared: ApplicationPatch =
            serde_json::from_value(json!({ "followUpDate": null })).unwrap();
        assert_eq!(cleared.follow_up_date, Some(None));

        let set: ApplicationPatch =
            serde_json::from_value(json!({ "followUpDate": "2025-02-01" })).unwrap();
        assert!(matches!(set.follow_up_date, Some(Some(_))));
    }
}
