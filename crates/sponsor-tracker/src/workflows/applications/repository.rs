use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationDetail, ApplicationId, ApplicationListing, ApplicationStatus,
    ApplicationUpdate, CompanyTarget,
};
use super::timeline::TimelineEntryDraft;
use crate::auth::UserId;
use crate::store::RepositoryError;

/// Validated application ready to be written, together with its seed
/// timeline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationDraft {
    pub owner: UserId,
    pub company: CompanyTarget,
    pub role: String,
    pub status: ApplicationStatus,
    pub applied_date: DateTime<Utc>,
    pub follow_up_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub salary: Option<String>,
    pub external_website: Option<String>,
    pub cv_version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub initial_entry: Option<TimelineEntryDraft>,
}

/// Mutation applied to a loaded application; returns the timeline entry the
/// change requires, if any.
pub type Revision<'a> = dyn FnMut(&mut Application) -> Option<TimelineEntryDraft> + 'a;

/// Storage abstraction for applications and their timelines. Every method is
/// scoped to `owner`: rows belonging to anyone else behave as if absent.
pub trait ApplicationRepository: Send + Sync {
    /// Writes the application, an inline external company if requested and
    /// the seed entry in one transaction.
    fn insert(&self, draft: ApplicationDraft) -> Result<ApplicationDetail, RepositoryError>;
    fn fetch(
        &self,
        owner: UserId,
        id: ApplicationId,
    ) -> Result<Option<ApplicationDetail>, RepositoryError>;
    /// Newest application first.
    fn list(&self, owner: UserId) -> Result<Vec<ApplicationListing>, RepositoryError>;
    /// Loads, revises and writes back the row plus the returned timeline entry
    /// atomically. `Ok(None)` when the application is missing or foreign.
    fn revise(
        &self,
        owner: UserId,
        id: ApplicationId,
        revision: &mut Revision<'_>,
    ) -> Result<Option<Application>, RepositoryError>;
    fn append_update(
        &self,
        owner: UserId,
        id: ApplicationId,
        entry: TimelineEntryDraft,
    ) -> Result<Option<ApplicationUpdate>, RepositoryError>;
    /// Removes the application and its timeline; `false` when nothing matched.
    fn delete(&self, owner: UserId, id: ApplicationId) -> Result<bool, RepositoryError>;
    fn statuses(&self, owner: UserId) -> Result<Vec<ApplicationStatus>, RepositoryError>;
}
