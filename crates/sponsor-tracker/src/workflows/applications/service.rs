use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::analytics::{summarize, ApplicationSummary};
use super::domain::{
    ApplicationDetail, ApplicationId, ApplicationListing, ApplicationPatch, ApplicationUpdate,
    CompanyTarget, ManualNoteRequest, NewApplicationRequest, ValidationError,
};
use super::prediction::{predict_outcome, Prediction};
use super::repository::{ApplicationDraft, ApplicationRepository};
use super::timeline;
use crate::auth::UserId;
use crate::store::RepositoryError;
use crate::workflows::sponsors::{CompanyDirectory, CompanyId};

/// Service composing the sponsor directory and the application repository.
/// Every operation acts on behalf of one authenticated caller.
pub struct TrackerService<C, R> {
    directory: Arc<C>,
    repository: Arc<R>,
}

impl<C, R> TrackerService<C, R>
where
    C: CompanyDirectory + 'static,
    R: ApplicationRepository + 'static,
{
    pub fn new(directory: Arc<C>, repository: Arc<R>) -> Self {
        Self {
            directory,
            repository,
        }
    }

    /// Outcome heuristic for a register company using only the caller's history.
    /// Ad-hoc companies are not part of the register and read as missing.
    pub fn predict(&self, caller: UserId, company_id: CompanyId) -> Result<Prediction, ServiceError> {
        let company = self
            .directory
            .company(company_id)?
            .filter(|company| !company.is_external)
            .ok_or(ServiceError::CompanyNotFound(company_id))?;
        let history = self.repository.statuses(caller)?;
        Ok(predict_outcome(company.rating.as_ref(), &history))
    }

    pub fn create(
        &self,
        caller: UserId,
        request: NewApplicationRequest,
    ) -> Result<ApplicationDetail, ServiceError> {
        self.create_at(caller, request, Utc::now())
    }

    pub(crate) fn create_at(
        &self,
        caller: UserId,
        request: NewApplicationRequest,
        now: DateTime<Utc>,
    ) -> Result<ApplicationDetail, ServiceError> {
        let role = request.role.trim();
        if role.is_empty() {
            return Err(ValidationError::BlankRole.into());
        }

        let company = match request.company {
            CompanyTarget::Existing { company_id } => {
                // Ad-hoc companies stay private to the application that created them.
                match self.directory.company(company_id)? {
                    Some(company) if !company.is_external => {}
                    _ => return Err(ServiceError::CompanyNotFound(company_id)),
                }
                CompanyTarget::Existing { company_id }
            }
            CompanyTarget::External(mut external) => {
                external.name = external.name.trim().to_string();
                if external.name.is_empty() {
                    return Err(ValidationError::BlankCompanyName.into());
                }
                CompanyTarget::External(external)
            }
        };

        let notes = request.notes.filter(|notes| !notes.trim().is_empty());
        let draft = ApplicationDraft {
            owner: caller,
            company,
            role: role.to_string(),
            status: request.status.unwrap_or_default(),
            applied_date: request.applied_date.unwrap_or(now),
            follow_up_date: request.follow_up_date,
            initial_entry: timeline::initial_entry(notes.as_deref(), now),
            notes,
            salary: request.salary,
            external_website: request.external_website,
            cv_version: request.cv_version,
            created_at: now,
        };

        let detail = self.repository.insert(draft)?;
        tracing::info!(
            user_id = caller.0,
            application_id = detail.application.id.0,
            status = %detail.application.status,
            "application created"
        );
        Ok(detail)
    }

    /// Partial update. A status change and its timeline entry are written
    /// together or not at all.
    pub fn update(
        &self,
        caller: UserId,
        id: ApplicationId,
        patch: ApplicationPatch,
    ) -> Result<ApplicationDetail, ServiceError> {
        patch.validate()?;
        let now = Utc::now();

        let mut status_changed = false;
        let revised = self.repository.revise(caller, id, &mut |application| {
            let entry = patch.apply(application, now);
            status_changed = entry.is_some();
            entry
        })?;
        if revised.is_none() {
            return Err(ServiceError::ApplicationNotFound(id));
        }
        if status_changed {
            tracing::info!(user_id = caller.0, application_id = id.0, "application status changed");
        }

        self.get(caller, id)
    }

    pub fn add_update(
        &self,
        caller: UserId,
        id: ApplicationId,
        request: ManualNoteRequest,
    ) -> Result<ApplicationUpdate, ServiceError> {
        let entry = timeline::manual_entry(&request.note, Utc::now())?;
        self.repository
            .append_update(caller, id, entry)?
            .ok_or(ServiceError::ApplicationNotFound(id))
    }

    pub fn get(&self, caller: UserId, id: ApplicationId) -> Result<ApplicationDetail, ServiceError> {
        self.repository
            .fetch(caller, id)?
            .ok_or(ServiceError::ApplicationNotFound(id))
    }

    pub fn list(&self, caller: UserId) -> Result<Vec<ApplicationListing>, ServiceError> {
        Ok(self.repository.list(caller)?)
    }

    pub fn delete(&self, caller: UserId, id: ApplicationId) -> Result<(), ServiceError> {
        if self.repository.delete(caller, id)? {
            tracing::info!(user_id = caller.0, application_id = id.0, "application deleted");
            Ok(())
        } else {
            Err(ServiceError::ApplicationNotFound(id))
        }
    }

    pub fn summary(&self, caller: UserId) -> Result<ApplicationSummary, ServiceError> {
        let listings = self.repository.list(caller)?;
        Ok(summarize(&listings, Utc::now()))
    }
}

/// Error raised by the tracker service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("company {0} not found")]
    CompanyNotFound(CompanyId),
    #[error("application {0} not found")]
    ApplicationNotFound(ApplicationId),
    #[error("user account no longer exists")]
    UnknownUser,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::UnknownOwner => ServiceError::UnknownUser,
            other => ServiceError::Repository(other),
        }
    }
}
