use std::sync::Arc;

use axum::response::Response;
use axum::Router;
use chrono::Duration;
use serde_json::Value;

use crate::auth::{TokenKeys, User, UserId};
use crate::store::{RepositoryError, SqliteStore};
use crate::workflows::applications::domain::{
    Application, ApplicationDetail, ApplicationId, ApplicationListing, ApplicationStatus,
    ApplicationUpdate, CompanyTarget, NewApplicationRequest,
};
use crate::workflows::applications::repository::{
    ApplicationDraft, ApplicationRepository, Revision,
};
use crate::workflows::applications::timeline::TimelineEntryDraft;
use crate::workflows::applications::{application_router, TrackerService};
use crate::workflows::sponsors::{
    Company, CompanyDirectory, CompanyId, CompanyPage, CompanyQuery, ImportLogEntry,
    SponsorRating, SponsorRecord,
};

pub(super) const A_RATED: CompanyId = CompanyId(1);
pub(super) const B_RATED: CompanyId = CompanyId(2);
pub(super) const LEGACY_RATED: CompanyId = CompanyId(3);
pub(super) const TOKEN_SECRET: &str = "routing-test-secret";

pub(super) type SqliteTracker = TrackerService<SqliteStore, SqliteStore>;

/// In-memory store seeded with three register companies (ids 1..=3) and two users.
pub(super) fn seeded_store() -> (Arc<SqliteStore>, User, User) {
    let store = SqliteStore::open_in_memory().expect("in-memory store");
    let inserted = store
        .insert_batch(&[
            SponsorRecord {
                name: "Acme Analytics".to_string(),
                town: Some("London".to_string()),
                route: Some("Skilled Worker".to_string()),
                rating: SponsorRating::A,
                full_rating: Some("Worker (A rating)".to_string()),
            },
            SponsorRecord {
                name: "Brook Logistics".to_string(),
                town: Some("Leeds".to_string()),
                route: Some("Skilled Worker".to_string()),
                rating: SponsorRating::B,
                full_rating: Some("Worker (B rating)".to_string()),
            },
            SponsorRecord {
                name: "Legacy Holdings".to_string(),
                town: None,
                route: None,
                rating: SponsorRating::Other("Premium".to_string()),
                full_rating: None,
            },
        ])
        .expect("seed companies");
    assert_eq!(inserted, 3);

    let casey = store.upsert_user("casey@example.com").expect("casey");
    let robin = store.upsert_user("robin@example.com").expect("robin");
    (Arc::new(store), casey, robin)
}

pub(super) fn tracker(store: &Arc<SqliteStore>) -> SqliteTracker {
    TrackerService::new(Arc::clone(store), Arc::clone(store))
}

pub(super) fn request_for(company_id: CompanyId, role: &str) -> NewApplicationRequest {
    NewApplicationRequest {
        company: CompanyTarget::Existing { company_id },
        role: role.to_string(),
        status: None,
        applied_date: None,
        follow_up_date: None,
        notes: None,
        salary: None,
        external_website: None,
        cv_version: None,
    }
}

pub(super) fn token_keys() -> Arc<TokenKeys> {
    Arc::new(TokenKeys::new(TOKEN_SECRET, Duration::hours(1)))
}

pub(super) fn bearer(keys: &TokenKeys, user: &User) -> String {
    format!("Bearer {}", keys.issue(user).expect("token signs"))
}

pub(super) fn router_for(store: &Arc<SqliteStore>, keys: Arc<TokenKeys>) -> Router {
    application_router(Arc::new(tracker(store)), keys, true)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store double whose every call fails as if the database were unreachable.
pub(super) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl CompanyDirectory for UnavailableStore {
    fn company(&self, _id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        offline()
    }

    fn search(&self, _query: &CompanyQuery) -> Result<CompanyPage, RepositoryError> {
        offline()
    }

    fn register_size(&self) -> Result<u64, RepositoryError> {
        offline()
    }

    fn insert_batch(&self, _batch: &[SponsorRecord]) -> Result<u64, RepositoryError> {
        offline()
    }

    fn record_import(&self, _entry: &ImportLogEntry) -> Result<(), RepositoryError> {
        offline()
    }

    fn last_import(&self) -> Result<Option<ImportLogEntry>, RepositoryError> {
        offline()
    }
}

impl ApplicationRepository for UnavailableStore {
    fn insert(&self, _draft: ApplicationDraft) -> Result<ApplicationDetail, RepositoryError> {
        offline()
    }

    fn fetch(
        &self,
        _owner: UserId,
        _id: ApplicationId,
    ) -> Result<Option<ApplicationDetail>, RepositoryError> {
        offline()
    }

    fn list(&self, _owner: UserId) -> Result<Vec<ApplicationListing>, RepositoryError> {
        offline()
    }

    fn revise(
        &self,
        _owner: UserId,
        _id: ApplicationId,
        _revision: &mut Revision<'_>,
    ) -> Result<Option<Application>, RepositoryError> {
        offline()
    }

    fn append_update(
        &self,
        _owner: UserId,
        _id: ApplicationId,
        _entry: TimelineEntryDraft,
    ) -> Result<Option<ApplicationUpdate>, RepositoryError> {
        offline()
    }

    fn delete(&self, _owner: UserId, _id: ApplicationId) -> Result<bool, RepositoryError> {
        offline()
    }

    fn statuses(&self, _owner: UserId) -> Result<Vec<ApplicationStatus>, RepositoryError> {
        offline()
    }
}
