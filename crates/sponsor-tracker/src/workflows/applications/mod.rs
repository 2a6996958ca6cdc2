//! Application tracking: CRUD over a user's applications, the append-only
//! status timeline, the outcome heuristic and the dashboard summary.

pub mod analytics;
pub mod domain;
pub mod prediction;
pub mod repository;
pub mod router;
pub mod service;
pub mod timeline;

#[cfg(test)]
mod tests;

pub use analytics::{ApplicationSummary, RegionCount};
pub use domain::{
    Application, ApplicationDetail, ApplicationId, ApplicationListing, ApplicationPatch,
    ApplicationStatus, ApplicationUpdate, CompanyTarget, ManualNoteRequest, NewApplicationRequest,
    TimelineEntryKind, UnknownStatus, ValidationError,
};
pub use prediction::{predict_outcome, Prediction};
pub use repository::{ApplicationDraft, ApplicationRepository, Revision};
pub use router::application_router;
pub use service::{ServiceError, TrackerService};
pub use timeline::TimelineEntryDraft;
