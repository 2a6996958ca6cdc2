//! Status/timeline consistency rule.
//!
//! Every accepted status change produces exactly one timeline entry, and the
//! entry is persisted in the same transaction as the status write. This module
//! only decides *which* entry (if any) an operation produces; the repository
//! owns atomicity.

use chrono::{DateTime, Utc};

use super::domain::{
    Application, ApplicationPatch, ApplicationStatus, TimelineEntryKind, ValidationError,
};

const INITIAL_NOTE_PREFIX: &str = "Initial note: ";

/// Timeline entry awaiting persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntryDraft {
    pub kind: TimelineEntryKind,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

/// Seed entry for a freshly created application. Blank notes produce none.
pub fn initial_entry(notes: Option<&str>, at: DateTime<Utc>) -> Option<TimelineEntryDraft> {
    let note = notes.filter(|note| !note.trim().is_empty())?;
    Some(TimelineEntryDraft {
        kind: TimelineEntryKind::InitialNote,
        note: format!("{INITIAL_NOTE_PREFIX}{note}"),
        created_at: at,
    })
}

/// Entry recording a transition; `None` when the status did not change.
pub fn status_change_entry(
    from: ApplicationStatus,
    to: ApplicationStatus,
    at: DateTime<Utc>,
) -> Option<TimelineEntryDraft> {
    (from != to).then(|| TimelineEntryDraft {
        kind: TimelineEntryKind::StatusChange,
        note: format!("Status changed from {from} to {to}"),
        created_at: at,
    })
}

/// User-authored entry. Notes are stored verbatim and never deduplicated.
pub fn manual_entry(note: &str, at: DateTime<Utc>) -> Result<TimelineEntryDraft, ValidationError> {
    if note.trim().is_empty() {
        return Err(ValidationError::BlankNote);
    }
    Ok(TimelineEntryDraft {
        kind: TimelineEntryKind::Manual,
        note: note.to_string(),
        created_at: at,
    })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ApplicationPatch {
    pub fn validate(&self) -> Result<(), ValidationError> {
        match &self.role {
            Some(role) if role.trim().is_empty() => Err(ValidationError::BlankRole),
            _ => Ok(()),
        }
    }

    /// Applies the present fields and returns the status-change entry the
    /// revision requires. Only `status` can produce an entry.
    pub fn apply(
        &self,
        application: &mut Application,
        now: DateTime<Utc>,
    ) -> Option<TimelineEntryDraft> {
        if let Some(role) = self.role.as_deref().and_then(non_blank) {
            application.role = role;
        }
        if let Some(notes) = &self.notes {
            application.notes = non_blank(notes);
        }
        if let Some(salary) = &self.salary {
            application.salary = non_blank(salary);
        }
        if let Some(website) = &self.external_website {
            application.external_website = non_blank(website);
        }
        if let Some(cv_version) = &self.cv_version {
            application.cv_version = non_blank(cv_version);
        }
        if let Some(follow_up_date) = self.follow_up_date {
            application.follow_up_date = follow_up_date;
        }
        if let Some(completed) = self.follow_up_completed {
            application.follow_up_completed = completed;
        }

        let entry = self
            .status
            .and_then(|status| status_change_entry(application.status, status, now));
        if let Some(status) = self.status {
            application.status = status;
        }
        application.updated_at = now;
        entry
    }
}
