use rusqlite::{params, Connection, OptionalExtension, Row};

use super::companies::{company_at, COMPANY_COLUMNS};
use super::{RepositoryError, SqliteStore};
use crate::auth::UserId;
use crate::workflows::applications::{
    Application, ApplicationDetail, ApplicationDraft, ApplicationId, ApplicationListing,
    ApplicationRepository, ApplicationStatus, ApplicationUpdate, CompanyTarget, Revision,
    TimelineEntryDraft,
};
use crate::workflows::sponsors::CompanyId;

const APPLICATION_COLUMNS: &str = "a.id, a.user_id, a.company_id, a.role, a.status, \
     a.applied_date, a.follow_up_date, a.follow_up_completed, a.notes, a.salary, \
     a.external_website, a.cv_version, a.created_at, a.updated_at";
const APPLICATION_COLUMN_COUNT: usize = 14;

fn application_at(row: &Row<'_>) -> rusqlite::Result<Application> {
    Ok(Application {
        id: ApplicationId(row.get(0)?),
        user_id: UserId(row.get(1)?),
        company_id: CompanyId(row.get(2)?),
        role: row.get(3)?,
        status: row.get(4)?,
        applied_date: row.get(5)?,
        follow_up_date: row.get(6)?,
        follow_up_completed: row.get(7)?,
        notes: row.get(8)?,
        salary: row.get(9)?,
        external_website: row.get(10)?,
        cv_version: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn listing_at(row: &Row<'_>) -> rusqlite::Result<ApplicationListing> {
    Ok(ApplicationListing {
        application: application_at(row)?,
        company: company_at(row, APPLICATION_COLUMN_COUNT)?,
    })
}

fn update_at(row: &Row<'_>) -> rusqlite::Result<ApplicationUpdate> {
    Ok(ApplicationUpdate {
        id: row.get(0)?,
        application_id: ApplicationId(row.get(1)?),
        kind: row.get(2)?,
        note: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn owned_application(
    conn: &Connection,
    owner: UserId,
    id: ApplicationId,
) -> Result<Option<Application>, RepositoryError> {
    let application = conn
        .query_row(
            &format!("SELECT {APPLICATION_COLUMNS} FROM applications a WHERE a.id = ?1 AND a.user_id = ?2"),
            params![id.0, owner.0],
            application_at,
        )
        .optional()?;
    Ok(application)
}

fn insert_entry(
    conn: &Connection,
    id: ApplicationId,
    entry: &TimelineEntryDraft,
) -> Result<ApplicationUpdate, RepositoryError> {
    conn.execute(
        "INSERT INTO application_updates (application_id, kind, note, created_at) \
         VALUES (?1, ?2, ?3, ?4)",
        params![id.0, entry.kind, entry.note, entry.created_at],
    )?;
    Ok(ApplicationUpdate {
        id: conn.last_insert_rowid(),
        application_id: id,
        kind: entry.kind,
        note: entry.note.clone(),
        created_at: entry.created_at,
    })
}

/// Timeline newest first; insertion order breaks timestamp ties.
fn timeline(conn: &Connection, id: ApplicationId) -> Result<Vec<ApplicationUpdate>, RepositoryError> {
    let mut stmt = conn.prepare(
        "SELECT id, application_id, kind, note, created_at FROM application_updates \
         WHERE application_id = ?1 ORDER BY created_at DESC, id DESC",
    )?;
    let updates = stmt
        .query_map([id.0], update_at)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(updates)
}

fn detail(
    conn: &Connection,
    owner: UserId,
    id: ApplicationId,
) -> Result<Option<ApplicationDetail>, RepositoryError> {
    let listing = conn
        .query_row(
            &format!(
                "SELECT {APPLICATION_COLUMNS}, {COMPANY_COLUMNS} FROM applications a \
                 JOIN companies c ON c.id = a.company_id WHERE a.id = ?1 AND a.user_id = ?2"
            ),
            params![id.0, owner.0],
            listing_at,
        )
        .optional()?;

    match listing {
        Some(listing) => Ok(Some(ApplicationDetail {
            updates: timeline(conn, id)?,
            application: listing.application,
            company: listing.company,
        })),
        None => Ok(None),
    }
}

fn exists(conn: &Connection, sql: &str, id: i64) -> Result<bool, RepositoryError> {
    let found: bool = conn.query_row(sql, [id], |row| row.get(0))?;
    Ok(found)
}

impl ApplicationRepository for SqliteStore {
    fn insert(&self, draft: ApplicationDraft) -> Result<ApplicationDetail, RepositoryError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        if !exists(&tx, "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)", draft.owner.0)? {
            return Err(RepositoryError::UnknownOwner);
        }

        let company_id = match &draft.company {
            CompanyTarget::Existing { company_id } => {
                if !exists(
                    &tx,
                    "SELECT EXISTS(SELECT 1 FROM companies WHERE id = ?1)",
                    company_id.0,
                )? {
                    return Err(RepositoryError::NotFound);
                }
                *company_id
            }
            CompanyTarget::External(company) => {
                tx.execute(
                    "INSERT INTO companies (name, town, industry, website, logo_url, is_external) \
                     VALUES (?1, ?2, ?3, ?4, ?5, 1)",
                    params![
                        company.name,
                        company.town,
                        company.industry,
                        company.website,
                        company.logo_url,
                    ],
                )?;
                CompanyId(tx.last_insert_rowid())
            }
        };

        tx.execute(
            "INSERT INTO applications (user_id, company_id, role, status, applied_date, \
             follow_up_date, follow_up_completed, notes, salary, external_website, cv_version, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10, ?11, ?11)",
            params![
                draft.owner.0,
                company_id.0,
                draft.role,
                draft.status,
                draft.applied_date,
                draft.follow_up_date,
                draft.notes,
                draft.salary,
                draft.external_website,
                draft.cv_version,
                draft.created_at,
            ],
        )?;
        let id = ApplicationId(tx.last_insert_rowid());

        if let Some(entry) = &draft.initial_entry {
            insert_entry(&tx, id, entry)?;
        }

        let created = detail(&tx, draft.owner, id)?.ok_or(RepositoryError::NotFound)?;
        tx.commit()?;
        Ok(created)
    }

    fn fetch(
        &self,
        owner: UserId,
        id: ApplicationId,
    ) -> Result<Option<ApplicationDetail>, RepositoryError> {
        let conn = self.connection()?;
        detail(&conn, owner, id)
    }

    fn list(&self, owner: UserId) -> Result<Vec<ApplicationListing>, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {APPLICATION_COLUMNS}, {COMPANY_COLUMNS} FROM applications a \
             JOIN companies c ON c.id = a.company_id WHERE a.user_id = ?1 \
             ORDER BY a.applied_date DESC, a.id DESC"
        ))?;
        let listings = stmt
            .query_map([owner.0], listing_at)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(listings)
    }

    fn revise(
        &self,
        owner: UserId,
        id: ApplicationId,
        revision: &mut Revision<'_>,
    ) -> Result<Option<Application>, RepositoryError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let Some(mut application) = owned_application(&tx, owner, id)? else {
            return Ok(None);
        };
        let entry = revision(&mut application);

        tx.execute(
            "UPDATE applications SET role = ?1, status = ?2, follow_up_date = ?3, \
             follow_up_completed = ?4, notes = ?5, salary = ?6, external_website = ?7, \
             cv_version = ?8, updated_at = ?9 WHERE id = ?10 AND user_id = ?11",
            params![
                application.role,
                application.status,
                application.follow_up_date,
                application.follow_up_completed,
                application.notes,
                application.salary,
                application.external_website,
                application.cv_version,
                application.updated_at,
                id.0,
                owner.0,
            ],
        )?;
        if let Some(entry) = &entry {
            insert_entry(&tx, id, entry)?;
        }

        tx.commit()?;
        Ok(Some(application))
    }

    fn append_update(
        &self,
        owner: UserId,
        id: ApplicationId,
        entry: TimelineEntryDraft,
    ) -> Result<Option<ApplicationUpdate>, RepositoryError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        if owned_application(&tx, owner, id)?.is_none() {
            return Ok(None);
        }
        let update = insert_entry(&tx, id, &entry)?;
        tx.commit()?;
        Ok(Some(update))
    }

    fn delete(&self, owner: UserId, id: ApplicationId) -> Result<bool, RepositoryError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;

        let Some(application) = owned_application(&tx, owner, id)? else {
            return Ok(false);
        };
        tx.execute(
            "DELETE FROM applications WHERE id = ?1 AND user_id = ?2",
            params![id.0, owner.0],
        )?;
        // Ad-hoc companies go with the last application that references them.
        tx.execute(
            "DELETE FROM companies WHERE id = ?1 AND is_external = 1 \
             AND NOT EXISTS (SELECT 1 FROM applications WHERE company_id = ?1)",
            [application.company_id.0],
        )?;

        tx.commit()?;
        Ok(true)
    }

    fn statuses(&self, owner: UserId) -> Result<Vec<ApplicationStatus>, RepositoryError> {
        let conn = self.connection()?;
        let mut stmt = conn.prepare("SELECT status FROM applications WHERE user_id = ?1")?;
        let statuses = stmt
            .query_map([owner.0], |row| row.get(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statuses)
    }
}
