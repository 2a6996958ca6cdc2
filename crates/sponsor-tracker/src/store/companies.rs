use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension, Row};

use super::{RepositoryError, SqliteStore};
use crate::workflows::sponsors::{
    Company, CompanyDirectory, CompanyId, CompanyPage, CompanyQuery, ImportLogEntry, Pagination,
    SponsorRating, SponsorRecord,
};

pub(super) const COMPANY_COLUMNS: &str = "c.id, c.name, c.town, c.route, c.rating, \
     c.full_rating, c.industry, c.website, c.logo_url, c.is_external";

/// Reads the ten `COMPANY_COLUMNS` starting at column `base`.
pub(super) fn company_at(row: &Row<'_>, base: usize) -> rusqlite::Result<Company> {
    Ok(Company {
        id: CompanyId(row.get(base)?),
        name: row.get(base + 1)?,
        town: row.get(base + 2)?,
        route: row.get(base + 3)?,
        rating: row
            .get::<_, Option<String>>(base + 4)?
            .map(SponsorRating::from),
        full_rating: row.get(base + 5)?,
        industry: row.get(base + 6)?,
        website: row.get(base + 7)?,
        logo_url: row.get(base + 8)?,
        is_external: row.get(base + 9)?,
    })
}

fn count_as_u64(count: i64) -> u64 {
    u64::try_from(count).unwrap_or_default()
}

impl CompanyDirectory for SqliteStore {
    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError> {
        let conn = self.connection()?;
        let company = conn
            .query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM companies c WHERE c.id = ?1"),
                [id.0],
                |row| company_at(row, 0),
            )
            .optional()?;
        Ok(company)
    }

    fn search(&self, query: &CompanyQuery) -> Result<CompanyPage, RepositoryError> {
        let mut clauses = vec!["c.is_external = 0".to_string()];
        let mut values: Vec<Value> = Vec::new();

        if let Some(town) = &query.town {
            values.push(Value::Text(town.clone()));
            clauses.push(format!("instr(lower(c.town), lower(?{})) > 0", values.len()));
        }
        if let Some(route) = &query.route {
            values.push(Value::Text(route.clone()));
            clauses.push(format!("instr(lower(c.route), lower(?{})) > 0", values.len()));
        }
        if let Some(rating) = &query.rating {
            values.push(Value::Text(rating.clone()));
            clauses.push(format!("c.rating = ?{}", values.len()));
        }
        let filter = clauses.join(" AND ");

        let conn = self.connection()?;
        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM companies c WHERE {filter}"),
            params_from_iter(values.iter()),
            |row| row.get(0),
        )?;

        let limit_slot = values.len() + 1;
        values.push(Value::Integer(i64::from(query.limit)));
        values.push(Value::Integer(
            i64::try_from(query.offset()).unwrap_or(i64::MAX),
        ));
        let mut stmt = conn.prepare(&format!(
            "SELECT {COMPANY_COLUMNS} FROM companies c WHERE {filter} \
             ORDER BY c.name ASC, c.id ASC LIMIT ?{} OFFSET ?{}",
            limit_slot,
            limit_slot + 1
        ))?;
        let companies = stmt
            .query_map(params_from_iter(values.iter()), |row| company_at(row, 0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompanyPage {
            companies,
            pagination: Pagination::new(count_as_u64(total), query.page, query.limit),
        })
    }

    fn register_size(&self) -> Result<u64, RepositoryError> {
        let conn = self.connection()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM companies WHERE is_external = 0",
            [],
            |row| row.get(0),
        )?;
        Ok(count_as_u64(count))
    }

    fn insert_batch(&self, batch: &[SponsorRecord]) -> Result<u64, RepositoryError> {
        let mut conn = self.connection()?;
        let tx = conn.transaction()?;
        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO companies (name, town, route, rating, full_rating, is_external) \
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
            )?;
            for record in batch {
                let changed = stmt.execute(params![
                    record.name,
                    record.town,
                    record.route,
                    record.rating.as_str(),
                    record.full_rating,
                ])?;
                inserted += changed as u64;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn record_import(&self, entry: &ImportLogEntry) -> Result<(), RepositoryError> {
        let conn = self.connection()?;
        conn.execute(
            "INSERT INTO import_logs (filename, status, count, error, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.filename,
                entry.status,
                entry.count.map(|count| i64::try_from(count).unwrap_or(i64::MAX)),
                entry.error,
                entry.created_at,
            ],
        )?;
        Ok(())
    }

    fn last_import(&self) -> Result<Option<ImportLogEntry>, RepositoryError> {
        let conn = self.connection()?;
        let entry = conn
            .query_row(
                "SELECT filename, status, count, error, created_at FROM import_logs \
                 ORDER BY created_at DESC, id DESC LIMIT 1",
                [],
                |row| {
                    Ok(ImportLogEntry {
                        filename: row.get(0)?,
                        status: row.get(1)?,
                        count: row.get::<_, Option<i64>>(2)?.map(count_as_u64),
                        error: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(entry)
    }
}
