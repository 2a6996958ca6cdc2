//! UK visa sponsor register: directory search and CSV import.

pub mod directory;
pub mod domain;
mod normalizer;
mod parser;
pub mod router;

pub use directory::CompanyDirectory;
pub use domain::{
    Company, CompanyId, CompanyPage, CompanyQuery, ExternalCompany, ImportLogEntry, ImportStatus,
    Pagination, SponsorRating, SponsorRecord,
};
pub use router::company_router;

use chrono::Utc;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use crate::store::RepositoryError;

pub const IMPORT_BATCH_SIZE: usize = 500;

#[derive(Debug)]
pub enum SponsorImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Store(RepositoryError),
}

impl std::fmt::Display for SponsorImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SponsorImportError::Io(err) => write!(f, "failed to read sponsor register: {}", err),
            SponsorImportError::Csv(err) => write!(f, "invalid sponsor register CSV: {}", err),
            SponsorImportError::Store(err) => {
                write!(f, "could not store sponsor register rows: {}", err)
            }
        }
    }
}

impl std::error::Error for SponsorImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SponsorImportError::Io(err) => Some(err),
            SponsorImportError::Csv(err) => Some(err),
            SponsorImportError::Store(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for SponsorImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for SponsorImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for SponsorImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Store(err)
    }
}

/// Result of one import run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportReport {
    /// The register was already populated; nothing was read.
    AlreadySeeded { existing: u64 },
    Imported { inserted: u64, skipped_rows: u64 },
}

/// Seeds the company directory from a register export in fixed-size batches.
pub struct SponsorImporter<C> {
    directory: Arc<C>,
    batch_size: usize,
}

impl<C> SponsorImporter<C>
where
    C: CompanyDirectory,
{
    pub fn new(directory: Arc<C>) -> Self {
        Self {
            directory,
            batch_size: IMPORT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn import_path<P: AsRef<Path>>(&self, path: P) -> Result<ImportReport, SponsorImportError> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        match std::fs::File::open(path) {
            Ok(file) => self.import_reader(file, &filename),
            Err(err) => {
                let err = SponsorImportError::from(err);
                self.log_failure(&filename, &err);
                Err(err)
            }
        }
    }

    /// Skips the seed entirely when the directory already holds companies.
    /// Every attempt that reads data leaves an import log entry behind.
    pub fn import_reader<R: Read>(
        &self,
        reader: R,
        filename: &str,
    ) -> Result<ImportReport, SponsorImportError> {
        let existing = self.directory.register_size()?;
        if existing > 0 {
            tracing::info!(existing, "sponsor register already populated, skipping seed");
            return Ok(ImportReport::AlreadySeeded { existing });
        }

        tracing::info!(filename, "starting sponsor register import");
        match self.load(reader) {
            Ok((inserted, skipped_rows)) => {
                self.directory.record_import(&ImportLogEntry {
                    filename: filename.to_string(),
                    status: ImportStatus::Success,
                    count: Some(inserted),
                    error: None,
                    created_at: Utc::now(),
                })?;
                tracing::info!(inserted, skipped_rows, "sponsor register import complete");
                Ok(ImportReport::Imported {
                    inserted,
                    skipped_rows,
                })
            }
            Err(err) => {
                self.log_failure(filename, &err);
                Err(err)
            }
        }
    }

    fn load<R: Read>(&self, reader: R) -> Result<(u64, u64), SponsorImportError> {
        let mut batch = Vec::with_capacity(self.batch_size);
        let mut inserted = 0;
        let mut skipped_rows = 0;

        for row in parser::parse_records(reader) {
            match row? {
                Some(record) => batch.push(record),
                None => skipped_rows += 1,
            }

            if batch.len() >= self.batch_size {
                inserted += self.directory.insert_batch(&batch)?;
                tracing::debug!(inserted, "sponsor register batch stored");
                batch.clear();
            }
        }

        if !batch.is_empty() {
            inserted += self.directory.insert_batch(&batch)?;
        }

        Ok((inserted, skipped_rows))
    }

    fn log_failure(&self, filename: &str, err: &SponsorImportError) {
        tracing::error!(filename, error = %err, "sponsor register import failed");
        let entry = ImportLogEntry {
            filename: filename.to_string(),
            status: ImportStatus::Failed,
            count: None,
            error: Some(err.to_string()),
            created_at: Utc::now(),
        };
        if let Err(log_err) = self.directory.record_import(&entry) {
            tracing::error!(error = %log_err, "could not write import failure log");
        }
    }
}
