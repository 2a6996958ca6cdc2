use super::domain::{Company, CompanyId, CompanyPage, CompanyQuery, ImportLogEntry, SponsorRecord};
use crate::store::RepositoryError;

/// Read/write access to the sponsor register. Company lookups back the
/// predictor; batch inserts back the CSV import.
pub trait CompanyDirectory: Send + Sync {
    fn company(&self, id: CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn search(&self, query: &CompanyQuery) -> Result<CompanyPage, RepositoryError>;
    fn register_size(&self) -> Result<u64, RepositoryError>;
    /// Inserts the batch, silently skipping duplicates; returns rows written.
    fn insert_batch(&self, batch: &[SponsorRecord]) -> Result<u64, RepositoryError>;
    fn record_import(&self, entry: &ImportLogEntry) -> Result<(), RepositoryError>;
    fn last_import(&self) -> Result<Option<ImportLogEntry>, RepositoryError>;
}
