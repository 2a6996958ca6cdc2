use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

use crate::workflows::applications::{ApplicationStatus, TimelineEntryKind};
use crate::workflows::sponsors::ImportStatus;

impl ToSql for ApplicationStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for ApplicationStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<ApplicationStatus>()
            .map_err(|err| FromSqlError::Other(Box::new(err)))
    }
}

impl ToSql for TimelineEntryKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for TimelineEntryKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse::<TimelineEntryKind>()
            .map_err(|err| FromSqlError::Other(err.into()))
    }
}

impl ToSql for ImportStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for ImportStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "SUCCESS" => Ok(ImportStatus::Success),
            "FAILED" => Ok(ImportStatus::Failed),
            other => Err(FromSqlError::Other(
                format!("unknown import status '{other}'").into(),
            )),
        }
    }
}
