//! Startup import of the student roster.
//!
//! The record store starts empty on a fresh deployment, so the server can
//! optionally load students from a CSV file on boot. The import runs once:
//! if the store already holds students, the file is left untouched so
//! restarts never duplicate the roster.

use std::path::{Path, PathBuf};

use csv::StringRecord;
use thiserror::Error;

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Student, StudentCode};

/// Failures while importing the student roster.
#[derive(Debug, Error)]
pub enum SeedError {
    /// The roster file could not be read or parsed.
    #[error("failed to read student roster {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    /// The record store rejected an insert.
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

/// Summary of a completed roster import.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedOutcome {
    /// Students written to the record store.
    pub imported: usize,
    /// Rows skipped because a required field was blank.
    pub skipped: usize,
}

/// Column positions resolved from the roster header.
///
/// Accepts both the `SName,SDepartment,SCode` convention of legacy exports
/// and plain `name,department,code` headers.
struct RosterColumns {
    name: usize,
    department: Option<usize>,
    code: usize,
}

impl RosterColumns {
    fn from_header(header: &StringRecord) -> Option<Self> {
        let find = |wanted: &[&str]| {
            header
                .iter()
                .position(|field| wanted.iter().any(|w| field.trim().eq_ignore_ascii_case(w)))
        };
        Some(Self {
            name: find(&["SName", "name"])?,
            department: find(&["SDepartment", "department"]),
            code: find(&["SCode", "code"])?,
        })
    }
}

/// Imports students from `path` into the record store, if one is configured
/// and the store is still empty.
///
/// Rows with a blank name or code are skipped with a warning rather than
/// aborting the import.
pub async fn seed_students_on_startup<R: RecordStore>(
    records: &R,
    path: Option<&Path>,
) -> Result<SeedOutcome, SeedError> {
    let Some(path) = path else {
        tracing::debug!("no student roster configured; skipping seed");
        return Ok(SeedOutcome::default());
    };
    if records.student_count().await? > 0 {
        tracing::info!(path = %path.display(), "record store already populated; skipping seed");
        return Ok(SeedOutcome::default());
    }

    let mut reader = csv::Reader::from_path(path).map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let header = reader
        .headers()
        .map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?
        .clone();
    let Some(columns) = RosterColumns::from_header(&header) else {
        tracing::warn!(
            path = %path.display(),
            "student roster header missing name/code columns; skipping seed"
        );
        return Ok(SeedOutcome::default());
    };

    let mut outcome = SeedOutcome::default();
    for record in reader.records() {
        let record = record.map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match parse_row(&record, &columns) {
            Some(student) => {
                records.insert_student(student).await?;
                outcome.imported += 1;
            }
            None => {
                tracing::warn!(row = ?record, "skipping roster row with blank name or code");
                outcome.skipped += 1;
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        imported = outcome.imported,
        skipped = outcome.skipped,
        "student roster imported"
    );
    Ok(outcome)
}

fn parse_row(record: &StringRecord, columns: &RosterColumns) -> Option<Student> {
    let name = record.get(columns.name)?.trim();
    let code = record.get(columns.code)?.trim();
    let department = columns
        .department
        .and_then(|idx| record.get(idx))
        .unwrap_or("")
        .trim();
    if name.is_empty() {
        return None;
    }
    let code = StudentCode::new(code).ok()?;
    Some(Student::new(name, department, code))
}

#[cfg(test)]
#[path = "seed_tests.rs"]
mod tests;
