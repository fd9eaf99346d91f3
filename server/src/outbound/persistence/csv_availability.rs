//! CSV-file availability store adapter.
//!
//! Persists per-title availability in a flat tabular file with the columns
//! `BookName,Available` and the literal values `Yes`/`No`, the layout the
//! catalogue file has always used. Rows are cached in memory; every update
//! rewrites the whole file, preserving row order and the original title
//! casing. Title lookups are case-insensitive.
//!
//! File I/O is synchronous under the row mutex; the catalogue file is small
//! and the engine bounds every store call with a timeout anyway.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{AvailabilityStore, AvailabilityStoreError};
use crate::domain::BookTitle;

#[derive(Debug, Deserialize, Serialize)]
struct CsvRow {
    #[serde(rename = "BookName")]
    title: String,
    #[serde(rename = "Available")]
    available: String,
}

#[derive(Debug, Clone)]
struct BookRow {
    title: String,
    available: bool,
}

impl BookRow {
    fn from_csv(row: CsvRow) -> Result<Self, AvailabilityStoreError> {
        let available = match row.available.trim() {
            flag if flag.eq_ignore_ascii_case("yes") => true,
            flag if flag.eq_ignore_ascii_case("no") => false,
            other => {
                return Err(AvailabilityStoreError::corrupt(format!(
                    "row for \"{}\" has Available value \"{other}\", expected Yes or No",
                    row.title
                )));
            }
        };
        Ok(Self {
            title: row.title,
            available,
        })
    }

    fn to_csv(&self) -> CsvRow {
        CsvRow {
            title: self.title.clone(),
            available: if self.available { "Yes" } else { "No" }.to_owned(),
        }
    }
}

/// File-backed implementation of [`AvailabilityStore`].
#[derive(Debug)]
pub struct CsvAvailabilityStore {
    path: PathBuf,
    rows: Mutex<Vec<BookRow>>,
}

impl CsvAvailabilityStore {
    /// Open the store, reading and validating every row.
    ///
    /// # Errors
    /// Returns [`AvailabilityStoreError::Io`] when the file cannot be read
    /// and [`AvailabilityStoreError::Corrupt`] when a row fails to parse.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AvailabilityStoreError> {
        let path = path.into();
        let rows = read_rows(&path)?;
        Ok(Self {
            path,
            rows: Mutex::new(rows),
        })
    }

    fn rows(&self) -> MutexGuard<'_, Vec<BookRow>> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, rows: &[BookRow]) -> Result<(), AvailabilityStoreError> {
        let mut writer = csv::Writer::from_path(&self.path)
            .map_err(|err| AvailabilityStoreError::io(err.to_string()))?;
        for row in rows {
            writer
                .serialize(row.to_csv())
                .map_err(|err| AvailabilityStoreError::io(err.to_string()))?;
        }
        writer
            .flush()
            .map_err(|err| AvailabilityStoreError::io(err.to_string()))
    }
}

fn read_rows(path: &Path) -> Result<Vec<BookRow>, AvailabilityStoreError> {
    let mut reader = csv::Reader::from_path(path).map_err(|err| {
        AvailabilityStoreError::io(format!("cannot open {}: {err}", path.display()))
    })?;
    let mut rows = Vec::new();
    for record in reader.deserialize::<CsvRow>() {
        let record = record.map_err(|err| AvailabilityStoreError::corrupt(err.to_string()))?;
        rows.push(BookRow::from_csv(record)?);
    }
    Ok(rows)
}

#[async_trait]
impl AvailabilityStore for CsvAvailabilityStore {
    async fn availability(
        &self,
        title: &BookTitle,
    ) -> Result<Option<bool>, AvailabilityStoreError> {
        Ok(self
            .rows()
            .iter()
            .find(|row| title.matches(&row.title))
            .map(|row| row.available))
    }

    async fn set_availability(
        &self,
        title: &BookTitle,
        available: bool,
    ) -> Result<(), AvailabilityStoreError> {
        let mut rows = self.rows();
        let Some(index) = rows.iter().position(|row| title.matches(&row.title)) else {
            return Err(AvailabilityStoreError::unknown_title(title.as_str()));
        };

        let previous = rows[index].available;
        rows[index].available = available;
        if let Err(err) = self.persist(&rows) {
            // Keep cache and file in agreement: a failed write means the
            // store did not change.
            rows[index].available = previous;
            return Err(err);
        }
        Ok(())
    }

    async fn available_titles(&self) -> Result<Vec<String>, AvailabilityStoreError> {
        Ok(self
            .rows()
            .iter()
            .filter(|row| row.available)
            .map(|row| row.title.clone())
            .collect())
    }
}
