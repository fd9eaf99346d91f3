//! In-memory availability store adapter.
//!
//! Satisfies the [`AvailabilityStore`] port with a mutex-guarded map; any
//! keyed store fulfils the contract, so tests and deployments without the
//! CSV file use this one.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{AvailabilityStore, AvailabilityStoreError};
use crate::domain::BookTitle;

#[derive(Debug, Clone)]
struct TitleEntry {
    /// Title as originally registered, for display.
    title: String,
    available: bool,
}

/// Mutex-guarded in-memory implementation of [`AvailabilityStore`].
///
/// Entries keep registration order, matching the file-backed adapter.
#[derive(Debug, Default)]
pub struct InMemoryAvailabilityStore {
    inner: Mutex<Vec<TitleEntry>>,
}

impl InMemoryAvailabilityStore {
    /// Create a store pre-populated with `(title, available)` pairs.
    pub fn with_titles<I, S>(titles: I) -> Self
    where
        I: IntoIterator<Item = (S, bool)>,
        S: Into<String>,
    {
        let entries = titles
            .into_iter()
            .map(|(title, available)| TitleEntry {
                title: title.into(),
                available,
            })
            .collect();
        Self {
            inner: Mutex::new(entries),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<TitleEntry>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AvailabilityStore for InMemoryAvailabilityStore {
    async fn availability(
        &self,
        title: &BookTitle,
    ) -> Result<Option<bool>, AvailabilityStoreError> {
        Ok(self
            .entries()
            .iter()
            .find(|entry| title.matches(&entry.title))
            .map(|entry| entry.available))
    }

    async fn set_availability(
        &self,
        title: &BookTitle,
        available: bool,
    ) -> Result<(), AvailabilityStoreError> {
        let mut entries = self.entries();
        match entries.iter_mut().find(|entry| title.matches(&entry.title)) {
            Some(entry) => {
                entry.available = available;
                Ok(())
            }
            None => Err(AvailabilityStoreError::unknown_title(title.as_str())),
        }
    }

    async fn available_titles(&self) -> Result<Vec<String>, AvailabilityStoreError> {
        Ok(self
            .entries()
            .iter()
            .filter(|entry| entry.available)
            .map(|entry| entry.title.clone())
            .collect())
    }
}
