//! Keyed asynchronous locks for transaction scoping.
//!
//! The lending engine serialises transactions per book title and per
//! student. A [`KeyedLocks`] hands out one async mutex per key so that two
//! transactions touching the same title (or the same student) cannot
//! interleave their check-then-write sequence, while transactions on
//! unrelated keys proceed concurrently.
//!
//! Lock entries are never evicted; the key space here (titles in the
//! catalogue, registered students) is small and bounded.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Map from key to its exclusive async lock.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    inner: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty lock map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the exclusive lock for `key`, waiting if another transaction
    /// holds it. The lock is released when the returned guard drops.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let entry = {
            // A poisoned map only means another thread panicked while
            // inserting; the map itself is still coherent.
            let mut map = self
                .inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(map.entry(key.to_owned()).or_default())
        };
        entry.lock_owned().await
    }
}
