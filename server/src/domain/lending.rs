//! The lending engine.
//!
//! Orchestrates borrow and return transactions across the record store and
//! the availability store. The two stores offer no joint transaction, so
//! each mutation is a two-phase commit with compensation: write the record
//! store first, then the availability store, and undo the first write when
//! the second fails. A compensation that itself fails is reported as
//! [`Error::InconsistentState`] rather than swallowed; at that point one
//! store refers to a state the other disagrees with and an operator must
//! reconcile.
//!
//! Locking discipline: every transaction takes the per-title lock, then
//! (for operations touching a student's loan count) the per-student lock.
//! The acquisition order is the same everywhere, so the lock order is total
//! and deadlock-free. Store calls are bounded by a timeout; an elapsed
//! timeout counts as a store failure and drives the compensation path.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, warn};

use super::error::Error;
use super::loan::{Loan, LoanId};
use super::locks::KeyedLocks;
use super::ports::{
    AvailabilityStore, AvailabilityStoreError, BorrowReceipt, BorrowRequest, LendingCommand,
    RecordStore, RecordStoreError,
};

/// Maximum number of open loans a student may hold concurrently.
pub const MAX_LOANS: usize = 3;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Lending engine implementing [`LendingCommand`] over the two stores.
pub struct LendingService<R, A> {
    records: Arc<R>,
    availability: Arc<A>,
    title_locks: KeyedLocks,
    student_locks: KeyedLocks,
    store_timeout: Duration,
}

impl<R, A> LendingService<R, A> {
    /// Create an engine over the two stores with the default store timeout.
    #[must_use]
    pub fn new(records: Arc<R>, availability: Arc<A>) -> Self {
        Self::with_store_timeout(records, availability, DEFAULT_STORE_TIMEOUT)
    }

    /// Create an engine with an explicit bound on each store call.
    #[must_use]
    pub fn with_store_timeout(
        records: Arc<R>,
        availability: Arc<A>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            records,
            availability,
            title_locks: KeyedLocks::new(),
            student_locks: KeyedLocks::new(),
            store_timeout,
        }
    }
}

impl<R, A> LendingService<R, A>
where
    R: RecordStore,
    A: AvailabilityStore,
{
    /// Run a record store call under the configured timeout.
    async fn record_call<T, F>(&self, context: &'static str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, RecordStoreError>> + Send,
    {
        match timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(Error::store_io(context, err.to_string())),
            Err(_) => Err(Error::store_io(context, "store call timed out")),
        }
    }

    /// Run an availability store call under the configured timeout.
    async fn availability_call<T, F>(&self, context: &'static str, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, AvailabilityStoreError>> + Send,
    {
        match timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(Error::store_io(context, err.to_string())),
            Err(_) => Err(Error::store_io(context, "store call timed out")),
        }
    }
}

#[async_trait]
impl<R, A> LendingCommand for LendingService<R, A>
where
    R: RecordStore,
    A: AvailabilityStore,
{
    async fn borrow_book(&self, request: BorrowRequest) -> Result<BorrowReceipt, Error> {
        let BorrowRequest {
            student_code,
            book_title,
            borrow_date,
        } = request;

        // Students are immutable and never deleted, so the existence check
        // needs no lock. It also runs first: checks run as student, then
        // availability, then limit, and the first failure wins.
        let student = self
            .record_call(
                "student lookup",
                self.records.find_student_by_code(&student_code),
            )
            .await?
            .ok_or_else(|| Error::StudentNotFound {
                code: student_code.to_string(),
            })?;

        // Title lock before student lock, everywhere.
        let _title_guard = self.title_locks.acquire(&book_title.key()).await;
        let _student_guard = self.student_locks.acquire(&student.id.to_string()).await;

        match self
            .availability_call(
                "availability lookup",
                self.availability.availability(&book_title),
            )
            .await?
        {
            None => {
                return Err(Error::BookNotFound {
                    title: book_title.to_string(),
                });
            }
            Some(false) => {
                return Err(Error::BookUnavailable {
                    title: book_title.to_string(),
                });
            }
            Some(true) => {}
        }

        let open = self
            .record_call("loan count", self.records.count_open_loans(student.id))
            .await?;
        if open >= MAX_LOANS {
            return Err(Error::BorrowLimitExceeded {
                code: student_code.to_string(),
                limit: MAX_LOANS,
            });
        }

        // Phase 1: tentative loan record.
        let loan = Loan::new(student.id, book_title.clone(), borrow_date);
        self.record_call("loan insert", self.records.insert_loan(loan.clone()))
            .await?;

        // Phase 2: flip the availability flag.
        if let Err(store_err) = self
            .availability_call(
                "availability update",
                self.availability.set_availability(&book_title, false),
            )
            .await
        {
            warn!(
                loan_id = %loan.id,
                title = %book_title,
                error = %store_err,
                "availability update failed after loan insert; compensating"
            );
            return match self
                .record_call("loan compensation", self.records.delete_loan(loan.id))
                .await
            {
                // Compensation restored the pre-transaction state; report
                // the original store failure.
                Ok(_) => Err(store_err),
                Err(comp_err) => Err(Error::inconsistent(format!(
                    "loan {} for \"{}\" is recorded but the title is still \
                     flagged available; compensation failed: {comp_err}",
                    loan.id, book_title
                ))),
            };
        }

        info!(
            loan_id = %loan.id,
            student_code = %student_code,
            title = %book_title,
            "book borrowed"
        );
        Ok(BorrowReceipt { loan_id: loan.id })
    }

    async fn return_book(&self, loan_id: LoanId) -> Result<(), Error> {
        // Unlocked lookup to learn which title to lock.
        let loan = self
            .record_call("loan lookup", self.records.find_loan(loan_id))
            .await?
            .ok_or(Error::LoanNotFound { id: loan_id })?;

        let _title_guard = self.title_locks.acquire(&loan.book_title.key()).await;
        let _student_guard = self
            .student_locks
            .acquire(&loan.student_id.to_string())
            .await;

        // Phase 1: remove the loan. A `None` here means a concurrent return
        // consumed the id while we waited on the locks; returns must not be
        // silently idempotent.
        let removed = self
            .record_call("loan delete", self.records.delete_loan(loan_id))
            .await?
            .ok_or(Error::LoanNotFound { id: loan_id })?;

        // Phase 2: flip the availability flag back.
        if let Err(store_err) = self
            .availability_call(
                "availability update",
                self.availability.set_availability(&removed.book_title, true),
            )
            .await
        {
            warn!(
                loan_id = %loan_id,
                title = %removed.book_title,
                error = %store_err,
                "availability update failed after loan delete; compensating"
            );
            return match self
                .record_call(
                    "loan compensation",
                    self.records.insert_loan(removed.clone()),
                )
                .await
            {
                Ok(()) => Err(store_err),
                Err(comp_err) => Err(Error::inconsistent(format!(
                    "loan {} for \"{}\" was deleted but the title is still \
                     flagged unavailable; compensation failed: {comp_err}",
                    loan_id, removed.book_title
                ))),
            };
        }

        info!(loan_id = %loan_id, title = %removed.book_title, "book returned");
        Ok(())
    }
}

#[cfg(test)]
#[path = "lending_tests.rs"]
mod tests;
