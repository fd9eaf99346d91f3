//! Read-only presentation queries over the two stores.
//!
//! Queries never mutate and take no locks; readers observe some committed
//! state consistent with the total order of transactions on each title.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::error::Error;
use super::ports::{
    AvailabilityStore, AvailabilityStoreError, CirculationQuery, LoanRecord, RecordStore,
    RecordStoreError,
};
use super::student::Student;

fn map_record_error(err: RecordStoreError) -> Error {
    Error::store_io("record store query", err.to_string())
}

fn map_availability_error(err: AvailabilityStoreError) -> Error {
    Error::store_io("availability store query", err.to_string())
}

/// Query service implementing [`CirculationQuery`] over the two stores.
pub struct QueryService<R, A> {
    records: Arc<R>,
    availability: Arc<A>,
}

impl<R, A> QueryService<R, A> {
    /// Create a query service over the two stores.
    #[must_use]
    pub fn new(records: Arc<R>, availability: Arc<A>) -> Self {
        Self {
            records,
            availability,
        }
    }
}

#[async_trait]
impl<R, A> CirculationQuery for QueryService<R, A>
where
    R: RecordStore,
    A: AvailabilityStore,
{
    async fn list_students(&self) -> Result<Vec<Student>, Error> {
        self.records
            .list_students()
            .await
            .map_err(map_record_error)
    }

    async fn open_loans(&self) -> Result<Vec<LoanRecord>, Error> {
        let students = self
            .records
            .list_students()
            .await
            .map_err(map_record_error)?;
        let by_id: HashMap<_, _> = students
            .into_iter()
            .map(|student| (student.id, student))
            .collect();

        let loans = self.records.list_loans().await.map_err(map_record_error)?;
        let mut records = Vec::with_capacity(loans.len());
        for loan in loans {
            match by_id.get(&loan.student_id) {
                Some(student) => records.push(LoanRecord {
                    loan,
                    student: student.clone(),
                }),
                // Students are never deleted, so an orphan loan points at a
                // store defect; log it rather than failing the listing.
                None => warn!(
                    loan_id = %loan.id,
                    student_id = %loan.student_id,
                    "open loan references an unknown student"
                ),
            }
        }
        Ok(records)
    }

    async fn available_books(&self) -> Result<Vec<String>, Error> {
        self.availability
            .available_titles()
            .await
            .map_err(map_availability_error)
    }
}
