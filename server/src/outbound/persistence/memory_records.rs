//! In-memory record store adapter.
//!
//! Backs the [`RecordStore`] port with a mutex-guarded map. The single
//! mutex makes each port operation atomic with respect to the others, which
//! is the serialisation guarantee the engine's per-student lock builds on.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::ports::{RecordStore, RecordStoreError};
use crate::domain::{Loan, LoanId, Student, StudentCode, StudentId};

#[derive(Debug, Default)]
struct RecordState {
    students: HashMap<StudentId, Student>,
    codes: HashMap<String, StudentId>,
    loans: HashMap<LoanId, Loan>,
}

/// Mutex-guarded in-memory implementation of [`RecordStore`].
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    inner: Mutex<RecordState>,
}

impl InMemoryRecordStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, RecordState> {
        // A poisoned mutex only means a test thread panicked mid-operation;
        // the map contents are still usable.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn find_student_by_code(
        &self,
        code: &StudentCode,
    ) -> Result<Option<Student>, RecordStoreError> {
        let state = self.state();
        let id = state.codes.get(code.as_str());
        Ok(id.and_then(|id| state.students.get(id)).cloned())
    }

    async fn list_students(&self) -> Result<Vec<Student>, RecordStoreError> {
        let state = self.state();
        let mut students: Vec<_> = state.students.values().cloned().collect();
        students.sort_by(|a, b| a.code.as_str().cmp(b.code.as_str()));
        Ok(students)
    }

    async fn insert_student(&self, student: Student) -> Result<(), RecordStoreError> {
        let mut state = self.state();
        if state.codes.contains_key(student.code.as_str()) {
            return Err(RecordStoreError::query(format!(
                "student code {} is already registered",
                student.code
            )));
        }
        state.codes.insert(student.code.as_str().to_owned(), student.id);
        state.students.insert(student.id, student);
        Ok(())
    }

    async fn student_count(&self) -> Result<usize, RecordStoreError> {
        Ok(self.state().students.len())
    }

    async fn count_open_loans(&self, student: StudentId) -> Result<usize, RecordStoreError> {
        let state = self.state();
        Ok(state
            .loans
            .values()
            .filter(|loan| loan.student_id == student)
            .count())
    }

    async fn insert_loan(&self, loan: Loan) -> Result<(), RecordStoreError> {
        let mut state = self.state();
        if state.loans.contains_key(&loan.id) {
            return Err(RecordStoreError::query(format!(
                "loan {} already exists",
                loan.id
            )));
        }
        state.loans.insert(loan.id, loan);
        Ok(())
    }

    async fn delete_loan(&self, id: LoanId) -> Result<Option<Loan>, RecordStoreError> {
        Ok(self.state().loans.remove(&id))
    }

    async fn find_loan(&self, id: LoanId) -> Result<Option<Loan>, RecordStoreError> {
        Ok(self.state().loans.get(&id).cloned())
    }

    async fn list_loans(&self) -> Result<Vec<Loan>, RecordStoreError> {
        let state = self.state();
        let mut loans: Vec<_> = state.loans.values().cloned().collect();
        loans.sort_by(|a, b| (a.borrow_date, a.id).cmp(&(b.borrow_date, b.id)));
        Ok(loans)
    }
}
