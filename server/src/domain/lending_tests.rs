//! Behavioural tests for the lending engine, including the compensation
//! paths and the check-then-act races the keyed locks exist to prevent.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::book::BookTitle;
use crate::domain::ports::{BorrowRequest, CirculationQuery, LendingCommand};
use crate::domain::queries::QueryService;
use crate::domain::student::{Student, StudentCode};
use crate::outbound::persistence::{InMemoryAvailabilityStore, InMemoryRecordStore};

/// Availability store wrapper that fails, or never completes, a
/// configurable number of updates.
struct FlakyAvailabilityStore {
    inner: InMemoryAvailabilityStore,
    sets_to_fail: AtomicUsize,
    sets_to_stall: AtomicUsize,
}

impl FlakyAvailabilityStore {
    fn wrapping(inner: InMemoryAvailabilityStore) -> Self {
        Self {
            inner,
            sets_to_fail: AtomicUsize::new(0),
            sets_to_stall: AtomicUsize::new(0),
        }
    }

    fn fail_next_sets(&self, count: usize) {
        self.sets_to_fail.store(count, Ordering::SeqCst);
    }

    fn stall_next_sets(&self, count: usize) {
        self.sets_to_stall.store(count, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl AvailabilityStore for FlakyAvailabilityStore {
    async fn availability(
        &self,
        title: &BookTitle,
    ) -> Result<Option<bool>, AvailabilityStoreError> {
        self.inner.availability(title).await
    }

    async fn set_availability(
        &self,
        title: &BookTitle,
        available: bool,
    ) -> Result<(), AvailabilityStoreError> {
        let stalled = self.sets_to_stall.load(Ordering::SeqCst);
        if stalled > 0 {
            self.sets_to_stall.store(stalled - 1, Ordering::SeqCst);
            std::future::pending::<()>().await;
        }
        let remaining = self.sets_to_fail.load(Ordering::SeqCst);
        if remaining > 0 {
            self.sets_to_fail.store(remaining - 1, Ordering::SeqCst);
            return Err(AvailabilityStoreError::io("injected write failure"));
        }
        self.inner.set_availability(title, available).await
    }

    async fn available_titles(&self) -> Result<Vec<String>, AvailabilityStoreError> {
        self.inner.available_titles().await
    }
}

/// Record store wrapper that fails a configurable number of mutations, used
/// to drive the compensation-failure path.
struct FlakyRecordStore {
    inner: InMemoryRecordStore,
    deletes_to_fail: AtomicUsize,
    inserts_to_fail: AtomicUsize,
}

impl FlakyRecordStore {
    fn wrapping(inner: InMemoryRecordStore) -> Self {
        Self {
            inner,
            deletes_to_fail: AtomicUsize::new(0),
            inserts_to_fail: AtomicUsize::new(0),
        }
    }

    fn fail_next_deletes(&self, count: usize) {
        self.deletes_to_fail.store(count, Ordering::SeqCst);
    }

    fn fail_next_inserts(&self, count: usize) {
        self.inserts_to_fail.store(count, Ordering::SeqCst);
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        let remaining = counter.load(Ordering::SeqCst);
        if remaining > 0 {
            counter.store(remaining - 1, Ordering::SeqCst);
            return true;
        }
        false
    }
}

#[async_trait::async_trait]
impl RecordStore for FlakyRecordStore {
    async fn find_student_by_code(
        &self,
        code: &StudentCode,
    ) -> Result<Option<Student>, RecordStoreError> {
        self.inner.find_student_by_code(code).await
    }

    async fn list_students(&self) -> Result<Vec<Student>, RecordStoreError> {
        self.inner.list_students().await
    }

    async fn insert_student(&self, student: Student) -> Result<(), RecordStoreError> {
        self.inner.insert_student(student).await
    }

    async fn student_count(&self) -> Result<usize, RecordStoreError> {
        self.inner.student_count().await
    }

    async fn count_open_loans(
        &self,
        student: crate::domain::StudentId,
    ) -> Result<usize, RecordStoreError> {
        self.inner.count_open_loans(student).await
    }

    async fn insert_loan(&self, loan: Loan) -> Result<(), RecordStoreError> {
        if Self::take_failure(&self.inserts_to_fail) {
            return Err(RecordStoreError::query("injected insert failure"));
        }
        self.inner.insert_loan(loan).await
    }

    async fn delete_loan(&self, id: LoanId) -> Result<Option<Loan>, RecordStoreError> {
        if Self::take_failure(&self.deletes_to_fail) {
            return Err(RecordStoreError::query("injected delete failure"));
        }
        self.inner.delete_loan(id).await
    }

    async fn find_loan(&self, id: LoanId) -> Result<Option<Loan>, RecordStoreError> {
        self.inner.find_loan(id).await
    }

    async fn list_loans(&self) -> Result<Vec<Loan>, RecordStoreError> {
        self.inner.list_loans().await
    }
}

struct Desk {
    records: Arc<FlakyRecordStore>,
    availability: Arc<FlakyAvailabilityStore>,
    engine: LendingService<FlakyRecordStore, FlakyAvailabilityStore>,
}

impl Desk {
    async fn student(&self, code: &str) -> Student {
        let student = Student::new("Ada", "CS", StudentCode::new(code).expect("valid code"));
        self.records
            .insert_student(student.clone())
            .await
            .expect("insert student");
        student
    }

    fn borrow(&self, code: &str, title: &str, day: u32) -> BorrowRequest {
        BorrowRequest {
            student_code: StudentCode::new(code).expect("valid code"),
            book_title: BookTitle::new(title).expect("valid title"),
            borrow_date: NaiveDate::from_ymd_opt(2024, 1, day).expect("valid date"),
        }
    }

    async fn open_loans(&self, student: &Student) -> usize {
        self.records
            .count_open_loans(student.id)
            .await
            .expect("count")
    }

    async fn available(&self, title: &str) -> Option<bool> {
        self.availability
            .availability(&BookTitle::new(title).expect("valid title"))
            .await
            .expect("availability")
    }
}

#[fixture]
fn desk() -> Desk {
    let records = Arc::new(FlakyRecordStore::wrapping(InMemoryRecordStore::new()));
    let availability = Arc::new(FlakyAvailabilityStore::wrapping(
        InMemoryAvailabilityStore::with_titles([
            ("Clean Code", true),
            ("Refactoring", true),
            ("The Pragmatic Programmer", true),
            ("Design Patterns", true),
            ("Working Effectively with Legacy Code", false),
        ]),
    ));
    let engine = LendingService::new(Arc::clone(&records), Arc::clone(&availability));
    Desk {
        records,
        availability,
        engine,
    }
}

#[rstest]
#[tokio::test]
async fn borrow_flips_availability_and_increments_the_count(desk: Desk) {
    let ada = desk.student("S100").await;

    let receipt = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect("borrow succeeds");

    assert_eq!(desk.available("Clean Code").await, Some(false));
    assert_eq!(desk.open_loans(&ada).await, 1);
    let loan = desk
        .records
        .find_loan(receipt.loan_id)
        .await
        .expect("lookup")
        .expect("loan recorded");
    assert_eq!(loan.student_id, ada.id);
    assert_eq!(loan.book_title.as_str(), "Clean Code");
}

#[rstest]
#[tokio::test]
async fn borrow_fails_for_an_unknown_student(desk: Desk) {
    let err = desk
        .engine
        .borrow_book(desk.borrow("S404", "Clean Code", 1))
        .await
        .expect_err("unknown student rejected");
    assert_eq!(err, Error::StudentNotFound { code: "S404".to_owned() });
    assert_eq!(desk.available("Clean Code").await, Some(true));
}

#[rstest]
#[tokio::test]
async fn borrow_fails_for_a_title_outside_the_catalogue(desk: Desk) {
    desk.student("S100").await;
    let err = desk
        .engine
        .borrow_book(desk.borrow("S100", "Unknown Title", 1))
        .await
        .expect_err("unknown title rejected");
    assert_eq!(
        err,
        Error::BookNotFound { title: "Unknown Title".to_owned() }
    );
}

#[rstest]
#[tokio::test]
async fn borrow_of_an_unavailable_title_mutates_nothing(desk: Desk) {
    let ada = desk.student("S100").await;
    let err = desk
        .engine
        .borrow_book(desk.borrow("S100", "Working Effectively with Legacy Code", 1))
        .await
        .expect_err("unavailable title rejected");
    assert_eq!(
        err,
        Error::BookUnavailable {
            title: "Working Effectively with Legacy Code".to_owned()
        }
    );
    assert_eq!(desk.open_loans(&ada).await, 0);
    assert_eq!(
        desk.available("Working Effectively with Legacy Code").await,
        Some(false)
    );
}

#[rstest]
#[tokio::test]
async fn borrow_title_matching_is_case_insensitive(desk: Desk) {
    desk.student("S100").await;
    desk.engine
        .borrow_book(desk.borrow("S100", "clean code", 1))
        .await
        .expect("borrow succeeds");
    assert_eq!(desk.available("Clean Code").await, Some(false));
}

#[rstest]
#[tokio::test]
async fn the_fourth_borrow_hits_the_limit_without_mutation(desk: Desk) {
    let ada = desk.student("S100").await;
    for (day, title) in [(1, "Clean Code"), (2, "Refactoring"), (3, "Design Patterns")] {
        desk.engine
            .borrow_book(desk.borrow("S100", title, day))
            .await
            .expect("borrow succeeds");
    }

    let err = desk
        .engine
        .borrow_book(desk.borrow("S100", "The Pragmatic Programmer", 4))
        .await
        .expect_err("limit enforced");
    assert_eq!(
        err,
        Error::BorrowLimitExceeded { code: "S100".to_owned(), limit: MAX_LOANS }
    );
    assert_eq!(desk.open_loans(&ada).await, MAX_LOANS);
    assert_eq!(desk.available("The Pragmatic Programmer").await, Some(true));
}

#[rstest]
#[tokio::test]
async fn borrow_then_return_restores_the_original_state(desk: Desk) {
    let ada = desk.student("S100").await;
    let receipt = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect("borrow succeeds");

    desk.engine
        .return_book(receipt.loan_id)
        .await
        .expect("return succeeds");

    assert_eq!(desk.available("Clean Code").await, Some(true));
    assert_eq!(desk.open_loans(&ada).await, 0);
    assert_eq!(
        desk.records
            .find_loan(receipt.loan_id)
            .await
            .expect("lookup"),
        None
    );
}

#[rstest]
#[tokio::test]
async fn returning_a_consumed_loan_id_fails_with_not_found(desk: Desk) {
    desk.student("S100").await;
    let receipt = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect("borrow succeeds");
    desk.engine
        .return_book(receipt.loan_id)
        .await
        .expect("first return succeeds");

    let err = desk
        .engine
        .return_book(receipt.loan_id)
        .await
        .expect_err("second return rejected");
    assert_eq!(err, Error::LoanNotFound { id: receipt.loan_id });
    // The flag must not be flipped again or otherwise disturbed.
    assert_eq!(desk.available("Clean Code").await, Some(true));
}

#[rstest]
#[tokio::test]
async fn returning_an_unknown_loan_id_fails_with_not_found(desk: Desk) {
    let id = LoanId::new();
    let err = desk
        .engine
        .return_book(id)
        .await
        .expect_err("unknown loan rejected");
    assert_eq!(err, Error::LoanNotFound { id });
}

#[rstest]
#[tokio::test]
async fn failed_availability_write_compensates_the_borrow(desk: Desk) {
    let ada = desk.student("S100").await;
    desk.availability.fail_next_sets(1);

    let err = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect_err("phase 2 failure surfaces");

    assert!(matches!(err, Error::StoreIo { .. }), "got {err:?}");
    // Net effect is "no mutation occurred".
    assert_eq!(desk.open_loans(&ada).await, 0);
    assert_eq!(desk.available("Clean Code").await, Some(true));
}

#[rstest]
#[tokio::test]
async fn a_stalled_availability_write_times_out_and_compensates(desk: Desk) {
    let ada = desk.student("S100").await;
    desk.availability.stall_next_sets(1);
    let engine = LendingService::with_store_timeout(
        Arc::clone(&desk.records),
        Arc::clone(&desk.availability),
        std::time::Duration::from_millis(50),
    );

    let err = engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect_err("elapsed timeout surfaces as a store failure");

    assert!(matches!(err, Error::StoreIo { .. }), "got {err:?}");
    // The timed-out write counts as a failed phase 2, so the tentative
    // loan is compensated away and the flag is untouched.
    assert_eq!(desk.open_loans(&ada).await, 0);
    assert_eq!(desk.available("Clean Code").await, Some(true));
}

#[rstest]
#[tokio::test]
async fn failed_borrow_compensation_reports_inconsistent_state(desk: Desk) {
    let ada = desk.student("S100").await;
    desk.availability.fail_next_sets(1);
    desk.records.fail_next_deletes(1);

    let err = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect_err("compensation failure surfaces");

    assert!(
        matches!(err, Error::InconsistentState { .. }),
        "must not be reported as a plain store failure: {err:?}"
    );
    // The orphaned loan is exactly the inconsistency being reported.
    assert_eq!(desk.open_loans(&ada).await, 1);
    assert_eq!(desk.available("Clean Code").await, Some(true));
}

#[rstest]
#[tokio::test]
async fn failed_availability_write_compensates_the_return(desk: Desk) {
    let ada = desk.student("S100").await;
    let receipt = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect("borrow succeeds");

    desk.availability.fail_next_sets(1);
    let err = desk
        .engine
        .return_book(receipt.loan_id)
        .await
        .expect_err("phase 2 failure surfaces");

    assert!(matches!(err, Error::StoreIo { .. }), "got {err:?}");
    // The loan was re-inserted unchanged, id included.
    let restored = desk
        .records
        .find_loan(receipt.loan_id)
        .await
        .expect("lookup")
        .expect("loan restored");
    assert_eq!(restored.student_id, ada.id);
    assert_eq!(desk.available("Clean Code").await, Some(false));
}

#[rstest]
#[tokio::test]
async fn failed_return_compensation_reports_inconsistent_state(desk: Desk) {
    desk.student("S100").await;
    let receipt = desk
        .engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect("borrow succeeds");

    desk.availability.fail_next_sets(1);
    desk.records.fail_next_inserts(1);
    let err = desk
        .engine
        .return_book(receipt.loan_id)
        .await
        .expect_err("compensation failure surfaces");

    assert!(matches!(err, Error::InconsistentState { .. }), "got {err:?}");
}

#[rstest]
#[tokio::test]
async fn concurrent_borrows_of_the_last_copy_admit_exactly_one_winner(desk: Desk) {
    desk.student("S100").await;
    desk.student("S200").await;

    let (first, second) = tokio::join!(
        desk.engine.borrow_book(desk.borrow("S100", "Clean Code", 1)),
        desk.engine.borrow_book(desk.borrow("S200", "Clean Code", 1)),
    );

    let outcomes = [first, second];
    let successes = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(successes, 1, "exactly one borrow may win: {outcomes:?}");
    let unavailable = outcomes
        .iter()
        .filter(|outcome| {
            matches!(outcome, Err(Error::BookUnavailable { title }) if title == "Clean Code")
        })
        .count();
    assert_eq!(unavailable, 1, "the loser sees Unavailable: {outcomes:?}");
    assert_eq!(desk.available("Clean Code").await, Some(false));
}

#[rstest]
#[tokio::test]
async fn concurrent_borrows_cannot_push_a_student_past_the_limit(desk: Desk) {
    let ada = desk.student("S100").await;
    for (day, title) in [(1, "Clean Code"), (2, "Refactoring")] {
        desk.engine
            .borrow_book(desk.borrow("S100", title, day))
            .await
            .expect("borrow succeeds");
    }

    // Two concurrent borrows while holding two loans: only one slot is left.
    let (first, second) = tokio::join!(
        desk.engine
            .borrow_book(desk.borrow("S100", "Design Patterns", 3)),
        desk.engine
            .borrow_book(desk.borrow("S100", "The Pragmatic Programmer", 3)),
    );

    let successes = [&first, &second]
        .iter()
        .filter(|outcome| outcome.is_ok())
        .count();
    assert_eq!(successes, 1, "got {first:?} and {second:?}");
    assert_eq!(desk.open_loans(&ada).await, MAX_LOANS);
}

#[rstest]
#[tokio::test]
async fn query_service_reflects_engine_state(desk: Desk) {
    let ada = desk.student("S100").await;
    desk.engine
        .borrow_book(desk.borrow("S100", "Clean Code", 1))
        .await
        .expect("borrow succeeds");

    let queries = QueryService::new(Arc::clone(&desk.records), Arc::clone(&desk.availability));
    let records = queries.open_loans().await.expect("open loans");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student.id, ada.id);
    assert_eq!(records[0].loan.book_title.as_str(), "Clean Code");

    let books = queries.available_books().await.expect("available books");
    assert!(!books.contains(&"Clean Code".to_owned()));
    assert!(books.contains(&"Refactoring".to_owned()));
}
