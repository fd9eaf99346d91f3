//! Domain ports defining the edges of the hexagon.
//!
//! Driven ports describe how the lending engine expects to reach its two
//! independently persisted stores; driving ports describe what inbound
//! adapters may ask of the domain. Each trait exposes strongly typed errors
//! so adapters map their failures into predictable variants.
//!
//! The two stores share no transaction primitive. Each store must only
//! guarantee that its own operations are atomic with respect to each other;
//! cross-store consistency is the engine's job (see [`super::lending`]).

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::book::BookTitle;
use super::error::Error;
use super::loan::{Loan, LoanId};
use super::student::{Student, StudentCode, StudentId};

/// Failures surfaced by [`RecordStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordStoreError {
    /// Store connection could not be established or was lost.
    #[error("record store connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("record store query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl RecordStoreError {
    /// Helper for connection oriented failures.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Helper for query failures.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Failures surfaced by [`AvailabilityStore`] adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AvailabilityStoreError {
    /// Reading or writing the backing store failed.
    #[error("availability store I/O failed: {message}")]
    Io {
        /// Adapter-level failure description.
        message: String,
    },
    /// The backing data could not be parsed.
    #[error("availability store data is corrupt: {message}")]
    Corrupt {
        /// Adapter-level failure description.
        message: String,
    },
    /// An update targeted a title the store does not know.
    #[error("availability store has no entry for \"{title}\"")]
    UnknownTitle {
        /// The title the update targeted.
        title: String,
    },
}

impl AvailabilityStoreError {
    /// Helper for I/O failures.
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Helper for unparseable backing data.
    pub fn corrupt(message: impl Into<String>) -> Self {
        Self::Corrupt {
            message: message.into(),
        }
    }

    /// Helper for updates against unknown titles.
    pub fn unknown_title(title: impl Into<String>) -> Self {
        Self::UnknownTitle {
            title: title.into(),
        }
    }
}

/// Driven port over the store of students and open loans.
///
/// Authoritative for "who currently holds what". Implementations must make
/// the loan operations for a given student atomic with respect to each
/// other; the engine's per-student lock relies on reads and writes not
/// interleaving below this interface.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Look up a student by their unique code.
    async fn find_student_by_code(
        &self,
        code: &StudentCode,
    ) -> Result<Option<Student>, RecordStoreError>;

    /// All registered students.
    async fn list_students(&self) -> Result<Vec<Student>, RecordStoreError>;

    /// Register a student. Fails if the code is already taken.
    async fn insert_student(&self, student: Student) -> Result<(), RecordStoreError>;

    /// Number of registered students.
    async fn student_count(&self) -> Result<usize, RecordStoreError>;

    /// Number of open loans held by the student.
    async fn count_open_loans(&self, student: StudentId) -> Result<usize, RecordStoreError>;

    /// Persist a loan. The loan carries its identifier so a compensating
    /// re-insert restores the exact pre-transaction record.
    async fn insert_loan(&self, loan: Loan) -> Result<(), RecordStoreError>;

    /// Delete a loan, returning the removed record when it existed.
    async fn delete_loan(&self, id: LoanId) -> Result<Option<Loan>, RecordStoreError>;

    /// Look up a loan by identifier.
    async fn find_loan(&self, id: LoanId) -> Result<Option<Loan>, RecordStoreError>;

    /// All open loans.
    async fn list_loans(&self) -> Result<Vec<Loan>, RecordStoreError>;
}

/// Driven port over the per-title availability flags.
///
/// Authoritative for "is a copy free". Title lookups are case-insensitive.
/// Implementations must make read-then-write on a single title atomic; the
/// engine's per-title lock relies on it.
#[async_trait]
pub trait AvailabilityStore: Send + Sync {
    /// Availability flag for a title, or `None` when the title is unknown.
    async fn availability(&self, title: &BookTitle)
        -> Result<Option<bool>, AvailabilityStoreError>;

    /// Set the availability flag for an existing title.
    async fn set_availability(
        &self,
        title: &BookTitle,
        available: bool,
    ) -> Result<(), AvailabilityStoreError>;

    /// Titles currently flagged available, in store order with their
    /// original casing.
    async fn available_titles(&self) -> Result<Vec<String>, AvailabilityStoreError>;
}

/// Typed request to borrow a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowRequest {
    /// Code of the borrowing student.
    pub student_code: StudentCode,
    /// Title being borrowed.
    pub book_title: BookTitle,
    /// Date the borrow takes effect.
    pub borrow_date: NaiveDate,
}

/// Result of a successful borrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowReceipt {
    /// Identifier callers use to return the book.
    pub loan_id: LoanId,
}

/// Driving port for the two state-changing lending operations.
#[async_trait]
pub trait LendingCommand: Send + Sync {
    /// Borrow a book for a student.
    async fn borrow_book(&self, request: BorrowRequest) -> Result<BorrowReceipt, Error>;

    /// Return a borrowed book by its loan identifier.
    async fn return_book(&self, loan_id: LoanId) -> Result<(), Error>;
}

/// An open loan joined with the borrowing student, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    /// The open loan.
    pub loan: Loan,
    /// The student holding it.
    pub student: Student,
}

/// Driving port for the read-only presentation queries.
#[async_trait]
pub trait CirculationQuery: Send + Sync {
    /// All registered students.
    async fn list_students(&self) -> Result<Vec<Student>, Error>;

    /// All open loans joined with their students.
    async fn open_loans(&self) -> Result<Vec<LoanRecord>, Error>;

    /// Titles currently available to borrow.
    async fn available_books(&self) -> Result<Vec<String>, Error>;
}
