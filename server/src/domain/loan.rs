//! Loan aggregate.
//!
//! A [`Loan`] records one student currently holding one book title. It is
//! created by a borrow transaction and deleted again by the matching return;
//! there is no retained history.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::book::BookTitle;
use super::student::StudentId;

/// Opaque loan identifier, minted by the lending engine before the first
/// store write so a compensated re-insert reproduces the identical record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(Uuid);

impl LoanId {
    /// Mint a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for LoanId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LoanId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// An open borrowing: one student holding one book title since a date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    /// Identifier used by callers to return the book.
    pub id: LoanId,
    /// The borrowing student; references an existing [`super::Student`].
    pub student_id: StudentId,
    /// The borrowed title.
    pub book_title: BookTitle,
    /// Date the book was borrowed.
    pub borrow_date: NaiveDate,
}

impl Loan {
    /// Construct a loan with a freshly minted identifier.
    #[must_use]
    pub fn new(student_id: StudentId, book_title: BookTitle, borrow_date: NaiveDate) -> Self {
        Self {
            id: LoanId::new(),
            student_id,
            book_title,
            borrow_date,
        }
    }
}
