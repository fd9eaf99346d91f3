//! Domain-level error type for circulation operations.
//!
//! Transport agnostic: the HTTP adapter maps each variant to a status code
//! and a JSON body carrying the stable [`ErrorCode`]. A distinction matters
//! operationally between [`Error::StoreIo`] (the transaction was rolled back,
//! retrying is safe) and [`Error::InconsistentState`] (a compensating step
//! failed and the two stores now disagree; an operator must reconcile).

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::loan::LoanId;

/// Stable machine-readable code identifying the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails field validation.
    InvalidRequest,
    /// A referenced student, book, or loan does not exist.
    NotFound,
    /// The book exists but no copy is free to borrow.
    Unavailable,
    /// The student already holds the maximum number of open loans.
    LimitExceeded,
    /// A store call failed or timed out; the transaction was rolled back.
    StoreUnavailable,
    /// A compensating action failed after a partial commit; the stores
    /// disagree and need reconciliation.
    InconsistentState,
}

/// Failures surfaced by lending operations.
///
/// # Examples
/// ```
/// use circulation::domain::{Error, ErrorCode};
///
/// let err = Error::StudentNotFound { code: "S100".to_owned() };
/// assert_eq!(err.code(), ErrorCode::NotFound);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// No student is registered under the given code.
    #[error("student {code} not found")]
    StudentNotFound {
        /// The student code supplied by the caller.
        code: String,
    },
    /// The title is not present in the availability store.
    #[error("book \"{title}\" is not in the catalogue")]
    BookNotFound {
        /// The requested book title.
        title: String,
    },
    /// No open loan exists under the given identifier.
    #[error("loan {id} not found")]
    LoanNotFound {
        /// The loan identifier supplied by the caller.
        id: LoanId,
    },
    /// The title exists but its copy is already on loan.
    #[error("book \"{title}\" is not available for borrowing")]
    BookUnavailable {
        /// The requested book title.
        title: String,
    },
    /// The student already holds `limit` open loans.
    #[error("student {code} has reached the borrow limit of {limit} books")]
    BorrowLimitExceeded {
        /// The student code supplied by the caller.
        code: String,
        /// The configured maximum number of concurrent loans.
        limit: usize,
    },
    /// A store call failed or timed out. Any partial write has been
    /// compensated, so the caller observes no state change.
    #[error("{context} failed: {message}")]
    StoreIo {
        /// Which store call failed.
        context: &'static str,
        /// Underlying store error text.
        message: String,
    },
    /// A compensating action failed after a partial commit. The record
    /// store and the availability store now disagree.
    #[error("stores left inconsistent: {message}")]
    InconsistentState {
        /// Description of the disagreement for the operator.
        message: String,
    },
    /// Caller-supplied input failed validation before any store access.
    #[error("{message}")]
    InvalidRequest {
        /// Human-readable description of the validation failure.
        message: String,
    },
}

impl Error {
    /// Stable code identifying the failure category.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::StudentNotFound { .. } | Self::BookNotFound { .. } | Self::LoanNotFound { .. } => {
                ErrorCode::NotFound
            }
            Self::BookUnavailable { .. } => ErrorCode::Unavailable,
            Self::BorrowLimitExceeded { .. } => ErrorCode::LimitExceeded,
            Self::StoreIo { .. } => ErrorCode::StoreUnavailable,
            Self::InconsistentState { .. } => ErrorCode::InconsistentState,
            Self::InvalidRequest { .. } => ErrorCode::InvalidRequest,
        }
    }

    /// Helper for failed or timed-out store calls.
    pub fn store_io(context: &'static str, message: impl Into<String>) -> Self {
        Self::StoreIo {
            context,
            message: message.into(),
        }
    }

    /// Helper for failed compensations.
    pub fn inconsistent(message: impl Into<String>) -> Self {
        Self::InconsistentState {
            message: message.into(),
        }
    }

    /// Helper for input validation failures.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }
}
