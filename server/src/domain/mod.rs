//! Domain types, ports, and the lending engine.
//!
//! Public surface:
//! - [`Error`] / [`ErrorCode`] — transaction failure kinds and their stable
//!   machine-readable codes.
//! - [`Student`], [`StudentCode`], [`StudentId`] — student identity.
//! - [`Loan`], [`LoanId`] — one student holding one title.
//! - [`BookTitle`] — case-insensitive title key.
//! - [`ports`] — driven store traits and driving command/query traits.
//! - [`LendingService`] — the two-phase, compensating lending engine.
//! - [`QueryService`] — read-only presentation queries.

pub mod book;
pub mod error;
pub mod lending;
pub mod loan;
pub mod locks;
pub mod ports;
pub mod queries;
pub mod student;

pub use self::book::{BookTitle, BookTitleValidationError};
pub use self::error::{Error, ErrorCode};
pub use self::lending::{LendingService, DEFAULT_STORE_TIMEOUT, MAX_LOANS};
pub use self::loan::{Loan, LoanId};
pub use self::queries::QueryService;
pub use self::student::{Student, StudentCode, StudentCodeValidationError, StudentId};
