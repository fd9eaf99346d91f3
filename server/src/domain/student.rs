//! Student identity types.
//!
//! Students are created at import time and never mutated or deleted by the
//! lending engine; the only mutable state attached to a student is the set
//! of open loans held in the record store.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Opaque student identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentId(Uuid);

impl StudentId {
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

impl Default for StudentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StudentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique, immutable code identifying a student to callers (e.g. `"S100"`).
///
/// # Examples
/// ```
/// use circulation::domain::StudentCode;
///
/// let code = StudentCode::new("S100").expect("valid code");
/// assert_eq!(code.as_str(), "S100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StudentCode(String);

impl StudentCode {
    /// Construct a code after validating it is non-blank; surrounding
    /// whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, StudentCodeValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(StudentCodeValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for StudentCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for StudentCode {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`StudentCode`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StudentCodeValidationError {
    /// Code is empty after trimming whitespace.
    #[error("student code must not be empty")]
    Empty,
}

/// A registered student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Opaque identifier; loans reference students by this id.
    pub id: StudentId,
    /// Display name.
    pub name: String,
    /// Department the student belongs to.
    pub department: String,
    /// Unique caller-facing code.
    pub code: StudentCode,
}

impl Student {
    /// Construct a student with a freshly minted identifier.
    #[must_use]
    pub fn new(name: impl Into<String>, department: impl Into<String>, code: StudentCode) -> Self {
        Self {
            id: StudentId::new(),
            name: name.into(),
            department: department.into(),
            code,
        }
    }
}
