//! Book title key type.
//!
//! The availability store keys entries by title with case-insensitive
//! matching (the source data is a hand-maintained file, so `"Clean Code"`
//! and `"clean code"` must resolve to the same entry). [`BookTitle`]
//! preserves the caller's casing for display while exposing a normalised
//! key for lookups and locking.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A book title, keyed case-insensitively.
///
/// # Examples
/// ```
/// use circulation::domain::BookTitle;
///
/// let title = BookTitle::new("Clean Code").expect("valid title");
/// let other = BookTitle::new("CLEAN CODE").expect("valid title");
/// assert_eq!(title.key(), other.key());
/// assert_eq!(title.as_str(), "Clean Code");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookTitle(String);

impl BookTitle {
    /// Construct a title after validating it is non-blank; surrounding
    /// whitespace is trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, BookTitleValidationError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BookTitleValidationError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the title as entered by the caller.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Normalised lookup key (lowercased).
    #[must_use]
    pub fn key(&self) -> String {
        self.0.to_lowercase()
    }

    /// Whether `candidate` names the same title under the normalised key.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        candidate.trim().to_lowercase() == self.key()
    }
}

impl fmt::Display for BookTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for BookTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`BookTitle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookTitleValidationError {
    /// Title is empty after trimming whitespace.
    #[error("book title must not be empty")]
    Empty,
}
