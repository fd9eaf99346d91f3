//! HTTP middleware.

mod trace;

pub use trace::{RequestTrace, REQUEST_ID_HEADER};
