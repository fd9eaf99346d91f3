//! HTTP inbound adapter exposing the circulation endpoints.

pub mod borrow;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod records;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
