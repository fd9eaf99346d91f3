//! Library circulation backend.
//!
//! The crate is organised hexagonally: `domain` holds the lending engine and
//! the port traits it drives, `outbound` holds the store adapters behind
//! those ports, and `inbound` holds the HTTP surface. `server` wires the
//! layers into a running Actix application.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod seed;
pub mod server;

/// Public OpenAPI surface used by tooling.
pub use doc::ApiDoc;
pub use middleware::RequestTrace;
