//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend
//! only on the domain's driving ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CirculationQuery, LendingCommand};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// State-changing lending operations.
    pub lending: Arc<dyn LendingCommand>,
    /// Read-only presentation queries.
    pub queries: Arc<dyn CirculationQuery>,
}

impl HttpState {
    /// Bundle the driving ports for handler injection.
    #[must_use]
    pub fn new(lending: Arc<dyn LendingCommand>, queries: Arc<dyn CirculationQuery>) -> Self {
        Self { lending, queries }
    }
}
