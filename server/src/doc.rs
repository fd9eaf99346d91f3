//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the circulation API: lending operations, catalogue listings, and health
//! probes. The document is served from `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::inbound::http::borrow::{BorrowCreated, BorrowForm};
use crate::inbound::http::catalogue::{BooksBody, StudentBody, StudentsBody};
use crate::inbound::http::error::ErrorBody;
use crate::inbound::http::records::{RecordBody, RecordsBody};

/// OpenAPI document for the circulation API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Circulation API",
        description = "HTTP interface for borrowing and returning library books."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::borrow::submit_borrow,
        crate::inbound::http::borrow::borrow_form_data,
        crate::inbound::http::records::list_records,
        crate::inbound::http::records::return_book,
        crate::inbound::http::catalogue::list_available_books,
        crate::inbound::http::catalogue::list_students,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorBody,
        BorrowForm,
        BorrowCreated,
        StudentBody,
        StudentsBody,
        BooksBody,
        RecordBody,
        RecordsBody,
    )),
    tags(
        (name = "lending", description = "Borrowing and returning books"),
        (name = "catalogue", description = "Book and student listings"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
