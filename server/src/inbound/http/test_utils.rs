//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App};

use crate::domain::{LendingService, QueryService, Student, StudentCode};
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{InMemoryAvailabilityStore, InMemoryRecordStore};

/// Backing stores kept alongside the state so tests can inspect them.
pub struct TestStores {
    pub records: Arc<InMemoryRecordStore>,
    pub availability: Arc<InMemoryAvailabilityStore>,
}

/// Build an [`HttpState`] over in-memory stores seeded with two students
/// and a small catalogue.
pub async fn seeded_state() -> (HttpState, TestStores) {
    use crate::domain::ports::RecordStore;

    let records = Arc::new(InMemoryRecordStore::new());
    let availability = Arc::new(InMemoryAvailabilityStore::with_titles([
        ("Clean Code", true),
        ("Refactoring", true),
        ("Design Patterns", true),
        ("The Pragmatic Programmer", true),
        ("Working Effectively with Legacy Code", false),
    ]));

    for (name, department, code) in [("Ada Lovelace", "CS", "S100"), ("Grace Hopper", "CS", "S200")]
    {
        records
            .insert_student(Student::new(
                name,
                department,
                StudentCode::new(code).expect("valid code"),
            ))
            .await
            .expect("seed student");
    }

    let state = HttpState::new(
        Arc::new(LendingService::new(
            Arc::clone(&records),
            Arc::clone(&availability),
        )),
        Arc::new(QueryService::new(
            Arc::clone(&records),
            Arc::clone(&availability),
        )),
    );
    (
        state,
        TestStores {
            records,
            availability,
        },
    )
}

/// Build a test app exposing every circulation route.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .service(crate::inbound::http::borrow::submit_borrow)
        .service(crate::inbound::http::borrow::borrow_form_data)
        .service(crate::inbound::http::records::list_records)
        .service(crate::inbound::http::records::return_book)
        .service(crate::inbound::http::catalogue::list_available_books)
        .service(crate::inbound::http::catalogue::list_students)
}
