//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{web, App, HttpResponse, HttpServer};
use utoipa::OpenApi;

use crate::doc::ApiDoc;
use crate::inbound::http::borrow::{borrow_form_data, submit_borrow};
use crate::inbound::http::catalogue::{list_available_books, list_students};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::records::{list_records, return_book};
use crate::inbound::http::state::HttpState;
use crate::middleware::RequestTrace;

/// Build an application exposing every circulation route.
///
/// Shared between [`create_server`] and integration tests so both exercise
/// the same routing table.
pub fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
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
        .app_data(health_state)
        .app_data(http_state)
        .wrap(RequestTrace)
        .service(submit_borrow)
        .service(borrow_form_data)
        .service(list_records)
        .service(return_book)
        .service(list_available_books)
        .service(list_students)
        .service(ready)
        .service(live)
        .route(
            "/api-docs/openapi.json",
            web::get().to(|| async { HttpResponse::Ok().json(ApiDoc::openapi()) }),
        )
}

/// Construct an Actix HTTP server using the provided state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    config: &ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_health_state.clone(), http_state.clone())
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
