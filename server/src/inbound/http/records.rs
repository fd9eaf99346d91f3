//! Loan record HTTP handlers.
//!
//! ```text
//! GET  /records           Open loans joined with student info
//! POST /return_book/{id}  Return a borrowed book
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::LoanRecord;
use crate::inbound::http::catalogue::StudentBody;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// One open loan joined with its student, as presented to clients.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordBody {
    /// Identifier to pass to `POST /return_book/{id}`.
    pub loan_id: Uuid,
    /// Borrowed title.
    pub book_title: String,
    /// Date the book was borrowed.
    pub borrow_date: NaiveDate,
    /// The borrowing student.
    pub student: StudentBody,
}

impl From<LoanRecord> for RecordBody {
    fn from(record: LoanRecord) -> Self {
        Self {
            loan_id: record.loan.id.as_uuid(),
            book_title: record.loan.book_title.to_string(),
            borrow_date: record.loan.borrow_date,
            student: StudentBody::from(record.student),
        }
    }
}

/// Response payload listing open loans.
#[derive(Debug, Serialize, ToSchema)]
pub struct RecordsBody {
    /// Open loans joined with their students.
    pub records: Vec<RecordBody>,
}

/// List open loans joined with student info.
#[utoipa::path(
    get,
    path = "/records",
    responses(
        (status = 200, description = "Open loans", body = RecordsBody),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["lending"]
)]
#[get("/records")]
pub async fn list_records(state: web::Data<HttpState>) -> ApiResult<web::Json<RecordsBody>> {
    let records = state.queries.open_loans().await?;
    Ok(web::Json(RecordsBody {
        records: records.into_iter().map(RecordBody::from).collect(),
    }))
}

/// Return a borrowed book by its loan identifier.
#[utoipa::path(
    post,
    path = "/return_book/{id}",
    params(
        ("id" = Uuid, Path, description = "Loan identifier from the borrow receipt")
    ),
    responses(
        (status = 204, description = "Book returned"),
        (status = 404, description = "Unknown or already returned loan", body = crate::inbound::http::error::ErrorBody),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["lending"]
)]
#[post("/return_book/{id}")]
pub async fn return_book(
    state: web::Data<HttpState>,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state.lending.return_book(id.into_inner().into()).await?;
    Ok(HttpResponse::NoContent().finish())
}
