//! Borrow HTTP handlers.
//!
//! ```text
//! POST /borrow  Borrow a book (form submission)
//! GET  /borrow  Student roster for the selection form
//! ```

use actix_web::{get, post, web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::BorrowRequest;
use crate::domain::{BookTitle, Error, StudentCode};
use crate::inbound::http::catalogue::{StudentBody, StudentsBody};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Form fields posted by the borrow page.
#[derive(Debug, Deserialize, ToSchema)]
pub struct BorrowForm {
    /// Code of the borrowing student.
    pub student_code: String,
    /// Title being borrowed.
    pub book_name: String,
    /// Borrow date, formatted `YYYY-MM-DD`.
    pub borrow_date: String,
}

/// Response payload acknowledging a borrow.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowCreated {
    /// Identifier to pass to `POST /return_book/{id}`.
    pub loan_id: Uuid,
}

fn parse_form(form: BorrowForm) -> Result<BorrowRequest, Error> {
    let student_code = StudentCode::new(form.student_code)
        .map_err(|err| Error::invalid_request(err.to_string()))?;
    let book_title =
        BookTitle::new(form.book_name).map_err(|err| Error::invalid_request(err.to_string()))?;
    let borrow_date = NaiveDate::parse_from_str(form.borrow_date.trim(), "%Y-%m-%d")
        .map_err(|_| Error::invalid_request("borrow_date must be formatted YYYY-MM-DD"))?;
    Ok(BorrowRequest {
        student_code,
        book_title,
        borrow_date,
    })
}

/// Borrow a book for a student.
#[utoipa::path(
    post,
    path = "/borrow",
    request_body(content = BorrowForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Book borrowed", body = BorrowCreated),
        (status = 400, description = "Malformed form field", body = crate::inbound::http::error::ErrorBody),
        (status = 404, description = "Unknown student or title", body = crate::inbound::http::error::ErrorBody),
        (status = 409, description = "Title unavailable or borrow limit reached", body = crate::inbound::http::error::ErrorBody),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["lending"]
)]
#[post("/borrow")]
pub async fn submit_borrow(
    state: web::Data<HttpState>,
    form: web::Form<BorrowForm>,
) -> ApiResult<HttpResponse> {
    let request = parse_form(form.into_inner())?;
    let receipt = state.lending.borrow_book(request).await?;
    Ok(HttpResponse::Created().json(BorrowCreated {
        loan_id: receipt.loan_id.as_uuid(),
    }))
}

/// Student roster backing the borrow selection form.
#[utoipa::path(
    get,
    path = "/borrow",
    responses(
        (status = 200, description = "Registered students", body = StudentsBody),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["lending"]
)]
#[get("/borrow")]
pub async fn borrow_form_data(state: web::Data<HttpState>) -> ApiResult<web::Json<StudentsBody>> {
    let students = state.queries.list_students().await?;
    Ok(web::Json(StudentsBody {
        students: students.into_iter().map(StudentBody::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test as actix_test};
    use serde_json::Value;

    use crate::inbound::http::test_utils::{seeded_state, test_app};

    fn borrow_form(code: &str, title: &str, date: &str) -> Vec<(String, String)> {
        vec![
            ("student_code".to_owned(), code.to_owned()),
            ("book_name".to_owned(), title.to_owned()),
            ("borrow_date".to_owned(), date.to_owned()),
        ]
    }

    #[actix_web::test]
    async fn borrowing_an_available_title_returns_created() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form("S100", "Clean Code", "2024-01-01"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let body: Value = actix_test::read_body_json(response).await;
        assert!(body.get("loanId").and_then(Value::as_str).is_some());
    }

    #[actix_web::test]
    async fn borrowing_with_an_unknown_student_is_404() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form("S404", "Clean Code", "2024-01-01"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("code").and_then(Value::as_str), Some("not_found"));
    }

    #[actix_web::test]
    async fn borrowing_an_unavailable_title_is_409() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form(
                "S100",
                "Working Effectively with Legacy Code",
                "2024-01-01",
            ))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body.get("code").and_then(Value::as_str), Some("unavailable"));
    }

    #[actix_web::test]
    async fn borrowing_the_same_copy_twice_is_409() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        let first = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form("S100", "Clean Code", "2024-01-01"))
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, first).await.status(),
            StatusCode::CREATED
        );

        let second = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form("S200", "Clean Code", "2024-01-02"))
            .to_request();
        assert_eq!(
            actix_test::call_service(&app, second).await.status(),
            StatusCode::CONFLICT
        );
    }

    #[actix_web::test]
    async fn a_malformed_date_is_400() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form("S100", "Clean Code", "01/01/2024"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn the_fourth_borrow_is_rejected_with_limit_exceeded() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        for (title, date) in [
            ("Clean Code", "2024-01-01"),
            ("Refactoring", "2024-01-02"),
            ("Design Patterns", "2024-01-03"),
        ] {
            let request = actix_test::TestRequest::post()
                .uri("/borrow")
                .set_form(borrow_form("S100", title, date))
                .to_request();
            assert_eq!(
                actix_test::call_service(&app, request).await.status(),
                StatusCode::CREATED
            );
        }

        let request = actix_test::TestRequest::post()
            .uri("/borrow")
            .set_form(borrow_form("S100", "The Pragmatic Programmer", "2024-01-04"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("code").and_then(Value::as_str),
            Some("limit_exceeded")
        );
    }

    #[actix_web::test]
    async fn get_borrow_returns_the_student_roster() {
        let (state, _stores) = seeded_state().await;
        let app = actix_test::init_service(test_app(state)).await;

        let request = actix_test::TestRequest::get().uri("/borrow").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(
            body.get("students")
                .and_then(Value::as_array)
                .map(Vec::len),
            Some(2)
        );
    }
}
