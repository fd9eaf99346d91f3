//! Catalogue API handlers.
//!
//! ```text
//! GET /api/books     Titles currently available to borrow
//! GET /api/students  Registered students
//! ```

use actix_web::{get, web};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::Student;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// One student as presented to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StudentBody {
    /// Opaque student identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Department the student belongs to.
    pub department: String,
    /// Unique caller-facing code.
    pub code: String,
}

impl From<Student> for StudentBody {
    fn from(student: Student) -> Self {
        Self {
            id: student.id.as_uuid(),
            name: student.name,
            department: student.department,
            code: student.code.to_string(),
        }
    }
}

/// Response payload listing registered students.
#[derive(Debug, Serialize, ToSchema)]
pub struct StudentsBody {
    /// Registered students.
    pub students: Vec<StudentBody>,
}

/// Response payload listing available titles.
#[derive(Debug, Serialize, ToSchema)]
pub struct BooksBody {
    /// Titles currently available to borrow.
    pub books: Vec<String>,
}

/// List titles currently flagged available.
#[utoipa::path(
    get,
    path = "/api/books",
    responses(
        (status = 200, description = "Available titles", body = BooksBody),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["catalogue"]
)]
#[get("/api/books")]
pub async fn list_available_books(state: web::Data<HttpState>) -> ApiResult<web::Json<BooksBody>> {
    let books = state.queries.available_books().await?;
    Ok(web::Json(BooksBody { books }))
}

/// List registered students.
#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Registered students", body = StudentsBody),
        (status = 503, description = "Store unavailable", body = crate::inbound::http::error::ErrorBody)
    ),
    tags = ["catalogue"]
)]
#[get("/api/students")]
pub async fn list_students(state: web::Data<HttpState>) -> ApiResult<web::Json<StudentsBody>> {
    let students = state.queries.list_students().await?;
    Ok(web::Json(StudentsBody {
        students: students.into_iter().map(StudentBody::from).collect(),
    }))
}
