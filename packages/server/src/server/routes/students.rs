//! CRUD handlers for `/estudiantes`.
//!
//! Each handler holds a single pooled connection for its whole lifetime.
//! Writes run inside one transaction that is committed before responding.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use sqlx::Connection;

use crate::common::ApiError;
use crate::domains::students::{Student, StudentInput};
use crate::server::app::AppState;

/// Numeric `:id` path segment.
///
/// Anything that is not a non-negative integer is treated as an unknown route.
#[derive(Debug, Clone, Copy)]
pub struct StudentId(pub u64);

#[async_trait]
impl<S> FromRequestParts<S> for StudentId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<u64>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| StudentId(id))
            .map_err(|_| ApiError::RouteNotFound)
    }
}

/// Parse a request body as JSON, ignoring the declared content type.
fn parse_body(body: &Bytes) -> Option<Value> {
    serde_json::from_slice(body).ok()
}

/// Falsy JSON values count as an absent body.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// GET /estudiantes
pub async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>, ApiError> {
    let mut conn = state
        .db
        .acquire_connection()
        .await
        .ok_or(ApiError::NoDbConnection)?;

    let students = Student::find_all(&mut conn).await?;
    tracing::debug!(count = students.len(), "Listed students");

    Ok(Json(students))
}

/// GET /estudiantes/:id
pub async fn get_student(
    State(state): State<AppState>,
    StudentId(id): StudentId,
) -> Result<Json<Student>, ApiError> {
    let mut conn = state
        .db
        .acquire_connection()
        .await
        .ok_or(ApiError::NoDbConnection)?;

    Student::find_by_id(id, &mut conn)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound)
}

/// POST /estudiantes
///
/// Only the presence of `carnet` is checked up front; the remaining fields
/// are required when the insert parameters are built.
pub async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let body = parse_body(&body)
        .filter(|body| body.get("carnet").is_some())
        .ok_or(ApiError::IncompleteData)?;

    let mut conn = state
        .db
        .acquire_connection()
        .await
        .ok_or(ApiError::NoDbConnection)?;

    let input = StudentInput::from_json(&body)?;

    let mut tx = conn.begin().await?;
    let id = Student::create(&input, &mut tx).await?;
    tx.commit().await?;

    tracing::info!(student_id = id, "Student created");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "mensaje": "Estudiante agregado", "id": id })),
    ))
}

/// PUT /estudiantes/:id
///
/// Full replacement: all four fields are written from the body.
pub async fn update_student(
    State(state): State<AppState>,
    StudentId(id): StudentId,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let body = parse_body(&body)
        .filter(is_present)
        .ok_or(ApiError::IncompleteData)?;

    let mut conn = state
        .db
        .acquire_connection()
        .await
        .ok_or(ApiError::NoDbConnection)?;

    let mut tx = conn.begin().await?;
    if !Student::exists(id, &mut tx).await? {
        return Err(ApiError::NotFound);
    }

    let input = StudentInput::from_json(&body)?;
    Student::update(id, &input, &mut tx).await?;
    tx.commit().await?;

    tracing::info!(student_id = id, "Student updated");

    Ok(Json(json!({ "mensaje": "Estudiante actualizado correctamente" })))
}

/// DELETE /estudiantes/:id
pub async fn delete_student(
    State(state): State<AppState>,
    StudentId(id): StudentId,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state
        .db
        .acquire_connection()
        .await
        .ok_or(ApiError::NoDbConnection)?;

    let mut tx = conn.begin().await?;
    if !Student::exists(id, &mut tx).await? {
        return Err(ApiError::NotFound);
    }

    Student::delete(id, &mut tx).await?;
    tx.commit().await?;

    tracing::info!(student_id = id, "Student deleted");

    Ok(Json(json!({ "mensaje": "Estudiante eliminado correctamente" })))
}
