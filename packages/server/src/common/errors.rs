use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Request-level failures of the student API.
///
/// Every variant renders as a JSON body; server-side failures carry an
/// `error` key, informational client outcomes a `mensaje` key.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("No hay conexión a la base de datos")]
    NoDbConnection,

    #[error("{0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    InvalidParameters(String),

    #[error("Datos incompletos")]
    IncompleteData,

    #[error("Estudiante no encontrado")]
    NotFound,

    #[error("Ruta no encontrada")]
    RouteNotFound,
}

impl ApiError {
    /// Taxonomy name of the failure.
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NoDbConnection => "no_db_connection",
            ApiError::Database(_) | ApiError::InvalidParameters(_) => "query_error",
            ApiError::IncompleteData => "incomplete_data",
            ApiError::NotFound => "not_found",
            ApiError::RouteNotFound => "route_not_found",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NoDbConnection | ApiError::Database(_) | ApiError::InvalidParameters(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::IncompleteData => StatusCode::BAD_REQUEST,
            ApiError::NotFound | ApiError::RouteNotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        let body = match &self {
            ApiError::IncompleteData | ApiError::NotFound => json!({ "mensaje": &message }),
            _ => json!({ "error": &message }),
        };

        if status.is_server_error() {
            tracing::error!(kind = self.kind(), error = %message, "Request failed");
        }

        (status, Json(body)).into_response()
    }
}
