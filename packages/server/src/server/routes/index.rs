use axum::Json;
use serde::Serialize;

use crate::common::ApiError;

#[derive(Serialize)]
pub struct IndexResponse {
    mensaje: &'static str,
}

/// GET / (no database access)
pub async fn index_handler() -> Json<IndexResponse> {
    Json(IndexResponse {
        mensaje: "API de Estudiantes funcionando correctamente",
    })
}

/// Fallback for paths that match no route.
pub async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}
