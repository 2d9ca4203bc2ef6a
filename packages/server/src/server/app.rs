//! Application setup and server configuration.

use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::kernel::Database;
use crate::server::routes::{
    create_student, delete_student, get_student, index_handler, list_students, route_not_found,
    update_student,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
}

/// Build the Axum application router
pub fn build_app(db: Database) -> Router {
    let state = AppState { db };

    // CORS configuration - any origin may call the API
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/estudiantes", get(list_students).post(create_student))
        .route(
            "/estudiantes/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .fallback(route_not_found)
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
