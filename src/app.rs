use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/periods/:series", get(handlers::get_periods))
        .route("/api/countries", get(handlers::get_countries))
        .route("/api/clients", get(handlers::get_clients))
        .route("/api/failures", get(handlers::get_failures))
        .route("/api/warnings", get(handlers::get_warnings))
        .route("/api/dataset", get(handlers::get_dataset))
        .with_state(state)
}
