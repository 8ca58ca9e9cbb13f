use axum::Router;

pub mod jobsheets;
pub mod system;

/// Router for all jobsheet endpoints.
pub fn router() -> Router {
    Router::new().nest("/jobsheets", jobsheets::router())
}
