use axum::Router;

pub mod functions;
pub mod system;

/// Router for the function endpoints (auth optional).
pub fn router() -> Router {
    Router::new().nest("/functions", functions::router())
}
