//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: job wiring over the entity store
//! - `routes/`: HTTP routes + handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use boardkeep_infra::{AppConfig, EntityStore};

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &AppConfig, store: Arc<dyn EntityStore>) -> Router {
    let jwt = Arc::new(boardkeep_auth::Hs256JwtValidator::new(
        config.jwt_secret.clone().into_bytes(),
    ));
    let auth_state = middleware::AuthState { jwt };

    let services = Arc::new(services::build_services(config, store));

    // Function routes: caller identity is optional and only consulted by the
    // handlers that care.
    let functions = routes::router()
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::optional_auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(functions)
}
