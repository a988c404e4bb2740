//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage backend selection and service construction
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request bodies and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use stockroom_auth::Hs256JwtValidator;
use stockroom_infra::{AppConfig, InfraResult, InventoryRepository};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &AppConfig) -> InfraResult<Router> {
    let repo = services::build_repository(config).await?;
    Ok(build_router(repo, config))
}

/// Build the router over an already constructed repository.
pub fn build_router(repo: Arc<dyn InventoryRepository>, config: &AppConfig) -> Router {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes()));
    let auth_state = middleware::AuthState { jwt: jwt.clone() };
    let services = Arc::new(services::AppServices::new(repo, jwt, config));

    // Protected routes: require a valid bearer token.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
