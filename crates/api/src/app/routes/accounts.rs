use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;

use stockroom_auth::Signup;
use stockroom_core::DomainError;
use stockroom_infra::InfraError;

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<Signup>,
) -> axum::response::Response {
    match services.accounts.signup(body).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({ "messages": "Account created successfully" })),
        )
            .into_response(),
        Err(e) => errors::create_error_to_response(e),
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.accounts.login(&body.username, &body.password, Utc::now()).await {
        Ok(token) => (StatusCode::OK, Json(dto::token_to_json(token))).into_response(),
        Err(InfraError::Domain(DomainError::Unauthorized)) => errors::json_error(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "Invalid username or password",
        ),
        Err(e) => errors::infra_error_to_response(e),
    }
}
