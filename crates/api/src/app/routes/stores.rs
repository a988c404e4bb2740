use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use stockroom_inventory::NewStore;

use crate::app::errors;
use crate::app::routes::common::acting_store;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_store))
        .route("/me", get(get_store).delete(delete_store))
}

pub async fn create_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewStore>,
) -> axum::response::Response {
    match services.inventory.create_store(user.user_id(), body).await {
        Ok(store) => (StatusCode::CREATED, Json(store)).into_response(),
        Err(e) => errors::create_error_to_response(e),
    }
}

pub async fn get_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    match acting_store(&services, user).await {
        Ok(store) => (StatusCode::OK, Json(store)).into_response(),
        Err(res) => res,
    }
}

pub async fn delete_store(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.delete_store(store.id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}
