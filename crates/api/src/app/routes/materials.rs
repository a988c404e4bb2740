use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;

use stockroom_core::MaterialId;
use stockroom_inventory::{MaterialUpdate, NewMaterial};

use crate::app::routes::common::acting_store;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_materials).post(create_material))
        .route("/restock", get(restock_summary).post(restock))
        .route("/inventory", get(inventory))
        .route(
            "/:id",
            get(get_material).put(update_material).delete(delete_material),
        )
}

pub async fn create_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewMaterial>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.create_material(store.id, body).await {
        Ok(m) => (StatusCode::CREATED, Json(dto::material_to_json(&m))).into_response(),
        Err(e) => errors::create_error_to_response(e),
    }
}

pub async fn list_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.list_materials(store.id).await {
        Ok(items) => {
            let items: Vec<serde_json::Value> = items.iter().map(dto::material_to_json).collect();
            (StatusCode::OK, Json(json!(items))).into_response()
        }
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn get_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialId>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.get_material(store.id, id).await {
        Ok(m) => (StatusCode::OK, Json(dto::material_to_json(&m))).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn update_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialId>,
    Json(body): Json<MaterialUpdate>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.update_material(store.id, id, body).await {
        Ok(m) => (StatusCode::OK, Json(dto::material_to_json(&m))).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn delete_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialId>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.delete_material(store.id, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn restock_summary(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.restock_summary(store.id).await {
        Ok(summary) => (StatusCode::OK, Json(dto::restock_summary_to_json(summary))).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn restock(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::RestockRequest>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.restock(store.id, body.materials).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "message": "Restock successfully" }))).into_response(),
        Err(e) => errors::batch_error_to_response(e),
    }
}

pub async fn inventory(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.inventory(store.id).await {
        Ok(levels) => (StatusCode::OK, Json(dto::inventory_to_json(levels))).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}
