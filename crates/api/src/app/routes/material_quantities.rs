use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use stockroom_core::MaterialQuantityId;
use stockroom_products::{MaterialQuantityPatch, NewMaterialQuantity};

use crate::app::errors;
use crate::app::routes::common::acting_store;
use crate::app::services::AppServices;
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_material_quantities).post(create_material_quantity))
        .route(
            "/:id",
            get(get_material_quantity)
                .put(replace_material_quantity)
                .patch(patch_material_quantity)
                .delete(delete_material_quantity),
        )
}

pub async fn create_material_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewMaterialQuantity>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.create_material_quantity(store.id, body).await {
        Ok(mq) => (StatusCode::CREATED, Json(mq)).into_response(),
        Err(e) => errors::create_error_to_response(e),
    }
}

pub async fn list_material_quantities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.list_material_quantities(store.id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn get_material_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialQuantityId>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.get_material_quantity(store.id, id).await {
        Ok(mq) => (StatusCode::OK, Json(mq)).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn replace_material_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialQuantityId>,
    Json(body): Json<NewMaterialQuantity>,
) -> axum::response::Response {
    update(&services, user, id, body.into()).await
}

pub async fn patch_material_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialQuantityId>,
    Json(body): Json<MaterialQuantityPatch>,
) -> axum::response::Response {
    update(&services, user, id, body).await
}

async fn update(
    services: &AppServices,
    user: UserContext,
    id: MaterialQuantityId,
    patch: MaterialQuantityPatch,
) -> axum::response::Response {
    let store = match acting_store(services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.update_material_quantity(store.id, id, patch).await {
        Ok(mq) => (StatusCode::OK, Json(mq)).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn delete_material_quantity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<MaterialQuantityId>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.delete_material_quantity(store.id, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}
