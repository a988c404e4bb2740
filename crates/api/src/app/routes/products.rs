use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use stockroom_core::ProductId;
use stockroom_products::NewProduct;

use crate::app::routes::common::acting_store;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::UserContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/product-capacity", get(product_capacity))
        .route("/sale", post(sale))
        .route(
            "/:id",
            get(get_product).put(rename_product).delete(delete_product),
        )
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.create_product(store.id, body).await {
        Ok(p) => (StatusCode::CREATED, Json(p)).into_response(),
        Err(e) => errors::create_error_to_response(e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.list_products(store.id).await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<ProductId>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.get_product(store.id, id).await {
        Ok(p) => (StatusCode::OK, Json(p)).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn rename_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<ProductId>,
    Json(body): Json<NewProduct>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.rename_product(store.id, id, body).await {
        Ok(p) => (StatusCode::OK, Json(p)).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<ProductId>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.delete_product(store.id, id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn product_capacity(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.product_capacity(store.id).await {
        Ok(capacities) => (StatusCode::OK, Json(dto::capacities_to_json(capacities))).into_response(),
        Err(e) => errors::infra_error_to_response(e),
    }
}

pub async fn sale(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<UserContext>,
    Json(body): Json<dto::SaleRequest>,
) -> axum::response::Response {
    let store = match acting_store(&services, user).await {
        Ok(s) => s,
        Err(res) => return res,
    };
    match services.inventory.sell(store.id, body.sale).await {
        Ok(_) => (StatusCode::OK, Json(json!({ "message": "Sale Successfully" }))).into_response(),
        Err(e) => errors::batch_error_to_response(e),
    }
}
