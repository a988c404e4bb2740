use axum::Router;

pub mod accounts;
pub mod common;
pub mod material_quantities;
pub mod materials;
pub mod products;
pub mod stores;
pub mod system;

/// Routes open to anonymous callers.
pub fn public_router() -> Router {
    Router::new().merge(system::router()).merge(accounts::router())
}

/// Routes that require a bearer token.
pub fn router() -> Router {
    Router::new()
        .nest("/stores", stores::router())
        .nest("/material", materials::router())
        .nest("/material-quantity", material_quantities::router())
        .nest("/product", products::router())
}
