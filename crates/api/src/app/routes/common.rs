use stockroom_inventory::Store;

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::UserContext;

/// The caller's store, or the response to send when there is none.
pub async fn acting_store(services: &AppServices, user: UserContext) -> Result<Store, axum::response::Response> {
    match services.inventory.store_for_user(user.user_id()).await {
        Ok(Some(store)) => Ok(store),
        Ok(None) => Err(errors::store_not_found()),
        Err(e) => Err(errors::infra_error_to_response(e)),
    }
}
