use async_trait::async_trait;

use stockroom_auth::{NewUser, User};
use stockroom_core::{MaterialId, MaterialQuantityId, ProductId, StoreId, UserId};
use stockroom_inventory::{Material, MaterialUpdate, NewMaterial, NewStore, Store};
use stockroom_products::{MaterialQuantity, MaterialQuantityPatch, NewMaterialQuantity, NewProduct, Product};

use super::batch::StockBatch;
use crate::error::InfraResult;

/// Persistence boundary for one deployment.
///
/// Every catalog operation takes the acting `StoreId`; rows owned by another
/// store are reported as not found, never returned.
///
/// Creation paths report duplicates as `DomainError::Conflict`. Updates that
/// collide with an existing row are `InfraError::Integrity`.
///
/// `commit_batch` is the only path that moves `current_capacity`. It reads
/// the rows it needs, plans the batch with the pure engines and writes the
/// resulting adjustments atomically: either every adjustment lands or none.
#[async_trait]
pub trait InventoryRepository: Send + Sync {
    // Accounts
    async fn insert_user(&self, user: NewUser) -> InfraResult<User>;
    async fn user_by_username(&self, username: &str) -> InfraResult<Option<User>>;

    // Stores
    async fn insert_store(&self, user_id: UserId, store: NewStore) -> InfraResult<Store>;
    async fn store_for_user(&self, user_id: UserId) -> InfraResult<Option<Store>>;
    /// Cascades to the store's materials, products and edges.
    async fn delete_store(&self, store_id: StoreId) -> InfraResult<()>;

    // Materials
    async fn insert_material(&self, store_id: StoreId, material: NewMaterial) -> InfraResult<Material>;
    /// Ordered by id.
    async fn list_materials(&self, store_id: StoreId) -> InfraResult<Vec<Material>>;
    async fn get_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<Material>;
    async fn update_material(
        &self,
        store_id: StoreId,
        id: MaterialId,
        update: MaterialUpdate,
    ) -> InfraResult<Material>;
    async fn delete_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<()>;

    // Products
    async fn insert_product(&self, store_id: StoreId, product: NewProduct) -> InfraResult<Product>;
    /// Ordered by id.
    async fn list_products(&self, store_id: StoreId) -> InfraResult<Vec<Product>>;
    async fn get_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<Product>;
    async fn rename_product(&self, store_id: StoreId, id: ProductId, product: NewProduct) -> InfraResult<Product>;
    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<()>;

    // Bill of materials
    async fn insert_material_quantity(
        &self,
        store_id: StoreId,
        edge: NewMaterialQuantity,
    ) -> InfraResult<MaterialQuantity>;
    /// Edges whose product belongs to the store, ordered by id.
    async fn list_material_quantities(&self, store_id: StoreId) -> InfraResult<Vec<MaterialQuantity>>;
    async fn get_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
    ) -> InfraResult<MaterialQuantity>;
    async fn update_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
        patch: MaterialQuantityPatch,
    ) -> InfraResult<MaterialQuantity>;
    async fn delete_material_quantity(&self, store_id: StoreId, id: MaterialQuantityId) -> InfraResult<()>;

    // Stock
    /// Plan and apply a restock or sale batch in one transaction, returning
    /// the materials whose capacity changed.
    async fn commit_batch(&self, store_id: StoreId, batch: &StockBatch) -> InfraResult<Vec<Material>>;
}
