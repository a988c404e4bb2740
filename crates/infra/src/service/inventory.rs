use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use stockroom_core::{MaterialId, MaterialQuantityId, ProductId, StoreId, UserId};
use stockroom_inventory::{
    Material, MaterialUpdate, NewMaterial, NewStore, RestockCandidate, RestockItem, Store,
    compute_total_price, percentage_of_capacity, restock_candidates,
};
use stockroom_products::{
    BillOfMaterials, MaterialQuantity, MaterialQuantityPatch, NewMaterialQuantity, NewProduct, Product,
    ProductCapacity,
};
use stockroom_sales::SaleLine;

use crate::error::InfraResult;
use crate::repository::{InventoryRepository, StockBatch};

/// What the store needs to be full again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestockSummary {
    pub candidates: Vec<RestockCandidate>,
    pub total_price: Decimal,
}

/// Fill level of one material.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryLevel {
    pub id: MaterialId,
    pub max_capacity: i64,
    pub current_capacity: i64,
    /// `current / max`, two decimal places.
    pub percentage_of_capacity: f64,
}

/// Store-scoped catalog and stock operations.
#[derive(Clone)]
pub struct InventoryService {
    repo: Arc<dyn InventoryRepository>,
}

impl InventoryService {
    pub fn new(repo: Arc<dyn InventoryRepository>) -> Self {
        Self { repo }
    }

    // Stores

    #[instrument(skip(self, store), fields(user_id = %user_id), err)]
    pub async fn create_store(&self, user_id: UserId, store: NewStore) -> InfraResult<Store> {
        let store = self.repo.insert_store(user_id, store.validate()?).await?;
        tracing::info!(store_id = %store.id, "store opened");
        Ok(store)
    }

    pub async fn store_for_user(&self, user_id: UserId) -> InfraResult<Option<Store>> {
        self.repo.store_for_user(user_id).await
    }

    #[instrument(skip(self), fields(store_id = %store_id), err)]
    pub async fn delete_store(&self, store_id: StoreId) -> InfraResult<()> {
        self.repo.delete_store(store_id).await
    }

    // Materials

    pub async fn create_material(&self, store_id: StoreId, material: NewMaterial) -> InfraResult<Material> {
        self.repo.insert_material(store_id, material.validate()?).await
    }

    pub async fn list_materials(&self, store_id: StoreId) -> InfraResult<Vec<Material>> {
        self.repo.list_materials(store_id).await
    }

    pub async fn get_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<Material> {
        self.repo.get_material(store_id, id).await
    }

    pub async fn update_material(
        &self,
        store_id: StoreId,
        id: MaterialId,
        update: MaterialUpdate,
    ) -> InfraResult<Material> {
        self.repo.update_material(store_id, id, update.validate()?).await
    }

    pub async fn delete_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<()> {
        self.repo.delete_material(store_id, id).await
    }

    // Products

    pub async fn create_product(&self, store_id: StoreId, product: NewProduct) -> InfraResult<Product> {
        self.repo.insert_product(store_id, product.validate()?).await
    }

    pub async fn list_products(&self, store_id: StoreId) -> InfraResult<Vec<Product>> {
        self.repo.list_products(store_id).await
    }

    pub async fn get_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<Product> {
        self.repo.get_product(store_id, id).await
    }

    pub async fn rename_product(&self, store_id: StoreId, id: ProductId, product: NewProduct) -> InfraResult<Product> {
        self.repo.rename_product(store_id, id, product.validate()?).await
    }

    pub async fn delete_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<()> {
        self.repo.delete_product(store_id, id).await
    }

    // Bill of materials

    pub async fn create_material_quantity(
        &self,
        store_id: StoreId,
        edge: NewMaterialQuantity,
    ) -> InfraResult<MaterialQuantity> {
        self.repo.insert_material_quantity(store_id, edge.validate()?).await
    }

    pub async fn list_material_quantities(&self, store_id: StoreId) -> InfraResult<Vec<MaterialQuantity>> {
        self.repo.list_material_quantities(store_id).await
    }

    pub async fn get_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
    ) -> InfraResult<MaterialQuantity> {
        self.repo.get_material_quantity(store_id, id).await
    }

    pub async fn update_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
        patch: MaterialQuantityPatch,
    ) -> InfraResult<MaterialQuantity> {
        self.repo.update_material_quantity(store_id, id, patch.validate()?).await
    }

    pub async fn delete_material_quantity(&self, store_id: StoreId, id: MaterialQuantityId) -> InfraResult<()> {
        self.repo.delete_material_quantity(store_id, id).await
    }

    // Stock

    /// Materials below capacity and what filling them would cost.
    pub async fn restock_summary(&self, store_id: StoreId) -> InfraResult<RestockSummary> {
        let materials = self.repo.list_materials(store_id).await?;
        let candidates = restock_candidates(&materials);
        let total_price = compute_total_price(&candidates)?;
        Ok(RestockSummary { candidates, total_price })
    }

    #[instrument(skip(self, items), fields(store_id = %store_id, lines = items.len()), err)]
    pub async fn restock(&self, store_id: StoreId, items: Vec<RestockItem>) -> InfraResult<Vec<Material>> {
        let updated = self
            .repo
            .commit_batch(store_id, &StockBatch::Restock(items))
            .await?;
        tracing::info!(materials = updated.len(), "restock applied");
        Ok(updated)
    }

    #[instrument(skip(self, lines), fields(store_id = %store_id, lines = lines.len()), err)]
    pub async fn sell(&self, store_id: StoreId, lines: Vec<SaleLine>) -> InfraResult<Vec<Material>> {
        let updated = self
            .repo
            .commit_batch(store_id, &StockBatch::Sale(lines))
            .await?;
        tracing::info!(materials = updated.len(), "sale applied");
        Ok(updated)
    }

    /// Fill level per material. Any material without a `max_capacity` fails
    /// the whole listing.
    pub async fn inventory(&self, store_id: StoreId) -> InfraResult<Vec<InventoryLevel>> {
        let materials = self.repo.list_materials(store_id).await?;
        materials
            .iter()
            .map(|m| {
                let pct = percentage_of_capacity(m)?;
                Ok(InventoryLevel {
                    id: m.id,
                    max_capacity: m.max_capacity,
                    current_capacity: m.current_capacity,
                    percentage_of_capacity: (pct * 100.0).round() / 100.0,
                })
            })
            .collect()
    }

    /// Producible quantity of every product in the store.
    pub async fn product_capacity(&self, store_id: StoreId) -> InfraResult<Vec<ProductCapacity>> {
        let materials = self.repo.list_materials(store_id).await?;
        let edges = self.repo.list_material_quantities(store_id).await?;
        let products = self.repo.list_products(store_id).await?;
        let bom = BillOfMaterials::new(&edges, &materials);
        Ok(bom.producible_quantities(&products)?)
    }
}
