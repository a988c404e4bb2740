use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use stockroom_auth::{NewUser, User};
use stockroom_core::{DomainError, MaterialId, MaterialQuantityId, ProductId, StoreId, UserId};
use stockroom_inventory::{Material, MaterialUpdate, NewMaterial, NewStore, Store, apply_adjustments};
use stockroom_products::{MaterialQuantity, MaterialQuantityPatch, NewMaterialQuantity, NewProduct, Product};

use super::batch::StockBatch;
use super::r#trait::InventoryRepository;
use crate::error::{InfraError, InfraResult};

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, User>,
    stores: BTreeMap<StoreId, Store>,
    materials: BTreeMap<MaterialId, Material>,
    products: BTreeMap<ProductId, Product>,
    edges: BTreeMap<MaterialQuantityId, MaterialQuantity>,
}

impl State {
    /// Ids are drawn from one counter, like a sequence per deployment.
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<&Material> {
        self.materials
            .get(&id)
            .filter(|m| m.store_id == store_id)
            .ok_or_else(|| DomainError::not_found("Material doesn't exists!").into())
    }

    fn product(&self, store_id: StoreId, id: ProductId) -> InfraResult<&Product> {
        self.products
            .get(&id)
            .filter(|p| p.store_id == store_id)
            .ok_or_else(|| DomainError::not_found("Product doesn't exists!").into())
    }

    fn edge(&self, store_id: StoreId, id: MaterialQuantityId) -> InfraResult<MaterialQuantity> {
        self.edges
            .get(&id)
            .copied()
            .filter(|e| self.product(store_id, e.product_id).is_ok())
            .ok_or_else(|| DomainError::not_found("Material quantity doesn't exists!").into())
    }

    fn store_materials(&self, store_id: StoreId) -> Vec<Material> {
        self.materials
            .values()
            .filter(|m| m.store_id == store_id)
            .cloned()
            .collect()
    }

    fn store_products(&self, store_id: StoreId) -> Vec<Product> {
        self.products
            .values()
            .filter(|p| p.store_id == store_id)
            .cloned()
            .collect()
    }

    fn store_edges(&self, store_id: StoreId) -> Vec<MaterialQuantity> {
        self.edges
            .values()
            .filter(|e| self.product(store_id, e.product_id).is_ok())
            .copied()
            .collect()
    }

    fn name_taken<'a>(
        mut names: impl Iterator<Item = (&'a str, i64)>,
        name: &str,
        except: Option<i64>,
    ) -> bool {
        names.any(|(n, id)| n == name && Some(id) != except)
    }
}

/// In-memory repository.
///
/// Intended for tests/dev. All state sits behind one lock, so a stock batch
/// holds the write guard from planning to apply and batches serialize.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> InfraResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| InfraError::backend("lock poisoned"))
    }

    fn write(&self) -> InfraResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| InfraError::backend("lock poisoned"))
    }
}

#[async_trait]
impl InventoryRepository for InMemoryRepository {
    async fn insert_user(&self, user: NewUser) -> InfraResult<User> {
        let mut state = self.write()?;
        if state.users.values().any(|u| u.username == user.username) {
            return Err(DomainError::conflict("Username already exists!").into());
        }
        let id = UserId::new(state.next_id());
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
        };
        state.users.insert(id, user.clone());
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> InfraResult<Option<User>> {
        let state = self.read()?;
        Ok(state.users.values().find(|u| u.username == username).cloned())
    }

    async fn insert_store(&self, user_id: UserId, store: NewStore) -> InfraResult<Store> {
        let mut state = self.write()?;
        if !state.users.contains_key(&user_id) {
            return Err(DomainError::not_found("User doesn't exists!").into());
        }
        if state.stores.values().any(|s| s.user_id == user_id) {
            return Err(DomainError::conflict("User already created a store!").into());
        }
        let id = StoreId::new(state.next_id());
        let store = Store {
            id,
            name: store.name,
            user_id,
        };
        state.stores.insert(id, store.clone());
        Ok(store)
    }

    async fn store_for_user(&self, user_id: UserId) -> InfraResult<Option<Store>> {
        let state = self.read()?;
        Ok(state.stores.values().find(|s| s.user_id == user_id).cloned())
    }

    async fn delete_store(&self, store_id: StoreId) -> InfraResult<()> {
        let mut state = self.write()?;
        if state.stores.remove(&store_id).is_none() {
            return Err(DomainError::not_found("Store doesn't exists!").into());
        }
        state.materials.retain(|_, m| m.store_id != store_id);
        state.products.retain(|_, p| p.store_id != store_id);
        let State { edges, products, .. } = &mut *state;
        edges.retain(|_, e| products.contains_key(&e.product_id));
        Ok(())
    }

    async fn insert_material(&self, store_id: StoreId, material: NewMaterial) -> InfraResult<Material> {
        let mut state = self.write()?;
        let names = state
            .materials
            .values()
            .filter(|m| m.store_id == store_id)
            .map(|m| (m.name.as_str(), m.id.get()));
        if State::name_taken(names, &material.name, None) {
            return Err(DomainError::conflict("Material existed!").into());
        }
        let id = MaterialId::new(state.next_id());
        let material = Material {
            id,
            store_id,
            name: material.name,
            price: material.price,
            max_capacity: material.max_capacity,
            current_capacity: material.current_capacity,
        };
        state.materials.insert(id, material.clone());
        Ok(material)
    }

    async fn list_materials(&self, store_id: StoreId) -> InfraResult<Vec<Material>> {
        Ok(self.read()?.store_materials(store_id))
    }

    async fn get_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<Material> {
        self.read()?.material(store_id, id).cloned()
    }

    async fn update_material(
        &self,
        store_id: StoreId,
        id: MaterialId,
        update: MaterialUpdate,
    ) -> InfraResult<Material> {
        let mut state = self.write()?;
        let mut material = state.material(store_id, id)?.clone();
        let names = state
            .materials
            .values()
            .filter(|m| m.store_id == store_id)
            .map(|m| (m.name.as_str(), m.id.get()));
        if State::name_taken(names, &update.name, Some(id.get())) {
            return Err(InfraError::Integrity(format!(
                "material name `{}` already used in store {store_id}",
                update.name
            )));
        }
        update.apply_to(&mut material);
        state.materials.insert(id, material.clone());
        Ok(material)
    }

    async fn delete_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<()> {
        let mut state = self.write()?;
        state.material(store_id, id)?;
        state.materials.remove(&id);
        state.edges.retain(|_, e| e.material_id != id);
        Ok(())
    }

    async fn insert_product(&self, store_id: StoreId, product: NewProduct) -> InfraResult<Product> {
        let mut state = self.write()?;
        let names = state
            .products
            .values()
            .filter(|p| p.store_id == store_id)
            .map(|p| (p.name.as_str(), p.id.get()));
        if State::name_taken(names, &product.name, None) {
            return Err(DomainError::conflict("Product existed!").into());
        }
        let id = ProductId::new(state.next_id());
        let product = Product {
            id,
            store_id,
            name: product.name,
        };
        state.products.insert(id, product.clone());
        Ok(product)
    }

    async fn list_products(&self, store_id: StoreId) -> InfraResult<Vec<Product>> {
        Ok(self.read()?.store_products(store_id))
    }

    async fn get_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<Product> {
        self.read()?.product(store_id, id).cloned()
    }

    async fn rename_product(&self, store_id: StoreId, id: ProductId, product: NewProduct) -> InfraResult<Product> {
        let mut state = self.write()?;
        let mut current = state.product(store_id, id)?.clone();
        let names = state
            .products
            .values()
            .filter(|p| p.store_id == store_id)
            .map(|p| (p.name.as_str(), p.id.get()));
        if State::name_taken(names, &product.name, Some(id.get())) {
            return Err(InfraError::Integrity(format!(
                "product name `{}` already used in store {store_id}",
                product.name
            )));
        }
        current.name = product.name;
        state.products.insert(id, current.clone());
        Ok(current)
    }

    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<()> {
        let mut state = self.write()?;
        state.product(store_id, id)?;
        state.products.remove(&id);
        state.edges.retain(|_, e| e.product_id != id);
        Ok(())
    }

    async fn insert_material_quantity(
        &self,
        store_id: StoreId,
        edge: NewMaterialQuantity,
    ) -> InfraResult<MaterialQuantity> {
        let mut state = self.write()?;
        state.product(store_id, edge.product_id)?;
        state.material(store_id, edge.material_id)?;
        let exists = state
            .edges
            .values()
            .any(|e| e.product_id == edge.product_id && e.material_id == edge.material_id);
        if exists {
            return Err(DomainError::conflict("Material quantity existed!").into());
        }
        let id = MaterialQuantityId::new(state.next_id());
        let edge = MaterialQuantity {
            id,
            product_id: edge.product_id,
            material_id: edge.material_id,
            quantity: edge.quantity,
        };
        state.edges.insert(id, edge);
        Ok(edge)
    }

    async fn list_material_quantities(&self, store_id: StoreId) -> InfraResult<Vec<MaterialQuantity>> {
        Ok(self.read()?.store_edges(store_id))
    }

    async fn get_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
    ) -> InfraResult<MaterialQuantity> {
        self.read()?.edge(store_id, id)
    }

    async fn update_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
        patch: MaterialQuantityPatch,
    ) -> InfraResult<MaterialQuantity> {
        let mut state = self.write()?;
        let next = patch.merged(&state.edge(store_id, id)?);
        state.product(store_id, next.product_id)?;
        state.material(store_id, next.material_id)?;
        let collides = state.edges.values().any(|e| {
            e.id != id && e.product_id == next.product_id && e.material_id == next.material_id
        });
        if collides {
            return Err(InfraError::Integrity(format!(
                "product {} already uses material {}",
                next.product_id, next.material_id
            )));
        }
        state.edges.insert(id, next);
        Ok(next)
    }

    async fn delete_material_quantity(&self, store_id: StoreId, id: MaterialQuantityId) -> InfraResult<()> {
        let mut state = self.write()?;
        state.edge(store_id, id)?;
        state.edges.remove(&id);
        Ok(())
    }

    async fn commit_batch(&self, store_id: StoreId, batch: &StockBatch) -> InfraResult<Vec<Material>> {
        let mut state = self.write()?;

        let mut materials = state.store_materials(store_id);
        let edges = state.store_edges(store_id);
        let products = state.store_products(store_id);

        let adjustments = batch.plan(&materials, &edges, &products)?;
        let updated = apply_adjustments(&mut materials, &adjustments)?;

        for material in &updated {
            state.materials.insert(material.id, material.clone());
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stockroom_inventory::RestockItem;
    use stockroom_sales::SaleLine;

    async fn seeded() -> (InMemoryRepository, StoreId) {
        let repo = InMemoryRepository::new();
        let user = repo
            .insert_user(NewUser {
                username: "admin".into(),
                email: None,
                password_hash: "hash".into(),
            })
            .await
            .unwrap();
        let store = repo
            .insert_store(user.id, NewStore { name: "store1".into() })
            .await
            .unwrap();
        (repo, store.id)
    }

    fn new_material(name: &str, max: i64, current: i64) -> NewMaterial {
        NewMaterial {
            name: name.into(),
            price: Decimal::new(1000, 2),
            max_capacity: max,
            current_capacity: current,
        }
    }

    #[tokio::test]
    async fn one_store_per_user() {
        let (repo, store_id) = seeded().await;
        let owner = repo.read().unwrap().stores[&store_id].user_id;
        let err = repo
            .insert_store(owner, NewStore { name: "store2".into() })
            .await
            .unwrap_err();
        assert_eq!(
            err.as_domain(),
            Some(&DomainError::conflict("User already created a store!"))
        );
    }

    #[tokio::test]
    async fn duplicate_material_name_is_a_conflict() {
        let (repo, store_id) = seeded().await;
        repo.insert_material(store_id, new_material("material1", 100, 0)).await.unwrap();
        let err = repo
            .insert_material(store_id, new_material("material1", 100, 0))
            .await
            .unwrap_err();
        assert_eq!(err.as_domain(), Some(&DomainError::conflict("Material existed!")));
    }

    #[tokio::test]
    async fn rows_of_other_stores_are_not_found() {
        let (repo, store_id) = seeded().await;
        let material = repo.insert_material(store_id, new_material("material1", 100, 0)).await.unwrap();

        let other = StoreId::new(999);
        let err = repo.get_material(other, material.id).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::NotFound(_))));
        assert!(repo.list_materials(other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_restock_leaves_every_material_untouched() {
        let (repo, store_id) = seeded().await;
        let a = repo.insert_material(store_id, new_material("a", 100, 40)).await.unwrap();
        let b = repo.insert_material(store_id, new_material("b", 100, 90)).await.unwrap();

        let batch = StockBatch::Restock(vec![
            RestockItem { id: a.id, quantity: 10 },
            RestockItem { id: b.id, quantity: 20 },
        ]);
        let err = repo.commit_batch(store_id, &batch).await.unwrap_err();
        assert!(matches!(err.as_domain(), Some(DomainError::CapacityExceeded { .. })));

        assert_eq!(repo.get_material(store_id, a.id).await.unwrap().current_capacity, 40);
        assert_eq!(repo.get_material(store_id, b.id).await.unwrap().current_capacity, 90);
    }

    #[tokio::test]
    async fn sale_depletes_through_the_bill_of_materials() {
        let (repo, store_id) = seeded().await;
        let a = repo.insert_material(store_id, new_material("a", 100, 100)).await.unwrap();
        let b = repo.insert_material(store_id, new_material("b", 100, 51)).await.unwrap();
        let p = repo
            .insert_product(store_id, NewProduct { name: "p".into() })
            .await
            .unwrap();
        for (material_id, quantity) in [(a.id, 10), (b.id, 6)] {
            repo.insert_material_quantity(
                store_id,
                NewMaterialQuantity { product_id: p.id, material_id, quantity },
            )
            .await
            .unwrap();
        }

        let updated = repo
            .commit_batch(store_id, &StockBatch::Sale(vec![SaleLine { product: p.id, quantity: 5 }]))
            .await
            .unwrap();
        assert_eq!(updated.len(), 2);
        assert_eq!(repo.get_material(store_id, a.id).await.unwrap().current_capacity, 50);
        assert_eq!(repo.get_material(store_id, b.id).await.unwrap().current_capacity, 21);
    }

    #[tokio::test]
    async fn deleting_a_store_cascades() {
        let (repo, store_id) = seeded().await;
        let m = repo.insert_material(store_id, new_material("a", 10, 0)).await.unwrap();
        let p = repo
            .insert_product(store_id, NewProduct { name: "p".into() })
            .await
            .unwrap();
        repo.insert_material_quantity(
            store_id,
            NewMaterialQuantity { product_id: p.id, material_id: m.id, quantity: 1 },
        )
        .await
        .unwrap();

        repo.delete_store(store_id).await.unwrap();

        assert!(repo.list_materials(store_id).await.unwrap().is_empty());
        assert!(repo.list_products(store_id).await.unwrap().is_empty());
        assert!(repo.list_material_quantities(store_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn deleting_a_material_drops_its_edges() {
        let (repo, store_id) = seeded().await;
        let m = repo.insert_material(store_id, new_material("a", 10, 0)).await.unwrap();
        let p = repo
            .insert_product(store_id, NewProduct { name: "p".into() })
            .await
            .unwrap();
        repo.insert_material_quantity(
            store_id,
            NewMaterialQuantity { product_id: p.id, material_id: m.id, quantity: 1 },
        )
        .await
        .unwrap();

        repo.delete_material(store_id, m.id).await.unwrap();
        assert!(repo.list_material_quantities(store_id).await.unwrap().is_empty());
    }
}
