//! Postgres-backed repository.
//!
//! Every catalog query carries `store_id` in its WHERE clause (directly or via
//! the owning product), so rows of another store behave as missing.
//!
//! Stock batches run in one transaction: the touched material rows are locked
//! with `SELECT ... FOR UPDATE` in ascending id order, the batch is planned
//! from the locked rows, and one `UPDATE` per adjusted material is written
//! before `COMMIT`. Dropping the transaction on any error rolls it back.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::instrument;

use stockroom_auth::{NewUser, User};
use stockroom_core::{DomainError, MaterialId, MaterialQuantityId, ProductId, StoreId, UserId};
use stockroom_inventory::{Material, MaterialUpdate, NewMaterial, NewStore, Store, apply_adjustments};
use stockroom_products::{MaterialQuantity, MaterialQuantityPatch, NewMaterialQuantity, NewProduct, Product};

use super::batch::StockBatch;
use super::r#trait::InventoryRepository;
use crate::error::{InfraError, InfraResult, map_sqlx_error};

const MAX_CONNECTIONS: u32 = 20;

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
        }
    }
}

#[derive(Debug, FromRow)]
struct StoreRow {
    id: i64,
    name: String,
    user_id: i64,
}

impl From<StoreRow> for Store {
    fn from(row: StoreRow) -> Self {
        Store {
            id: StoreId::new(row.id),
            name: row.name,
            user_id: UserId::new(row.user_id),
        }
    }
}

#[derive(Debug, FromRow)]
struct MaterialRow {
    id: i64,
    store_id: i64,
    name: String,
    price: Decimal,
    max_capacity: i64,
    current_capacity: i64,
}

impl From<MaterialRow> for Material {
    fn from(row: MaterialRow) -> Self {
        Material {
            id: MaterialId::new(row.id),
            store_id: StoreId::new(row.store_id),
            name: row.name,
            price: row.price,
            max_capacity: row.max_capacity,
            current_capacity: row.current_capacity,
        }
    }
}

#[derive(Debug, FromRow)]
struct ProductRow {
    id: i64,
    store_id: i64,
    name: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: ProductId::new(row.id),
            store_id: StoreId::new(row.store_id),
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
struct MaterialQuantityRow {
    id: i64,
    product_id: i64,
    material_id: i64,
    quantity: i64,
}

impl From<MaterialQuantityRow> for MaterialQuantity {
    fn from(row: MaterialQuantityRow) -> Self {
        MaterialQuantity {
            id: MaterialQuantityId::new(row.id),
            product_id: ProductId::new(row.product_id),
            material_id: MaterialId::new(row.material_id),
            quantity: row.quantity,
        }
    }
}

const MATERIAL_COLUMNS: &str = "id, store_id, name, price, max_capacity, current_capacity";

fn material_not_found() -> InfraError {
    DomainError::not_found("Material doesn't exists!").into()
}

fn product_not_found() -> InfraError {
    DomainError::not_found("Product doesn't exists!").into()
}

fn edge_not_found() -> InfraError {
    DomainError::not_found("Material quantity doesn't exists!").into()
}

/// Postgres-backed repository.
///
/// Uses SQLx connection pool which is thread-safe (Arc + Send + Sync).
#[derive(Debug, Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `database_url` and bring the schema up to date.
    pub async fn connect(database_url: &str) -> InfraResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let repo = Self::new(pool);
        repo.run_migrations().await?;
        Ok(repo)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> InfraResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| InfraError::backend(format!("migration failed: {e}")))
    }

    async fn lock_materials(
        tx: &mut Transaction<'_, Postgres>,
        store_id: StoreId,
        ids: &[i64],
    ) -> InfraResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM material \
             WHERE store_id = $1 AND id = ANY($2) \
             ORDER BY id ASC FOR UPDATE"
        ))
        .bind(store_id.get())
        .bind(ids)
        .fetch_all(&mut **tx)
        .await
        .map_err(|e| map_sqlx_error("lock_materials", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn ensure_pair_in_store(
        &self,
        store_id: StoreId,
        product_id: ProductId,
        material_id: MaterialId,
    ) -> InfraResult<()> {
        self.get_product(store_id, product_id).await?;
        self.get_material(store_id, material_id).await?;
        Ok(())
    }
}

#[async_trait]
impl InventoryRepository for PostgresRepository {
    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn insert_user(&self, user: NewUser) -> InfraResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (username) DO NOTHING
            RETURNING id, username, email, password_hash
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_user", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::conflict("Username already exists!").into())
    }

    async fn user_by_username(&self, username: &str) -> InfraResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email, password_hash FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("user_by_username", e))?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self, store), fields(user_id = %user_id), err)]
    async fn insert_store(&self, user_id: UserId, store: NewStore) -> InfraResult<Store> {
        let row = sqlx::query_as::<_, StoreRow>(
            r#"
            INSERT INTO store (name, user_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id, name, user_id
            "#,
        )
        .bind(&store.name)
        .bind(user_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match map_sqlx_error("insert_store", e) {
            InfraError::Integrity(_) => DomainError::not_found("User doesn't exists!").into(),
            other => other,
        })?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::conflict("User already created a store!").into())
    }

    async fn store_for_user(&self, user_id: UserId) -> InfraResult<Option<Store>> {
        let row = sqlx::query_as::<_, StoreRow>("SELECT id, name, user_id FROM store WHERE user_id = $1")
            .bind(user_id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("store_for_user", e))?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self), fields(store_id = %store_id), err)]
    async fn delete_store(&self, store_id: StoreId) -> InfraResult<()> {
        let result = sqlx::query("DELETE FROM store WHERE id = $1")
            .bind(store_id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_store", e))?;
        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("Store doesn't exists!").into());
        }
        Ok(())
    }

    async fn insert_material(&self, store_id: StoreId, material: NewMaterial) -> InfraResult<Material> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "INSERT INTO material (name, price, store_id, max_capacity, current_capacity) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (name, store_id) DO NOTHING \
             RETURNING {MATERIAL_COLUMNS}"
        ))
        .bind(&material.name)
        .bind(material.price)
        .bind(store_id.get())
        .bind(material.max_capacity)
        .bind(material.current_capacity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_material", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::conflict("Material existed!").into())
    }

    async fn list_materials(&self, store_id: StoreId) -> InfraResult<Vec<Material>> {
        let rows = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM material WHERE store_id = $1 ORDER BY id ASC"
        ))
        .bind(store_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_materials", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<Material> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "SELECT {MATERIAL_COLUMNS} FROM material WHERE store_id = $1 AND id = $2"
        ))
        .bind(store_id.get())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_material", e))?;
        row.map(Into::into).ok_or_else(material_not_found)
    }

    async fn update_material(
        &self,
        store_id: StoreId,
        id: MaterialId,
        update: MaterialUpdate,
    ) -> InfraResult<Material> {
        let row = sqlx::query_as::<_, MaterialRow>(&format!(
            "UPDATE material SET name = $3, price = $4, max_capacity = $5 \
             WHERE store_id = $1 AND id = $2 \
             RETURNING {MATERIAL_COLUMNS}"
        ))
        .bind(store_id.get())
        .bind(id.get())
        .bind(&update.name)
        .bind(update.price)
        .bind(update.max_capacity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_material", e))?;
        row.map(Into::into).ok_or_else(material_not_found)
    }

    async fn delete_material(&self, store_id: StoreId, id: MaterialId) -> InfraResult<()> {
        let result = sqlx::query("DELETE FROM material WHERE store_id = $1 AND id = $2")
            .bind(store_id.get())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_material", e))?;
        if result.rows_affected() == 0 {
            return Err(material_not_found());
        }
        Ok(())
    }

    async fn insert_product(&self, store_id: StoreId, product: NewProduct) -> InfraResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            INSERT INTO product (name, store_id)
            VALUES ($1, $2)
            ON CONFLICT (name, store_id) DO NOTHING
            RETURNING id, store_id, name
            "#,
        )
        .bind(&product.name)
        .bind(store_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_product", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::conflict("Product existed!").into())
    }

    async fn list_products(&self, store_id: StoreId) -> InfraResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, store_id, name FROM product WHERE store_id = $1 ORDER BY id ASC",
        )
        .bind(store_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_products", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, store_id, name FROM product WHERE store_id = $1 AND id = $2",
        )
        .bind(store_id.get())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_product", e))?;
        row.map(Into::into).ok_or_else(product_not_found)
    }

    async fn rename_product(&self, store_id: StoreId, id: ProductId, product: NewProduct) -> InfraResult<Product> {
        let row = sqlx::query_as::<_, ProductRow>(
            r#"
            UPDATE product SET name = $3
            WHERE store_id = $1 AND id = $2
            RETURNING id, store_id, name
            "#,
        )
        .bind(store_id.get())
        .bind(id.get())
        .bind(&product.name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("rename_product", e))?;
        row.map(Into::into).ok_or_else(product_not_found)
    }

    async fn delete_product(&self, store_id: StoreId, id: ProductId) -> InfraResult<()> {
        let result = sqlx::query("DELETE FROM product WHERE store_id = $1 AND id = $2")
            .bind(store_id.get())
            .bind(id.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_product", e))?;
        if result.rows_affected() == 0 {
            return Err(product_not_found());
        }
        Ok(())
    }

    async fn insert_material_quantity(
        &self,
        store_id: StoreId,
        edge: NewMaterialQuantity,
    ) -> InfraResult<MaterialQuantity> {
        self.ensure_pair_in_store(store_id, edge.product_id, edge.material_id)
            .await?;

        let row = sqlx::query_as::<_, MaterialQuantityRow>(
            r#"
            INSERT INTO material_quantity (quantity, product_id, material_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (product_id, material_id) DO NOTHING
            RETURNING id, product_id, material_id, quantity
            "#,
        )
        .bind(edge.quantity)
        .bind(edge.product_id.get())
        .bind(edge.material_id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert_material_quantity", e))?;

        row.map(Into::into)
            .ok_or_else(|| DomainError::conflict("Material quantity existed!").into())
    }

    async fn list_material_quantities(&self, store_id: StoreId) -> InfraResult<Vec<MaterialQuantity>> {
        let rows = sqlx::query_as::<_, MaterialQuantityRow>(
            r#"
            SELECT mq.id, mq.product_id, mq.material_id, mq.quantity
            FROM material_quantity mq
            JOIN product p ON p.id = mq.product_id
            WHERE p.store_id = $1
            ORDER BY mq.id ASC
            "#,
        )
        .bind(store_id.get())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_material_quantities", e))?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn get_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
    ) -> InfraResult<MaterialQuantity> {
        let row = sqlx::query_as::<_, MaterialQuantityRow>(
            r#"
            SELECT mq.id, mq.product_id, mq.material_id, mq.quantity
            FROM material_quantity mq
            JOIN product p ON p.id = mq.product_id
            WHERE p.store_id = $1 AND mq.id = $2
            "#,
        )
        .bind(store_id.get())
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_material_quantity", e))?;
        row.map(Into::into).ok_or_else(edge_not_found)
    }

    async fn update_material_quantity(
        &self,
        store_id: StoreId,
        id: MaterialQuantityId,
        patch: MaterialQuantityPatch,
    ) -> InfraResult<MaterialQuantity> {
        let next = patch.merged(&self.get_material_quantity(store_id, id).await?);
        self.ensure_pair_in_store(store_id, next.product_id, next.material_id)
            .await?;

        let row = sqlx::query_as::<_, MaterialQuantityRow>(
            r#"
            UPDATE material_quantity
            SET product_id = $2, material_id = $3, quantity = $4
            WHERE id = $1
            RETURNING id, product_id, material_id, quantity
            "#,
        )
        .bind(id.get())
        .bind(next.product_id.get())
        .bind(next.material_id.get())
        .bind(next.quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_material_quantity", e))?;
        row.map(Into::into).ok_or_else(edge_not_found)
    }

    async fn delete_material_quantity(&self, store_id: StoreId, id: MaterialQuantityId) -> InfraResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM material_quantity mq
            USING product p
            WHERE p.id = mq.product_id AND p.store_id = $1 AND mq.id = $2
            "#,
        )
        .bind(store_id.get())
        .bind(id.get())
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_material_quantity", e))?;
        if result.rows_affected() == 0 {
            return Err(edge_not_found());
        }
        Ok(())
    }

    #[instrument(
        skip(self, batch),
        fields(store_id = %store_id, kind = batch.kind(), lines = batch.len()),
        err
    )]
    async fn commit_batch(&self, store_id: StoreId, batch: &StockBatch) -> InfraResult<Vec<Material>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let product_ids: Vec<i64> = batch.product_ids().into_iter().map(|id| id.get()).collect();

        let products: Vec<Product> = sqlx::query_as::<_, ProductRow>(
            "SELECT id, store_id, name FROM product WHERE store_id = $1 AND id = ANY($2) ORDER BY id ASC",
        )
        .bind(store_id.get())
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("load_products", e))?
        .into_iter()
        .map(Into::into)
        .collect();

        let edges: Vec<MaterialQuantity> = sqlx::query_as::<_, MaterialQuantityRow>(
            r#"
            SELECT mq.id, mq.product_id, mq.material_id, mq.quantity
            FROM material_quantity mq
            JOIN product p ON p.id = mq.product_id
            WHERE p.store_id = $1 AND mq.product_id = ANY($2)
            ORDER BY mq.id ASC
            "#,
        )
        .bind(store_id.get())
        .bind(&product_ids)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("load_material_quantities", e))?
        .into_iter()
        .map(Into::into)
        .collect();

        let material_ids: Vec<i64> = batch.material_ids(&edges).into_iter().map(|id| id.get()).collect();
        let mut materials = Self::lock_materials(&mut tx, store_id, &material_ids).await?;

        let adjustments = batch.plan(&materials, &edges, &products)?;
        let updated = apply_adjustments(&mut materials, &adjustments)?;

        for material in &updated {
            sqlx::query("UPDATE material SET current_capacity = $2 WHERE id = $1")
                .bind(material.id.get())
                .bind(material.current_capacity)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_sqlx_error("update_capacity", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        tracing::debug!(updated = updated.len(), "stock batch committed");
        Ok(updated)
    }
}
