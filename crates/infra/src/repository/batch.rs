//! Stock-moving batches and their planning step.

use std::collections::BTreeSet;

use stockroom_core::{DomainResult, MaterialId, ProductId};
use stockroom_inventory::{CapacityAdjustment, Material, RestockItem, validate_batch};
use stockroom_products::{BillOfMaterials, MaterialQuantity, Product};
use stockroom_sales::{SaleLine, plan_sale};

/// A batch of capacity changes requested in one call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StockBatch {
    Restock(Vec<RestockItem>),
    Sale(Vec<SaleLine>),
}

impl StockBatch {
    pub fn kind(&self) -> &'static str {
        match self {
            StockBatch::Restock(_) => "restock",
            StockBatch::Sale(_) => "sale",
        }
    }

    pub fn len(&self) -> usize {
        match self {
            StockBatch::Restock(items) => items.len(),
            StockBatch::Sale(lines) => lines.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Products named by a sale, ascending. Empty for restocks.
    pub fn product_ids(&self) -> Vec<ProductId> {
        match self {
            StockBatch::Restock(_) => Vec::new(),
            StockBatch::Sale(lines) => lines
                .iter()
                .map(|l| l.product)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    /// Materials a batch may touch, ascending (the lock order on Postgres).
    ///
    /// Restocks name their materials directly; sales reach them through the
    /// given bill-of-materials edges.
    pub fn material_ids(&self, edges: &[MaterialQuantity]) -> Vec<MaterialId> {
        let ids: BTreeSet<MaterialId> = match self {
            StockBatch::Restock(items) => items.iter().map(|i| i.id).collect(),
            StockBatch::Sale(_) => edges.iter().map(|e| e.material_id).collect(),
        };
        ids.into_iter().collect()
    }

    /// Run the pure engine for this batch against a snapshot of store state.
    ///
    /// `materials` and `products` must be limited to the acting store.
    pub fn plan(
        &self,
        materials: &[Material],
        edges: &[MaterialQuantity],
        products: &[Product],
    ) -> DomainResult<Vec<CapacityAdjustment>> {
        match self {
            StockBatch::Restock(items) => Ok(validate_batch(materials, items)?.into_adjustments()),
            StockBatch::Sale(lines) => {
                let bom = BillOfMaterials::new(edges, materials);
                Ok(plan_sale(&bom, products, lines)?.adjustments())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stockroom_core::{DomainError, MaterialQuantityId, StoreId};

    fn material(id: i64, max: i64, current: i64) -> Material {
        Material {
            id: MaterialId::new(id),
            store_id: StoreId::new(1),
            name: format!("material{id}"),
            price: Decimal::new(100, 2),
            max_capacity: max,
            current_capacity: current,
        }
    }

    #[test]
    fn restock_plans_one_adjustment_per_material() {
        let batch = StockBatch::Restock(vec![
            RestockItem { id: MaterialId::new(2), quantity: 5 },
            RestockItem { id: MaterialId::new(1), quantity: 3 },
            RestockItem { id: MaterialId::new(2), quantity: 5 },
        ]);
        let materials = vec![material(1, 10, 0), material(2, 10, 0)];

        assert_eq!(batch.material_ids(&[]), vec![MaterialId::new(1), MaterialId::new(2)]);
        let plan = batch.plan(&materials, &[], &[]).unwrap();
        assert_eq!(
            plan,
            vec![
                CapacityAdjustment { material_id: MaterialId::new(1), delta: 3 },
                CapacityAdjustment { material_id: MaterialId::new(2), delta: 10 },
            ]
        );
    }

    #[test]
    fn sale_reaches_materials_through_edges() {
        let product = Product {
            id: ProductId::new(1),
            store_id: StoreId::new(1),
            name: "product1".into(),
        };
        let edges = vec![MaterialQuantity {
            id: MaterialQuantityId::new(1),
            product_id: product.id,
            material_id: MaterialId::new(4),
            quantity: 2,
        }];
        let batch = StockBatch::Sale(vec![SaleLine { product: product.id, quantity: 3 }]);

        assert_eq!(batch.product_ids(), vec![ProductId::new(1)]);
        assert_eq!(batch.material_ids(&edges), vec![MaterialId::new(4)]);

        let plan = batch
            .plan(&[material(4, 10, 10)], &edges, std::slice::from_ref(&product))
            .unwrap();
        assert_eq!(plan, vec![CapacityAdjustment { material_id: MaterialId::new(4), delta: -6 }]);

        let err = batch.plan(&[material(4, 10, 5)], &edges, &[product]).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
    }
}
