//! Bill-of-materials resolver.
//!
//! Products and materials are linked through [`MaterialQuantity`] edges. The
//! resolver indexes those edges and a stock snapshot by id, so every lookup is
//! an id lookup (no reliance on record identity).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, MaterialId, ProductId};
use stockroom_inventory::Material;

use crate::material_quantity::MaterialQuantity;
use crate::product::Product;

/// One material requirement of a product.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BomEdge {
    pub material_id: MaterialId,
    pub per_unit_quantity: i64,
}

/// How many units of a product the current stock can produce.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCapacity {
    pub product: ProductId,
    pub quantity: i64,
}

/// Id-indexed view over bill-of-materials edges and material stock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BillOfMaterials {
    edges: BTreeMap<ProductId, Vec<BomEdge>>,
    stock: BTreeMap<MaterialId, i64>,
}

impl BillOfMaterials {
    pub fn new(edges: &[MaterialQuantity], materials: &[Material]) -> Self {
        let mut by_product: BTreeMap<ProductId, Vec<BomEdge>> = BTreeMap::new();
        for edge in edges {
            by_product.entry(edge.product_id).or_default().push(BomEdge {
                material_id: edge.material_id,
                per_unit_quantity: edge.quantity,
            });
        }
        for list in by_product.values_mut() {
            list.sort_by_key(|e| e.material_id);
        }

        let stock = materials.iter().map(|m| (m.id, m.current_capacity)).collect();

        Self { edges: by_product, stock }
    }

    /// All material requirements of `product`, ordered by material id.
    pub fn edges_for(&self, product: ProductId) -> &[BomEdge] {
        self.edges.get(&product).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current capacity of a material in the snapshot.
    pub fn stock_of(&self, material: MaterialId) -> DomainResult<i64> {
        self.stock
            .get(&material)
            .copied()
            .ok_or_else(|| DomainError::not_found("Material doesn't exists!"))
    }

    /// Maximum units of `product` the current stock can produce.
    ///
    /// A product without a recipe produces nothing. Edges with a per-unit
    /// quantity of zero do not constrain production. One material short of a
    /// single unit blocks production entirely.
    pub fn producible_quantity(&self, product: ProductId) -> DomainResult<i64> {
        let mut producible: Option<i64> = None;

        for edge in self.edges_for(product) {
            if edge.per_unit_quantity == 0 {
                continue;
            }
            let units = self.stock_of(edge.material_id)?.div_euclid(edge.per_unit_quantity);
            if units <= 0 {
                return Ok(0);
            }
            producible = Some(producible.map_or(units, |current| current.min(units)));
        }

        Ok(producible.unwrap_or(0))
    }

    /// Producible quantity for each product, ordered by product id.
    pub fn producible_quantities(&self, products: &[Product]) -> DomainResult<Vec<ProductCapacity>> {
        let mut capacities = products
            .iter()
            .map(|p| {
                Ok(ProductCapacity {
                    product: p.id,
                    quantity: self.producible_quantity(p.id)?,
                })
            })
            .collect::<DomainResult<Vec<_>>>()?;
        capacities.sort_by_key(|c| c.product);
        Ok(capacities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use stockroom_core::{MaterialQuantityId, StoreId};

    fn material(id: i64, current: i64) -> Material {
        Material {
            id: MaterialId::new(id),
            store_id: StoreId::new(1),
            name: format!("material{id}"),
            price: Decimal::new(1250, 2),
            max_capacity: 100,
            current_capacity: current,
        }
    }

    fn edge(id: i64, product: i64, material: i64, quantity: i64) -> MaterialQuantity {
        MaterialQuantity {
            id: MaterialQuantityId::new(id),
            product_id: ProductId::new(product),
            material_id: MaterialId::new(material),
            quantity,
        }
    }

    fn product(id: i64) -> Product {
        Product {
            id: ProductId::new(id),
            store_id: StoreId::new(1),
            name: format!("product{id}"),
        }
    }

    #[test]
    fn producible_quantity_is_the_scarcest_material() {
        let bom = BillOfMaterials::new(
            &[edge(1, 1, 1, 10), edge(2, 1, 2, 6)],
            &[material(1, 100), material(2, 51)],
        );
        assert_eq!(bom.producible_quantity(ProductId::new(1)), Ok(8));
    }

    #[test]
    fn product_without_recipe_produces_nothing() {
        let bom = BillOfMaterials::new(&[], &[material(1, 100)]);
        assert_eq!(bom.producible_quantity(ProductId::new(1)), Ok(0));
        assert!(bom.edges_for(ProductId::new(1)).is_empty());
    }

    #[test]
    fn one_short_material_blocks_production() {
        let bom = BillOfMaterials::new(
            &[edge(1, 1, 1, 10), edge(2, 1, 2, 60)],
            &[material(1, 100), material(2, 59)],
        );
        assert_eq!(bom.producible_quantity(ProductId::new(1)), Ok(0));
    }

    #[test]
    fn zero_quantity_edges_do_not_constrain() {
        let bom = BillOfMaterials::new(
            &[edge(1, 1, 1, 0), edge(2, 1, 2, 5)],
            &[material(1, 0), material(2, 51)],
        );
        assert_eq!(bom.producible_quantity(ProductId::new(1)), Ok(10));

        let only_zero = BillOfMaterials::new(&[edge(1, 2, 1, 0)], &[material(1, 100)]);
        assert_eq!(only_zero.producible_quantity(ProductId::new(2)), Ok(0));
    }

    #[test]
    fn edge_to_unknown_material_is_not_found() {
        let bom = BillOfMaterials::new(&[edge(1, 1, 7, 1)], &[material(1, 100)]);
        assert!(matches!(
            bom.producible_quantity(ProductId::new(1)),
            Err(DomainError::NotFound(_))
        ));
    }

    #[test]
    fn producible_quantities_cover_every_product_in_id_order() {
        let bom = BillOfMaterials::new(
            &[edge(1, 1, 1, 10), edge(2, 2, 1, 30)],
            &[material(1, 100)],
        );
        let capacities = bom
            .producible_quantities(&[product(3), product(2), product(1)])
            .unwrap();

        assert_eq!(
            capacities,
            vec![
                ProductCapacity { product: ProductId::new(1), quantity: 10 },
                ProductCapacity { product: ProductId::new(2), quantity: 3 },
                ProductCapacity { product: ProductId::new(3), quantity: 0 },
            ]
        );
    }

    #[test]
    fn edges_are_ordered_by_material() {
        let bom = BillOfMaterials::new(&[edge(1, 1, 3, 1), edge(2, 1, 2, 1)], &[]);
        let ids: Vec<i64> = bom
            .edges_for(ProductId::new(1))
            .iter()
            .map(|e| e.material_id.get())
            .collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: the producible quantity is always coverable by stock,
            /// and one more unit is not.
            #[test]
            fn producible_quantity_is_tight(
                stock in prop::collection::vec(0i64..500, 1..6),
                per_unit in prop::collection::vec(1i64..20, 1..6),
            ) {
                let n = stock.len().min(per_unit.len());
                let materials: Vec<Material> =
                    (0..n).map(|i| material(i as i64 + 1, stock[i])).collect();
                let edges: Vec<MaterialQuantity> = (0..n)
                    .map(|i| edge(i as i64 + 1, 1, i as i64 + 1, per_unit[i]))
                    .collect();
                let bom = BillOfMaterials::new(&edges, &materials);

                let q = bom.producible_quantity(ProductId::new(1)).unwrap();
                prop_assert!(q >= 0);
                for i in 0..n {
                    prop_assert!(per_unit[i] * q <= stock[i]);
                }
                let one_more_fits = (0..n).all(|i| per_unit[i] * (q + 1) <= stock[i]);
                prop_assert!(!one_more_fits);
            }
        }
    }
}
