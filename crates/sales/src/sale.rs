//! Sale engine.
//!
//! A sale batch is all-or-nothing: every line is checked against the stock
//! snapshot, depletion is aggregated per material, and only then is a plan
//! produced. Storage applies the plan with one write per material.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, MaterialId, ProductId};
use stockroom_inventory::{CapacityAdjustment, Material, apply_adjustments};
use stockroom_products::{BillOfMaterials, MaterialQuantity, Product};

/// One line of a sale batch.
///
/// Quantities are not required to be positive: zero is a no-op and a
/// negative quantity returns material to stock.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product: ProductId,
    pub quantity: i64,
}

/// Aggregated material depletion of a validated sale batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SalePlan {
    depletion: BTreeMap<MaterialId, i64>,
}

impl SalePlan {
    /// Total units consumed per material across every line of the batch.
    pub fn depletion(&self) -> &BTreeMap<MaterialId, i64> {
        &self.depletion
    }

    /// One adjustment per consumed material, ordered by material id.
    pub fn adjustments(&self) -> Vec<CapacityAdjustment> {
        self.depletion
            .iter()
            .filter(|(_, total)| **total != 0)
            .map(|(material_id, total)| CapacityAdjustment {
                material_id: *material_id,
                delta: -*total,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.depletion.values().all(|total| *total == 0)
    }
}

/// Validate a sale batch against a stock snapshot and aggregate its depletion.
///
/// `products` are the products of the acting store; lines naming anything
/// else are reported as not found.
pub fn plan_sale(bom: &BillOfMaterials, products: &[Product], lines: &[SaleLine]) -> DomainResult<SalePlan> {
    let known: BTreeSet<ProductId> = products.iter().map(|p| p.id).collect();
    let mut depletion: BTreeMap<MaterialId, i64> = BTreeMap::new();

    for line in lines {
        if !known.contains(&line.product) {
            return Err(DomainError::not_found("Product doesn't exists!"));
        }

        for edge in bom.edges_for(line.product) {
            let required = edge
                .per_unit_quantity
                .checked_mul(line.quantity)
                .ok_or_else(|| DomainError::validation("Please enter a valid sale data"))?;
            let available = bom.stock_of(edge.material_id)?;
            ensure_stock(edge.material_id, required, available)?;

            let total = depletion.entry(edge.material_id).or_insert(0);
            *total = total
                .checked_add(required)
                .ok_or_else(|| DomainError::validation("Please enter a valid sale data"))?;
        }
    }

    // Lines sharing a material must fit together, not just one at a time.
    for (material_id, total) in &depletion {
        ensure_stock(*material_id, *total, bom.stock_of(*material_id)?)?;
    }

    Ok(SalePlan { depletion })
}

/// Plan a sale and apply it to a working set of materials.
///
/// On error the materials are left untouched.
pub fn validate_and_apply(
    materials: &mut [Material],
    edges: &[MaterialQuantity],
    products: &[Product],
    lines: &[SaleLine],
) -> DomainResult<Vec<Material>> {
    let bom = BillOfMaterials::new(edges, materials);
    let plan = plan_sale(&bom, products, lines)?;
    apply_adjustments(materials, &plan.adjustments())
}

fn ensure_stock(material_id: MaterialId, required: i64, available: i64) -> DomainResult<()> {
    let remaining = available.checked_sub(required);
    if remaining.is_none_or(|r| r < 0) {
        return Err(DomainError::InsufficientStock {
            material_id,
            required,
            available,
        });
    }
    Ok(())
}
