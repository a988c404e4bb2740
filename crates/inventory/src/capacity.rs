//! Capacity ledger: the rules behind `max_capacity` / `current_capacity`.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, MaterialId};

use crate::material::Material;

/// A planned change to one material's `current_capacity`.
///
/// Positive deltas restock, negative deltas deplete. Both engines produce
/// these; storage applies them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityAdjustment {
    pub material_id: MaterialId,
    pub delta: i64,
}

/// A material that is below its `max_capacity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockCandidate {
    pub material_id: MaterialId,
    pub quantity_deficit: i64,
    pub unit_price: Decimal,
}

/// Reject negative capacities.
pub fn validate_capacity(value: i64) -> DomainResult<i64> {
    if value < 0 {
        return Err(DomainError::validation("Please enter a valid value"));
    }
    Ok(value)
}

/// `current_capacity / max_capacity`.
///
/// A zero `max_capacity` is reported as a computation error; callers decide
/// how to surface it.
pub fn percentage_of_capacity(material: &Material) -> DomainResult<f64> {
    if material.max_capacity == 0 {
        return Err(DomainError::computation(format!(
            "division by zero: material {} has no max_capacity",
            material.id
        )));
    }
    Ok(material.current_capacity as f64 / material.max_capacity as f64)
}

/// Materials with a positive deficit, ordered by material id.
pub fn restock_candidates(materials: &[Material]) -> Vec<RestockCandidate> {
    let mut candidates: Vec<RestockCandidate> = materials
        .iter()
        .filter_map(|m| {
            let deficit = m.max_capacity - m.current_capacity;
            (deficit > 0).then(|| RestockCandidate {
                material_id: m.id,
                quantity_deficit: deficit,
                unit_price: m.price,
            })
        })
        .collect();
    candidates.sort_by_key(|c| c.material_id);
    candidates
}

/// `current_capacity += delta`. Bounds are checked when a batch is validated,
/// not here.
pub fn apply_delta(mut material: Material, delta: i64) -> Material {
    material.current_capacity += delta;
    material
}

/// Apply planned adjustments to a working set of materials, returning the
/// updated records in adjustment order.
pub fn apply_adjustments(
    materials: &mut [Material],
    adjustments: &[CapacityAdjustment],
) -> DomainResult<Vec<Material>> {
    let index: BTreeMap<MaterialId, usize> = materials
        .iter()
        .enumerate()
        .map(|(idx, m)| (m.id, idx))
        .collect();

    // Resolve every target first so a bad adjustment leaves the set untouched.
    let targets = adjustments
        .iter()
        .map(|adj| {
            index
                .get(&adj.material_id)
                .map(|idx| (*idx, adj.delta))
                .ok_or_else(|| DomainError::not_found("Material doesn't exists!"))
        })
        .collect::<DomainResult<Vec<_>>>()?;

    let mut updated = Vec::with_capacity(targets.len());
    for (idx, delta) in targets {
        let next = apply_delta(materials[idx].clone(), delta);
        materials[idx] = next.clone();
        updated.push(next);
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockroom_core::StoreId;

    fn material(id: i64, max: i64, current: i64) -> Material {
        Material {
            id: MaterialId::new(id),
            store_id: StoreId::new(1),
            name: format!("material{id}"),
            price: Decimal::new(1250, 2),
            max_capacity: max,
            current_capacity: current,
        }
    }

    #[test]
    fn validate_capacity_rejects_negative_values() {
        assert_eq!(validate_capacity(0), Ok(0));
        assert_eq!(validate_capacity(100), Ok(100));
        assert!(matches!(validate_capacity(-1), Err(DomainError::Validation(_))));
    }

    #[test]
    fn percentage_of_capacity_divides_current_by_max() {
        let pct = percentage_of_capacity(&material(1, 100, 51)).unwrap();
        assert!((pct - 0.51).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_of_capacity_surfaces_division_by_zero() {
        match percentage_of_capacity(&material(1, 0, 0)) {
            Err(DomainError::Computation(_)) => {}
            other => panic!("expected computation error, got {other:?}"),
        }
    }

    #[test]
    fn full_materials_are_not_restock_candidates() {
        let materials = vec![material(3, 100, 48), material(1, 100, 100), material(2, 100, 49)];
        let candidates = restock_candidates(&materials);

        let ids: Vec<i64> = candidates.iter().map(|c| c.material_id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
        assert_eq!(candidates[0].quantity_deficit, 51);
        assert_eq!(candidates[1].quantity_deficit, 52);
    }

    #[test]
    fn over_capacity_materials_are_not_candidates() {
        let candidates = restock_candidates(&[material(1, 10, 12)]);
        assert!(candidates.is_empty());
    }

    #[test]
    fn apply_delta_moves_current_capacity_both_ways() {
        let m = apply_delta(material(1, 100, 40), 25);
        assert_eq!(m.current_capacity, 65);
        let m = apply_delta(m, -65);
        assert_eq!(m.current_capacity, 0);
    }

    #[test]
    fn apply_adjustments_rejects_unknown_material() {
        let mut materials = vec![material(1, 100, 0)];
        let err = apply_adjustments(
            &mut materials,
            &[CapacityAdjustment { material_id: MaterialId::new(9), delta: 1 }],
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }
}
