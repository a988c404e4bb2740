//! Restock engine.
//!
//! A restock request moves `Requested → Validated → Applied`, or is
//! `Rejected` as a whole on the first invalid item:
//!
//! - [`validate_batch`] turns a request into a [`ValidatedRestock`] (or an error);
//! - [`apply_batch`] applies a validated restock to a working set of materials.
//!
//! Storage backends run both steps inside one transaction.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, MaterialId};

use crate::capacity::{CapacityAdjustment, RestockCandidate, apply_adjustments};
use crate::material::Material;

/// One line of a restock request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestockItem {
    pub id: MaterialId,
    pub quantity: i64,
}

/// A restock that passed validation against a snapshot of material state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRestock {
    adjustments: Vec<CapacityAdjustment>,
}

impl ValidatedRestock {
    /// One adjustment per touched material, ordered by material id.
    pub fn adjustments(&self) -> &[CapacityAdjustment] {
        &self.adjustments
    }

    pub fn into_adjustments(self) -> Vec<CapacityAdjustment> {
        self.adjustments
    }
}

/// Validate a restock batch against the acting store's materials.
///
/// `materials` must contain every material the caller is allowed to touch;
/// ids outside it are reported as not found. Repeated ids are summed before
/// the capacity check.
pub fn validate_batch(materials: &[Material], items: &[RestockItem]) -> DomainResult<ValidatedRestock> {
    let index: BTreeMap<MaterialId, &Material> = materials.iter().map(|m| (m.id, m)).collect();
    let mut totals: BTreeMap<MaterialId, i64> = BTreeMap::new();

    for item in items {
        if item.quantity < 0 {
            return Err(DomainError::validation("Please enter a valid value"));
        }
        let material = index
            .get(&item.id)
            .ok_or_else(|| DomainError::not_found("Material doesn't exists!"))?;

        let total = totals.entry(item.id).or_insert(0);
        *total = total
            .checked_add(item.quantity)
            .ok_or_else(|| DomainError::validation("Please enter a valid value"))?;

        let exceeds = material
            .current_capacity
            .checked_add(*total)
            .is_none_or(|next| next > material.max_capacity);
        if exceeds {
            return Err(DomainError::CapacityExceeded {
                material_id: material.id,
                requested: *total,
                max_capacity: material.max_capacity,
            });
        }
    }

    let adjustments = totals
        .into_iter()
        .filter(|(_, delta)| *delta != 0)
        .map(|(material_id, delta)| CapacityAdjustment { material_id, delta })
        .collect();

    Ok(ValidatedRestock { adjustments })
}

/// Apply a validated restock, returning the updated materials.
pub fn apply_batch(materials: &mut [Material], restock: &ValidatedRestock) -> DomainResult<Vec<Material>> {
    apply_adjustments(materials, restock.adjustments())
}

/// Informational total for the "what needs restocking" read path:
/// Σ deficit × unit price, rounded to two decimal places.
///
/// A total outside `Decimal`'s range is a computation error.
pub fn compute_total_price(candidates: &[RestockCandidate]) -> DomainResult<Decimal> {
    let overflow = || DomainError::computation("restock total price overflowed");
    candidates
        .iter()
        .try_fold(Decimal::ZERO, |total, c| {
            let line = Decimal::from(c.quantity_deficit).checked_mul(c.unit_price)?;
            total.checked_add(line)
        })
        .map(|total| total.round_dp(2))
        .ok_or_else(overflow)
}
