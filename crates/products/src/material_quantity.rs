use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, DomainResult, Entity, MaterialId, MaterialQuantityId, ProductId};

/// Bill-of-materials edge: `quantity` units of `material_id` go into one unit
/// of `product_id`. A `(product, material)` pair appears at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialQuantity {
    pub id: MaterialQuantityId,
    pub product_id: ProductId,
    pub material_id: MaterialId,
    pub quantity: i64,
}

impl Entity for MaterialQuantity {
    type Id = MaterialQuantityId;

    fn id(&self) -> MaterialQuantityId {
        self.id
    }
}

/// Input for creating (or fully replacing) an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaterialQuantity {
    pub product_id: ProductId,
    pub material_id: MaterialId,
    #[serde(default)]
    pub quantity: i64,
}

impl NewMaterialQuantity {
    pub fn validate(self) -> DomainResult<Self> {
        validate_quantity(self.quantity)?;
        Ok(self)
    }
}

/// Partial update of an edge; absent fields keep their current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialQuantityPatch {
    pub product_id: Option<ProductId>,
    pub material_id: Option<MaterialId>,
    pub quantity: Option<i64>,
}

impl MaterialQuantityPatch {
    pub fn validate(self) -> DomainResult<Self> {
        if let Some(q) = self.quantity {
            validate_quantity(q)?;
        }
        Ok(self)
    }

    /// The edge as it would look after the patch.
    pub fn merged(&self, current: &MaterialQuantity) -> MaterialQuantity {
        MaterialQuantity {
            id: current.id,
            product_id: self.product_id.unwrap_or(current.product_id),
            material_id: self.material_id.unwrap_or(current.material_id),
            quantity: self.quantity.unwrap_or(current.quantity),
        }
    }
}

impl From<NewMaterialQuantity> for MaterialQuantityPatch {
    fn from(value: NewMaterialQuantity) -> Self {
        Self {
            product_id: Some(value.product_id),
            material_id: Some(value.material_id),
            quantity: Some(value.quantity),
        }
    }
}

fn validate_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity < 0 {
        return Err(DomainError::validation("Please enter a valid value"));
    }
    Ok(quantity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge() -> MaterialQuantity {
        MaterialQuantity {
            id: MaterialQuantityId::new(1),
            product_id: ProductId::new(1),
            material_id: MaterialId::new(1),
            quantity: 10,
        }
    }

    #[test]
    fn negative_quantity_is_rejected() {
        let input = NewMaterialQuantity {
            product_id: ProductId::new(1),
            material_id: MaterialId::new(1),
            quantity: -10,
        };
        assert!(matches!(input.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn partial_update_only_touches_given_fields() {
        let patch = MaterialQuantityPatch { quantity: Some(50), ..Default::default() }
            .validate()
            .unwrap();
        let merged = patch.merged(&edge());
        assert_eq!(merged.quantity, 50);
        assert_eq!(merged.product_id, ProductId::new(1));
        assert_eq!(merged.material_id, MaterialId::new(1));
    }
}
