use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_core::validate::{self, MAX_NAME_LEN};
use stockroom_core::{DomainError, DomainResult, Entity, MaterialId, StoreId, StoreScoped};

use crate::capacity::validate_capacity;

/// Price precision: `NUMERIC(20, 2)`.
const PRICE_SCALE: u32 = 2;
const PRICE_MAX_DIGITS: u32 = 20;

/// Raw stock item with a bounded capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    pub id: MaterialId,
    pub store_id: StoreId,
    pub name: String,
    pub price: Decimal,
    pub max_capacity: i64,
    pub current_capacity: i64,
}

impl Entity for Material {
    type Id = MaterialId;

    fn id(&self) -> MaterialId {
        self.id
    }
}

impl StoreScoped for Material {
    fn store_id(&self) -> StoreId {
        self.store_id
    }
}

/// Input for creating a material. Capacities default to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMaterial {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub max_capacity: i64,
    #[serde(default)]
    pub current_capacity: i64,
}

impl NewMaterial {
    pub fn validate(self) -> DomainResult<Self> {
        Ok(Self {
            name: validate::name(&self.name, "name", MAX_NAME_LEN)?,
            price: validate_price(self.price)?,
            max_capacity: validate_capacity(self.max_capacity)?,
            current_capacity: validate_capacity(self.current_capacity)?,
        })
    }
}

/// General-purpose update. `current_capacity` only moves through restock and
/// sale, so it is not part of the update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialUpdate {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub max_capacity: i64,
}

impl MaterialUpdate {
    pub fn validate(self) -> DomainResult<Self> {
        Ok(Self {
            name: validate::name(&self.name, "name", MAX_NAME_LEN)?,
            price: validate_price(self.price)?,
            max_capacity: validate_capacity(self.max_capacity)?,
        })
    }

    pub fn apply_to(&self, material: &mut Material) {
        material.name = self.name.clone();
        material.price = self.price;
        material.max_capacity = self.max_capacity;
    }
}

/// Check a price against `NUMERIC(20, 2)` and normalize it to two decimal places.
pub fn validate_price(price: Decimal) -> DomainResult<Decimal> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::validation("Please enter a valid value"));
    }
    if price.normalize().scale() > PRICE_SCALE {
        return Err(DomainError::validation(
            "Ensure that there are no more than 2 decimal places.",
        ));
    }

    let mut price = price;
    price.rescale(PRICE_SCALE);
    if price.mantissa().unsigned_abs() >= 10u128.pow(PRICE_MAX_DIGITS) {
        return Err(DomainError::validation(
            "Ensure that there are no more than 20 digits in total.",
        ));
    }
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn new_material_rejects_negative_capacities() {
        let input = NewMaterial {
            name: "material1".into(),
            price: dec("12.50"),
            max_capacity: -10,
            current_capacity: -10,
        };
        match input.validate() {
            Err(DomainError::Validation(_)) => {}
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_material_accepts_defaults() {
        let input = NewMaterial {
            name: "material1".into(),
            price: dec("12.5"),
            max_capacity: 0,
            current_capacity: 0,
        };
        let valid = input.validate().unwrap();
        assert_eq!(valid.price.to_string(), "12.50");
    }

    #[test]
    fn price_rejects_extra_precision_and_negative_values() {
        assert!(validate_price(dec("1.005")).is_err());
        assert!(validate_price(dec("-0.01")).is_err());
        assert!(validate_price(dec("1.500")).is_ok());
        assert!(validate_price(dec("123456789012345678.99")).is_ok());
        assert!(validate_price(dec("1234567890123456789.00")).is_err());
    }

    #[test]
    fn update_leaves_current_capacity_alone() {
        let mut material = Material {
            id: MaterialId::new(1),
            store_id: StoreId::new(1),
            name: "material1".into(),
            price: dec("12.50"),
            max_capacity: 0,
            current_capacity: 0,
        };
        let update = MaterialUpdate {
            name: "material1".into(),
            price: dec("12.50"),
            max_capacity: 200,
        }
        .validate()
        .unwrap();

        update.apply_to(&mut material);
        assert_eq!(material.max_capacity, 200);
        assert_eq!(material.current_capacity, 0);
    }
}
