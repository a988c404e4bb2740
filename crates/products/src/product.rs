use serde::{Deserialize, Serialize};

use stockroom_core::validate::{self, MAX_NAME_LEN};
use stockroom_core::{DomainResult, Entity, ProductId, StoreId, StoreScoped};

/// Sellable item composed of materials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub name: String,
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> ProductId {
        self.id
    }
}

impl StoreScoped for Product {
    fn store_id(&self) -> StoreId {
        self.store_id
    }
}

/// Input for creating or renaming a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
}

impl NewProduct {
    pub fn validate(self) -> DomainResult<Self> {
        Ok(Self {
            name: validate::name(&self.name, "name", MAX_NAME_LEN)?,
        })
    }
}
