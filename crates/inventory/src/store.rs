use serde::{Deserialize, Serialize};

use stockroom_core::validate::{self, MAX_NAME_LEN};
use stockroom_core::{DomainResult, Entity, StoreId, UserId};

/// A user's store: the tenant boundary owning materials and products.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub user_id: UserId,
}

impl Entity for Store {
    type Id = StoreId;

    fn id(&self) -> StoreId {
        self.id
    }
}

/// Input for opening a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewStore {
    pub name: String,
}

impl NewStore {
    pub fn validate(self) -> DomainResult<Self> {
        Ok(Self {
            name: validate::name(&self.name, "name", MAX_NAME_LEN)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_store_requires_a_name() {
        assert!(NewStore { name: " ".into() }.validate().is_err());
        let store = NewStore { name: " corner shop ".into() }.validate().unwrap();
        assert_eq!(store.name, "corner shop");
    }
}
