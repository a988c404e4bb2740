//! Entity trait: identity + continuity across state changes.

use crate::id::StoreId;

/// Entity marker + minimal interface.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + Ord + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// An entity owned exclusively by one store (the tenant boundary).
pub trait StoreScoped: Entity {
    fn store_id(&self) -> StoreId;

    /// True when the entity belongs to `store_id`.
    fn belongs_to(&self, store_id: StoreId) -> bool {
        self.store_id() == store_id
    }
}
