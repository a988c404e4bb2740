//! Inventory domain module: stores, materials and their capacities.
//!
//! This crate contains the capacity ledger and the restock engine, implemented
//! purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod capacity;
pub mod material;
pub mod restock;
pub mod store;

pub use capacity::{
    CapacityAdjustment, RestockCandidate, apply_adjustments, apply_delta, percentage_of_capacity,
    restock_candidates, validate_capacity,
};
pub use material::{Material, MaterialUpdate, NewMaterial, validate_price};
pub use restock::{RestockItem, ValidatedRestock, apply_batch, compute_total_price, validate_batch};
pub use store::{NewStore, Store};
