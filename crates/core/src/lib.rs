//! `stockroom-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! typed identifiers, the entity contract and the shared error model.

pub mod entity;
pub mod error;
pub mod id;
pub mod validate;

pub use entity::{Entity, StoreScoped};
pub use error::{DomainError, DomainResult};
pub use id::{MaterialId, MaterialQuantityId, ProductId, StoreId, UserId};
