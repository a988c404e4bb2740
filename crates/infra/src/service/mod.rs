//! Orchestration over the repository: the operations the HTTP layer calls.

pub mod accounts;
pub mod inventory;

pub use accounts::{AccountService, IssuedToken};
pub use inventory::{InventoryLevel, InventoryService, RestockSummary};
