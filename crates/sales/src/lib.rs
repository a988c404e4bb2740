//! Sales domain module: recording product sales against material stock.
//!
//! This crate contains the sale engine, implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod sale;

pub use sale::{SaleLine, SalePlan, plan_sale, validate_and_apply};
