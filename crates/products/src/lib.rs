//! Products domain module: sellable products and their bills of materials.
//!
//! This crate contains the bill-of-materials resolver, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod bom;
pub mod material_quantity;
pub mod product;

pub use bom::{BillOfMaterials, BomEdge, ProductCapacity};
pub use material_quantity::{MaterialQuantity, MaterialQuantityPatch, NewMaterialQuantity};
pub use product::{NewProduct, Product};
