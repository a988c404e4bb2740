use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;

use stockroom_infra::{InventoryLevel, IssuedToken, RestockSummary};
use stockroom_inventory::{Material, RestockItem};
use stockroom_products::ProductCapacity;
use stockroom_sales::SaleLine;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RestockRequest {
    pub materials: Vec<RestockItem>,
    /// Echo of the quoted total; informational only.
    #[serde(default)]
    pub total_price: Option<Decimal>,
}

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    pub sale: Vec<SaleLine>,
}

pub fn token_to_json(token: IssuedToken) -> serde_json::Value {
    json!({
        "token": token.token,
        "expires_at": token.expires_at.to_rfc3339(),
    })
}

pub fn material_to_json(m: &Material) -> serde_json::Value {
    json!({
        "id": m.id,
        "name": m.name,
        "price": money(m.price),
        "store": m.store_id,
        "max_capacity": m.max_capacity,
        "current_capacity": m.current_capacity,
    })
}

pub fn restock_summary_to_json(summary: RestockSummary) -> serde_json::Value {
    let materials: Vec<serde_json::Value> = summary
        .candidates
        .iter()
        .map(|c| json!({ "id": c.material_id, "quantity": c.quantity_deficit }))
        .collect();

    let mut body = json!({
        "materials": materials,
        "total_price": money(summary.total_price),
    });
    if summary.candidates.is_empty() {
        body["messages"] = json!("Nothing to restock!");
    }
    body
}

pub fn inventory_to_json(levels: Vec<InventoryLevel>) -> serde_json::Value {
    json!(levels)
}

pub fn capacities_to_json(capacities: Vec<ProductCapacity>) -> serde_json::Value {
    json!({ "remaining_capacities": capacities })
}

/// Two decimal places, as a string.
fn money(value: Decimal) -> String {
    let mut value = value;
    value.rescale(2);
    value.to_string()
}
