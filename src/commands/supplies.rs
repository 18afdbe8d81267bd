//! Supply subcommands. Results are keyed by account name.

use anyhow::Result;
use log::warn;
use serde_json::{Value, json};

use crate::wildberries::SuppliesApi;

/// `{ account: [supplies...] }`, optionally only the open ones.
#[tracing::instrument(skip(api))]
pub async fn list_supplies<S: SuppliesApi + ?Sized>(
    api: &S,
    account: &str,
    open_only: bool,
) -> Result<Value> {
    let supplies = if open_only {
        api.list_open_supplies().await?
    } else {
        api.list_supplies().await?
    };
    Ok(json!({ account: supplies }))
}

/// `{ account: { supply_id: { "orders": [...] } } }`
#[tracing::instrument(skip(api))]
pub async fn supply_orders<S: SuppliesApi + ?Sized>(
    api: &S,
    account: &str,
    supply_id: &str,
) -> Result<Value> {
    let orders = api.get_supply_orders(supply_id).await?;
    Ok(json!({ account: orders }))
}

#[tracing::instrument(skip(api))]
pub async fn create_supply<S: SuppliesApi + ?Sized>(api: &S, name: &str) -> Result<Value> {
    api.create_supply(name).await
}

#[tracing::instrument(skip(api))]
pub async fn add_order<S: SuppliesApi + ?Sized>(
    api: &S,
    supply_id: &str,
    order_id: u64,
) -> Result<Value> {
    api.add_order_to_supply(supply_id, order_id).await
}

#[tracing::instrument(skip(api))]
pub async fn delete_supply<S: SuppliesApi + ?Sized>(api: &S, supply_id: &str) -> Result<Value> {
    api.delete_supply(supply_id).await
}

/// `{ "supplyId": ..., "status": ... }`. A rejected delivery is reported, not raised.
#[tracing::instrument(skip(api))]
pub async fn deliver_supply<S: SuppliesApi + ?Sized>(api: &S, supply_id: &str) -> Result<Value> {
    let status = api.deliver_supply(supply_id).await?;
    if !(200..300).contains(&status) {
        warn!("Supply {} was not delivered, status {}", supply_id, status);
    }
    Ok(json!({ "supplyId": supply_id, "status": status }))
}
