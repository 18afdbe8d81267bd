//! Order subcommands.

use anyhow::Result;
use serde_json::{Value, json};

use crate::wildberries::OrdersApi;

#[tracing::instrument(skip(api))]
pub async fn list_new_orders<O: OrdersApi + ?Sized>(api: &O, account: &str) -> Result<Value> {
    let orders = api.list_new_orders().await?;
    Ok(json!({ account: orders }))
}

#[tracing::instrument(skip(api))]
pub async fn list_orders<O: OrdersApi + ?Sized>(api: &O, account: &str) -> Result<Value> {
    let orders = api.list_orders().await?;
    Ok(json!({ account: orders }))
}

/// `{ account: { supply_id: [statuses...] } }`
#[tracing::instrument(skip(api))]
pub async fn order_statuses<O: OrdersApi + ?Sized>(
    api: &O,
    account: &str,
    supply_id: &str,
    order_ids: &[u64],
) -> Result<Value> {
    let statuses = api.get_supply_order_statuses(supply_id, order_ids).await?;
    Ok(json!({ account: statuses }))
}

/// `{ account: { supply_id: { "stickers": [...] } } }`
#[tracing::instrument(skip(api, order_ids))]
pub async fn stickers<O: OrdersApi + ?Sized>(
    api: &O,
    account: &str,
    supply_id: &str,
    order_ids: &[u64],
) -> Result<Value> {
    let stickers = api.get_stickers(supply_id, order_ids).await?;
    Ok(json!({ account: stickers }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wildberries::Stickers;
    use crate::wildberries::orders::MockOrdersApi;
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn test_list_new_orders_keyed_by_account() {
        let mut api = MockOrdersApi::new();
        api.expect_list_new_orders().returning(|| {
            Ok(vec![
                serde_json::from_value(json!({ "id": 5, "article": "wild1" })).unwrap(),
            ])
        });

        let result = list_new_orders(&api, "main").await.unwrap();
        assert_eq!(result, json!({ "main": [{ "id": 5, "article": "wild1" }] }));
    }

    #[tokio::test]
    async fn test_list_orders_error_propagates() {
        let mut api = MockOrdersApi::new();
        api.expect_list_orders()
            .returning(|| Err(anyhow::anyhow!("connection reset")));

        assert!(list_orders(&api, "main").await.is_err());
    }

    #[tokio::test]
    async fn test_order_statuses_passes_ids() {
        let mut api = MockOrdersApi::new();
        api.expect_get_supply_order_statuses()
            .withf(|supply_id, ids| supply_id.to_string() == "WB-GI-1" && ids.to_vec() == vec![1u64, 2])
            .returning(|supply_id, _| {
                Ok(BTreeMap::from([(
                    supply_id.to_string(),
                    vec![json!({ "id": 1 }), json!({ "id": 2 })],
                )]))
            });

        let result = order_statuses(&api, "main", "WB-GI-1", &[1, 2]).await.unwrap();
        assert_eq!(result["main"]["WB-GI-1"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_stickers_keyed_by_account() {
        let mut api = MockOrdersApi::new();
        api.expect_get_stickers().returning(|supply_id, _| {
            Ok(BTreeMap::from([(
                supply_id.to_string(),
                Stickers {
                    stickers: vec![json!({ "orderId": 1 })],
                },
            )]))
        });

        let result = stickers(&api, "main", "WB-GI-1", &[1]).await.unwrap();
        assert_eq!(
            result,
            json!({ "main": { "WB-GI-1": { "stickers": [{ "orderId": 1 }] } } })
        );
    }
}
