use anyhow::Result;
use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, info, warn};
use serde_json::{Value, json};
use std::collections::BTreeMap;

use super::fetch_all_pages;
use super::types::{Order, OrderStatuses, OrdersPage, Stickers};
use crate::account::Account;
use crate::http::DecodeError;

pub const MARKETPLACE_ORDERS_URL: &str = "https://marketplace-api.wildberries.ru/api/v3/orders";

/// The stickers endpoint accepts at most this many order ids per request.
pub const STICKER_BATCH_SIZE: usize = 99;

const STICKER_QUERY: [(&str, &str); 3] = [("type", "png"), ("width", "58"), ("height", "40")];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrdersApi: Send + Sync {
    /// New assembly tasks, all pages concatenated.
    async fn list_new_orders(&self) -> Result<Vec<Order>>;
    /// All assembly tasks, all pages concatenated.
    async fn list_orders(&self) -> Result<Vec<Order>>;
    async fn get_orders_statuses(&self, order_ids: &[u64]) -> Result<Value>;
    /// `{ supply_id: [ ...statuses ] }`
    async fn get_supply_order_statuses(
        &self,
        supply_id: &str,
        order_ids: &[u64],
    ) -> Result<BTreeMap<String, Vec<Value>>>;
    /// `{ supply_id: { "stickers": [...] } }`, fetched in batches of [`STICKER_BATCH_SIZE`].
    async fn get_stickers(
        &self,
        supply_id: &str,
        order_ids: &[u64],
    ) -> Result<BTreeMap<String, Stickers>>;
}

pub struct Orders {
    account: Account,
    url: String,
}

impl Orders {
    #[tracing::instrument(skip(account, url))]
    pub fn new(account: Account, url: Option<String>) -> Self {
        let url = url.unwrap_or_else(|| MARKETPLACE_ORDERS_URL.to_string());
        Self {
            account,
            url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }
}

#[async_trait]
impl OrdersApi for Orders {
    #[tracing::instrument(skip(self))]
    async fn list_new_orders(&self) -> Result<Vec<Order>> {
        let url = format!("{}/new", self.url);
        fetch_all_pages::<OrdersPage>(&self.account, &url, "new orders").await
    }

    #[tracing::instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<Order>> {
        fetch_all_pages::<OrdersPage>(&self.account, &self.url, "orders").await
    }

    #[tracing::instrument(skip(self, order_ids))]
    async fn get_orders_statuses(&self, order_ids: &[u64]) -> Result<Value> {
        let url = format!("{}/status", self.url);
        debug!("Requesting statuses for {:?}", order_ids);
        self.account
            .http()
            .post_json(&url, &[], &json!({ "orders": order_ids }))
            .await
    }

    #[tracing::instrument(skip(self, order_ids))]
    async fn get_supply_order_statuses(
        &self,
        supply_id: &str,
        order_ids: &[u64],
    ) -> Result<BTreeMap<String, Vec<Value>>> {
        let response = self.get_orders_statuses(order_ids).await?;
        let statuses: OrderStatuses = crate::http::decode::decode(response)?;
        info!(
            "Got {} order statuses for supply {}, account {}",
            statuses.orders.len(),
            supply_id,
            self.account.name()
        );
        Ok(BTreeMap::from([(supply_id.to_string(), statuses.orders)]))
    }

    #[tracing::instrument(skip(self, order_ids))]
    async fn get_stickers(
        &self,
        supply_id: &str,
        order_ids: &[u64],
    ) -> Result<BTreeMap<String, Stickers>> {
        info!(
            "Getting stickers for supply {}, account {}, orders count: {}",
            supply_id,
            self.account.name(),
            order_ids.len()
        );

        let url = format!("{}/stickers", self.url);
        let batches: Vec<&[u64]> = order_ids.chunks(STICKER_BATCH_SIZE).collect();
        debug!("Split into {} batches", batches.len());

        let responses = join_all(batches.iter().map(|batch| {
            let body = json!({ "orders": batch });
            let url = &url;
            async move {
                self.account
                    .http()
                    .post_json::<_, Stickers>(url, &STICKER_QUERY, &body)
                    .await
            }
        }))
        .await;

        let mut merged = Stickers::default();
        for (i, response) in responses.into_iter().enumerate() {
            match response {
                Ok(batch) => {
                    debug!("Batch {}: {} stickers", i + 1, batch.stickers.len());
                    merged.stickers.extend(batch.stickers);
                }
                Err(e) if e.downcast_ref::<DecodeError>().is_some() => {
                    warn!("Skipping sticker batch {}: {}", i + 1, e);
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            "Completed getting stickers for supply {}. Total stickers: {}",
            supply_id,
            merged.stickers.len()
        );
        Ok(BTreeMap::from([(supply_id.to_string(), merged)]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpClient;
    use mockito::{Matcher, Server};
    use reqwest::Client;

    fn orders_for(server: &Server) -> Orders {
        let account = Account::with_client("main", HttpClient::new(Client::new()));
        Orders::new(account, Some(server.url()))
    }

    fn sticker_query() -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("type".into(), "png".into()),
            Matcher::UrlEncoded("width".into(), "58".into()),
            Matcher::UrlEncoded("height".into(), "40".into()),
        ])
    }

    #[tokio::test]
    async fn test_list_new_orders_follows_next() {
        let mut server = Server::new_async().await;

        let first = server
            .mock("GET", "/new")
            .match_query(Matcher::UrlEncoded("next".into(), "0".into()))
            .with_status(200)
            .with_body(r#"{"orders": [{"id": 1}, {"id": 2}], "next": 9}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/new")
            .match_query(Matcher::UrlEncoded("next".into(), "9".into()))
            .with_status(200)
            .with_body(r#"{"orders": [{"id": 3}]}"#)
            .expect(1)
            .create_async()
            .await;

        let orders = orders_for(&server).list_new_orders().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        let ids: Vec<Option<u64>> = orders.iter().map(Order::order_id).collect();
        assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_list_orders_single_page() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("limit".into(), "1000".into()))
            .with_status(200)
            .with_body(r#"{"orders": [{"id": 7, "supplyId": "WB-GI-1"}], "next": 0}"#)
            .expect(1)
            .create_async()
            .await;

        let orders = orders_for(&server).list_orders().await.unwrap();

        mock.assert_async().await;
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].extra.get("supplyId"), Some(&json!("WB-GI-1")));
    }

    #[tokio::test]
    async fn test_list_orders_keeps_orders_without_numeric_id() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("GET", "/")
            .match_query(Matcher::UrlEncoded("next".into(), "0".into()))
            .with_status(200)
            .with_body(r#"{"orders": [{"rid": "abc", "article": "x"}, {"id": "7a"}]}"#)
            .create_async()
            .await;

        let orders = orders_for(&server).list_orders().await.unwrap();

        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].extra.get("rid"), Some(&json!("abc")));
        assert_eq!(orders[1].id, Some(json!("7a")));
        assert_eq!(orders[1].order_id(), None);
    }

    #[tokio::test]
    async fn test_get_supply_order_statuses() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/status")
            .match_body(Matcher::Json(json!({ "orders": [1, 2] })))
            .with_status(200)
            .with_body(
                r#"{"orders": [{"id": 1, "supplierStatus": "complete"}, {"id": 2, "supplierStatus": "cancel"}]}"#,
            )
            .create_async()
            .await;

        let result = orders_for(&server)
            .get_supply_order_statuses("WB-GI-1", &[1, 2])
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result["WB-GI-1"].len(), 2);
        assert_eq!(result["WB-GI-1"][1]["supplierStatus"], json!("cancel"));
    }

    #[tokio::test]
    async fn test_get_stickers_batches_and_merges() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/stickers")
            .match_query(sticker_query())
            .with_status(200)
            .with_body(r#"{"stickers": [{"orderId": 1, "file": "aGVsbG8="}]}"#)
            .expect(3)
            .create_async()
            .await;

        let ids: Vec<u64> = (1..=200).collect();
        let result = orders_for(&server)
            .get_stickers("WB-GI-1", &ids)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(result["WB-GI-1"].stickers.len(), 3);
    }

    #[tokio::test]
    async fn test_get_stickers_skips_undecodable_batch() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/stickers")
            .match_query(sticker_query())
            .with_status(200)
            .with_body("garbage")
            .expect(2)
            .create_async()
            .await;

        let ids: Vec<u64> = (1..=100).collect();
        let result = orders_for(&server)
            .get_stickers("WB-GI-1", &ids)
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(result["WB-GI-1"].stickers.is_empty());
    }

    #[tokio::test]
    async fn test_get_stickers_propagates_client_errors() {
        let mut server = Server::new_async().await;

        let _mock = server
            .mock("POST", "/stickers")
            .match_query(sticker_query())
            .with_status(401)
            .create_async()
            .await;

        let result = orders_for(&server).get_stickers("WB-GI-1", &[1]).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_stickers_no_orders_no_requests() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("POST", "/stickers")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let result = orders_for(&server).get_stickers("WB-GI-1", &[]).await.unwrap();

        mock.assert_async().await;
        assert!(result["WB-GI-1"].stickers.is_empty());
    }
}
