use anyhow::Result;
use async_trait::async_trait;
use log::info;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use super::fetch_all_pages;
use super::types::{SuppliesPage, Supply, SupplyOrders};
use crate::account::Account;
use crate::http::RetryPolicy;

pub const MARKETPLACE_SUPPLIES_URL: &str =
    "https://marketplace-api.wildberries.ru/api/v3/supplies";

/// Supply operations. Lifecycle rules (deleting only empty supplies, delivering
/// only non-empty ones) are enforced by the marketplace, not here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SuppliesApi: Send + Sync {
    /// Every supply of the account, all pages concatenated in request order.
    async fn list_supplies(&self) -> Result<Vec<Supply>>;
    /// Supplies whose `done` flag is false, null or absent.
    async fn list_open_supplies(&self) -> Result<Vec<Supply>>;
    /// `{ supply_id: { "orders": [...] } }`
    async fn get_supply_orders(&self, supply_id: &str) -> Result<BTreeMap<String, SupplyOrders>>;
    async fn create_supply(&self, name: &str) -> Result<Value>;
    /// Retried with the elevated budget.
    async fn add_order_to_supply(&self, supply_id: &str, order_id: u64) -> Result<Value>;
    async fn delete_supply(&self, supply_id: &str) -> Result<Value>;
    /// Returns the response status only; the body is never read.
    async fn deliver_supply(&self, supply_id: &str) -> Result<u16>;
}

pub struct Supplies {
    account: Account,
    url: String,
    add_order_retry: RetryPolicy,
}

impl Supplies {
    #[tracing::instrument(skip(account, url))]
    pub fn new(account: Account, url: Option<String>) -> Self {
        let url = url.unwrap_or_else(|| MARKETPLACE_SUPPLIES_URL.to_string());
        Self {
            account,
            url: url.trim_end_matches('/').to_string(),
            add_order_retry: RetryPolicy::add_order(),
        }
    }

    /// Overrides the retry budget of [`SuppliesApi::add_order_to_supply`].
    pub fn with_add_order_retry(mut self, policy: RetryPolicy) -> Self {
        self.add_order_retry = policy;
        self
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    fn supply_url(&self, supply_id: &str) -> String {
        format!("{}/{}", self.url, supply_id)
    }
}

/// Keeps supplies that are not done, preserving order.
pub fn filter_open(supplies: Vec<Supply>) -> Vec<Supply> {
    supplies.into_iter().filter(|s| !s.is_done()).collect()
}

#[async_trait]
impl SuppliesApi for Supplies {
    #[tracing::instrument(skip(self))]
    async fn list_supplies(&self) -> Result<Vec<Supply>> {
        fetch_all_pages::<SuppliesPage>(&self.account, &self.url, "supplies").await
    }

    #[tracing::instrument(skip(self))]
    async fn list_open_supplies(&self) -> Result<Vec<Supply>> {
        let open = filter_open(self.list_supplies().await?);
        info!(
            "{} open supplies, account {}",
            open.len(),
            self.account.name()
        );
        Ok(open)
    }

    #[tracing::instrument(skip(self))]
    async fn get_supply_orders(&self, supply_id: &str) -> Result<BTreeMap<String, SupplyOrders>> {
        let url = format!("{}/orders", self.supply_url(supply_id));
        // An empty body decodes as null and means no orders.
        let orders: SupplyOrders = self
            .account
            .http()
            .get_json::<Option<SupplyOrders>>(&url)
            .await?
            .unwrap_or_default();
        info!(
            "Supply {} has {} orders, account {}",
            supply_id,
            orders.orders.len(),
            self.account.name()
        );
        Ok(BTreeMap::from([(supply_id.to_string(), orders)]))
    }

    #[tracing::instrument(skip(self))]
    async fn create_supply(&self, name: &str) -> Result<Value> {
        let created: Value = self
            .account
            .http()
            .post_json(&self.url, &[], &json!({ "name": name }))
            .await?;
        info!(
            "Created supply {:?}: {}, account {}",
            name,
            created,
            self.account.name()
        );
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn add_order_to_supply(&self, supply_id: &str, order_id: u64) -> Result<Value> {
        let url = format!("{}/orders/{}", self.supply_url(supply_id), order_id);
        let response: Value = self
            .account
            .http()
            .patch_json(&url, self.add_order_retry)
            .await?;
        info!(
            "Added order {} to supply {}, account {}",
            order_id,
            supply_id,
            self.account.name()
        );
        Ok(response)
    }

    #[tracing::instrument(skip(self))]
    async fn delete_supply(&self, supply_id: &str) -> Result<Value> {
        let response: Value = self
            .account
            .http()
            .delete_json(&self.supply_url(supply_id))
            .await?;
        info!(
            "Deleted supply {}, account {}",
            supply_id,
            self.account.name()
        );
        Ok(response)
    }

    #[tracing::instrument(skip(self))]
    async fn deliver_supply(&self, supply_id: &str) -> Result<u16> {
        let url = format!("{}/deliver", self.supply_url(supply_id));
        let status = self.account.http().patch_status(&url).await?;
        info!(
            "Supply {} sent to delivery with status {}, account {}",
            supply_id,
            status,
            self.account.name()
        );
        Ok(status)
    }
}
