//! Clients for the Wildberries marketplace API.

use anyhow::Result;
use log::info;
use serde::de::DeserializeOwned;

use crate::account::Account;

pub mod orders;
pub mod supplies;
pub mod types;

pub use orders::{MARKETPLACE_ORDERS_URL, Orders, OrdersApi, STICKER_BATCH_SIZE};
pub use supplies::{MARKETPLACE_SUPPLIES_URL, Supplies, SuppliesApi};
pub use types::{Order, Stickers, Supply, SupplyOrders};

/// Page size requested from paginated endpoints.
pub const PAGE_LIMIT: u32 = 1000;

/// One page of a `limit`/`next` paginated listing.
pub(crate) trait Page: DeserializeOwned {
    type Item;

    fn into_parts(self) -> (Vec<Self::Item>, Option<i64>);
}

impl Page for types::SuppliesPage {
    type Item = Supply;

    fn into_parts(self) -> (Vec<Supply>, Option<i64>) {
        (self.supplies, self.next)
    }
}

impl Page for types::OrdersPage {
    type Item = Order;

    fn into_parts(self) -> (Vec<Order>, Option<i64>) {
        (self.orders, self.next)
    }
}

/// Follows the `next` cursor until the server omits it (or sends `0`),
/// fetching pages one after another and keeping them in request order.
pub(crate) async fn fetch_all_pages<P: Page>(
    account: &Account,
    url: &str,
    what: &str,
) -> Result<Vec<P::Item>> {
    let limit = PAGE_LIMIT.to_string();
    let mut items = Vec::new();
    let mut next: i64 = 0;

    loop {
        let cursor = next.to_string();
        let page: P = account
            .http()
            .get_json_with_query(url, &[("limit", limit.as_str()), ("next", cursor.as_str())])
            .await?;

        let (batch, next_value) = page.into_parts();
        items.extend(batch);

        info!(
            "Fetched {} {} so far, next {:?}, account {}",
            items.len(),
            what,
            next_value,
            account.name()
        );

        match next_value {
            Some(value) if value != 0 => next = value,
            _ => break,
        }
    }

    Ok(items)
}
