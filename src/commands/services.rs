//! Service factory for building API clients from configuration.

use anyhow::Result;

use crate::{
    account::Account,
    wildberries::{Orders, Supplies},
};

use super::config::Config;

/// The API clients of one account.
pub struct Services {
    pub account: Account,
    pub supplies: Supplies,
    pub orders: Orders,
}

impl Services {
    pub fn from_config(config: &Config) -> Result<Self> {
        let account = config.tokens.account(config.account.as_deref())?;
        Ok(Self::for_account(account, config))
    }

    pub fn for_account(account: Account, config: &Config) -> Self {
        let supplies = Supplies::new(account.clone(), config.supplies_url.clone());
        let orders = Orders::new(account.clone(), config.orders_url.clone());
        Self {
            account,
            supplies,
            orders,
        }
    }
}
