use anyhow::Result;
use serde::Serialize;

pub mod config;
mod orders;
mod services;
mod supplies;

pub use orders::{list_new_orders, list_orders, order_statuses, stickers};
pub use services::Services;
pub use supplies::{
    add_order, create_supply, delete_supply, deliver_supply, list_supplies, supply_orders,
};

use crate::config::TokenStore;

/// Pretty-prints a command result to stdout.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Names of the configured accounts.
pub fn accounts(tokens: &TokenStore) -> Vec<String> {
    tokens.names().into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounts_lists_names() {
        let tokens = TokenStore::parse(r#"{"wb-2": "b", "wb-1": "a"}"#).unwrap();
        assert_eq!(accounts(&tokens), vec!["wb-1", "wb-2"]);
    }

    #[test]
    fn test_print_json() {
        assert!(print_json(&serde_json::json!({"ok": true})).is_ok());
    }
}
