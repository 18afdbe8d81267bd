//! Client for the Wildberries marketplace supplies and orders API.
//!
//! An [`account::Account`] holds an account name and a transport that sends
//! its bearer token. The clients in [`wildberries`] build on it to manage
//! supplies and to read orders with their statuses and stickers. Tokens for
//! several accounts live in a JSON file read by [`config::TokenStore`], and
//! the `wb-supplies` binary exposes every operation from the command line.

pub mod account;
pub mod commands;
pub mod config;
pub mod http;
pub mod runtime;
pub mod wildberries;
