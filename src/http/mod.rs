//! HTTP transport with status classification, JSON decoding and retry logic.

mod client;
pub mod decode;
mod retry;

pub use client::HttpClient;
pub use decode::{DecodeError, parse_json};
pub use retry::{
    ADD_ORDER_MAX_ATTEMPTS, ADD_ORDER_RETRY_DELAY, NonRetryableError, RetryPolicy, ServerError,
    check_status, classify_status,
};
