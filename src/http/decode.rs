//! Response body decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Longest body excerpt kept in a [`DecodeError`].
const BODY_EXCERPT_LEN: usize = 200;

/// The response body was not the JSON we expected.
#[derive(Debug)]
pub struct DecodeError {
    pub message: String,
    pub body: String,
}

impl DecodeError {
    fn new(message: impl Into<String>, body: &str) -> Self {
        Self {
            message: message.into(),
            body: excerpt(body),
        }
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.body.is_empty() {
            write!(f, "Failed to decode response: {}", self.message)
        } else {
            write!(
                f,
                "Failed to decode response: {} (body: {})",
                self.message, self.body
            )
        }
    }
}

impl std::error::Error for DecodeError {}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}

/// Parses a raw body into a JSON value. An empty body (HTTP 204) is `null`.
pub fn parse_json(body: &str) -> Result<Value, DecodeError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| DecodeError::new(e.to_string(), body))
}

/// Converts a parsed value into a typed record.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, DecodeError> {
    let rendered = value.to_string();
    serde_json::from_value(value).map_err(|e| DecodeError::new(e.to_string(), &rendered))
}
