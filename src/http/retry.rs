//! Retry policy and status classification for marketplace API calls.

use reqwest::StatusCode;
use std::time::Duration;

/// Number of attempts for calls that do not opt into retries.
pub const SINGLE_ATTEMPT: usize = 1;

/// Attempts made when attaching an order to a supply.
pub const ADD_ORDER_MAX_ATTEMPTS: usize = 3;

/// Delay between attempts when attaching an order to a supply.
pub const ADD_ORDER_RETRY_DELAY: Duration = Duration::from_millis(1000);

/// How many times a request is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: usize, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// One attempt, no waiting.
    pub const fn none() -> Self {
        Self::new(SINGLE_ATTEMPT, Duration::ZERO)
    }

    /// The elevated budget used for `add_order_to_supply`.
    pub const fn add_order() -> Self {
        Self::new(ADD_ORDER_MAX_ATTEMPTS, ADD_ORDER_RETRY_DELAY)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::none()
    }
}

/// Client errors returned by the marketplace API. Retrying them will not help.
///
/// Each variant carries the response body so that remote business-rule
/// rejections reach the caller exactly as the API phrased them.
#[derive(Debug)]
pub enum NonRetryableError {
    /// HTTP 429
    RateLimitExceeded(String),
    /// HTTP 401
    AuthenticationFailed(String),
    /// HTTP 404
    NotFound(String),
    /// HTTP 403
    Forbidden(String),
    /// HTTP 409, e.g. deleting a supply that still has orders
    Conflict(String),
    /// Any other 4xx
    ClientError(u16, String),
}

impl NonRetryableError {
    pub fn status(&self) -> u16 {
        match self {
            NonRetryableError::RateLimitExceeded(_) => 429,
            NonRetryableError::AuthenticationFailed(_) => 401,
            NonRetryableError::NotFound(_) => 404,
            NonRetryableError::Forbidden(_) => 403,
            NonRetryableError::Conflict(_) => 409,
            NonRetryableError::ClientError(status, _) => *status,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            NonRetryableError::RateLimitExceeded(body)
            | NonRetryableError::AuthenticationFailed(body)
            | NonRetryableError::NotFound(body)
            | NonRetryableError::Forbidden(body)
            | NonRetryableError::Conflict(body)
            | NonRetryableError::ClientError(_, body) => body,
        }
    }
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::RateLimitExceeded(body) => {
                write!(f, "Rate limit exceeded, try again later: {}", body)
            }
            NonRetryableError::AuthenticationFailed(body) => {
                write!(f, "Authentication failed, check the account token: {}", body)
            }
            NonRetryableError::NotFound(body) => {
                write!(f, "Not found: {}", body)
            }
            NonRetryableError::Forbidden(body) => {
                write!(f, "Access forbidden: {}", body)
            }
            NonRetryableError::Conflict(body) => {
                write!(f, "Rejected by marketplace: {}", body)
            }
            NonRetryableError::ClientError(status, body) => {
                write!(f, "Request error (HTTP {}): {}", status, body)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// A 5xx response. Worth another attempt when the call has a retry budget.
#[derive(Debug)]
pub struct ServerError {
    pub status: u16,
    pub body: String,
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Server error (HTTP {}): {}", self.status, self.body)
    }
}

impl std::error::Error for ServerError {}

/// Classifies a response status.
/// Returns Ok(()) for success and for errors worth retrying, Err for client errors.
pub fn classify_status(status: StatusCode, body: &str) -> Result<(), NonRetryableError> {
    let body = body.trim().to_string();
    match status {
        StatusCode::UNAUTHORIZED => Err(NonRetryableError::AuthenticationFailed(body)),
        StatusCode::FORBIDDEN => Err(NonRetryableError::Forbidden(body)),
        StatusCode::TOO_MANY_REQUESTS => Err(NonRetryableError::RateLimitExceeded(body)),
        StatusCode::NOT_FOUND => Err(NonRetryableError::NotFound(body)),
        StatusCode::CONFLICT => Err(NonRetryableError::Conflict(body)),
        s if s.is_client_error() => Err(NonRetryableError::ClientError(s.as_u16(), body)),
        _ => Ok(()),
    }
}

/// Turns a non-success status into an error, keeping client errors non-retryable.
pub fn check_status(status: StatusCode, body: &str) -> anyhow::Result<()> {
    classify_status(status, body)?;
    if !status.is_success() {
        return Err(anyhow::Error::from(ServerError {
            status: status.as_u16(),
            body: body.trim().to_string(),
        }));
    }
    Ok(())
}
