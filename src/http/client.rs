//! Shared HTTP transport for marketplace API calls.

use anyhow::{Context, Result};
use log::{debug, warn};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::decode::{DecodeError, decode, parse_json};
use super::retry::{NonRetryableError, RetryPolicy, check_status};

/// HTTP client that decodes JSON responses and retries when a policy allows it.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new HTTP client wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Performs a GET request and decodes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);
        self.execute(self.client.get(url)).await
    }

    /// Performs a GET request with query parameters and decodes the JSON response.
    #[tracing::instrument(skip(self, query))]
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!("GET JSON from {} with query {:?}...", url, query);
        self.execute(self.client.get(url).query(query)).await
    }

    /// Performs a POST request with a JSON body and decodes the JSON response.
    #[tracing::instrument(skip(self, query, body))]
    pub async fn post_json<B, T>(&self, url: &str, query: &[(&str, &str)], body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("POST JSON to {} with query {:?}...", url, query);
        self.execute(self.client.post(url).query(query).json(body))
            .await
    }

    /// Performs a PATCH request without a body and decodes the JSON response,
    /// retrying transient failures according to `policy`.
    #[tracing::instrument(skip(self))]
    pub async fn patch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        policy: RetryPolicy,
    ) -> Result<T> {
        debug!("PATCH {}...", url);
        self.with_retry("PATCH", policy, || self.execute(self.client.patch(url)))
            .await
    }

    /// Performs a DELETE request and decodes the JSON response.
    #[tracing::instrument(skip(self))]
    pub async fn delete_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("DELETE {}...", url);
        self.execute(self.client.delete(url)).await
    }

    /// Performs a PATCH request and returns the status code without reading the body.
    /// Only transport failures are errors; any status, including 4xx and 5xx, is returned.
    #[tracing::instrument(skip(self))]
    pub async fn patch_status(&self, url: &str) -> Result<u16> {
        debug!("PATCH {} (status only)...", url);
        let response = self
            .client
            .patch(url)
            .send()
            .await
            .context("Failed to send request")?;
        Ok(response.status().as_u16())
    }

    /// Sends one request, checks the status and decodes the body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.context("Failed to send request")?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        check_status(status, &body)?;

        let value = parse_json(&body)?;
        Ok(decode(value)?)
    }

    /// Executes an async operation with retry logic.
    async fn with_retry<F, Fut, T>(
        &self,
        operation_name: &str,
        policy: RetryPolicy,
        operation: F,
    ) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let max_attempts = policy.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable_error(&e) {
                        debug!("{}: non-retryable error: {}", operation_name, e);
                        return Err(e);
                    }

                    if attempt < max_attempts {
                        warn!(
                            "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                            operation_name,
                            attempt,
                            max_attempts,
                            e,
                            policy.delay.as_millis()
                        );
                        tokio::time::sleep(policy.delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("{}: failed after {} attempts", operation_name, max_attempts)
        }))
    }
}

/// Client errors and undecodable bodies will not improve on another attempt.
fn is_retryable_error(e: &anyhow::Error) -> bool {
    if e.downcast_ref::<NonRetryableError>().is_some() {
        return false;
    }
    if e.downcast_ref::<DecodeError>().is_some() {
        return false;
    }
    true
}
