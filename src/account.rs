//! Marketplace account: a name, its API token and the transport that carries it.

use anyhow::{Context, Result};
use log::debug;
use reqwest::{
    Client,
    header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue},
};

use crate::http::HttpClient;

/// Handle passed to every API client.
///
/// Cloning is cheap: the underlying connection pool is shared.
#[derive(Clone)]
pub struct Account {
    name: String,
    http: HttpClient,
}

impl Account {
    /// Builds the shared transport with `Authorization: Bearer <token>` on every request.
    pub fn new(name: impl Into<String>, token: &str) -> Result<Self> {
        let name = name.into();

        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
            .with_context(|| format!("Invalid token for account {}", name))?;
        auth_value.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        debug!("Using token {} for account {}", mask_token(token), name);

        let client = Client::builder()
            .user_agent(concat!("wb-supplies/", env!("WB_SUPPLIES_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self::with_client(name, HttpClient::new(client)))
    }

    /// Wraps an already configured transport.
    pub fn with_client(name: impl Into<String>, http: HttpClient) -> Self {
        Self {
            name: name.into(),
            http,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account").field("name", &self.name).finish()
    }
}

/// Keeps the first 8 and last 4 characters of long tokens.
pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.trim().chars().collect();
    if chars.len() <= 12 {
        return "*********".to_string();
    }
    let head: String = chars[..8].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}*********{}", head, tail)
}
