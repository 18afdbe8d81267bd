//! Account tokens, stored as a JSON object mapping account names to API tokens.

use anyhow::{Context, Result, anyhow, bail};
use log::debug;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::account::Account;
use crate::runtime::Runtime;

/// Environment variable pointing at the tokens file.
pub const TOKENS_FILE_ENV: &str = "WB_TOKENS_FILE";

const APP_DIR: &str = "wb-supplies";
const TOKENS_FILE: &str = "tokens.json";

#[derive(Default, Clone, PartialEq)]
pub struct TokenStore {
    tokens: BTreeMap<String, String>,
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("accounts", &self.names())
            .finish()
    }
}

impl TokenStore {
    pub fn new(tokens: BTreeMap<String, String>) -> Self {
        Self { tokens }
    }

    /// Reads the tokens file at `path`, or at [`default_tokens_path`] when `None`.
    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => default_tokens_path(runtime)?,
        };

        if !runtime.exists(&path) {
            bail!("Tokens file not found: {}", path.display());
        }

        debug!("Loading tokens from {}", path.display());
        let content = runtime.read_to_string(&path)?;
        Self::parse(&content).with_context(|| format!("Invalid tokens file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let tokens: BTreeMap<String, String> =
            serde_json::from_str(content).context("Expected a JSON object of account tokens")?;
        Ok(Self::new(tokens))
    }

    /// Account names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.tokens.keys().map(String::as_str).collect()
    }

    /// Builds the account called `name`. Without a name the store must hold exactly one account.
    pub fn account(&self, name: Option<&str>) -> Result<Account> {
        match name {
            Some(name) => {
                let token = self.tokens.get(name).ok_or_else(|| {
                    anyhow!(
                        "Unknown account '{}'. Known accounts: {}",
                        name,
                        self.names().join(", ")
                    )
                })?;
                Account::new(name, token)
            }
            None => match self.tokens.iter().next() {
                Some((name, token)) if self.tokens.len() == 1 => Account::new(name.as_str(), token),
                Some(_) => bail!(
                    "Several accounts configured ({}), choose one with --account",
                    self.names().join(", ")
                ),
                None => bail!("No accounts configured"),
            },
        }
    }

    /// Every configured account, in name order.
    pub fn accounts(&self) -> Result<Vec<Account>> {
        self.tokens
            .iter()
            .map(|(name, token)| Account::new(name.as_str(), token))
            .collect()
    }
}

/// `$WB_TOKENS_FILE`, else `<config dir>/wb-supplies/tokens.json`.
pub fn default_tokens_path<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    if let Ok(path) = runtime.env_var(TOKENS_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    let config_dir = runtime
        .config_dir()
        .context("Could not determine the configuration directory")?;
    Ok(config_dir.join(APP_DIR).join(TOKENS_FILE))
}
