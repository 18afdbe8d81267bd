//! Command configuration resolved from flags, environment and the tokens file.

use anyhow::Result;
use std::path::PathBuf;

use crate::{config::TokenStore, runtime::Runtime};

/// Values a command needs before it can build API clients.
#[derive(Debug, Default, Clone)]
pub struct Config {
    pub tokens: TokenStore,
    pub account: Option<String>,
    pub supplies_url: Option<String>,
    pub orders_url: Option<String>,
}

impl Config {
    /// Loads the tokens file and keeps the remaining options as given.
    #[tracing::instrument(skip(runtime, supplies_url, orders_url))]
    pub fn load<R: Runtime>(
        runtime: &R,
        tokens_file: Option<PathBuf>,
        account: Option<String>,
        supplies_url: Option<String>,
        orders_url: Option<String>,
    ) -> Result<Self> {
        let tokens = TokenStore::load(runtime, tokens_file.as_deref())?;
        Ok(Self {
            tokens,
            account,
            supplies_url,
            orders_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use mockall::predicate::eq;
    use std::path::Path;

    #[test]
    fn test_load_with_explicit_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .with(eq(Path::new("/tmp/tokens.json")))
            .returning(|_| true);
        runtime
            .expect_read_to_string()
            .returning(|_| Ok(r#"{"main": "token"}"#.to_string()));

        let config = Config::load(
            &runtime,
            Some(PathBuf::from("/tmp/tokens.json")),
            Some("main".to_string()),
            None,
            None,
        )
        .unwrap();

        assert_eq!(config.tokens.names(), vec!["main"]);
        assert_eq!(config.account.as_deref(), Some("main"));
        assert!(config.supplies_url.is_none());
    }
}
