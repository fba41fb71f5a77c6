//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use shop_commerce::keys::StorageKeys;
use shop_commerce::Storefront;
use shop_kv::FileStore;
use shop_orders::{ClientConfig, FetchPolicy, HttpOrderClient, TimeoutConfig};
use tracing::debug;

use crate::config::{ShopConfig, CONFIG_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: ShopConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (ShopConfig::load(path)?, Some(PathBuf::from(path))),
            None => match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (ShopConfig::default(), None),
            },
        };

        debug!(path = ?config_path, "Loaded configuration");

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(ShopConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in &CONFIG_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = ShopConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }

    /// Open the file-backed storefront and restore its state.
    pub async fn storefront(&self) -> Result<Storefront> {
        let dir = self.resolve_path(&self.config.storage.dir);
        self.output.debug(&format!("Storage: {}", dir.display()));

        let backend = FileStore::open(&dir)
            .await
            .with_context(|| format!("Failed to open storage directory: {}", dir.display()))?;

        Storefront::open(
            backend,
            StorageKeys::new(self.config.storage.namespace.clone()),
            self.config.store.default_currency,
        )
        .await
        .context("Failed to load storefront state")
    }

    /// Build the order API client from the `[api]` section.
    pub fn api(&self) -> Result<Arc<HttpOrderClient>> {
        let api = &self.config.api;
        let timeout = TimeoutConfig::from_total(Duration::from_millis(api.timeout_ms));

        let mut config = ClientConfig::new(api.base_url.clone())
            .with_policy(FetchPolicy::new(timeout, api.retries));
        if let Some(token) = &api.auth_token {
            config = config.with_auth_token(token.clone());
        }

        self.output.debug(&format!("API: {}", api.base_url));
        let client = HttpOrderClient::new(config).context("Failed to build API client")?;
        Ok(Arc::new(client))
    }
}
