//! CLI configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use shop_commerce::Currency;

/// File names searched for, in order, in the working directory and its parents.
pub const CONFIG_NAMES: [&str; 3] = ["shop.toml", ".shop.toml", "shop.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShopConfig {
    /// Order API connection.
    #[serde(default)]
    pub api: ApiConfig,

    /// Local persistence.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Storefront defaults.
    #[serde(default)]
    pub store: StoreConfig,
}

impl ShopConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Order API settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bearer token. `SHOP_AUTH_TOKEN` takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,

    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for catalog reads. Orders are never retried.
    #[serde(default = "default_retries")]
    pub retries: u32,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_retries() -> u32 {
    2
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            auth_token: None,
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }
}

/// Where cart, coupon and currency records live.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    /// Directory for the file store.
    #[serde(default = "default_dir")]
    pub dir: String,

    /// Key namespace.
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_dir() -> String {
    ".shop".to_string()
}

fn default_namespace() -> String {
    shop_commerce::keys::DEFAULT_NAMESPACE.to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            namespace: default_namespace(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreConfig {
    /// Currency used until a preference is saved.
    #[serde(default)]
    pub default_currency: Currency,
}

/// Generate a default shop.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront CLI configuration

[api]
base_url = "{base_url}"
# auth_token = "..."  # or set SHOP_AUTH_TOKEN
timeout_ms = {timeout_ms}
retries = {retries}

[storage]
dir = "{dir}"
namespace = "{namespace}"

[store]
default_currency = "BRL"
"#,
        base_url = default_base_url(),
        timeout_ms = default_timeout_ms(),
        retries = default_retries(),
        dir = default_dir(),
        namespace = default_namespace(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: ShopConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, ShopConfig::default());
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ShopConfig = toml::from_str(
            r#"
[api]
base_url = "https://api.example.com"

[store]
default_currency = "USD"
"#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://api.example.com");
        assert_eq!(config.api.retries, 2);
        assert_eq!(config.storage.namespace, "shop");
        assert_eq!(config.store.default_currency, Currency::USD);
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shop.json");

        let mut config = ShopConfig::default();
        config.api.auth_token = Some("token".to_string());
        config.storage.dir = "/var/lib/shop".to_string();
        std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

        let path = path.to_str().unwrap();
        assert_eq!(ShopConfig::load(path).unwrap(), config);
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let result: Result<ShopConfig, _> = toml::from_str("[store]\ndefault_currency = \"EUR\"\n");
        assert!(result.is_err());
    }
}
