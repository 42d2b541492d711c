//! Product App configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PRODUCT_API_BASE_URL` - Product data source (default: <https://fakestoreapi.com>)
//! - `PRODUCT_APP_DATA_DIR` - Directory for locally persisted data (default: `.product-app`)
//! - `PRODUCT_APP_CART_KEY` - Storage key of the fallback cart (default: `cart`)
//! - `HOST_APP_URL` - Base URL of the host application; unset means standalone
//! - `HOST_APP_CAPABILITY` - Name of the host's cart capability (default: `host_app/cartActions`)
//! - `PRODUCT_APP_LOG_FORMAT` - `pretty` or `json` (default: `pretty`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use url::Url;

pub const DEFAULT_PRODUCT_API_URL: &str = "https://fakestoreapi.com";
pub const DEFAULT_DATA_DIR: &str = ".product-app";
pub const DEFAULT_CART_KEY: &str = "cart";
pub const DEFAULT_CART_CAPABILITY: &str = "host_app/cartActions";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Product App configuration.
#[derive(Debug, Clone)]
pub struct ProductAppConfig {
    /// Base URL of the product data source
    pub product_api_url: Url,
    /// Directory holding the local persisted store
    pub data_dir: PathBuf,
    /// Key of the fallback cart collection in the local store
    pub cart_key: String,
    /// Host application integration, if hosted
    pub host: Option<HostConfig>,
    /// Log output format
    pub log_format: LogFormat,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Where to find the host application's cart capability.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Base URL of the host application
    pub base_url: Url,
    /// Capability name, `<remote>/<module>`
    pub capability: String,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected `pretty` or `json`, got `{other}`")),
        }
    }
}

impl ProductAppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let product_api_url = parse_http_url(
            "PRODUCT_API_BASE_URL",
            &get_or_default(&lookup, "PRODUCT_API_BASE_URL", DEFAULT_PRODUCT_API_URL),
        )?;
        let data_dir = PathBuf::from(get_or_default(&lookup, "PRODUCT_APP_DATA_DIR", DEFAULT_DATA_DIR));
        let cart_key = get_or_default(&lookup, "PRODUCT_APP_CART_KEY", DEFAULT_CART_KEY);
        // Same rule the file store applies, so a bad key fails at startup
        crate::storage::validate_key(&cart_key).map_err(|e| {
            ConfigError::InvalidEnvVar("PRODUCT_APP_CART_KEY".to_string(), e.to_string())
        })?;

        let host = match get_optional(&lookup, "HOST_APP_URL") {
            Some(raw) => Some(HostConfig {
                base_url: parse_http_url("HOST_APP_URL", &raw)?,
                capability: parse_capability(&get_or_default(
                    &lookup,
                    "HOST_APP_CAPABILITY",
                    DEFAULT_CART_CAPABILITY,
                ))?,
            }),
            None => None,
        };

        let log_format = get_optional(&lookup, "PRODUCT_APP_LOG_FORMAT")
            .map(|raw| raw.parse::<LogFormat>())
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("PRODUCT_APP_LOG_FORMAT".to_string(), e))?
            .unwrap_or_default();

        Ok(Self {
            product_api_url,
            data_dir,
            cart_key,
            host,
            log_format,
            sentry_dsn: get_optional(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional(&lookup, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Whether the app runs inside a host application.
    #[must_use]
    pub const fn is_hosted(&self) -> bool {
        self.host.is_some()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional variable, treating blank values as unset.
fn get_optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

/// Get a variable with a default value.
fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Parse an absolute `http`/`https` URL.
fn parse_http_url(key: &str, raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme `{scheme}`"),
        )),
    }
}

/// Validate a `<remote>/<module>` capability name.
fn parse_capability(raw: &str) -> Result<String, ConfigError> {
    match raw.split_once('/') {
        Some((remote, module)) if !remote.is_empty() && !module.is_empty() => Ok(raw.to_string()),
        _ => Err(ConfigError::InvalidEnvVar(
            "HOST_APP_CAPABILITY".to_string(),
            format!("expected `<remote>/<module>`, got `{raw}`"),
        )),
    }
}
