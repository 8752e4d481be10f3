//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `DATABASE_URL` - `PostgreSQL` connection string
//! - `APP_URL` - Public URL of this backend (OAuth redirect base)
//! - `FRONTEND_URL` - Where merchants land after installing
//! - `SHOPIFY_API_KEY` - Shopify app client ID
//! - `SHOPIFY_API_SECRET` - Shopify app client secret (signs OAuth callbacks)
//! - `CLAUDE_API_KEY` - Anthropic API key
//!
//! ## Optional
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 8000)
//! - `SHOPIFY_API_VERSION` - Admin REST version (default: 2024-10)
//! - `SHOPIFY_SCOPES` - Comma-separated OAuth scopes
//! - `CLAUDE_MODEL` - Model ID (default: claude-sonnet-4-20250514)
//! - `CLAUDE_API_URL` - Messages endpoint (default: Anthropic production)
//! - `CLAUDE_TIMEOUT_SECS` - Per-request timeout (default: 60)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_CLAUDE_MODEL: &str = "claude-sonnet-4-20250514";
const DEFAULT_CLAUDE_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_SHOPIFY_API_VERSION: &str = "2024-10";
const DEFAULT_SHOPIFY_SCOPES: &str = "read_products,write_products,read_content,write_content,write_discounts,read_themes,write_themes";

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public URL of this backend, without trailing slash
    pub app_url: String,
    /// Frontend URL merchants are sent back to after install
    pub frontend_url: String,
    /// Shopify app configuration
    pub shopify: ShopifyAppConfig,
    /// Claude configuration
    pub claude: ClaudeConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
    /// Log output format
    pub log_format: LogFormat,
}

/// Shopify app credentials and API settings.
///
/// Implements `Debug` manually to redact the client secret.
#[derive(Clone)]
pub struct ShopifyAppConfig {
    /// App client ID
    pub api_key: String,
    /// App client secret
    pub api_secret: SecretString,
    /// Admin REST API version (e.g., 2024-10)
    pub api_version: String,
    /// OAuth scopes requested at install
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for ShopifyAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAppConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Claude API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct ClaudeConfig {
    /// Anthropic API key
    pub api_key: SecretString,
    /// Model ID (e.g., claude-sonnet-4-20250514)
    pub model: String,
    /// Messages endpoint URL
    pub api_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for ClaudeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaudeConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = SecretString::from(get_required_env("DATABASE_URL")?);
        let host = get_env_or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let app_url = get_url("APP_URL")?;
        let frontend_url = get_url("FRONTEND_URL")?;

        let shopify = ShopifyAppConfig::from_env()?;
        let claude = ClaudeConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);
        let log_format = parse_log_format(get_optional_env("LOG_FORMAT").as_deref());

        Ok(Self {
            database_url,
            host,
            port,
            app_url,
            frontend_url,
            shopify,
            claude,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
            log_format,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// OAuth redirect URI registered with Shopify.
    #[must_use]
    pub fn oauth_redirect_uri(&self) -> String {
        format!("{}/auth/callback", self.app_url)
    }
}

impl ShopifyAppConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: get_required_env("SHOPIFY_API_KEY")?,
            api_secret: get_validated_secret("SHOPIFY_API_SECRET")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            scopes: parse_scopes(&get_env_or_default("SHOPIFY_SCOPES", DEFAULT_SHOPIFY_SCOPES)),
        })
    }
}

impl ClaudeConfig {
    /// Load only the Claude settings, for tools that never touch Shopify
    /// or the database.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `CLAUDE_API_KEY` is missing or fails
    /// validation, or `CLAUDE_TIMEOUT_SECS` is not a number.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let timeout_secs = get_env_or_default("CLAUDE_TIMEOUT_SECS", "60")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("CLAUDE_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        Ok(Self {
            api_key: get_validated_secret("CLAUDE_API_KEY")?,
            model: get_env_or_default("CLAUDE_MODEL", DEFAULT_CLAUDE_MODEL),
            api_url: get_env_or_default("CLAUDE_API_URL", DEFAULT_CLAUDE_API_URL),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Get a required absolute URL, without its trailing slash.
fn get_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    url::Url::parse(&value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    Ok(value.trim_end_matches('/').to_string())
}

fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw {
        Some(s) if s.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use the value issued by the provider."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> ServerConfig {
        ServerConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().expect("ip"),
            port: 8000,
            app_url: "https://api.launchkit.test".to_string(),
            frontend_url: "https://app.launchkit.test".to_string(),
            shopify: ShopifyAppConfig {
                api_key: "test_api_key".to_string(),
                api_secret: SecretString::from("shpss_super_secret_value"),
                api_version: DEFAULT_SHOPIFY_API_VERSION.to_string(),
                scopes: parse_scopes(DEFAULT_SHOPIFY_SCOPES),
            },
            claude: ClaudeConfig {
                api_key: SecretString::from("sk-ant-test"),
                model: DEFAULT_CLAUDE_MODEL.to_string(),
                api_url: DEFAULT_CLAUDE_API_URL.to_string(),
                timeout: Duration::from_secs(60),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
            log_format: LogFormat::Text,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("sk-ant-REDACTED", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_scopes() {
        assert_eq!(
            parse_scopes(" read_products, write_products,,"),
            vec!["read_products".to_string(), "write_products".to_string()]
        );
        assert_eq!(parse_scopes(DEFAULT_SHOPIFY_SCOPES).len(), 7);
    }

    #[test]
    fn test_parse_log_format() {
        assert_eq!(parse_log_format(Some("JSON")), LogFormat::Json);
        assert_eq!(parse_log_format(Some("pretty")), LogFormat::Text);
        assert_eq!(parse_log_format(None), LogFormat::Text);
    }

    #[test]
    fn test_socket_addr_and_redirect_uri() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
        assert_eq!(
            config.oauth_redirect_uri(),
            "https://api.launchkit.test/auth/callback"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{:?}", config.shopify);
        assert!(debug_output.contains("test_api_key"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpss_super_secret_value"));

        let debug_output = format!("{:?}", config.claude);
        assert!(debug_output.contains(DEFAULT_CLAUDE_MODEL));
        assert!(!debug_output.contains("sk-ant-test"));
    }
}
