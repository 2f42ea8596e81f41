//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string (session store)
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//! - `KIVU_API_URL` - Base URL of the dashboard/user/returns/product REST service
//! - `KIVU_GRAPHQL_URL` - GraphQL endpoint for site configuration and page content
//! - `FLUTTERWAVE_PUBLIC_KEY` - Flutterwave public key
//! - `FLUTTERWAVE_SECRET_KEY` - Flutterwave secret key (server-side only)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `KIVU_GRAPHQL_TOKEN` - Bearer token for the GraphQL endpoint
//! - `FLUTTERWAVE_BASE_URL` - Flutterwave API base (default: <https://api.flutterwave.com>)
//! - `STORE_CURRENCY` - Display/charge currency (default: RWF)
//! - `HOME_CATEGORIES` - Comma-separated category slugs for home sliders
//!   (default: electronics,auto-parts)
//! - `FLASH_SALE_ENABLED` - Show the flash-sale popup (default: true)
//! - `FLASH_SALE_ENDS_AT` - RFC 3339 sale end; unset means start + default hours
//! - `FLASH_SALE_DEFAULT_HOURS` - Sale length when no end is set (default: 24)
//! - `FLASH_SALE_SHOW_AFTER_SECS` - Popup delay (default: 5)
//! - `FLASH_SALE_VISIBLE_SECS` - Popup lifetime (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `LOG_FORMAT` - `json` for JSON log lines (read by the binary)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kivu_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const MIN_SESSION_SECRET_LENGTH: usize = 32;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Backend REST and GraphQL endpoints
    pub backend: BackendConfig,
    /// Flutterwave payment gateway
    pub flutterwave: FlutterwaveConfig,
    /// Merchandising settings (currency, home sliders, flash sale)
    pub shop: ShopConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Backend service endpoints.
///
/// Implements `Debug` manually to redact the GraphQL token.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the REST service (dashboard, user, returns, products, cart)
    pub api_url: Url,
    /// GraphQL endpoint (site configuration, page content, FAQs, categories)
    pub graphql_url: Url,
    /// Optional bearer token for the GraphQL endpoint
    pub graphql_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_url", &self.api_url.as_str())
            .field("graphql_url", &self.graphql_url.as_str())
            .field(
                "graphql_token",
                &self.graphql_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Flutterwave configuration.
///
/// Implements `Debug` manually to redact the secret key.
#[derive(Clone)]
pub struct FlutterwaveConfig {
    /// Public key (safe to expose in the browser)
    pub public_key: String,
    /// Secret key used for server-side API calls
    pub secret_key: SecretString,
    /// API base URL
    pub base_url: Url,
}

impl std::fmt::Debug for FlutterwaveConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlutterwaveConfig")
            .field("public_key", &self.public_key)
            .field("secret_key", &"[REDACTED]")
            .field("base_url", &self.base_url.as_str())
            .finish()
    }
}

/// Merchandising settings.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Currency prices are shown and charged in
    pub currency: CurrencyCode,
    /// Category slugs that get a dynamic slider on the home page
    pub home_categories: Vec<String>,
    /// Flash-sale popup settings
    pub flash_sale: FlashSaleConfig,
}

/// Flash-sale popup timing.
#[derive(Debug, Clone)]
pub struct FlashSaleConfig {
    pub enabled: bool,
    /// Explicit sale end; `None` anchors the end at server start
    pub ends_at: Option<DateTime<Utc>>,
    /// Sale length used when `ends_at` is not set
    pub default_length: Duration,
    /// Delay before the popup appears
    pub show_after: Duration,
    /// How long the popup stays up before hiding itself
    pub visible_for: Duration,
}

impl Default for FlashSaleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ends_at: None,
            default_length: Duration::from_secs(24 * 60 * 60),
            show_after: Duration::from_secs(5),
            visible_for: Duration::from_secs(30),
        }
    }
}

impl StorefrontConfig {
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

        let database_url = get_database_url("STOREFRONT_DATABASE_URL")?;
        let host = parse_env("STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env("STOREFRONT_PORT", "3000")?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        Ok(Self {
            database_url,
            host,
            port,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_secret,
            backend: BackendConfig::from_env()?,
            flutterwave: FlutterwaveConfig::from_env()?,
            shop: ShopConfig::from_env()?,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Absolute URL for a storefront path (used for payment redirects).
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_url: get_url("KIVU_API_URL", None)?,
            graphql_url: get_url("KIVU_GRAPHQL_URL", None)?,
            graphql_token: get_optional_env("KIVU_GRAPHQL_TOKEN").map(SecretString::from),
            timeout: Duration::from_secs(10),
        })
    }
}

impl FlutterwaveConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            public_key: get_required_env("FLUTTERWAVE_PUBLIC_KEY")?,
            secret_key: get_validated_secret("FLUTTERWAVE_SECRET_KEY")?,
            base_url: get_url("FLUTTERWAVE_BASE_URL", Some("https://api.flutterwave.com"))?,
        })
    }
}

impl ShopConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let currency = get_env_or_default("STORE_CURRENCY", "RWF")
            .parse::<CurrencyCode>()
            .map_err(|e| ConfigError::InvalidEnvVar("STORE_CURRENCY".to_string(), e))?;

        let home_categories =
            parse_category_list(&get_env_or_default("HOME_CATEGORIES", "electronics,auto-parts"));

        let ends_at = get_optional_env("FLASH_SALE_ENDS_AT")
            .map(|raw| {
                DateTime::parse_from_rfc3339(&raw)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        ConfigError::InvalidEnvVar("FLASH_SALE_ENDS_AT".to_string(), e.to_string())
                    })
            })
            .transpose()?;

        let flash_sale = FlashSaleConfig {
            enabled: parse_env("FLASH_SALE_ENABLED", "true")?,
            ends_at,
            default_length: hours_to_duration(
                "FLASH_SALE_DEFAULT_HOURS",
                parse_env("FLASH_SALE_DEFAULT_HOURS", "24")?,
            )?,
            show_after: Duration::from_secs(parse_env("FLASH_SALE_SHOW_AFTER_SECS", "5")?),
            visible_for: Duration::from_secs(parse_env("FLASH_SALE_VISIBLE_SECS", "30")?),
        };

        Ok(Self {
            currency,
            home_categories,
            flash_sale,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn hours_to_duration(key: &str, hours: u64) -> Result<Duration, ConfigError> {
    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(key.to_string(), format!("{hours} hours is too long"))
        })
}

/// Split a comma-separated slug list, dropping blanks and duplicates.
fn parse_category_list(raw: &str) -> Vec<String> {
    let mut slugs: Vec<String> = Vec::new();
    for slug in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let slug = slug.to_lowercase();
        if !slugs.contains(&slug) {
            slugs.push(slug);
        }
    }
    slugs
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an environment variable (or its default) into `T`.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(key, default)
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a URL variable, with an optional default.
fn get_url(key: &str, default: Option<&str>) -> Result<Url, ConfigError> {
    let raw = match default {
        Some(default) => get_env_or_default(key, default),
        None => get_required_env(key)?,
    };
    Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Validate that a session secret meets minimum length requirements.
fn validate_session_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_SESSION_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_SESSION_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
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
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
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
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Configuration pointing at unreachable local services, for handler tests.
    pub(crate) fn test_config() -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/kivu_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            session_secret: SecretString::from("x".repeat(32)),
            backend: BackendConfig {
                api_url: Url::parse("http://127.0.0.1:9/api/").unwrap(),
                graphql_url: Url::parse("http://127.0.0.1:9/graphql").unwrap(),
                graphql_token: None,
                timeout: Duration::from_millis(200),
            },
            flutterwave: FlutterwaveConfig {
                public_key: "FLWPUBK_TEST-abc".to_string(),
                secret_key: SecretString::from("FLWSECK_TEST-super-private"),
                base_url: Url::parse("http://127.0.0.1:9").unwrap(),
            },
            shop: ShopConfig {
                currency: CurrencyCode::RWF,
                home_categories: vec!["electronics".to_string()],
                flash_sale: FlashSaleConfig::default(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-flutterwave-key", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_validate_session_secret_too_short() {
        let secret = SecretString::from("short");
        assert!(validate_session_secret(&secret, "TEST_SESSION").is_err());
    }

    #[test]
    fn test_parse_category_list() {
        assert_eq!(
            parse_category_list(" Electronics, auto-parts,,electronics , "),
            vec!["electronics".to_string(), "auto-parts".to_string()]
        );
        assert!(parse_category_list("").is_empty());
    }

    #[test]
    fn test_flash_sale_hours_overflow_is_rejected() {
        assert_eq!(
            hours_to_duration("FLASH_SALE_DEFAULT_HOURS", 24).unwrap(),
            Duration::from_secs(86_400)
        );
        assert!(matches!(
            hours_to_duration("FLASH_SALE_DEFAULT_HOURS", u64::MAX),
            Err(ConfigError::InvalidEnvVar(key, _)) if key == "FLASH_SALE_DEFAULT_HOURS"
        ));
    }

    #[test]
    fn test_socket_addr_and_absolute_url() {
        let config = test_config();
        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
        assert_eq!(
            config.absolute_url("/checkout/callback"),
            "http://localhost:3000/checkout/callback"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = test_config();
        let debug_output = format!("{:?}", config.flutterwave);
        assert!(debug_output.contains("FLWPUBK_TEST-abc"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-private"));

        let backend = BackendConfig {
            graphql_token: Some(SecretString::from("gql-token-value")),
            ..config.backend
        };
        let debug_output = format!("{backend:?}");
        assert!(!debug_output.contains("gql-token-value"));
    }
}
