//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STOREFRONT_BASE_URL` - Public URL for the storefront
//! - `STOREFRONT_SESSION_SECRET` - Session signing secret (min 32 chars, high entropy)
//!
//! ## Optional
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_PASSWORD` - Shared store password (unset: nobody can unlock)
//! - `STOREFRONT_LOCKED` - `true` to put the store behind the password gate
//! - `STOREFRONT_ADMIN_BYPASS` - `true` to disable the gate
//! - `STOREFRONT_PASSWORD_MAX_AGE_SECS` - Gate cookie max-age (default: 900, `0` for no override)
//! - `STOREFRONT_LAUNCH_AT` - RFC 3339 launch instant for the lock-screen countdown
//! - `STOREFRONT_MESSAGE_1`, `STOREFRONT_MESSAGE_2`, `STOREFRONT_MESSAGE_3` - Announcement bar
//! - `STOREFRONT_CONTACT_URL` - Contact page link (default: /contact)
//! - `STOREFRONT_SHOP_URL` - Shop page link (default: /shop)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Utc};
use flora_bella_core::PasswordGate;
use flora_bella_core::gate::DEFAULT_MAX_AGE;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

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
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: String,
    /// Session signing secret
    pub session_secret: SecretString,
    /// Password gate settings
    pub gate: GateConfig,
    /// Store-wide display settings
    pub store: StoreConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Password gate configuration.
///
/// Implements `Debug` manually to redact the store password.
#[derive(Clone, Default)]
pub struct GateConfig {
    /// Whether the store is behind the gate at all
    pub locked: bool,
    /// Disables the gate even when `locked` is set
    pub admin_bypass: bool,
    /// Shared store password
    pub password: Option<SecretString>,
    /// Cookie max-age applied when the gate flag is committed
    pub max_age: Option<Duration>,
    /// Launch instant shown as a countdown on the lock screen
    pub launch_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("locked", &self.locked)
            .field("admin_bypass", &self.admin_bypass)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("max_age", &self.max_age)
            .field("launch_at", &self.launch_at)
            .finish()
    }
}

/// Store-wide display configuration.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Announcement bar messages (empty ones are dropped)
    pub messages: Vec<String>,
    /// Contact page link
    pub contact_url: String,
    /// Shop page link
    pub shop_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            contact_url: "/contact".to_string(),
            shop_url: "/shop".to_string(),
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

        let host = get_env_or_default("STOREFRONT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("STOREFRONT_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("STOREFRONT_PORT".to_string(), e.to_string())
            })?;
        let base_url = get_required_env("STOREFRONT_BASE_URL")?;
        url::Url::parse(&base_url).map_err(|e| {
            ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
        })?;
        let session_secret = get_validated_secret("STOREFRONT_SESSION_SECRET")?;
        validate_session_secret(&session_secret, "STOREFRONT_SESSION_SECRET")?;

        let gate = GateConfig::from_env()?;
        let store = StoreConfig::from_env();

        Ok(Self {
            host,
            port,
            base_url,
            session_secret,
            gate,
            store,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl GateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_age = parse_max_age(&get_env_or_default(
            "STOREFRONT_PASSWORD_MAX_AGE_SECS",
            &DEFAULT_MAX_AGE.as_secs().to_string(),
        ))
        .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_PASSWORD_MAX_AGE_SECS".to_string(), e))?;

        let launch_at = get_optional_env("STOREFRONT_LAUNCH_AT")
            .map(|value| parse_launch_at(&value))
            .transpose()
            .map_err(|e| ConfigError::InvalidEnvVar("STOREFRONT_LAUNCH_AT".to_string(), e))?;

        Ok(Self {
            locked: parse_flag(get_optional_env("STOREFRONT_LOCKED").as_deref()),
            admin_bypass: parse_flag(get_optional_env("STOREFRONT_ADMIN_BYPASS").as_deref()),
            password: get_optional_env("STOREFRONT_PASSWORD").map(SecretString::from),
            max_age,
            launch_at,
        })
    }

    /// Whether requests are actually checked against the gate.
    #[must_use]
    pub const fn enforced(&self) -> bool {
        self.locked && !self.admin_bypass
    }

    /// Build the password gate from this configuration.
    #[must_use]
    pub fn password_gate(&self) -> PasswordGate {
        PasswordGate::new(self.password.clone(), self.max_age)
    }
}

impl StoreConfig {
    fn from_env() -> Self {
        let messages = ["STOREFRONT_MESSAGE_1", "STOREFRONT_MESSAGE_2", "STOREFRONT_MESSAGE_3"]
            .into_iter()
            .filter_map(get_optional_env)
            .filter(|m| !m.trim().is_empty())
            .collect();

        Self {
            messages,
            contact_url: get_env_or_default("STOREFRONT_CONTACT_URL", "/contact"),
            shop_url: get_env_or_default("STOREFRONT_SHOP_URL", "/shop"),
        }
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

/// Only the literal `true` enables a flag.
fn parse_flag(value: Option<&str>) -> bool {
    value == Some("true")
}

/// Parse a max-age in seconds. `0` disables the per-commit override.
fn parse_max_age(value: &str) -> Result<Option<Duration>, String> {
    let secs = value.trim().parse::<u64>().map_err(|e| e.to_string())?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn parse_launch_at(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| e.to_string())
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
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
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
