//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required (when `AULA_STORE=rest`, the default)
//! - `SUPABASE_URL` - Base URL of the hosted store (e.g. `https://xyz.supabase.co`)
//! - `SUPABASE_ANON_KEY` - Public (anon) API key sent as `apikey` and bearer token
//!
//! ## Optional
//! - `AULA_STORE` - `rest` (default) or `memory` for a process-local store
//! - `AULA_HOST` - Bind address (default: 127.0.0.1)
//! - `AULA_PORT` - Listen port (default: 3000)
//! - `AULA_BASE_URL` - Public URL (default: `http://{host}:{port}`)
//! - `AULA_CHAT_POLL_SECONDS` - Chat polling interval (default: 3)
//! - `AULA_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Default chat polling interval in seconds.
pub const DEFAULT_CHAT_POLL_SECONDS: u64 = 3;

/// Blocklist of placeholder patterns left over from setup templates (case-insensitive).
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "inserisci",
    "your-",
    "changeme",
    "placeholder",
    "replace",
    "xxx",
    "todo",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Configuration required: {0} still holds a placeholder value")]
    Placeholder(String),
}

/// Aula application configuration.
#[derive(Debug, Clone)]
pub struct AulaConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL (decides whether cookies are marked secure)
    pub base_url: String,
    /// Which remote store backend to use
    pub store: StoreConfig,
    /// How often the course page polls for new chat messages
    pub chat_poll_interval: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
    /// Emit logs as JSON
    pub log_json: bool,
}

/// Remote store backend selection.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// PostgREST endpoint of the hosted store.
    Rest(SupabaseConfig),
    /// Process-local tables (development and tests).
    Memory,
}

/// Hosted store connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project base URL, always ending with `/`
    pub url: Url,
    /// Anon API key
    pub anon_key: SecretString,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .finish()
    }
}

impl AulaConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// still hold setup placeholders.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`AulaConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = get_env_or_default(&lookup, "AULA_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("AULA_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default(&lookup, "AULA_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("AULA_PORT".to_string(), e.to_string()))?;
        let base_url = get_optional_env(&lookup, "AULA_BASE_URL")
            .unwrap_or_else(|| format!("http://{host}:{port}"));

        let poll_seconds = get_env_or_default(
            &lookup,
            "AULA_CHAT_POLL_SECONDS",
            &DEFAULT_CHAT_POLL_SECONDS.to_string(),
        )
        .parse::<u64>()
        .ok()
        .filter(|seconds| *seconds > 0)
        .ok_or_else(|| {
            ConfigError::InvalidEnvVar(
                "AULA_CHAT_POLL_SECONDS".to_string(),
                "must be a positive number of seconds".to_string(),
            )
        })?;

        let store = match get_env_or_default(&lookup, "AULA_STORE", "rest").as_str() {
            "rest" => StoreConfig::Rest(SupabaseConfig::from_lookup(&lookup)?),
            "memory" => StoreConfig::Memory,
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    "AULA_STORE".to_string(),
                    format!("expected 'rest' or 'memory', got '{other}'"),
                ));
            }
        };

        Ok(Self {
            host,
            port,
            base_url,
            store,
            chat_poll_interval: Duration::from_secs(poll_seconds),
            sentry_dsn: get_optional_env(&lookup, "SENTRY_DSN"),
            sentry_environment: get_optional_env(&lookup, "SENTRY_ENVIRONMENT"),
            log_json: get_optional_env(&lookup, "AULA_LOG_JSON").is_some(),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

impl SupabaseConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_url = get_required_env(lookup, "SUPABASE_URL")?;
        reject_placeholder(&raw_url, "SUPABASE_URL")?;
        let url = parse_base_url(&raw_url)?;

        let anon_key = get_required_env(lookup, "SUPABASE_ANON_KEY")?;
        reject_placeholder(&anon_key, "SUPABASE_ANON_KEY")?;

        Ok(Self {
            url,
            anon_key: SecretString::from(anon_key),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env<F>(lookup: &F, key: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating blank values as unset.
fn get_optional_env<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    get_optional_env(lookup, key).unwrap_or_else(|| default.to_string())
}

/// Reject values copied verbatim from setup instructions.
fn reject_placeholder(value: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = value.to_lowercase();
    if PLACEHOLDER_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
    {
        return Err(ConfigError::Placeholder(var_name.to_string()));
    }
    Ok(())
}

/// Parse the store URL, normalizing it to end with `/` so relative joins keep its path.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    let url = Url::parse(&with_slash)
        .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL".to_string(), e.to_string()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "SUPABASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(url)
}
