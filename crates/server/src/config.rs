//! Server configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FARMGATE_DATABASE_URL` - `MongoDB` connection string (falls back to
//!   `DATABASE_URL`)
//!
//! ## Optional
//! - `FARMGATE_HOST` - Bind address (default: 127.0.0.1)
//! - `FARMGATE_PORT` - Listen port (default: 3000)
//! - `FARMGATE_DATABASE_NAME` - Database to select (default: farmgate)
//! - `NOTIFIER_ENDPOINT` - Order notification endpoint; notifications are
//!   skipped when unset
//! - `NOTIFIER_API_KEY` - Bearer key for the notification endpoint
//!   (required when the endpoint is set)
//! - `GEOCODER_ENDPOINT` - Nominatim-compatible search endpoint
//!   (default: <https://nominatim.openstreetmap.org>)
//! - `IMAGE_STORE_ENDPOINT` - Image hosting upload endpoint; uploads are
//!   rejected when unset
//! - `IMAGE_STORE_API_KEY` - Key for the image hosting endpoint (required
//!   when the endpoint is set)

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

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

/// Marketplace server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// `MongoDB` connection URL (contains credentials)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Database to select on the deployment
    pub database_name: String,
    /// Order notification endpoint, if configured
    pub notifier: Option<NotifierConfig>,
    /// Geocoding endpoint configuration
    pub geocoder: GeocoderConfig,
    /// Image hosting endpoint, if configured
    pub images: Option<ImageStoreConfig>,
}

/// Order notification endpoint configuration.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// Endpoint that accepts notification payloads
    pub endpoint: String,
    /// Bearer key for the endpoint
    pub api_key: SecretString,
}

/// Geocoding endpoint configuration.
#[derive(Debug, Clone)]
pub struct GeocoderConfig {
    /// Nominatim-compatible search endpoint
    pub endpoint: String,
}

/// Image hosting endpoint configuration.
#[derive(Debug, Clone)]
pub struct ImageStoreConfig {
    /// Endpoint that accepts image uploads
    pub endpoint: String,
    /// Upload key for the endpoint
    pub api_key: SecretString,
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

        let database_url = get_database_url("FARMGATE_DATABASE_URL")?;
        let host = get_env_or_default("FARMGATE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMGATE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("FARMGATE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("FARMGATE_PORT".to_string(), e.to_string()))?;
        let database_name = get_env_or_default("FARMGATE_DATABASE_NAME", "farmgate");

        let notifier = NotifierConfig::from_env()?;
        let geocoder = GeocoderConfig::from_env();
        let images = ImageStoreConfig::from_env()?;

        Ok(Self {
            database_url,
            host,
            port,
            database_name,
            notifier,
            geocoder,
            images,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl NotifierConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(endpoint) = get_optional_env("NOTIFIER_ENDPOINT") else {
            return Ok(None);
        };
        Ok(Some(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: get_validated_secret("NOTIFIER_API_KEY")?,
        }))
    }
}

impl GeocoderConfig {
    fn from_env() -> Self {
        let endpoint = get_env_or_default("GEOCODER_ENDPOINT", "https://nominatim.openstreetmap.org");
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }
}

impl ImageStoreConfig {
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Some(endpoint) = get_optional_env("IMAGE_STORE_ENDPOINT") else {
            return Ok(None);
        };
        Ok(Some(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: get_validated_secret("IMAGE_STORE_API_KEY")?,
        }))
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get database URL with fallback to generic `DATABASE_URL` (set by platform
/// database attachments).
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
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
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

    // Real API keys have high entropy
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
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_single_char() {
        // All same character = 0 entropy
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        // "ab" has entropy of 1 bit per char (50% a, 50% b)
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_shannon_entropy_high() {
        // Random-looking string should have high entropy
        let entropy = shannon_entropy("aB3$xY9!mK2@nL5#");
        assert!(entropy > 3.3);
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let result = validate_secret_strength("your-api-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_valid() {
        // High-entropy random string
        let result = validate_secret_strength("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ServerConfig {
            database_url: SecretString::from("mongodb://localhost:27017"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            database_name: "farmgate".to_string(),
            notifier: None,
            geocoder: GeocoderConfig {
                endpoint: "https://nominatim.openstreetmap.org".to_string(),
            },
            images: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_notifier_config_debug_redacts_api_key() {
        let config = NotifierConfig {
            endpoint: "https://notify.example.net/v1".to_string(),
            api_key: SecretString::from("kY9mN2pQ7rT0uW4z"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("notify.example.net"));
        assert!(!debug_output.contains("kY9mN2pQ7rT0uW4z"));
    }
}
