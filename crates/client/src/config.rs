//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SALESDESK_API_URL` - Base URL of the quotation backend
//!
//! ## Optional
//! - `SALESDESK_API_TOKEN` - Bearer token sent with every request
//! - `SALESDESK_HTTP_TIMEOUT_SECS` - Request timeout (default: 30)
//! - `SEQUENCE_WIDTHS` - Pad widths per prefix, e.g. `LD=3,DO=2,QN=3`
//! - `QUOTATION_PREFIX` - Prefix for quotation numbers (default: QN)
//! - `SEQUENCE_CLAIM_ATTEMPTS` - Claim retries when issuing numbers (default: 5)

use std::time::Duration;

use reqwest::Url;
use salesdesk_core::sequence::{QUOTATION_PREFIX, SequenceNumber, SequenceRegistry};
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CLAIM_ATTEMPTS: u32 = 5;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Backend and sequence configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Backend base URL
    pub api_url: Url,
    /// Bearer token, if the backend requires one
    pub api_token: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pad widths for sequence identifiers
    pub sequences: SequenceRegistry,
    /// Prefix for quotation numbers
    pub quotation_prefix: String,
    /// How many times the issuer retries a lost claim
    pub claim_attempts: u32,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url.as_str())
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("sequences", &self.sequences)
            .field("quotation_prefix", &self.quotation_prefix)
            .field("claim_attempts", &self.claim_attempts)
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value
    /// does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_url = get("SALESDESK_API_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("SALESDESK_API_URL".to_string()))?;
        let api_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SALESDESK_API_URL".to_string(), e))?;

        let api_token = get("SALESDESK_API_TOKEN").map(SecretString::from);

        let timeout_secs = get("SALESDESK_HTTP_TIMEOUT_SECS")
            .map(|s| parse_positive::<u64>("SALESDESK_HTTP_TIMEOUT_SECS", &s))
            .transpose()?
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let sequences = Self::sequences_from_lookup(&lookup)?;

        let quotation_prefix = get("QUOTATION_PREFIX")
            .map_or_else(|| QUOTATION_PREFIX.to_string(), |p| p.trim().to_string());
        // A prefix is valid iff its seed identifier parses back.
        SequenceNumber::parse(&format!("{quotation_prefix}-1")).map_err(|e| {
            ConfigError::InvalidEnvVar("QUOTATION_PREFIX".to_string(), e.to_string())
        })?;

        let claim_attempts = get("SEQUENCE_CLAIM_ATTEMPTS")
            .map(|s| parse_positive::<u32>("SEQUENCE_CLAIM_ATTEMPTS", &s))
            .transpose()?
            .unwrap_or(DEFAULT_CLAIM_ATTEMPTS);

        Ok(Self {
            api_url,
            api_token,
            timeout: Duration::from_secs(timeout_secs),
            sequences,
            quotation_prefix,
            claim_attempts,
        })
    }

    /// Load only the sequence pad widths, for tools that never reach the
    /// backend.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `SEQUENCE_WIDTHS` does not
    /// parse.
    pub fn sequences_from_env() -> Result<SequenceRegistry, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::sequences_from_lookup(|key| std::env::var(key).ok())
    }

    /// Sequence pad widths from `SEQUENCE_WIDTHS` in an arbitrary lookup.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sequences_from_env`].
    pub fn sequences_from_lookup<F>(lookup: F) -> Result<SequenceRegistry, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup("SEQUENCE_WIDTHS").filter(|v| !v.trim().is_empty()) {
            Some(table) => SequenceRegistry::default().with_table(&table).map_err(|e| {
                ConfigError::InvalidEnvVar("SEQUENCE_WIDTHS".to_string(), e.to_string())
            }),
            None => Ok(SequenceRegistry::default()),
        }
    }
}

/// Parse a base URL, making sure relative paths join beneath it.
fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err("must be an absolute http(s) URL".to_string());
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {}", url.scheme()));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_positive<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let parsed = value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if parsed <= T::default() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(parsed)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use secrecy::ExposeSecret;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("SALESDESK_API_URL", "https://api.example.test/v1")]).unwrap();
        assert_eq!(config.api_url.as_str(), "https://api.example.test/v1/");
        assert!(config.api_token.is_none());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.quotation_prefix, "QN");
        assert_eq!(config.claim_attempts, 5);
        assert_eq!(config.sequences.width("DO"), 2);
    }

    #[test]
    fn test_missing_url() {
        assert!(matches!(
            load(&[("SALESDESK_API_URL", "  ")]),
            Err(ConfigError::MissingEnvVar(key)) if key == "SALESDESK_API_URL"
        ));
    }

    #[test]
    fn test_invalid_values() {
        let base = ("SALESDESK_API_URL", "http://localhost:5050");
        for (key, value) in [
            ("SALESDESK_API_URL", "not a url"),
            ("SALESDESK_API_URL", "ftp://files.example.test"),
            ("SALESDESK_HTTP_TIMEOUT_SECS", "0"),
            ("SALESDESK_HTTP_TIMEOUT_SECS", "soon"),
            ("SEQUENCE_WIDTHS", "LD=three"),
            ("QUOTATION_PREFIX", "Q N"),
            ("SEQUENCE_CLAIM_ATTEMPTS", "-1"),
        ] {
            let vars = if key == base.0 {
                vec![(key, value)]
            } else {
                vec![base, (key, value)]
            };
            assert!(
                matches!(load(&vars), Err(ConfigError::InvalidEnvVar(k, _)) if k == key),
                "{key}={value} should be rejected"
            );
        }
    }

    #[test]
    fn test_sequences_without_backend_settings() {
        let registry = ClientConfig::sequences_from_lookup(|key| {
            (key == "SEQUENCE_WIDTHS").then(|| "LD=5".to_string())
        })
        .unwrap();
        assert_eq!(registry.width("LD"), 5);
        assert_eq!(registry.width("DO"), 2);

        let blank = ClientConfig::sequences_from_lookup(|_| Some("  ".to_string())).unwrap();
        assert_eq!(blank.width("LD"), 3);

        assert!(matches!(
            ClientConfig::sequences_from_lookup(|_| Some("LD=0".to_string())),
            Err(ConfigError::InvalidEnvVar(k, _)) if k == "SEQUENCE_WIDTHS"
        ));
    }

    #[test]
    fn test_overrides_and_redaction() {
        let config = load(&[
            ("SALESDESK_API_URL", "http://localhost:5050/api/"),
            ("SALESDESK_API_TOKEN", "tok-123"),
            ("SALESDESK_HTTP_TIMEOUT_SECS", "5"),
            ("SEQUENCE_WIDTHS", "QN=4"),
            ("QUOTATION_PREFIX", "SQ"),
            ("SEQUENCE_CLAIM_ATTEMPTS", "9"),
        ])
        .unwrap();
        assert_eq!(config.api_url.as_str(), "http://localhost:5050/api/");
        assert_eq!(config.api_token.as_ref().unwrap().expose_secret(), "tok-123");
        assert_eq!(config.sequences.width("QN"), 4);
        assert_eq!(config.quotation_prefix, "SQ");
        assert_eq!(config.claim_attempts, 9);

        let debug = format!("{config:?}");
        assert!(!debug.contains("tok-123"));
        assert!(debug.contains("[REDACTED]"));
    }
}
