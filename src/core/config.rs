use crate::core::kernel::retry::RetryPolicy;
use crate::core::types::{to_epoch_seconds, ExchangeKind};
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::Path;
use std::time::Duration;

/// Credentials and endpoint for one exchange account
#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub passphrase: Option<Secret<String>>,
    pub base_url: Option<String>,
}

// Never expose secrets in serialization
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 4)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field(
            "passphrase",
            &self.passphrase.as_ref().map(|_| "[REDACTED]"),
        )?;
        state.serialize_field("base_url", &self.base_url)?;
        state.end()
    }
}

impl ExchangeConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            passphrase: None,
            base_url: None,
        }
    }

    /// Set the API passphrase (required by KuCoin)
    #[must_use]
    pub fn passphrase(mut self, passphrase: String) -> Self {
        self.passphrase = Some(Secret::new(passphrase));
        self
    }

    /// Set custom base URL
    #[must_use]
    pub fn base_url(mut self, base_url: String) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Check if this configuration has valid credentials for authenticated operations
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// Get passphrase, if any (use carefully - exposes secret)
    pub fn passphrase_str(&self) -> Option<&str> {
        self.passphrase.as_ref().map(|p| p.expose_secret().as_str())
    }
}

const DEFAULT_POLL_INTERVAL_MS: u64 = 250;
const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

/// Operator settings file.
///
/// ```json
/// {
///   "api_key": "...",
///   "api_secret": "...",
///   "api_pass_phrase": "...",
///   "start_sale_time": 1700000000,
///   "sale_price": "0.35",
///   "threads": 10,
///   "requests_count": 50,
///   "endpoint_url": "https://api.kucoin.com",
///   "proxy": ""
/// }
/// ```
#[derive(Debug, Deserialize)]
pub struct SnipeSettings {
    pub api_key: Secret<String>,
    pub api_secret: Secret<String>,
    #[serde(default, deserialize_with = "empty_secret_as_none")]
    pub api_pass_phrase: Option<Secret<String>>,
    #[serde(deserialize_with = "epoch_seconds")]
    pub start_sale_time: u64,
    pub sale_price: Decimal,
    pub threads: usize,
    pub requests_count: usize,
    pub endpoint_url: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub proxy: Option<String>,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub retry_delay_ms: u64,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

const fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

const fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn empty_secret_as_none<'de, D>(deserializer: D) -> Result<Option<Secret<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Secret<String>>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.expose_secret().trim().is_empty()))
}

/// Accepts seconds or milliseconds, as a number or a string.
fn epoch_seconds<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTime {
        Number(u64),
        Text(String),
    }

    let raw = match RawTime::deserialize(deserializer)? {
        RawTime::Number(n) => n,
        RawTime::Text(s) => s.trim().parse::<u64>().map_err(serde::de::Error::custom)?,
    };
    Ok(to_epoch_seconds(raw))
}

impl SnipeSettings {
    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::InvalidConfiguration(format!(
                "Failed to read settings file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&content)
    }

    /// Parse settings from JSON text. A leading UTF-8 BOM is tolerated.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let content = content.trim_start_matches('\u{feff}');
        serde_json::from_str(content)
            .map_err(|e| ConfigError::InvalidConfiguration(format!("Invalid settings: {}", e)))
    }

    /// Check the settings against what the selected exchange needs
    pub fn validate(&self, kind: ExchangeKind) -> Result<(), ConfigError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingField("api_key".to_string()));
        }
        if self.api_secret.expose_secret().is_empty() {
            return Err(ConfigError::MissingField("api_secret".to_string()));
        }
        if kind.requires_passphrase() && self.api_pass_phrase.is_none() {
            return Err(ConfigError::MissingField("api_pass_phrase".to_string()));
        }
        if self.endpoint_url.trim().is_empty() {
            return Err(ConfigError::MissingField("endpoint_url".to_string()));
        }
        if self.threads == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.requests_count == 0 {
            return Err(ConfigError::InvalidConfiguration(
                "requests_count must be at least 1".to_string(),
            ));
        }
        if self.sale_price <= Decimal::ZERO {
            return Err(ConfigError::InvalidConfiguration(format!(
                "sale_price must be positive, got {}",
                self.sale_price
            )));
        }
        if self.max_attempts == Some(0) {
            return Err(ConfigError::InvalidConfiguration(
                "max_attempts must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Credentials and endpoint for the connector
    pub fn exchange_config(&self) -> ExchangeConfig {
        let mut config = ExchangeConfig::new(
            self.api_key.expose_secret().clone(),
            self.api_secret.expose_secret().clone(),
        )
        .base_url(self.endpoint_url.trim_end_matches('/').to_string());

        if let Some(passphrase) = &self.api_pass_phrase {
            config = config.passphrase(passphrase.expose_secret().clone());
        }
        config
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration field: {0}")]
    MissingField(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
