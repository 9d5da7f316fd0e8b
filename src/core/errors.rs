use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    /// The exchange rejected the request because of its source address.
    /// Resending the same signed request cannot fix this; the caller must re-sign.
    #[error("Invalid request ip: {0}")]
    InvalidRequestIp(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Gave up after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}
