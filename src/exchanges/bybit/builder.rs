use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestTransport, RestClientBuilder, RestClientConfig, RetryPolicy};
use crate::exchanges::bybit::connector::BybitConnector;

/// Create a Bybit connector over a pooled reqwest transport
pub fn build_connector(
    config: &ExchangeConfig,
    rest_config: RestClientConfig,
    policy: RetryPolicy,
) -> Result<BybitConnector<ReqwestTransport>, ExchangeError> {
    if !config.has_credentials() {
        return Err(ExchangeError::AuthError(
            "Bybit requires an API key and secret".to_string(),
        ));
    }

    let transport = RestClientBuilder::new(rest_config).build()?;
    Ok(BybitConnector::new(transport, config, policy))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_bybit_connector() {
        let config = ExchangeConfig::new("key".to_string(), "secret".to_string());
        let result = build_connector(
            &config,
            RestClientConfig::new("bybit".to_string()),
            RetryPolicy::default(),
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_build_bybit_connector_without_credentials() {
        let config = ExchangeConfig::new(String::new(), String::new());
        let result = build_connector(
            &config,
            RestClientConfig::new("bybit".to_string()),
            RetryPolicy::default(),
        );
        assert!(result.is_err());
    }
}
