use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{ReqwestTransport, RestClientBuilder, RestClientConfig, RetryPolicy};
use crate::exchanges::kucoin::connector::KuCoinConnector;

/// Create a KuCoin connector over a pooled reqwest transport
pub fn build_connector(
    config: &ExchangeConfig,
    rest_config: RestClientConfig,
    policy: RetryPolicy,
) -> Result<KuCoinConnector<ReqwestTransport>, ExchangeError> {
    if !config.has_credentials() {
        return Err(ExchangeError::AuthError(
            "KuCoin requires an API key and secret".to_string(),
        ));
    }

    let transport = RestClientBuilder::new(rest_config).build()?;
    KuCoinConnector::new(transport, config, policy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_kucoin_connector_missing_passphrase() {
        let config = ExchangeConfig::new("test_key".to_string(), "test_secret".to_string());
        let result = build_connector(
            &config,
            RestClientConfig::new("kucoin".to_string()),
            RetryPolicy::default(),
        );
        assert!(result.is_err());
        assert!(result.err().unwrap().to_string().contains("passphrase"));
    }

    #[test]
    fn test_build_kucoin_connector_with_credentials() {
        let config = ExchangeConfig::new("test_key".to_string(), "test_secret".to_string())
            .passphrase("test_passphrase".to_string());
        let result = build_connector(
            &config,
            RestClientConfig::new("kucoin".to_string()),
            RetryPolicy::default(),
        );
        assert!(result.is_ok());
    }
}
