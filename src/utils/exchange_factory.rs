use crate::core::config::SnipeSettings;
use crate::core::errors::ExchangeError;
use crate::core::kernel::RestClientConfig;
use crate::core::traits::SellVenue;
use crate::core::types::ExchangeKind;
use crate::exchanges::{bybit, kucoin};
use std::sync::Arc;
use tracing::info;

/// Factory for creating exchange connectors
pub struct ExchangeFactory;

impl ExchangeFactory {
    /// Validate `settings` for `kind` and build a shared connector for it
    pub fn create_venue(
        kind: ExchangeKind,
        settings: &SnipeSettings,
    ) -> Result<Arc<dyn SellVenue>, ExchangeError> {
        settings.validate(kind)?;

        let config = settings.exchange_config();
        let rest_config = Self::rest_config(kind, settings);
        let policy = settings.retry_policy();

        info!(
            exchange = %kind,
            endpoint = %settings.endpoint_url,
            proxied = settings.proxy.is_some(),
            "Creating connector"
        );

        match kind {
            ExchangeKind::Bybit => Ok(Arc::new(bybit::build_connector(
                &config,
                rest_config,
                policy,
            )?)),
            ExchangeKind::KuCoin => Ok(Arc::new(kucoin::build_connector(
                &config,
                rest_config,
                policy,
            )?)),
        }
    }

    fn rest_config(kind: ExchangeKind, settings: &SnipeSettings) -> RestClientConfig {
        RestClientConfig::new(kind.to_string().to_lowercase())
            .with_timeout(settings.timeout_seconds)
            .with_proxy(settings.proxy.clone())
    }
}
