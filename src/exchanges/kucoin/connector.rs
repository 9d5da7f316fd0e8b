use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HttpTransport, RetryPolicy, RetryingRest};
use crate::core::traits::SellVenue;
use crate::core::types::{
    ExchangeKind, OrderAck, OrderSide, OrderType, SaleOrderSpec, TradingPair,
};
use crate::exchanges::kucoin::rest::{KuCoinClassifier, KuCoinRestClient};
use crate::exchanges::kucoin::signer::KuCoinSigner;
use crate::exchanges::kucoin::types::KuCoinOrderRequest;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{info, instrument};
use uuid::Uuid;

pub const DEFAULT_BASE_URL: &str = "https://api.kucoin.com";

/// KuCoin spot connector
pub struct KuCoinConnector<T: HttpTransport> {
    rest: KuCoinRestClient<T>,
}

impl<T: HttpTransport> KuCoinConnector<T> {
    pub fn new(
        transport: T,
        config: &ExchangeConfig,
        policy: RetryPolicy,
    ) -> Result<Self, ExchangeError> {
        let passphrase = config.passphrase_str().ok_or_else(|| {
            ExchangeError::AuthError("KuCoin requires an API passphrase".to_string())
        })?;
        let signer = KuCoinSigner::new(
            config.api_key().to_string(),
            config.secret_key().to_string(),
            passphrase,
        )?;
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let rest = RetryingRest::new(transport, KuCoinClassifier, "kucoin").with_policy(policy);

        Ok(Self {
            rest: KuCoinRestClient::new(rest, signer, base_url),
        })
    }
}

fn convert_order_side(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "buy",
        OrderSide::Sell => "sell",
    }
}

fn convert_order_type(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "market",
        OrderType::Limit => "limit",
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(value.trim())
        .map_err(|e| ExchangeError::DeserializationError(format!("Invalid {}: {}", field, e)))
}

#[async_trait]
impl<T: HttpTransport> SellVenue for KuCoinConnector<T> {
    fn kind(&self) -> ExchangeKind {
        ExchangeKind::KuCoin
    }

    #[instrument(skip(self), fields(exchange = "kucoin"))]
    async fn get_balance(&self, token: &str) -> Result<Option<Decimal>, ExchangeError> {
        let response = self.rest.get_accounts(&token.to_uppercase()).await?;

        response
            .data
            .into_iter()
            .find(|a| a.currency.eq_ignore_ascii_case(token) && a.account_type == "trade")
            .map(|a| parse_decimal("available", &a.available))
            .transpose()
    }

    #[instrument(skip(self), fields(exchange = "kucoin", pair = %pair))]
    async fn get_quantity_precision(
        &self,
        pair: &TradingPair,
    ) -> Result<Option<Decimal>, ExchangeError> {
        let response = self.rest.get_symbols().await?;

        response
            .data
            .into_iter()
            .find(|s| pair.matches(&s.base_currency, &s.quote_currency))
            .map(|s| parse_decimal("baseIncrement", &s.base_increment))
            .transpose()
    }

    async fn get_server_time(&self) -> Result<u64, ExchangeError> {
        Ok(self.rest.get_server_time().await?.data)
    }

    #[instrument(skip(self, order), fields(exchange = "kucoin", pair = %order.pair))]
    async fn submit_sell_order(&self, order: &SaleOrderSpec) -> Result<OrderAck, ExchangeError> {
        // One idempotency key per attempt, reused across its retries
        let client_oid = Uuid::new_v4().to_string();
        let request = KuCoinOrderRequest {
            client_oid: client_oid.clone(),
            side: convert_order_side(order.side).to_string(),
            symbol: order.pair.symbol("-"),
            order_type: convert_order_type(order.order_type).to_string(),
            price: order.limit_price.to_string(),
            size: order.quantity.to_string(),
        };

        let response = self.rest.place_order(&request).await?;
        info!(order_id = %response.data.order_id, client_oid = %client_oid, "Order created");

        Ok(OrderAck {
            order_id: response.data.order_id,
            client_order_id: Some(client_oid),
        })
    }
}
