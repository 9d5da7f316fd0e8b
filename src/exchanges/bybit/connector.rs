use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HttpTransport, RetryPolicy, RetryingRest};
use crate::core::traits::SellVenue;
use crate::core::types::{
    ExchangeKind, OrderAck, OrderSide, OrderType, SaleOrderSpec, TradingPair,
};
use crate::exchanges::bybit::rest::{BybitClassifier, BybitRestClient};
use crate::exchanges::bybit::signer::BybitSigner;
use crate::exchanges::bybit::types::BybitOrderRequest;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.bybit.com";

/// Bybit spot connector
pub struct BybitConnector<T: HttpTransport> {
    rest: BybitRestClient<T>,
}

impl<T: HttpTransport> BybitConnector<T> {
    pub fn new(transport: T, config: &ExchangeConfig, policy: RetryPolicy) -> Self {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let signer = BybitSigner::new(
            config.api_key().to_string(),
            config.secret_key().to_string(),
        );
        let rest = RetryingRest::new(transport, BybitClassifier, "bybit").with_policy(policy);

        Self {
            rest: BybitRestClient::new(rest, signer, base_url),
        }
    }
}

fn convert_order_side(side: OrderSide) -> &'static str {
    match side {
        OrderSide::Buy => "Buy",
        OrderSide::Sell => "Sell",
    }
}

fn convert_order_type(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::Market => "Market",
        OrderType::Limit => "Limit",
    }
}

fn parse_decimal(field: &str, value: &str) -> Result<Decimal, ExchangeError> {
    Decimal::from_str(value.trim())
        .map_err(|e| ExchangeError::DeserializationError(format!("Invalid {}: {}", field, e)))
}

#[async_trait]
impl<T: HttpTransport> SellVenue for BybitConnector<T> {
    fn kind(&self) -> ExchangeKind {
        ExchangeKind::Bybit
    }

    #[instrument(skip(self), fields(exchange = "bybit"))]
    async fn get_balance(&self, token: &str) -> Result<Option<Decimal>, ExchangeError> {
        let response = self.rest.get_wallet_balance(&token.to_uppercase()).await?;

        for account in response.result.list {
            if account.account_type != "SPOT" {
                continue;
            }
            let Some(entry) = account
                .coin
                .into_iter()
                .find(|c| c.coin.eq_ignore_ascii_case(token))
            else {
                continue;
            };
            let raw = entry
                .free
                .filter(|s| !s.trim().is_empty())
                .or(entry.wallet_balance)
                .filter(|s| !s.trim().is_empty());
            return raw.map(|v| parse_decimal("balance", &v)).transpose();
        }

        Ok(None)
    }

    #[instrument(skip(self), fields(exchange = "bybit", pair = %pair))]
    async fn get_quantity_precision(
        &self,
        pair: &TradingPair,
    ) -> Result<Option<Decimal>, ExchangeError> {
        let response = self.rest.get_instruments(&pair.symbol("")).await?;

        response
            .result
            .list
            .into_iter()
            .find(|i| pair.matches(&i.base_coin, &i.quote_coin))
            .map(|i| parse_decimal("basePrecision", &i.lot_size_filter.base_precision))
            .transpose()
    }

    async fn get_server_time(&self) -> Result<u64, ExchangeError> {
        let response = self.rest.get_server_time().await?;
        response
            .result
            .time_second
            .trim()
            .parse::<u64>()
            .map_err(|e| {
                ExchangeError::DeserializationError(format!("Invalid timeSecond: {}", e))
            })
    }

    #[instrument(skip(self, order), fields(exchange = "bybit", pair = %order.pair))]
    async fn submit_sell_order(&self, order: &SaleOrderSpec) -> Result<OrderAck, ExchangeError> {
        let request = BybitOrderRequest {
            category: "spot".to_string(),
            symbol: order.pair.symbol(""),
            side: convert_order_side(order.side).to_string(),
            order_type: convert_order_type(order.order_type).to_string(),
            qty: order.quantity.to_string(),
            price: order.limit_price.to_string(),
        };

        let response = self.rest.place_order(&request).await?;
        info!(order_id = %response.result.order_id, "Order created");

        Ok(OrderAck {
            order_id: response.result.order_id,
            client_order_id: response.result.order_link_id.filter(|id| !id.is_empty()),
        })
    }
}
