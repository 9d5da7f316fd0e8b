use crate::core::{
    errors::ExchangeError,
    types::{ExchangeKind, OrderAck, SaleOrderSpec, TradingPair},
};
use async_trait::async_trait;
use rust_decimal::Decimal;

/// What the scheduler and dispatcher need from an exchange.
///
/// Implementations retry transient API failures internally, so an `Err` here
/// means a local problem (bad credentials, an exhausted attempt cap), not a
/// rejected request.
#[async_trait]
pub trait SellVenue: Send + Sync {
    fn kind(&self) -> ExchangeKind;

    /// Free spot balance of `token`, or `None` when the account holds none
    async fn get_balance(&self, token: &str) -> Result<Option<Decimal>, ExchangeError>;

    /// Minimum quantity increment for the pair, or `None` if the pair is not listed
    async fn get_quantity_precision(
        &self,
        pair: &TradingPair,
    ) -> Result<Option<Decimal>, ExchangeError>;

    /// Exchange clock as reported by its public time endpoint.
    /// Resolution depends on the exchange; see `to_epoch_seconds`.
    async fn get_server_time(&self) -> Result<u64, ExchangeError>;

    async fn submit_sell_order(&self, order: &SaleOrderSpec) -> Result<OrderAck, ExchangeError>;
}
