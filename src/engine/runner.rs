use crate::core::errors::ExchangeError;
use crate::core::traits::SellVenue;
use crate::core::types::{
    default_quantity_step, AttemptResult, QuantityRounding, SaleOrderSpec, TradingPair,
};
use crate::engine::dispatcher::BurstDispatcher;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing to sell; no order was sent
    NoBalance,
    /// Balance was smaller than one quantity step; no order was sent
    QuantityTooSmall { balance: Decimal, step: Decimal },
    /// The burst ran; one result per attempt
    Completed {
        order: SaleOrderSpec,
        results: Vec<AttemptResult>,
    },
}

impl RunOutcome {
    pub fn filled_count(&self) -> usize {
        match self {
            Self::Completed { results, .. } => results.iter().filter(|r| r.is_success()).count(),
            _ => 0,
        }
    }
}

/// Sells the whole spot balance of `pair.base` at `limit_price` at `target`
pub struct AutoSeller {
    venue: Arc<dyn SellVenue>,
    pair: TradingPair,
    limit_price: Decimal,
    target: u64,
    dispatcher: BurstDispatcher,
}

impl AutoSeller {
    pub fn new(
        venue: Arc<dyn SellVenue>,
        pair: TradingPair,
        limit_price: Decimal,
        target: u64,
        dispatcher: BurstDispatcher,
    ) -> Self {
        Self {
            venue,
            pair,
            limit_price,
            target,
            dispatcher,
        }
    }

    /// Balance, then step, then rounding, then wait, then burst.
    pub async fn run(&self) -> Result<RunOutcome, ExchangeError> {
        let token = self.pair.base.to_uppercase();

        let balance = match self.venue.get_balance(&self.pair.base).await? {
            Some(balance) if balance > Decimal::ZERO => balance,
            _ => {
                error!("Zero Token Balance: {}", token);
                return Ok(RunOutcome::NoBalance);
            }
        };

        let step = match self.venue.get_quantity_precision(&self.pair).await? {
            Some(step) if step > Decimal::ZERO => step,
            _ => {
                let fallback = default_quantity_step();
                warn!(
                    "Error When Getting Base Precision: {}, Using {}",
                    token, fallback
                );
                fallback
            }
        };

        let quantity = resolve_quantity(self.venue.kind().quantity_rounding(), balance, step);
        info!("{} - {}", token, quantity);

        if quantity <= Decimal::ZERO {
            error!(%balance, %step, "Balance is below one quantity step");
            return Ok(RunOutcome::QuantityTooSmall { balance, step });
        }

        let order = SaleOrderSpec::limit_sell(self.pair.clone(), quantity, self.limit_price);
        let results = self
            .dispatcher
            .run(
                Arc::clone(&self.venue),
                Arc::new(order.clone()),
                self.target,
            )
            .await?;

        Ok(RunOutcome::Completed { order, results })
    }
}

/// Tradable quantity for `balance`; never more than `balance`
pub fn resolve_quantity(rounding: QuantityRounding, balance: Decimal, step: Decimal) -> Decimal {
    rounding.apply(balance, step)
}
