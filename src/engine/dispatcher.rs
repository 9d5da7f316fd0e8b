use crate::core::errors::ExchangeError;
use crate::core::traits::SellVenue;
use crate::core::types::{AttemptResult, SaleOrderSpec};
use crate::engine::scheduler::wait_until;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info, instrument};

/// Fires `requests_count` identical sell orders, at most `threads` in flight.
///
/// Every attempt is spawned before the sale time behind a gate with no
/// permits; reaching the target adds `threads` permits, so nothing is sent
/// early and the first wave leaves together.
#[derive(Debug, Clone)]
pub struct BurstDispatcher {
    threads: usize,
    requests_count: usize,
    poll_interval: Duration,
}

impl BurstDispatcher {
    pub fn new(threads: usize, requests_count: usize) -> Self {
        Self {
            threads: threads.max(1),
            requests_count,
            poll_interval: Duration::from_millis(250),
        }
    }

    #[must_use]
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait for the exchange clock to reach `target`, then fire the burst.
    #[instrument(
        skip(self, venue, order),
        fields(exchange = %venue.kind(), threads = self.threads, requests = self.requests_count)
    )]
    pub async fn run(
        &self,
        venue: Arc<dyn SellVenue>,
        order: Arc<SaleOrderSpec>,
        target: u64,
    ) -> Result<Vec<AttemptResult>, ExchangeError> {
        let gate = Arc::new(Semaphore::new(0));
        let handles = self.spawn_attempts(&venue, &order, &gate);

        if let Err(e) = wait_until(venue.as_ref(), target, self.poll_interval).await {
            // Queued attempts see a closed gate and finish without sending
            gate.close();
            join_all(handles).await;
            return Err(e);
        }

        gate.add_permits(self.threads);
        info!("Releasing {} sell requests", self.requests_count);
        Ok(collect_results(join_all(handles).await))
    }

    /// Fire the burst now, without waiting for a target time.
    #[cfg(test)]
    async fn fire(
        &self,
        venue: Arc<dyn SellVenue>,
        order: Arc<SaleOrderSpec>,
    ) -> Vec<AttemptResult> {
        let gate = Arc::new(Semaphore::new(self.threads));
        let handles = self.spawn_attempts(&venue, &order, &gate);
        collect_results(join_all(handles).await)
    }

    fn spawn_attempts(
        &self,
        venue: &Arc<dyn SellVenue>,
        order: &Arc<SaleOrderSpec>,
        gate: &Arc<Semaphore>,
    ) -> Vec<tokio::task::JoinHandle<AttemptResult>> {
        (1..=self.requests_count)
            .map(|attempt| {
                let venue = Arc::clone(venue);
                let order = Arc::clone(order);
                let gate = Arc::clone(gate);
                tokio::spawn(async move { submit_attempt(attempt, venue, order, gate).await })
            })
            .collect()
    }
}

async fn submit_attempt(
    attempt: usize,
    venue: Arc<dyn SellVenue>,
    order: Arc<SaleOrderSpec>,
    gate: Arc<Semaphore>,
) -> AttemptResult {
    let Ok(_permit) = gate.acquire_owned().await else {
        return AttemptResult::Failed {
            attempt,
            reason: "cancelled before dispatch".to_string(),
        };
    };

    match venue.submit_sell_order(&order).await {
        Ok(ack) => {
            info!(attempt, "Order Id: {}", ack.order_id);
            AttemptResult::Filled {
                attempt,
                order_id: ack.order_id,
            }
        }
        Err(e) => {
            error!(attempt, "Sell attempt failed: {}", e);
            AttemptResult::Failed {
                attempt,
                reason: e.to_string(),
            }
        }
    }
}

fn collect_results(
    joined: Vec<Result<AttemptResult, tokio::task::JoinError>>,
) -> Vec<AttemptResult> {
    joined
        .into_iter()
        .enumerate()
        .map(|(index, result)| {
            result.unwrap_or_else(|e| AttemptResult::Failed {
                attempt: index + 1,
                reason: format!("attempt task failed: {}", e),
            })
        })
        .collect()
}
