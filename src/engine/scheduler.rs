use crate::core::errors::ExchangeError;
use crate::core::traits::SellVenue;
use crate::core::types::to_epoch_seconds;
use std::time::Duration;
use tracing::{debug, info};

/// Block until the exchange clock reaches `target` (epoch seconds).
///
/// Uses the exchange's own time endpoint, never the local clock. Returns the
/// first observed exchange time that is `>= target`; no sleep happens after it.
pub async fn wait_until<V>(
    venue: &V,
    target: u64,
    poll_interval: Duration,
) -> Result<u64, ExchangeError>
where
    V: SellVenue + ?Sized,
{
    let mut polls: u64 = 0;

    loop {
        let raw = venue.get_server_time().await?;
        let now = to_epoch_seconds(raw);
        polls += 1;

        if now >= target {
            info!(exchange = %venue.kind(), server_time = now, polls, "Sale time reached");
            return Ok(now);
        }

        info!(exchange = %venue.kind(), "{} sec.", target - now);
        debug!(raw, polls, "Exchange clock behind target");
        tokio::time::sleep(poll_interval).await;
    }
}
