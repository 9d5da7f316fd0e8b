pub mod core;
pub mod engine;
pub mod exchanges;
pub mod utils;

pub use core::{errors::ExchangeError, traits::SellVenue, types::*};
pub use engine::{AutoSeller, BurstDispatcher, RunOutcome};
pub use exchanges::bybit::BybitConnector;
pub use exchanges::kucoin::KuCoinConnector;
