//! Sells a spot token balance on Bybit or KuCoin the moment trading opens.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use lotus_autosell::core::config::SnipeSettings;
use lotus_autosell::utils::exchange_factory::ExchangeFactory;
use lotus_autosell::{AutoSeller, BurstDispatcher, ExchangeKind, RunOutcome, TradingPair};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Timed limit-sell burst for a token listing
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Settings file path (can also be set via AUTOSELL_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Exchange to sell on: bybit (2) or kucoin (1)
    #[arg(short, long)]
    exchange: ExchangeKind,

    /// Token to sell
    #[arg(long)]
    from: String,

    /// Token to receive
    #[arg(long)]
    to: String,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    // CLI arg > AUTOSELL_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("AUTOSELL_CONFIG").ok())
        .unwrap_or_else(|| "settings.json".to_string());

    info!(config_path = %config_path, exchange = %args.exchange, "Loading settings");
    let settings = SnipeSettings::from_file(&config_path)
        .with_context(|| format!("failed to load settings from {}", config_path))?;

    let pair = TradingPair::new(args.from, args.to)?;
    let venue = ExchangeFactory::create_venue(args.exchange, &settings)?;
    let dispatcher = BurstDispatcher::new(settings.threads, settings.requests_count)
        .with_poll_interval(settings.poll_interval());

    let sale_time = i64::try_from(settings.start_sale_time)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| settings.start_sale_time.to_string(), |t| t.to_rfc3339());
    info!(%pair, sale_time = %sale_time, "Sell scheduled");

    let seller = AutoSeller::new(
        venue,
        pair,
        settings.sale_price,
        settings.start_sale_time,
        dispatcher,
    );

    match seller.run().await? {
        RunOutcome::Completed { order, results } => {
            let filled = results.iter().filter(|r| r.is_success()).count();
            info!(
                quantity = %order.quantity,
                price = %order.limit_price,
                filled,
                attempts = results.len(),
                "Sell burst finished"
            );
        }
        RunOutcome::NoBalance => warn!("Nothing to sell"),
        RunOutcome::QuantityTooSmall { balance, step } => {
            warn!(%balance, %step, "Balance below one quantity step, nothing sold");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_and_pair_are_required() {
        assert!(Args::try_parse_from(["autosell"]).is_err());
        assert!(Args::try_parse_from(["autosell", "--from", "arb", "--to", "usdt"]).is_err());
        assert!(
            Args::try_parse_from(["autosell", "--exchange", "kucoin", "--to", "usdt"]).is_err()
        );
        assert!(
            Args::try_parse_from(["autosell", "--exchange", "kucoin", "--from", "arb"]).is_err()
        );
    }

    #[test]
    fn test_full_arguments_parse() {
        let args = Args::try_parse_from([
            "autosell",
            "--exchange",
            "2",
            "--from",
            "arb",
            "--to",
            "usdt",
        ])
        .unwrap();
        assert_eq!(args.exchange, ExchangeKind::Bybit);
        assert_eq!(args.from, "arb");
        assert!(args.config.is_none());
    }
}
