use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Unknown exchange: {0}")]
    UnknownExchange(String),
}

/// Supported exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeKind {
    Bybit,
    KuCoin,
}

impl ExchangeKind {
    pub const fn requires_passphrase(self) -> bool {
        matches!(self, Self::KuCoin)
    }

    /// How this exchange turns a raw balance into a tradable quantity
    pub const fn quantity_rounding(self) -> QuantityRounding {
        match self {
            Self::Bybit => QuantityRounding::TruncateDigits,
            Self::KuCoin => QuantityRounding::FloorToStep,
        }
    }
}

impl fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bybit => write!(f, "Bybit"),
            Self::KuCoin => write!(f, "KuCoin"),
        }
    }
}

impl FromStr for ExchangeKind {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "kucoin" => Ok(Self::KuCoin),
            "2" | "bybit" => Ok(Self::Bybit),
            other => Err(TypesError::UnknownExchange(other.to_string())),
        }
    }
}

/// Base/quote token pair. Tokens are stored lower case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradingPair {
    pub base: String,
    pub quote: String,
}

impl TradingPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Result<Self, TypesError> {
        let base = base.into().trim().to_lowercase();
        let quote = quote.into().trim().to_lowercase();

        if base.is_empty() || quote.is_empty() {
            return Err(TypesError::InvalidSymbol(
                "Base and quote tokens cannot be empty".to_string(),
            ));
        }

        Ok(Self { base, quote })
    }

    /// Symbol with the given separator, upper case: `BTCUSDT` or `BTC-USDT`
    pub fn symbol(&self, separator: &str) -> String {
        format!(
            "{}{}{}",
            self.base.to_uppercase(),
            separator,
            self.quote.to_uppercase()
        )
    }

    pub fn matches(&self, base: &str, quote: &str) -> bool {
        self.base.eq_ignore_ascii_case(base) && self.quote.eq_ignore_ascii_case(quote)
    }
}

impl fmt::Display for TradingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol("/"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderType {
    Market,
    Limit,
}

/// The one order every burst attempt submits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOrderSpec {
    pub pair: TradingPair,
    pub quantity: Decimal,
    pub limit_price: Decimal,
    pub side: OrderSide,
    pub order_type: OrderType,
}

impl SaleOrderSpec {
    pub fn limit_sell(pair: TradingPair, quantity: Decimal, limit_price: Decimal) -> Self {
        Self {
            pair,
            quantity,
            limit_price,
            side: OrderSide::Sell,
            order_type: OrderType::Limit,
        }
    }
}

/// Exchange acknowledgement of a created order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAck {
    pub order_id: String,
    pub client_order_id: Option<String>,
}

/// Terminal state of one burst attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptResult {
    Filled { attempt: usize, order_id: String },
    Failed { attempt: usize, reason: String },
}

impl AttemptResult {
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Filled { .. })
    }
}

/// Step used when the exchange does not list the pair
pub fn default_quantity_step() -> Decimal {
    Decimal::new(1, 1)
}

/// Quantity rounding policy. Both never round up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityRounding {
    /// Keep as many fractional digits as the step has, drop the rest
    TruncateDigits,
    /// `floor(balance / step) * step`
    FloorToStep,
}

impl QuantityRounding {
    pub fn apply(self, balance: Decimal, step: Decimal) -> Decimal {
        if step <= Decimal::ZERO {
            return balance.trunc();
        }
        let digits = step.normalize().scale();
        let quantity = match self {
            Self::TruncateDigits => {
                balance.round_dp_with_strategy(digits, RoundingStrategy::ToZero)
            }
            // Past the Decimal range the quotient is meaningless; truncation is still exact
            Self::FloorToStep => balance
                .checked_div(step)
                .and_then(|units| units.floor().checked_mul(step))
                .unwrap_or(balance)
                .round_dp_with_strategy(digits, RoundingStrategy::ToZero),
        };
        quantity.normalize()
    }
}

/// Keep at most the first 10 digits of an epoch timestamp, so seconds,
/// milliseconds and nanoseconds all come out as seconds.
pub fn to_epoch_seconds(raw: u64) -> u64 {
    let mut value = raw;
    while value >= 10_000_000_000 {
        value /= 10;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_both_policies_truncate_end_to_end_value() {
        let balance = dec!(12.3456789);
        let step = dec!(0.001);
        assert_eq!(
            QuantityRounding::TruncateDigits.apply(balance, step),
            dec!(12.345)
        );
        assert_eq!(QuantityRounding::FloorToStep.apply(balance, step), dec!(12.345));
        assert_eq!(
            QuantityRounding::FloorToStep.apply(balance, step).to_string(),
            "12.345"
        );
    }

    #[test]
    fn test_rounding_never_exceeds_balance() {
        let balances = [dec!(0.99999), dec!(1), dec!(1234.5678), dec!(0.0004), dec!(7.25)];
        let steps = [dec!(1), dec!(0.1), dec!(0.01), dec!(0.0001), dec!(0.25), dec!(0.00000001)];

        for balance in balances {
            for step in steps {
                for policy in [QuantityRounding::TruncateDigits, QuantityRounding::FloorToStep] {
                    let quantity = policy.apply(balance, step);
                    assert!(quantity <= balance, "{policy:?} {balance} {step} -> {quantity}");
                    assert!(quantity >= Decimal::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_floor_to_step_survives_quotient_overflow() {
        let balance = dec!(1000000000000000000000);
        let step = dec!(0.00000001);

        let quantity = QuantityRounding::FloorToStep.apply(balance, step);

        assert_eq!(quantity, balance);
        assert_eq!(
            quantity,
            QuantityRounding::TruncateDigits.apply(balance, step)
        );
        assert_eq!(
            QuantityRounding::FloorToStep.apply(Decimal::MAX, dec!(0.5)),
            Decimal::MAX
        );
    }

    #[test]
    fn test_policies_differ_on_non_decimal_steps() {
        assert_eq!(QuantityRounding::TruncateDigits.apply(dec!(7.4), dec!(0.25)), dec!(7.4));
        assert_eq!(QuantityRounding::FloorToStep.apply(dec!(7.4), dec!(0.25)), dec!(7.25));
    }

    #[test]
    fn test_step_with_trailing_zeros() {
        assert_eq!(
            QuantityRounding::TruncateDigits.apply(dec!(3.14159), dec!(0.0100)),
            dec!(3.14)
        );
        assert_eq!(QuantityRounding::FloorToStep.apply(dec!(3.9), dec!(1)), dec!(3));
    }

    #[test]
    fn test_to_epoch_seconds() {
        assert_eq!(to_epoch_seconds(1_700_000_000), 1_700_000_000);
        assert_eq!(to_epoch_seconds(1_700_000_000_123), 1_700_000_000);
        assert_eq!(to_epoch_seconds(1_700_000_000_123_456_789), 1_700_000_000);
        assert_eq!(to_epoch_seconds(42), 42);
    }

    #[test]
    fn test_trading_pair_symbols() {
        let pair = TradingPair::new("Arb", " USDT ").unwrap();
        assert_eq!(pair.symbol(""), "ARBUSDT");
        assert_eq!(pair.symbol("-"), "ARB-USDT");
        assert!(pair.matches("ARB", "usdt"));
        assert!(TradingPair::new("", "usdt").is_err());
    }

    #[test]
    fn test_exchange_kind_parse() {
        assert_eq!("kucoin".parse::<ExchangeKind>().unwrap(), ExchangeKind::KuCoin);
        assert_eq!("2".parse::<ExchangeKind>().unwrap(), ExchangeKind::Bybit);
        assert!("binance".parse::<ExchangeKind>().is_err());
    }
}
