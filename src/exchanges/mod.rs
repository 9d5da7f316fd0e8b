pub mod bybit;
pub mod kucoin;
