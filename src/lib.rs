pub mod core;
pub mod exchanges;

pub use core::{
    config::ExchangeConfig,
    errors::{ExchangeError, OrderbookError},
    orderbook::OrderbookStore,
    pair::{CurrencyPair, CurrencyPairCodec, PairFormat},
    types::*,
};
pub use exchanges::binance::BinanceClient;
