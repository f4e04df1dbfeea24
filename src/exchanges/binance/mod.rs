pub mod account;
pub mod client;
pub mod converters;
pub mod market_data;
pub mod signer;
pub mod trading;
pub mod types;

use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;

pub use client::BinanceClient;
pub use signer::BinanceSigner;
pub use trading::{OrderLookup, PostOrderParams};
pub use types::{
    BinanceAccountInfo, BinanceBalance, BinanceDepth, BinanceErrorCode, BinanceExchangeInfo,
    BinanceMarket, BinanceOrder, DeleteOrderResponse, OrderSide, OrderType, PostOrderAckResponse,
    TimeInForce,
};

pub const EXCHANGE_NAME: &str = "binance";

pub const BINANCE_BASE_URL: &str = "https://api.binance.com";
pub const BINANCE_TESTNET_URL: &str = "https://testnet.binance.vision";

pub const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";
pub const DEPTH_PATH: &str = "/api/v3/depth";
pub const ACCOUNT_PATH: &str = "/api/v3/account";
pub const OPEN_ORDERS_PATH: &str = "/api/v3/openOrders";
pub const ORDER_PATH: &str = "/api/v3/order";
pub const ORDER_TEST_PATH: &str = "/api/v3/order/test";

/// Create a Binance client over HTTPS
pub fn create_binance_client(config: ExchangeConfig) -> Result<BinanceClient, ExchangeError> {
    BinanceClient::new(config)
}
