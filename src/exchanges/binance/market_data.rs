use super::client::BinanceClient;
use super::converters::{convert_depth, symbol_entries};
use super::types::{BinanceDepth, BinanceExchangeInfo};
use super::{DEPTH_PATH, EXCHANGE_INFO_PATH};
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HttpTransport, Params};
use crate::core::orderbook::OrderbookStore;
use crate::core::pair::{CurrencyPair, CurrencyPairCodec};
use crate::core::types::{book_type, OrderbookSnapshot};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, instrument};

impl<T: HttpTransport> BinanceClient<T> {
    /// Current trading rules and symbol information.
    #[instrument(skip(self), fields(exchange = "binance"))]
    pub async fn fetch_exchange_info(&self) -> Result<BinanceExchangeInfo, ExchangeError> {
        self.send_request(Method::GET, EXCHANGE_INFO_PATH, &Params::new(), false)
            .await
    }

    /// Refresh the symbol map from the published instrument list.
    /// Returns the number of symbols now known.
    pub async fn load_instruments(&self) -> Result<usize, ExchangeError> {
        let info = self.fetch_exchange_info().await?;
        let entries = symbol_entries(&info);
        let count = entries.len();
        self.symbols().replace(entries);
        debug!(count, "loaded binance instruments");
        Ok(count)
    }

    /// Raw depth for a venue symbol.
    ///
    /// `limit: None` omits the parameter and the venue default applies.
    /// `Some(0)` is sent as-is and asks for the uncapped book, which can be
    /// very large.
    #[instrument(skip(self), fields(exchange = "binance"))]
    pub async fn fetch_depth(
        &self,
        symbol: &str,
        limit: Option<u32>,
    ) -> Result<BinanceDepth, ExchangeError> {
        let mut params = Params::new();
        params.set("symbol", symbol);
        if let Some(limit) = limit {
            params.set("limit", limit.to_string());
        }
        self.send_request(Method::GET, DEPTH_PATH, &params, false)
            .await
    }

    /// Order book snapshot for a pair, same `limit` semantics as `fetch_depth`.
    pub async fn fetch_market_data(
        &self,
        pair: &CurrencyPair,
        limit: Option<u32>,
    ) -> Result<OrderbookSnapshot, ExchangeError> {
        let symbol = self.pair_to_symbol(pair);
        let depth = self.fetch_depth(&symbol, limit).await?;
        convert_depth(pair, depth)
    }

    /// Fetch a pair's book and store it under `SPOT`.
    ///
    /// The store is only touched after the response has arrived.
    pub async fn update_orderbook(
        &self,
        store: &OrderbookStore,
        pair: &CurrencyPair,
        limit: Option<u32>,
    ) -> Result<Arc<OrderbookSnapshot>, ExchangeError> {
        let snapshot = self.fetch_market_data(pair, limit).await?;
        store.upsert(pair, book_type::SPOT, snapshot);
        Ok(store.get(pair, book_type::SPOT)?)
    }
}
