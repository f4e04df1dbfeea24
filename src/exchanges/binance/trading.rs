use super::client::BinanceClient;
use super::types::{
    BinanceOrder, DeleteOrderResponse, OrderSide, OrderType, PostOrderAckResponse, TimeInForce,
};
use super::{OPEN_ORDERS_PATH, ORDER_PATH, ORDER_TEST_PATH};
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HttpTransport, Params};
use reqwest::Method;
use rust_decimal::Decimal;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct PostOrderParams {
    pub symbol: String,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub time_in_force: Option<TimeInForce>,
    pub quantity: Decimal,
    pub price: Option<Decimal>,
    pub new_client_order_id: Option<String>,
    pub stop_price: Option<Decimal>,
    pub iceberg_qty: Option<Decimal>,
    /// Send to the test endpoint: validated, never reaches the matching engine.
    pub validate_only: bool,
}

impl PostOrderParams {
    /// Good-till-cancelled limit order.
    pub fn limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: Decimal,
        price: Decimal,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit,
            time_in_force: Some(TimeInForce::GTC),
            quantity,
            price: Some(price),
            new_client_order_id: None,
            stop_price: None,
            iceberg_qty: None,
            validate_only: false,
        }
    }

    /// Check the fields the order type requires before anything is signed.
    pub fn validate(&self) -> Result<(), ExchangeError> {
        if self.quantity <= Decimal::ZERO {
            return Err(ExchangeError::InvalidParameters(format!(
                "quantity must be positive, got {}",
                self.quantity
            )));
        }

        let (needs_price, needs_stop, needs_tif) = match self.order_type {
            OrderType::Market => (false, false, false),
            OrderType::Limit => (true, false, true),
            OrderType::LimitMaker => (true, false, false),
            OrderType::StopLoss | OrderType::TakeProfit => (false, true, false),
            OrderType::StopLossLimit | OrderType::TakeProfitLimit => (true, true, true),
        };
        let order_type = self.order_type.as_str();

        if needs_price && self.price.is_none() {
            return Err(ExchangeError::InvalidParameters(format!(
                "{} order requires a price",
                order_type
            )));
        }
        if needs_stop && self.stop_price.is_none() {
            return Err(ExchangeError::InvalidParameters(format!(
                "{} order requires a stop price",
                order_type
            )));
        }
        if needs_tif && self.time_in_force.is_none() {
            return Err(ExchangeError::InvalidParameters(format!(
                "{} order requires a time in force",
                order_type
            )));
        }
        Ok(())
    }

    pub fn to_params(&self) -> Params {
        let mut params = Params::new();
        params
            .set("symbol", self.symbol.as_str())
            .set("side", self.side.as_str())
            .set("type", self.order_type.as_str());
        if let Some(tif) = self.time_in_force {
            params.set("timeInForce", tif.as_str());
        }
        params.set("quantity", self.quantity.normalize().to_string());
        if let Some(price) = self.price {
            params.set("price", price.normalize().to_string());
        }
        if let Some(id) = &self.new_client_order_id {
            params.set("newClientOrderId", id.as_str());
        }
        if let Some(stop) = self.stop_price {
            params.set("stopPrice", stop.normalize().to_string());
        }
        if let Some(iceberg) = self.iceberg_qty {
            params.set("icebergQty", iceberg.normalize().to_string());
        }
        params.set("newOrderRespType", "ACK");
        params
    }
}

/// Identifies an existing order either by venue id or by client id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderLookup {
    OrderId(i64),
    ClientOrderId(String),
}

impl OrderLookup {
    fn to_params(&self, symbol: &str) -> Params {
        let mut params = Params::new();
        params.set("symbol", symbol);
        match self {
            Self::OrderId(id) => params.set("orderId", id.to_string()),
            Self::ClientOrderId(id) => params.set("origClientOrderId", id.as_str()),
        };
        params
    }
}

impl<T: HttpTransport> BinanceClient<T> {
    #[instrument(skip(self, order), fields(exchange = "binance", symbol = %order.symbol, validate_only = order.validate_only))]
    pub async fn post_order(
        &self,
        order: &PostOrderParams,
    ) -> Result<PostOrderAckResponse, ExchangeError> {
        order.validate()?;
        let path = if order.validate_only {
            ORDER_TEST_PATH
        } else {
            ORDER_PATH
        };
        self.send_request(Method::POST, path, &order.to_params(), true)
            .await
    }

    #[instrument(skip(self), fields(exchange = "binance"))]
    pub async fn fetch_order(
        &self,
        symbol: &str,
        lookup: &OrderLookup,
    ) -> Result<BinanceOrder, ExchangeError> {
        self.send_request(Method::GET, ORDER_PATH, &lookup.to_params(symbol), true)
            .await
    }

    /// Cancel an active order.
    #[instrument(skip(self), fields(exchange = "binance"))]
    pub async fn delete_order(
        &self,
        symbol: &str,
        lookup: &OrderLookup,
    ) -> Result<DeleteOrderResponse, ExchangeError> {
        self.send_request(Method::DELETE, ORDER_PATH, &lookup.to_params(symbol), true)
            .await
    }

    /// Open orders, for one symbol or (at a much higher weight) all of them.
    #[instrument(skip(self), fields(exchange = "binance"))]
    pub async fn fetch_open_orders(
        &self,
        symbol: Option<&str>,
    ) -> Result<Vec<BinanceOrder>, ExchangeError> {
        self.send_request(Method::GET, OPEN_ORDERS_PATH, &open_orders_params(symbol), true)
            .await
    }

    /// Like `fetch_open_orders`, but at most `budget` calls per rate-limit
    /// window; calls beyond that return an empty list.
    pub async fn poll_open_orders(
        &self,
        budget: u32,
        symbol: Option<&str>,
    ) -> Result<Vec<BinanceOrder>, ExchangeError> {
        self.send_rate_limited(
            budget,
            Method::GET,
            OPEN_ORDERS_PATH,
            &open_orders_params(symbol),
            Vec::new(),
        )
        .await
    }
}

fn open_orders_params(symbol: Option<&str>) -> Params {
    let mut params = Params::new();
    if let Some(symbol) = symbol {
        params.set("symbol", symbol);
    }
    params
}
