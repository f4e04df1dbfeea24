//! Shared test utilities: a scripted in-memory transport.
#![allow(dead_code)]

use async_trait::async_trait;
use orderlink::core::config::ExchangeConfig;
use orderlink::core::errors::ExchangeError;
use orderlink::core::kernel::{HttpRequest, HttpResponse, HttpTransport};
use orderlink::BinanceClient;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_BASE_URL: &str = "http://mock.local";

/// What the mock does with the next request.
pub enum Reply {
    Respond(HttpResponse),
    Fail(ExchangeError),
    /// Never completes.
    Hang,
}

/// Transport that records every request and answers from a queue.
///
/// An empty queue answers `200 {}`.
#[derive(Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    requests: Arc<Mutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, status: u16, body: &str) -> &Self {
        self.push(Reply::Respond(HttpResponse {
            status,
            body: body.to_string(),
        }))
    }

    pub fn fail(&self, error: ExchangeError) -> &Self {
        self.push(Reply::Fail(error))
    }

    pub fn hang(&self) -> &Self {
        self.push(Reply::Hang)
    }

    fn push(&self, reply: Reply) -> &Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        self.requests.lock().unwrap().push(request);
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Respond(response)) => Ok(response),
            Some(Reply::Fail(error)) => Err(error),
            Some(Reply::Hang) => std::future::pending().await,
            None => Ok(HttpResponse {
                status: 200,
                body: "{}".to_string(),
            }),
        }
    }
}

pub fn signed_config() -> ExchangeConfig {
    ExchangeConfig::new("test_api_key".to_string(), "test_secret_key".to_string())
        .base_url(TEST_BASE_URL.to_string())
}

pub fn signed_client() -> (BinanceClient<MockTransport>, MockTransport) {
    client_with(signed_config())
}

pub fn signed_client_with_window(window: Duration) -> (BinanceClient<MockTransport>, MockTransport) {
    client_with(signed_config().rate_limit_window(window))
}

pub fn public_client() -> (BinanceClient<MockTransport>, MockTransport) {
    client_with(ExchangeConfig::read_only().base_url(TEST_BASE_URL.to_string()))
}

fn client_with(config: ExchangeConfig) -> (BinanceClient<MockTransport>, MockTransport) {
    let transport = MockTransport::new();
    let client = BinanceClient::with_transport(&config, transport.clone());
    (client, transport)
}

pub const DEPTH_BODY: &str = r#"{
    "lastUpdateId": 1027024,
    "bids": [["4.00000000", "431.00000000"], ["3.99000000", "0.00000000"], ["3.98000000", "12.50000000"]],
    "asks": [["4.00000200", "12.00000000"], ["4.10000000", "3.00000000"]]
}"#;

pub const EXCHANGE_INFO_BODY: &str = r#"{
    "timezone": "UTC",
    "serverTime": 1565246363776,
    "symbols": [
        {"symbol": "BTCUSDT", "status": "TRADING", "baseAsset": "BTC", "quoteAsset": "USDT", "baseAssetPrecision": 8, "quotePrecision": 8},
        {"symbol": "ETHBTC", "status": "TRADING", "baseAsset": "ETH", "quoteAsset": "BTC", "baseAssetPrecision": 8, "quotePrecision": 8}
    ]
}"#;
