use super::client::BinanceClient;
use super::types::BinanceAccountInfo;
use super::ACCOUNT_PATH;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{HttpTransport, Params};
use reqwest::Method;
use tracing::instrument;

impl<T: HttpTransport> BinanceClient<T> {
    /// Current account information (commissions, permissions, balances).
    #[instrument(skip(self), fields(exchange = "binance"))]
    pub async fn fetch_account_info(&self) -> Result<BinanceAccountInfo, ExchangeError> {
        self.send_request(Method::GET, ACCOUNT_PATH, &Params::new(), true)
            .await
    }
}
