use super::signer::BinanceSigner;
use super::types::{BinanceErrorCode, BinanceErrorEnvelope};
use super::{BINANCE_BASE_URL, BINANCE_TESTNET_URL, EXCHANGE_NAME};
use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    timestamp_millis, HttpRequest, HttpResponse, HttpTransport, Params, RateLimiter,
    ReqwestTransport, RestClientConfig, Signer,
};
use crate::core::pair::{CurrencyPair, CurrencyPairCodec, PairFormat, SymbolMap};
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Signed, rate-limited REST client for the Binance spot API.
///
/// Owns its rate-limit accounting and its symbol map; nothing is shared
/// between client instances.
pub struct BinanceClient<T: HttpTransport = ReqwestTransport> {
    transport: T,
    base_url: String,
    signer: Option<Arc<dyn Signer>>,
    rate_limiter: RateLimiter,
    request_format: PairFormat,
    symbols: SymbolMap,
}

impl<T: HttpTransport> std::fmt::Debug for BinanceClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .field("has_signer", &self.signer.is_some())
            .field("known_symbols", &self.symbols.len())
            .finish_non_exhaustive()
    }
}

impl BinanceClient<ReqwestTransport> {
    /// Client over HTTPS, pointed at mainnet, testnet or `config.base_url`.
    pub fn new(config: ExchangeConfig) -> Result<Self, ExchangeError> {
        let base_url = config.resolve_base_url(BINANCE_BASE_URL, BINANCE_TESTNET_URL);
        let rest_config = RestClientConfig::new(base_url, EXCHANGE_NAME.to_string());
        let transport = ReqwestTransport::new(&rest_config)?;
        Ok(Self::with_transport(&config, transport))
    }
}

impl<T: HttpTransport> BinanceClient<T> {
    pub fn with_transport(config: &ExchangeConfig, transport: T) -> Self {
        let signer = config
            .has_credentials()
            .then(|| Arc::new(BinanceSigner::from_config(config)) as Arc<dyn Signer>);

        Self {
            transport,
            base_url: config.resolve_base_url(BINANCE_BASE_URL, BINANCE_TESTNET_URL),
            signer,
            rate_limiter: RateLimiter::new(config.rate_limit_window),
            request_format: PairFormat::new("", true),
            symbols: SymbolMap::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_credentials(&self) -> bool {
        self.signer.is_some()
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn symbols(&self) -> &SymbolMap {
        &self.symbols
    }

    /// Build the wire request: sign if asked, then place the payload in the
    /// query string (GET) or a form body (everything else).
    pub fn build_request(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        requires_auth: bool,
    ) -> Result<HttpRequest, ExchangeError> {
        let mut headers = vec![("Accept".to_string(), "application/json".to_string())];
        let mut payload = params.encode();

        if requires_auth {
            let signer = self
                .signer
                .as_ref()
                .ok_or_else(|| ExchangeError::NoCredentials {
                    exchange: EXCHANGE_NAME.to_string(),
                })?;
            let signed = signer.sign_request(&payload, timestamp_millis()?)?;
            headers.extend(signed.headers);
            payload = signed.payload;
        }

        let url = format!("{}{}", self.base_url, path);
        if method == Method::GET {
            let url = if payload.is_empty() {
                url
            } else {
                format!("{}?{}", url, payload)
            };
            Ok(HttpRequest {
                method,
                url,
                headers,
                body: None,
            })
        } else {
            headers.push(("Content-Type".to_string(), FORM_CONTENT_TYPE.to_string()));
            Ok(HttpRequest {
                method,
                url,
                headers,
                body: Some(payload),
            })
        }
    }

    /// Send a request and decode the response into `R`.
    ///
    /// Venue rejections come back as `ExchangeError::ApiError` carrying the
    /// venue's own code and message.
    #[instrument(skip(self, params), fields(exchange = EXCHANGE_NAME, method = %method, path = %path, signed = requires_auth))]
    pub async fn send_request<R: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &Params,
        requires_auth: bool,
    ) -> Result<R, ExchangeError> {
        let request = self.build_request(method, path, params, requires_auth)?;
        let response = self.transport.execute(request).await?;
        decode_response(response)
    }

    /// Signed request under a per-endpoint call budget.
    ///
    /// Once `budget` calls to `method + path` have been admitted in the
    /// current window, further calls return `default` straight away: no
    /// network call and no error. A slot counts as used the moment it is
    /// admitted, whatever happens to the request afterwards.
    pub async fn send_rate_limited<R: DeserializeOwned>(
        &self,
        budget: u32,
        method: Method,
        path: &str,
        params: &Params,
        default: R,
    ) -> Result<R, ExchangeError> {
        let key = format!("{}{}", method, path);
        if !self.rate_limiter.try_acquire(&key, budget) {
            debug!(endpoint = %key, budget, "rate limit budget exhausted, using default");
            return Ok(default);
        }

        self.send_request(method, path, params, true).await
    }
}

impl<T: HttpTransport> CurrencyPairCodec for BinanceClient<T> {
    fn request_format(&self) -> &PairFormat {
        &self.request_format
    }

    fn symbol_to_pair(&self, symbol: &str) -> Result<CurrencyPair, ExchangeError> {
        self.symbols.resolve(symbol, &self.request_format)
    }
}

/// 2xx → decoded result; anything else → the venue's error envelope.
pub fn decode_response<R: DeserializeOwned>(response: HttpResponse) -> Result<R, ExchangeError> {
    if response.is_success() {
        return serde_json::from_str(&response.body)
            .map_err(|e| ExchangeError::MalformedResponse(e.to_string()));
    }

    let envelope: BinanceErrorEnvelope =
        serde_json::from_str(&response.body).map_err(|e| {
            ExchangeError::MalformedErrorResponse {
                status: response.status,
                reason: e.to_string(),
            }
        })?;

    if BinanceErrorCode::from_code(envelope.code) == Some(BinanceErrorCode::InvalidTimestamp) {
        warn!(code = envelope.code, "request timestamp rejected, local clock may be out of sync");
    } else {
        debug!(status = response.status, code = envelope.code, msg = %envelope.msg, "venue rejected request");
    }

    Err(ExchangeError::ApiError {
        code: envelope.code,
        message: envelope.msg,
    })
}

impl ExchangeError {
    /// True when Binance rejected the request timestamp (code -1021).
    pub fn is_clock_skew(&self) -> bool {
        self.venue_code() == Some(BinanceErrorCode::InvalidTimestamp.code())
    }
}
