use crate::core::errors::ExchangeError;
use async_trait::async_trait;
use reqwest::{Client, Method};
use std::time::Duration;
use tracing::{instrument, trace};

/// Ordered request parameters, encoded as `application/x-www-form-urlencoded`.
///
/// Insertion order is preserved on the wire, which matters for anything
/// signed over the encoded string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing an existing value in place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.pairs.iter_mut().find(|(k, _)| k == key) {
            Some(pair) => pair.1 = value,
            None => self.pairs.push((key.to_string(), value)),
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn encode(&self) -> String {
        self.pairs
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.set(&k.into(), v);
        }
        params
    }
}

/// A fully built HTTP request, ready for the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL including any query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Query string part of the URL, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.url.split_once('?').map(|(_, q)| q)
    }
}

/// Raw HTTP response: status and undecoded body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Transport seam between request building and the network.
///
/// Exchange clients build and sign requests themselves and hand them to a
/// transport. Errors returned here are transport failures only; HTTP error
/// statuses come back as ordinary responses.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError>;
}

/// Configuration for the REST client
#[derive(Clone, Debug)]
pub struct RestClientConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string to include in requests
    pub user_agent: String,
}

impl RestClientConfig {
    pub fn new(base_url: String, exchange_name: String) -> Self {
        Self {
            base_url,
            exchange_name,
            timeout_seconds: 30,
            user_agent: "orderlink/0.1".to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// `HttpTransport` backed by a pooled reqwest client.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: Client,
    exchange_name: String,
}

impl ReqwestTransport {
    pub fn new(config: &RestClientConfig) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;

        Ok(Self {
            client,
            exchange_name: config.exchange_name.clone(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(exchange = %self.exchange_name, method = %request.method))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ExchangeError> {
        let mut builder = self.client.request(request.method, &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        trace!(status, "Response body: {}", body);

        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_keep_order_and_encode() {
        let mut params = Params::new();
        params
            .set("symbol", "BTCUSDT")
            .set("newClientOrderId", "my order/1")
            .set("symbol", "ETHBTC");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("symbol"), Some("ETHBTC"));
        assert_eq!(
            params.encode(),
            "symbol=ETHBTC&newClientOrderId=my%20order%2F1"
        );
        assert_eq!(Params::new().encode(), "");
    }

    #[test]
    fn test_request_helpers() {
        let request = HttpRequest {
            method: Method::GET,
            url: "https://api.binance.com/api/v3/depth?symbol=BTCUSDT&limit=5".to_string(),
            headers: vec![("X-MBX-APIKEY".to_string(), "key".to_string())],
            body: None,
        };
        assert_eq!(request.query(), Some("symbol=BTCUSDT&limit=5"));
        assert_eq!(request.header("x-mbx-apikey"), Some("key"));
        assert_eq!(request.header("Content-Type"), None);
    }

    #[test]
    fn test_success_range() {
        let ok = |status| HttpResponse {
            status,
            body: String::new(),
        };
        assert!(ok(200).is_success());
        assert!(ok(299).is_success());
        assert!(!ok(300).is_success());
        assert!(!ok(418).is_success());
        assert!(!ok(199).is_success());
    }

    #[test]
    fn test_reqwest_transport_builds() {
        let config = RestClientConfig::new(
            "https://api.binance.com".to_string(),
            "binance".to_string(),
        )
        .with_timeout(5);
        assert!(ReqwestTransport::new(&config).is_ok());
    }
}
