use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{hmac_sha256_hex, SignatureResult, SignedPayload, Signer};
use secrecy::{ExposeSecret, Secret};
use std::collections::HashMap;

pub const API_KEY_HEADER: &str = "X-MBX-APIKEY";

/// HMAC-SHA256 signer for Binance `SIGNED` endpoints.
///
/// Appends `timestamp` and `recvWindow` to the payload, signs the result
/// and appends `signature`. The API key travels in a header only.
pub struct BinanceSigner {
    api_key: Secret<String>,
    secret_key: Secret<String>,
    recv_window_ms: u64,
}

impl BinanceSigner {
    pub fn new(api_key: String, secret_key: String, recv_window_ms: u64) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            recv_window_ms,
        }
    }

    pub fn from_config(config: &ExchangeConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            secret_key: config.secret_key.clone(),
            recv_window_ms: config.recv_window_ms,
        }
    }

    pub fn generate_signature(&self, query_string: &str) -> Result<String, ExchangeError> {
        hmac_sha256_hex(
            self.secret_key.expose_secret().as_bytes(),
            query_string.as_bytes(),
        )
    }
}

impl Signer for BinanceSigner {
    fn sign_request(&self, payload: &str, timestamp: u64) -> SignatureResult {
        let time_window = format!("timestamp={}&recvWindow={}", timestamp, self.recv_window_ms);
        let unsigned = if payload.is_empty() {
            time_window
        } else {
            format!("{}&{}", payload, time_window)
        };

        let signature = self.generate_signature(&unsigned)?;

        let mut headers = HashMap::new();
        headers.insert(
            API_KEY_HEADER.to_string(),
            self.api_key.expose_secret().clone(),
        );

        Ok(SignedPayload {
            headers,
            payload: format!("{}&signature={}", unsigned, signature),
        })
    }
}
