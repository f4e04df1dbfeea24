use thiserror::Error;

/// Lookup failures raised by the order book store.
///
/// Both are recoverable: the book simply has not been ingested yet.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderbookError {
    #[error("primary currency for orderbook not found: {base}")]
    PrimaryCurrencyNotFound { base: String },

    #[error("secondary currency for orderbook not found: {base}-{quote}")]
    SecondaryCurrencyNotFound { base: String, quote: String },
}

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("{exchange}: authenticated request attempted without API credentials")]
    NoCredentials { exchange: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Failed to decode response body: {0}")]
    MalformedResponse(String),

    #[error("Failed to decode error response (status {status}): {reason}")]
    MalformedErrorResponse { status: u16, reason: String },

    /// Error reported by the venue itself, code and message untouched.
    #[error("API error: {code} - {message}")]
    ApiError { code: i32, message: String },

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error(transparent)]
    Orderbook(#[from] OrderbookError),
}

impl ExchangeError {
    /// The venue's numeric error code, if the venue rejected the request.
    pub fn venue_code(&self) -> Option<i32> {
        match self {
            Self::ApiError { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// True for decode failures of either a success or an error body.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedResponse(_) | Self::MalformedErrorResponse { .. }
        )
    }

    pub fn is_transport_error(&self) -> bool {
        matches!(self, Self::HttpError(_) | Self::NetworkError(_))
    }
}
