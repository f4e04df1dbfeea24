//! Transport kernel shared by exchange clients.
//!
//! - `HttpTransport` / `ReqwestTransport`: send a built request, return status and body
//! - `Signer`: venue-specific request authentication
//! - `RateLimiter`: per-endpoint fixed-window call budget
//!
//! The kernel holds no venue logic. Exchange modules decide how parameters
//! are encoded, what gets signed and how error bodies are decoded.
pub mod rate_limit;
pub mod rest;
pub mod signer;

pub use rate_limit::{RateLimitWindow, RateLimiter, WindowState};
pub use rest::{
    HttpRequest, HttpResponse, HttpTransport, Params, ReqwestTransport, RestClientConfig,
};
pub use signer::{hmac_sha256_hex, timestamp_millis, SignatureResult, SignedPayload, Signer};
