use crate::core::errors::ExchangeError;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

/// Output of signing: headers to attach and the final payload to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedPayload {
    pub headers: HashMap<String, String>,
    pub payload: String,
}

pub type SignatureResult = Result<SignedPayload, ExchangeError>;

/// Signer trait for request authentication
///
/// Implementations own the credentials and know the venue's signing scheme.
/// The caller passes the already-encoded parameter string and the request
/// time; the signer returns what has to go on the wire.
pub trait Signer: Send + Sync {
    /// Sign an encoded payload (`k=v&k=v`, possibly empty).
    ///
    /// # Arguments
    /// * `payload` - Encoded request parameters
    /// * `timestamp` - Request timestamp in milliseconds
    fn sign_request(&self, payload: &str, timestamp: u64) -> SignatureResult;
}

/// Hex-encoded HMAC-SHA256 of `message` keyed with `secret`.
pub fn hmac_sha256_hex(secret: &[u8], message: &[u8]) -> Result<String, ExchangeError> {
    let mut mac = HmacSha256::new_from_slice(secret)
        .map_err(|e| ExchangeError::AuthError(format!("Invalid secret key: {}", e)))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn timestamp_millis() -> Result<u64, ExchangeError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .map_err(|e| ExchangeError::AuthError(format!("System clock before Unix epoch: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_matches_rfc4231_case_2() {
        let digest = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_empty_secret_is_accepted() {
        let digest = hmac_sha256_hex(b"", b"timestamp=1").unwrap();
        assert_eq!(digest.len(), 64);
    }
}
