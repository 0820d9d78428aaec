//! Webhook signature verification.
//!
//! Completion webhooks carry an `X-Webhook-Signature` header of the form
//! `sha256=<hex>` computed as HMAC-SHA256 over `"{timestamp}.{payload}"`
//! keyed by the job's webhook secret.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Verify a webhook signature against the raw request body.
///
/// `payload` must be the exact bytes received, before any JSON decoding,
/// and `timestamp` the value of the `X-Webhook-Timestamp` header. Comparison
/// is constant time.
pub fn verify_webhook(payload: &str, signature: &str, timestamp: &str, secret: &str) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    let expected = format!("sha256={}", hex::encode(mac.finalize().into_bytes()));

    if expected.len() != signature.len() {
        return false;
    }
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
