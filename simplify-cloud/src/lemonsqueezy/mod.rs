//! Lemon Squeezy webhook support
//!
//! Signature verification and the typed event payload.

pub mod payload;

use hmac::{Hmac, Mac};
use sha2::Sha256;

pub use payload::WebhookPayload;

/// Header carrying the hex HMAC-SHA256 of the raw body
pub const SIGNATURE_HEADER: &str = "x-signature";

const DIGEST_LEN: usize = 32;

/// Verify the webhook signature
///
/// The header is the hex-encoded HMAC-SHA256 of the exact raw body, keyed
/// with the signing secret. Comparison is constant-time (`verify_slice`).
pub fn verify_signature(raw_body: &[u8], signature: &str, secret: &str) -> bool {
    if signature.is_empty() || secret.is_empty() {
        return false;
    }

    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    if expected.len() != DIGEST_LEN {
        return false;
    }

    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}
