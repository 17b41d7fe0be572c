//! Shared-secret signature helpers for C4 (gateway callback verification)
//! and C2 (idempotency request hashing).
//!
//! The constant-time compare and timestamp-concatenation pattern mirror
//! `generate_callback_signature`/`verify_callback_signature` in
//! `tos-network-tos`'s callback module; Paystack and Flutterwave each get
//! their own function since the two providers sign differently (HMAC-SHA512
//! over the raw body vs. a static shared-secret header).

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha512};

type HmacSha512 = Hmac<Sha512>;

/// Hex-encoded SHA-256 of arbitrary bytes; used to fingerprint a request body
/// for idempotency-key collision detection (C2).
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Verifies a Paystack-style `x-paystack-signature` header: HMAC-SHA512 of
/// the raw request body, keyed by the provider's secret key, hex-encoded.
pub fn verify_paystack_signature(secret_key: &str, body: &[u8], signature_header: &str) -> bool {
    let mut mac = match HmacSha512::new_from_slice(secret_key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(body);
    let expected = hex::encode(mac.finalize().into_bytes());
    constant_time_compare(&expected, signature_header)
}

/// Verifies a Flutterwave-style `verif-hash` header: a static shared secret
/// echoed back verbatim rather than a keyed digest over the body.
pub fn verify_flutterwave_signature(secret_hash: &str, received_hash: &str) -> bool {
    constant_time_compare(secret_hash, received_hash)
}

/// Constant-time string comparison; avoids leaking match-length via early
/// return timing when verifying attacker-supplied signatures.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_hex_is_deterministic() {
        assert_eq!(sha256_hex(b"hello"), sha256_hex(b"hello"));
        assert_ne!(sha256_hex(b"hello"), sha256_hex(b"world"));
    }

    #[test]
    fn paystack_signature_round_trips() {
        let secret = "sk_test_abc123";
        let body = br#"{"event":"charge.success"}"#;
        let mut mac = HmacSha512::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(body);
        let sig = hex::encode(mac.finalize().into_bytes());

        assert!(verify_paystack_signature(secret, body, &sig));
        assert!(!verify_paystack_signature(secret, body, "deadbeef"));
    }

    #[test]
    fn flutterwave_signature_is_shared_secret_compare() {
        assert!(verify_flutterwave_signature("shared-hash", "shared-hash"));
        assert!(!verify_flutterwave_signature("shared-hash", "other-hash"));
    }

    #[test]
    fn constant_time_compare_rejects_different_lengths() {
        assert!(!constant_time_compare("abc", "abcd"));
    }
}
