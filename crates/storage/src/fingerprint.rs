//! Content fingerprints for stored payloads
//!
//! A fingerprint is the SHA-256 of the encoded payload, rendered as
//! unpadded URL-safe base64. Equal bytes give equal fingerprints; any
//! byte change gives a different one.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use sha2::{Digest, Sha256};

/// Fingerprint of encoded payload bytes
pub fn fingerprint(encoded: &[u8]) -> String {
    let digest = Sha256::digest(encoded);
    URL_SAFE_NO_PAD.encode(digest)
}
