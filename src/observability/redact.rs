use sha2::{Digest, Sha256};

/// Stable short fingerprint of a sensitive value, safe to put in logs.
pub fn fingerprint(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    hex::encode(&digest[..6])
}
