//! Note ID generation.

use sha2::{Digest, Sha256};

/// Hash a seed string down to an 8-character lowercase hex token.
///
/// Pure: the same seed always yields the same ID. Callers wanting
/// unique IDs mix a timestamp into the seed.
pub fn generate_id(seed: &str) -> String {
    let digest = Sha256::digest(seed.as_bytes());
    hex::encode(&digest[..4])
}
