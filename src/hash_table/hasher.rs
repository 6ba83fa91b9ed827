use crc::{Crc, CRC_16_IBM_SDLC};
use serde::Deserialize;

const X25: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_SDLC);

/// Maps a key to a raw hash value; the table reduces it modulo its bucket count
pub trait KeyHasher {
    fn hash(&self, key: &str) -> u64;
}

/// Placement functions selectable from `config.toml`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// Polynomial rolling hash with multiplier 31
    #[default]
    Polynomial,
    /// CRC-16/IBM-SDLC (X.25) checksum of the key bytes
    Crc16,
}

impl KeyHasher for HashAlgorithm {
    fn hash(&self, key: &str) -> u64 {
        match self {
            HashAlgorithm::Polynomial => polynomial_hash(key),
            HashAlgorithm::Crc16 => X25.checksum(key.as_bytes()) as u64,
        }
    }
}

/// hash = hash * 31 + byte, over the UTF-8 bytes of the key
fn polynomial_hash(key: &str) -> u64 {
    let mut hash = 0u64;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as u64);
    }
    hash
}
