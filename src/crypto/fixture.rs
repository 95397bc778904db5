//! Deterministic key generation for test fixtures
//!
//! **The keys produced here are cryptographically weak.** Anyone who knows
//! the seed can regenerate the private key. This module is only compiled for
//! tests or with the `insecure-fixtures` feature and must never be used for
//! real backups.
//!
//! The byte stream is `HMAC-SHA256(seed, counter)` for counter = 0, 1, 2, ...
//! (big-endian u64), concatenated.

use hmac::{Hmac, Mac};
use rand::{CryptoRng, RngCore};
use sha2::Sha256;

use super::keys::KeyPair;
use crate::error::{OrbitError, OrbitResult};

type HmacSha256 = Hmac<Sha256>;

const BLOCK_SIZE: usize = 32;

/// Reproducible byte stream keyed by a seed string
pub struct HmacCounterRng {
    mac: HmacSha256,
    counter: u64,
    block: [u8; BLOCK_SIZE],
    offset: usize,
}

impl HmacCounterRng {
    pub fn new(seed: &str) -> OrbitResult<Self> {
        let mac = HmacSha256::new_from_slice(seed.as_bytes())
            .map_err(|e| OrbitError::Crypto(format!("Invalid fixture seed: {}", e)))?;
        Ok(Self {
            mac,
            counter: 0,
            block: [0; BLOCK_SIZE],
            offset: BLOCK_SIZE,
        })
    }

    fn refill(&mut self) {
        let mut mac = self.mac.clone();
        mac.update(&self.counter.to_be_bytes());
        self.block.copy_from_slice(&mac.finalize().into_bytes());
        self.counter += 1;
        self.offset = 0;
    }
}

impl RngCore for HmacCounterRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut written = 0;
        while written < dest.len() {
            if self.offset == BLOCK_SIZE {
                self.refill();
            }
            let take = (BLOCK_SIZE - self.offset).min(dest.len() - written);
            dest[written..written + take]
                .copy_from_slice(&self.block[self.offset..self.offset + take]);
            self.offset += take;
            written += take;
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

// Required by the RSA key generator; the stream is not actually secure.
impl CryptoRng for HmacCounterRng {}

/// Generate a reproducible, **insecure** RSA-2048 key pair from `seed`
///
/// Test fixtures only. The same seed always yields the same key pair.
pub fn generate_insecure_fixture_keypair(seed: &str) -> OrbitResult<KeyPair> {
    KeyPair::generate_with(&mut HmacCounterRng::new(seed)?)
}
