//! Hybrid encryption envelope
//!
//! Layout of an encrypted container:
//!
//! ```text
//! "ORBIT_ENCRYPTED_v1.0\n" | key length (u32, big endian) | RSA-OAEP(SHA-256) wrapped key | nonce (12) | AES-256-GCM ciphertext + tag
//! ```
//!
//! A fresh AES key and nonce are drawn for every container. Decryption fails
//! closed: no plaintext is returned unless the tag verifies.

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{OrbitError, OrbitResult};

/// Envelope format version embedded in the header
pub const ENVELOPE_VERSION: &str = "1.0";

/// Exact leading bytes of every encrypted container
pub const ENVELOPE_HEADER: &[u8] = b"ORBIT_ENCRYPTED_v1.0\n";

/// AES-256 key size in bytes
const KEY_SIZE: usize = 32;

/// Size of the AES-GCM nonce in bytes (96 bits)
const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes
const TAG_SIZE: usize = 16;

const LENGTH_FIELD_SIZE: usize = 4;

/// Whether `data` starts with the envelope header
pub fn is_encrypted(data: &[u8]) -> bool {
    data.starts_with(ENVELOPE_HEADER)
}

/// The two encrypted parts of a container, borrowed from its bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    /// RSA-OAEP wrapped AES key
    pub encrypted_key: &'a [u8],
    /// Nonce followed by ciphertext and tag
    pub payload: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Split an encrypted container into its parts
    pub fn parse(data: &'a [u8]) -> OrbitResult<Self> {
        let rest = data.strip_prefix(ENVELOPE_HEADER).ok_or_else(|| {
            OrbitError::Format("Data is not an encrypted Orbit container".into())
        })?;

        if rest.len() < LENGTH_FIELD_SIZE {
            return Err(OrbitError::Format("Truncated key length field".into()));
        }
        let (length, rest) = rest.split_at(LENGTH_FIELD_SIZE);
        let key_len = u32::from_be_bytes([length[0], length[1], length[2], length[3]]) as usize;

        if key_len == 0 || key_len > rest.len() {
            return Err(OrbitError::Format(format!(
                "Invalid encrypted key length {} ({} bytes remain)",
                key_len,
                rest.len()
            )));
        }
        let (encrypted_key, payload) = rest.split_at(key_len);

        if payload.len() < NONCE_SIZE + TAG_SIZE {
            return Err(OrbitError::Format(format!(
                "Encrypted payload too short: {} bytes",
                payload.len()
            )));
        }

        Ok(Self {
            encrypted_key,
            payload,
        })
    }

    /// Serialize with the header and length field
    pub fn to_bytes(&self) -> OrbitResult<Vec<u8>> {
        let key_len = u32::try_from(self.encrypted_key.len())
            .map_err(|_| OrbitError::Crypto("Encrypted key too large".into()))?;

        let mut out = Vec::with_capacity(
            ENVELOPE_HEADER.len() + LENGTH_FIELD_SIZE + self.encrypted_key.len() + self.payload.len(),
        );
        out.extend_from_slice(ENVELOPE_HEADER);
        out.extend_from_slice(&key_len.to_be_bytes());
        out.extend_from_slice(self.encrypted_key);
        out.extend_from_slice(self.payload);
        Ok(out)
    }
}

/// Encrypt `plaintext` for the holder of `public_key`
pub fn encrypt(plaintext: &[u8], public_key: &RsaPublicKey) -> OrbitResult<Vec<u8>> {
    let mut key = Zeroizing::new([0u8; KEY_SIZE]);
    OsRng.fill_bytes(&mut key[..]);

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);

    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| OrbitError::Crypto(format!("Failed to create cipher: {}", e)))?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| OrbitError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut payload = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    payload.extend_from_slice(&nonce_bytes);
    payload.extend_from_slice(&ciphertext);

    let encrypted_key = public_key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &key[..])
        .map_err(|e| OrbitError::Crypto(format!("Failed to wrap data key: {}", e)))?;

    Envelope {
        encrypted_key: &encrypted_key,
        payload: &payload,
    }
    .to_bytes()
}

/// Decrypt a container produced by [`encrypt`]
pub fn decrypt(data: &[u8], private_key: &RsaPrivateKey) -> OrbitResult<Zeroizing<Vec<u8>>> {
    let envelope = Envelope::parse(data)?;

    let key = Zeroizing::new(
        private_key
            .decrypt(Oaep::new::<Sha256>(), envelope.encrypted_key)
            .map_err(|_| OrbitError::Crypto("Failed to unwrap data key: wrong private key?".into()))?,
    );

    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|_| OrbitError::Crypto("Unwrapped data key has the wrong size".into()))?;

    let (nonce, ciphertext) = envelope.payload.split_at(NONCE_SIZE);
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| {
            OrbitError::Crypto("Decryption failed: data may be corrupted or tampered".into())
        })?;

    Ok(Zeroizing::new(plaintext))
}
