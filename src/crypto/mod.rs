//! Cryptographic functions for Orbit
//!
//! Provides the RSA-OAEP + AES-256-GCM hybrid envelope that wraps backup
//! containers, and RSA key pair management.

pub mod envelope;
#[cfg(any(test, feature = "insecure-fixtures"))]
pub mod fixture;
pub mod keys;

pub use envelope::{decrypt, encrypt, is_encrypted, Envelope, ENVELOPE_HEADER, ENVELOPE_VERSION};
pub use keys::{
    default_prefix, load_private_key, load_public_key, ConfirmOverwrite, KeyManager, KeyPair,
    KeyPairPaths,
};
