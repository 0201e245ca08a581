//! # Utility Modules
//!
//! Supporting utilities for key material, credential blobs, and logging.
//!
//! ## Components
//! - **Crypto**: Diffie-Hellman key agreement, transcript KDF, packet cipher seam
//! - **Blob**: varint codec and discovery credential blob parsing
//! - **Logging**: structured logging configuration
//!
//! ## Security
//! - Cryptographically secure RNG for key and nonce material
//! - Derived key material is zeroed on drop (zeroize crate)

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use sha1::{Digest, Sha1};

pub mod blob;
pub mod crypto;
pub mod logging;

/// Derive a stable device identifier from a device name.
///
/// The identifier is the base64 encoding of the SHA-1 digest of the name,
/// matching what the access point expects to see across reconnects of the
/// same device.
pub fn device_id(name: &str) -> String {
    let digest = Sha1::digest(name.as_bytes());
    BASE64_STANDARD.encode(digest)
}
