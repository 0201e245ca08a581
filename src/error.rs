//! # Error Types
//!
//! Error handling for the session core.
//!
//! This module defines all error variants that can occur while bootstrapping
//! and running a session, from low-level I/O failures to protocol violations
//! and rejected logins.
//!
//! ## Error Categories
//! - **I/O Errors**: dial failures, short reads, closed connections
//! - **Frame Errors**: invalid length prefixes, oversized frames, MAC failures
//! - **Handshake Errors**: missing key-exchange fields, bad key material
//! - **Authentication Errors**: rejected credentials, unexpected replies
//! - **Configuration Errors**: invalid or unusable settings
//!
//! All errors implement `std::error::Error` for interoperability. Everything
//! except [`SessionError::AuthFailed`] is fatal to the session that produced
//! it; `AuthFailed` is surfaced to the login caller and no session exists
//! afterwards.

use std::io;
use thiserror::Error;

/// Error message constants reused across modules.
pub mod constants {
    /// Handshake: the server hello carried no challenge at all.
    pub const ERR_MISSING_CHALLENGE: &str = "server hello carried no challenge";
    /// Handshake: the challenge carried no Diffie-Hellman union.
    pub const ERR_MISSING_DH_CHALLENGE: &str = "server challenge carried no Diffie-Hellman key";
    /// Blob decoding: ran out of bytes mid-structure.
    pub const ERR_BLOB_TRUNCATED: &str = "credential blob truncated";
    /// Blob decoding: a varint continued past the supported two bytes.
    pub const ERR_VARINT_OVERFLOW: &str = "varint longer than two bytes";
}

/// Primary error type for all session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("access point resolution failed: {0}")]
    Resolve(String),

    #[error("invalid frame length: {0}")]
    InvalidFrame(u32),

    #[error("frame too large: {0} bytes")]
    OversizedFrame(u32),

    #[error("payload too large for one packet: {0} bytes")]
    OversizedPayload(usize),

    #[error("malformed message: {0}")]
    Decode(#[from] prost::DecodeError),

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("packet MAC verification failed")]
    MacMismatch,

    #[error("authentication failed")]
    AuthFailed,

    #[error("unexpected command: 0x{0:02x}")]
    UnexpectedCommand(u8),

    #[error("credential blob error: {0}")]
    Blob(String),

    #[error("mercury error: {0}")]
    Mercury(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("operation timed out")]
    Timeout,
}

impl SessionError {
    /// Map a read-side I/O error, folding EOF into [`SessionError::ConnectionClosed`].
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            SessionError::ConnectionClosed
        } else {
            SessionError::Io(err)
        }
    }
}

/// Type alias for Results using SessionError
pub type Result<T> = std::result::Result<T, SessionError>;
