//! # Core Wire Components
//!
//! Low-level framing for both phases of a session.
//!
//! ## Components
//! - **Packet**: command bytes and the decoded packet value
//! - **Plain**: pre-handshake length-prefixed framer with transcript capture
//! - **Stream**: post-handshake cipher-framed duplex
//!
//! ## Wire Formats
//! ```text
//! pre-handshake:  [prefix bytes] [length: be_u32] [payload]
//! post-handshake: [cmd: u8] [length: be_u16] [payload] [MAC]
//! ```
//!
//! The pre-handshake length counts itself and the prefix; the
//! post-handshake length counts the payload only, and the MAC length is
//! defined by the negotiated cipher.

pub mod packet;
pub mod plain;
pub mod stream;
