//! # ap-session
//!
//! Session bootstrap and encrypted packet framing for Spotify Access Point
//! connections.
//!
//! This crate implements the hard core of a streaming client: resolving and
//! dialing an access point, the plaintext Diffie-Hellman handshake whose
//! challenge MAC covers the exact hello transcript, the encrypted
//! length-framed packet stream whose cipher state advances per packet in
//! both directions, the credential exchange for every supported login
//! flavor, and the single background task that routes server-initiated
//! packets to their subsystem handlers.
//!
//! The pieces that are deliberately *not* here plug in through trait seams:
//! the Shannon stream cipher ([`utils::crypto::CipherFactory`]), the
//! mercury message-bus router ([`service::mercury::Mercury`]), and the
//! access-point resolver HTTP call ([`transport::ApResolver`]).
//!
//! ## Layers
//! ```text
//! service::session  — lifecycle: dial, handshake, login, dispatch
//! protocol          — wire messages, handshake, login, dispatcher
//! core              — plaintext framer, cipher-framed packet stream
//! transport         — resolver seam and TCP dialing
//! utils             — key schedule, credential blobs, logging
//! ```
//!
//! ## Example
//! ```no_run
//! use ap_session::config::SessionConfig;
//! use ap_session::utils::crypto::PlainCipherFactory;
//! use ap_session::Session;
//!
//! # async fn run() -> ap_session::Result<()> {
//! let config = SessionConfig::default_with_overrides(|c| {
//!     c.device.name = "kitchen-speaker".into();
//! });
//!
//! let session = Session::builder(config)
//!     .cipher(PlainCipherFactory) // substitute the real cipher here
//!     .login_password("alice", "s3cr3t")
//!     .await?;
//!
//! println!("logged in as {}", session.username());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use error::{Result, SessionError};
pub use protocol::login::Credentials;
pub use service::session::{Session, SessionBuilder};
