//! # Transport Layer
//!
//! Access-point resolution and TCP dialing.
//!
//! The production resolver is an HTTP service that returns a current
//! `host:port`; that call lives outside this crate, behind [`ApResolver`].
//! The bundled [`StaticApResolver`] serves the configured fallback address.

use crate::error::{Result, SessionError};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tracing::{info, instrument};

/// A byte-duplex connection a session can run over.
///
/// Blanket-implemented for every async stream, so tests can substitute an
/// in-memory duplex and hosts can tunnel through proxies.
pub trait Connection: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T: AsyncRead + AsyncWrite + Send + Unpin> Connection for T {}

/// Type-erased connection owned by a session.
pub type BoxedConnection = Box<dyn Connection>;

/// Read half of a session's connection.
pub type SessionReader = tokio::io::ReadHalf<BoxedConnection>;

/// Write half of a session's connection.
pub type SessionWriter = tokio::io::WriteHalf<BoxedConnection>;

/// Resolves the access point to dial.
#[async_trait]
pub trait ApResolver: Send + Sync {
    /// Produce a `host:port` to connect to.
    async fn resolve(&self) -> Result<String>;
}

/// Resolver that always returns one configured address.
#[derive(Debug, Clone)]
pub struct StaticApResolver {
    address: String,
}

impl StaticApResolver {
    /// Wrap a fixed `host:port`.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

#[async_trait]
impl ApResolver for StaticApResolver {
    async fn resolve(&self) -> Result<String> {
        Ok(self.address.clone())
    }
}

/// Dial the access point over TCP.
#[instrument(level = "debug")]
pub async fn connect(address: &str, timeout: Duration) -> Result<TcpStream> {
    let stream = tokio::time::timeout(timeout, TcpStream::connect(address))
        .await
        .map_err(|_| SessionError::Timeout)??;
    stream.set_nodelay(true)?;
    info!(%address, "connected to access point");
    Ok(stream)
}
