//! Post-authentication packet routing.
//!
//! One task owns the receive side of the stream and routes every packet by
//! its command byte: keep-alive probes are echoed, the country code is
//! recorded, mercury frames go to the injected subsystem client, and
//! unknown commands are ignored. Receive order is dispatch order; the
//! cipher state tolerates nothing else.

use crate::core::packet::{cmd, Packet};
use crate::core::stream::{PacketReceiver, SharedSender};
use crate::error::Result;
use crate::service::mercury::Mercury;
use std::sync::{Arc, RwLock};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tracing::{debug, error, info, trace};

/// Routes received packets to their subsystem handlers.
pub struct Dispatcher<R, W> {
    receiver: PacketReceiver<R>,
    sender: SharedSender<W>,
    mercury: Box<dyn Mercury>,
    country: Arc<RwLock<Option<String>>>,
    closed_tx: watch::Sender<bool>,
}

impl<R, W> Dispatcher<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Assemble a dispatcher around the receive half of a session.
    pub fn new(
        receiver: PacketReceiver<R>,
        sender: SharedSender<W>,
        mercury: Box<dyn Mercury>,
        country: Arc<RwLock<Option<String>>>,
        closed_tx: watch::Sender<bool>,
    ) -> Self {
        Self {
            receiver,
            sender,
            mercury,
            country,
            closed_tx,
        }
    }

    /// Receive and route exactly one packet.
    ///
    /// Called synchronously once after login to prime the stream, then in a
    /// loop by [`Dispatcher::run`].
    pub async fn handle_one(&mut self) -> Result<()> {
        let packet = self.receiver.recv().await?;
        self.handle(packet).await
    }

    async fn handle(&mut self, packet: Packet) -> Result<()> {
        match packet.cmd {
            cmd::PING => {
                debug!(len = packet.payload.len(), "ping");
                self.sender.send(cmd::PONG, &packet.payload).await?;
            }
            cmd::COUNTRY_CODE => {
                let code = String::from_utf8_lossy(&packet.payload).into_owned();
                debug!(country = %code, "country code");
                if let Ok(mut slot) = self.country.write() {
                    *slot = Some(code);
                }
            }
            c if cmd::is_mercury(c) => {
                self.mercury.handle(c, packet.payload)?;
            }
            other => {
                trace!("ignoring unknown command 0x{other:02x}");
            }
        }
        Ok(())
    }

    /// Consume packets until the connection fails or closes.
    ///
    /// Spawned as the session's single background task. Any error ends the
    /// session; the watch channel flips so holders of the session handle
    /// can observe the teardown.
    pub async fn run(mut self) {
        loop {
            match self.handle_one().await {
                Ok(()) => {}
                Err(crate::error::SessionError::ConnectionClosed) => {
                    info!("connection closed, stopping dispatch");
                    break;
                }
                Err(e) => {
                    error!(error = %e, "session dispatch failed");
                    break;
                }
            }
        }
        let _ = self.closed_tx.send(true);
    }
}
