//! Post-handshake cipher-framed duplex.
//!
//! Each direction owns an independent cipher whose state advances once per
//! frame; a dropped, duplicated, or reordered frame invalidates every MAC
//! after it. The receive side is owned by the dispatch loop and needs no
//! locking. The send side is shared between the session and any injected
//! subsystem clients, so [`SharedSender`] holds the frame write under one
//! mutex: command, length, payload, and MAC always reach the wire as an
//! uninterrupted unit.

use crate::config::MAX_PACKET_PAYLOAD;
use crate::core::packet::Packet;
use crate::error::{Result, SessionError};
use crate::utils::crypto::PacketCipher;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{instrument, trace};

/// Encrypting writer for one direction of the session.
pub struct PacketSender<W> {
    writer: W,
    cipher: Box<dyn PacketCipher>,
}

impl<W: AsyncWrite + Unpin + Send> PacketSender<W> {
    /// Wrap a write half with its direction's cipher.
    pub fn new(writer: W, cipher: Box<dyn PacketCipher>) -> Self {
        Self { writer, cipher }
    }

    /// Encrypt and send one packet.
    #[instrument(level = "trace", skip(self, payload), fields(payload_len = payload.len()))]
    pub async fn send(&mut self, cmd: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_PACKET_PAYLOAD {
            return Err(SessionError::OversizedPayload(payload.len()));
        }

        let mut frame = Vec::with_capacity(3 + payload.len());
        frame.push(cmd);
        frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
        frame.extend_from_slice(payload);

        self.cipher.encrypt(&mut frame);
        let mac = self.cipher.finish();

        self.writer.write_all(&frame).await?;
        if !mac.is_empty() {
            self.writer.write_all(&mac).await?;
        }
        self.writer.flush().await?;
        trace!(cmd, "packet sent");
        Ok(())
    }
}

/// Decrypting reader for one direction of the session.
pub struct PacketReceiver<R> {
    reader: R,
    cipher: Box<dyn PacketCipher>,
}

impl<R: AsyncRead + Unpin + Send> PacketReceiver<R> {
    /// Wrap a read half with its direction's cipher.
    pub fn new(reader: R, cipher: Box<dyn PacketCipher>) -> Self {
        Self { reader, cipher }
    }

    /// Receive and decrypt one packet.
    ///
    /// The three header bytes are decrypted first to learn the payload
    /// length, then the payload, then the trailing MAC is verified. A MAC
    /// mismatch never yields a payload.
    #[instrument(level = "trace", skip(self))]
    pub async fn recv(&mut self) -> Result<Packet> {
        let mut header = [0u8; 3];
        self.reader
            .read_exact(&mut header)
            .await
            .map_err(SessionError::from_read)?;
        self.cipher.decrypt(&mut header);

        let cmd = header[0];
        let length = u16::from_be_bytes([header[1], header[2]]) as usize;

        let mut payload = vec![0u8; length];
        self.reader
            .read_exact(&mut payload)
            .await
            .map_err(SessionError::from_read)?;
        self.cipher.decrypt(&mut payload);

        let mut mac = vec![0u8; self.cipher.mac_len()];
        self.reader
            .read_exact(&mut mac)
            .await
            .map_err(SessionError::from_read)?;
        if self.cipher.finish() != mac {
            return Err(SessionError::MacMismatch);
        }

        trace!(cmd, payload_len = length, "packet received");
        Ok(Packet::new(cmd, payload))
    }
}

/// Clone-able handle serializing all writers onto one [`PacketSender`].
pub struct SharedSender<W> {
    inner: Arc<Mutex<PacketSender<W>>>,
}

impl<W> Clone for SharedSender<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: AsyncWrite + Unpin + Send> SharedSender<W> {
    /// Take ownership of the sender.
    pub fn new(sender: PacketSender<W>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(sender)),
        }
    }

    /// Encrypt and send one packet, holding the send lock for the whole
    /// frame so the cipher state advances one packet at a time.
    pub async fn send(&self, cmd: u8, payload: &[u8]) -> Result<()> {
        self.inner.lock().await.send(cmd, payload).await
    }
}
