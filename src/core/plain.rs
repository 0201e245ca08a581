//! Pre-handshake framing with transcript capture.
//!
//! The key exchange runs over plaintext frames of the form
//! `prefix || be_u32(total_length) || payload` where the length counts the
//! prefix and itself. Both sides later MAC the *exact* bytes that crossed
//! the wire during the hello exchange, so each operation returns the full
//! frame verbatim instead of hiding it in internal buffers.

use crate::config::MAX_PLAIN_FRAME;
use crate::error::{Result, SessionError};
use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{instrument, trace};

/// Length-prefixed framer used only until the key exchange completes.
///
/// Has no concurrent access by construction: it is created for the
/// handshake and retired via [`PlainTransport::into_inner`] immediately
/// after.
#[derive(Debug)]
pub struct PlainTransport<T> {
    io: T,
}

impl<T: AsyncRead + AsyncWrite + Unpin> PlainTransport<T> {
    /// Wrap a freshly dialed transport.
    pub fn new(io: T) -> Self {
        Self { io }
    }

    /// Write one frame and return the exact bytes written, for transcript
    /// hashing.
    #[instrument(level = "trace", skip_all, fields(prefix_len = prefix.len(), payload_len = payload.len()))]
    pub async fn send_prefix_packet(&mut self, prefix: &[u8], payload: &[u8]) -> Result<Bytes> {
        let total = prefix.len() + 4 + payload.len();

        let mut frame = BytesMut::with_capacity(total);
        frame.put_slice(prefix);
        frame.put_u32(total as u32);
        frame.put_slice(payload);
        let frame = frame.freeze();

        self.io.write_all(&frame).await?;
        self.io.flush().await?;
        trace!(bytes = frame.len(), "plain frame sent");
        Ok(frame)
    }

    /// Read one frame and return all of its bytes, length prefix included.
    ///
    /// Rejects lengths that cannot describe a frame (`< 4`) and lengths
    /// beyond [`MAX_PLAIN_FRAME`]; both are fatal to the session.
    #[instrument(level = "trace", skip_all)]
    pub async fn recv_packet(&mut self) -> Result<Bytes> {
        let mut header = [0u8; 4];
        self.io
            .read_exact(&mut header)
            .await
            .map_err(SessionError::from_read)?;

        let length = u32::from_be_bytes(header);
        if length < 4 {
            return Err(SessionError::InvalidFrame(length));
        }
        if length as usize > MAX_PLAIN_FRAME {
            return Err(SessionError::OversizedFrame(length));
        }

        let mut frame = vec![0u8; length as usize];
        frame[..4].copy_from_slice(&header);
        self.io
            .read_exact(&mut frame[4..])
            .await
            .map_err(SessionError::from_read)?;
        trace!(bytes = frame.len(), "plain frame received");
        Ok(Bytes::from(frame))
    }

    /// Release the transport so the cipher layer can take over.
    pub fn into_inner(self) -> T {
        self.io
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sent_frame_bytes_are_exact() {
        let (client, mut server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);

        let frame = transport
            .send_prefix_packet(&[0x00, 0x04], &[0xAA, 0xBB, 0xCC])
            .await
            .unwrap();

        // prefix || be_u32(2 + 4 + 3) || payload
        assert_eq!(&frame[..], &[0x00, 0x04, 0x00, 0x00, 0x00, 0x09, 0xAA, 0xBB, 0xCC]);

        let mut on_wire = vec![0u8; frame.len()];
        server.read_exact(&mut on_wire).await.unwrap();
        assert_eq!(on_wire, frame);
    }

    #[tokio::test]
    async fn empty_prefix_frames_are_length_only() {
        let (client, _server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);

        let frame = transport.send_prefix_packet(&[], &[0x01]).await.unwrap();
        assert_eq!(&frame[..], &[0x00, 0x00, 0x00, 0x05, 0x01]);
    }

    #[tokio::test]
    async fn received_frame_includes_length_prefix() {
        let (client, mut server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);

        server
            .write_all(&[0x00, 0x00, 0x00, 0x06, 0xDE, 0xAD])
            .await
            .unwrap();

        let frame = transport.recv_packet().await.unwrap();
        assert_eq!(&frame[..], &[0x00, 0x00, 0x00, 0x06, 0xDE, 0xAD]);
    }

    #[tokio::test]
    async fn zero_length_is_rejected() {
        let (client, mut server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);

        server.write_all(&[0x00, 0x00, 0x00, 0x00]).await.unwrap();

        assert!(matches!(
            transport.recv_packet().await,
            Err(SessionError::InvalidFrame(0))
        ));
    }

    #[tokio::test]
    async fn length_below_header_size_is_rejected() {
        let (client, mut server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);

        server.write_all(&[0x00, 0x00, 0x00, 0x03]).await.unwrap();

        assert!(matches!(
            transport.recv_packet().await,
            Err(SessionError::InvalidFrame(3))
        ));
    }

    #[tokio::test]
    async fn oversized_length_is_rejected() {
        let (client, mut server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);

        server.write_all(&[0x7F, 0x00, 0x00, 0x00]).await.unwrap();

        assert!(matches!(
            transport.recv_packet().await,
            Err(SessionError::OversizedFrame(_))
        ));
    }

    #[tokio::test]
    async fn eof_maps_to_connection_closed() {
        let (client, server) = tokio::io::duplex(4096);
        let mut transport = PlainTransport::new(client);
        drop(server);

        assert!(matches!(
            transport.recv_packet().await,
            Err(SessionError::ConnectionClosed)
        ));
    }
}
