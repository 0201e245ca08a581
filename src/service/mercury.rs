//! Mercury subsystem seam.
//!
//! The mercury message bus (commands `0xB2`–`0xB6`) has its own
//! request/subscription router that lives outside this crate. The session
//! core only needs to hand frames over; [`Mercury`] is that seam, and the
//! factory closure receives the shared send handle so a real client can
//! issue its own requests over the same connection.

use crate::core::stream::SharedSender;
use crate::error::Result;
use crate::transport::SessionWriter;
use bytes::Bytes;
use tracing::debug;

/// Consumer of mercury frames received by the dispatcher.
pub trait Mercury: Send {
    /// Handle one mercury frame. An error is fatal to the session.
    fn handle(&mut self, cmd: u8, payload: Bytes) -> Result<()>;
}

/// Factory invoked at session construction with the shared send handle.
pub type MercuryFactory =
    Box<dyn FnOnce(SharedSender<SessionWriter>) -> Box<dyn Mercury> + Send>;

/// Default mercury consumer: drops frames.
///
/// Used when no mercury client is injected, e.g. by hosts that only need
/// authentication and keep-alive.
#[derive(Debug, Default)]
pub struct NullMercury;

impl Mercury for NullMercury {
    fn handle(&mut self, cmd: u8, payload: Bytes) -> Result<()> {
        debug!(cmd, len = payload.len(), "mercury frame dropped, no client configured");
        Ok(())
    }
}
