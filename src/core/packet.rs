//! Command bytes and the decoded packet value.

use bytes::Bytes;

/// Command bytes used on the encrypted stream.
pub mod cmd {
    /// Server keep-alive probe; echoed back as [`PONG`].
    pub const PING: u8 = 0x04;
    /// Country code notification for the authenticated account.
    pub const COUNTRY_CODE: u8 = 0x1b;
    /// Keep-alive echo sent in response to [`PING`].
    pub const PONG: u8 = 0x49;
    /// Encrypted login credentials, client to server.
    pub const LOGIN: u8 = 0xab;
    /// Successful login reply carrying the welcome message.
    pub const AP_WELCOME: u8 = 0xac;
    /// Login rejection.
    pub const AUTH_FAILURE: u8 = 0xad;
    /// First command of the mercury message-bus range.
    pub const MERCURY_REQ: u8 = 0xb2;
    /// Mercury subscription acknowledgements.
    pub const MERCURY_SUB: u8 = 0xb3;
    /// Mercury unsubscription acknowledgements.
    pub const MERCURY_UNSUB: u8 = 0xb4;
    /// Mercury subscription events.
    pub const MERCURY_EVENT: u8 = 0xb5;
    /// Last command of the mercury message-bus range.
    pub const MERCURY_LAST: u8 = 0xb6;

    /// Whether a command byte belongs to the mercury subsystem.
    pub fn is_mercury(cmd: u8) -> bool {
        (MERCURY_REQ..=MERCURY_LAST).contains(&cmd)
    }
}

/// One decrypted packet from the encrypted stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Command byte selecting the subsystem handler.
    pub cmd: u8,
    /// Decrypted payload.
    pub payload: Bytes,
}

impl Packet {
    /// Construct a packet value.
    pub fn new(cmd: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            cmd,
            payload: payload.into(),
        }
    }
}
