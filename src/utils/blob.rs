//! # Credential Blob Codec
//!
//! Varint primitives and the discovery credential envelope.
//!
//! Devices discovered over the local network hand over credentials as a
//! base64 envelope: a sequence of single-byte markers, length-prefixed byte
//! blocks, and little-endian 7-bit varints. Only one- and two-byte varints
//! exist in these envelopes; a longer varint means the blob is corrupt and
//! is reported as such rather than silently misparsed.

use crate::error::constants::{ERR_BLOB_TRUNCATED, ERR_VARINT_OVERFLOW};
use crate::error::{Result, SessionError};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use bytes::{Buf, BufMut};

/// Largest value a two-byte varint can carry.
pub const MAX_VARINT: u32 = 0x3fff;

/// Credentials recovered from a discovery blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobCredentials {
    /// Account the blob belongs to.
    pub username: String,
    /// Numeric authentication type, as used on the wire.
    pub auth_type: i32,
    /// Opaque authentication data.
    pub auth_data: Vec<u8>,
}

/// Read a little-endian 7-bit varint of at most two bytes.
pub fn read_varint(buf: &mut impl Buf) -> Result<u32> {
    if !buf.has_remaining() {
        return Err(SessionError::Blob(ERR_BLOB_TRUNCATED.into()));
    }
    let lo = u32::from(buf.get_u8());
    if lo & 0x80 == 0 {
        return Ok(lo);
    }
    if !buf.has_remaining() {
        return Err(SessionError::Blob(ERR_BLOB_TRUNCATED.into()));
    }
    let hi = u32::from(buf.get_u8());
    if hi & 0x80 != 0 {
        return Err(SessionError::Blob(ERR_VARINT_OVERFLOW.into()));
    }
    Ok((lo & 0x7f) | (hi << 7))
}

/// Write a varint in the same one- or two-byte encoding.
///
/// Values above [`MAX_VARINT`] do not fit in two bytes and are a programmer
/// error.
pub fn write_varint(buf: &mut impl BufMut, value: u32) {
    assert!(value <= MAX_VARINT, "varint out of range: {value}");
    if value < 0x80 {
        buf.put_u8(value as u8);
    } else {
        buf.put_u8((value & 0x7f | 0x80) as u8);
        buf.put_u8((value >> 7) as u8);
    }
}

/// Read a length-prefixed byte block: `varint(len) || len bytes`.
pub fn read_block(buf: &mut impl Buf) -> Result<Vec<u8>> {
    let len = read_varint(buf)? as usize;
    if buf.remaining() < len {
        return Err(SessionError::Blob(ERR_BLOB_TRUNCATED.into()));
    }
    let mut data = vec![0u8; len];
    buf.copy_to_slice(&mut data);
    Ok(data)
}

/// Write a length-prefixed byte block.
pub fn write_block(buf: &mut impl BufMut, data: &[u8]) {
    write_varint(buf, data.len() as u32);
    buf.put_slice(data);
}

fn skip_byte(buf: &mut impl Buf) -> Result<()> {
    if !buf.has_remaining() {
        return Err(SessionError::Blob(ERR_BLOB_TRUNCATED.into()));
    }
    buf.advance(1);
    Ok(())
}

/// Decode a base64 discovery envelope into [`BlobCredentials`].
///
/// Layout: one marker byte, a discarded block, one marker byte, the varint
/// authentication type, one marker byte, the authentication data block.
pub fn decode_blob(username: &str, blob: &str) -> Result<BlobCredentials> {
    let data = BASE64_STANDARD
        .decode(blob)
        .map_err(|e| SessionError::Blob(format!("invalid base64: {e}")))?;
    let mut buf = data.as_slice();

    skip_byte(&mut buf)?;
    read_block(&mut buf)?;
    skip_byte(&mut buf)?;
    let auth_type = read_varint(&mut buf)? as i32;
    skip_byte(&mut buf)?;
    let auth_data = read_block(&mut buf)?;

    Ok(BlobCredentials {
        username: username.to_string(),
        auth_type,
        auth_data,
    })
}

/// Encode [`BlobCredentials`] into the base64 envelope `decode_blob` reads.
///
/// Used by tests and by hosts persisting discovery credentials for later
/// sessions.
pub fn encode_blob(credentials: &BlobCredentials) -> String {
    let mut buf = Vec::new();
    buf.put_u8(b'I');
    write_block(&mut buf, credentials.username.as_bytes());
    buf.put_u8(b'P');
    write_varint(&mut buf, credentials.auth_type as u32);
    buf.put_u8(b'Q');
    write_block(&mut buf, &credentials.auth_data);
    BASE64_STANDARD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_one_byte_boundaries() {
        for value in [0u32, 1, 0x7f] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.len(), 1);
            assert_eq!(read_varint(&mut buf.as_slice()).unwrap(), value);
        }
    }

    #[test]
    fn varint_two_byte_boundaries() {
        for value in [0x80u32, 0x1234, MAX_VARINT] {
            let mut buf = Vec::new();
            write_varint(&mut buf, value);
            assert_eq!(buf.len(), 2);
            assert_eq!(read_varint(&mut buf.as_slice()).unwrap(), value);
        }
    }

    #[test]
    fn varint_rejects_three_byte_encodings() {
        let result = read_varint(&mut [0x80u8, 0x80, 0x01].as_slice());
        assert!(matches!(result, Err(SessionError::Blob(_))));
    }

    #[test]
    fn varint_rejects_truncation() {
        assert!(read_varint(&mut [].as_slice()).is_err());
        assert!(read_varint(&mut [0x80u8].as_slice()).is_err());
    }

    #[test]
    fn block_roundtrip() {
        for len in [0usize, 1, 0x7f, 0x80, 1000] {
            let data = vec![0xAB; len];
            let mut buf = Vec::new();
            write_block(&mut buf, &data);
            assert_eq!(read_block(&mut buf.as_slice()).unwrap(), data);
        }
    }

    #[test]
    fn block_rejects_short_body() {
        let mut buf = Vec::new();
        write_varint(&mut buf, 10);
        buf.extend_from_slice(&[1, 2, 3]);
        assert!(read_block(&mut buf.as_slice()).is_err());
    }

    #[test]
    fn blob_roundtrip() {
        let credentials = BlobCredentials {
            username: "bob".to_string(),
            auth_type: 1,
            auth_data: vec![0x01, 0x02, 0x03],
        };
        let blob = encode_blob(&credentials);
        assert_eq!(decode_blob("bob", &blob).unwrap(), credentials);
    }

    #[test]
    fn blob_rejects_bad_base64() {
        assert!(matches!(
            decode_blob("bob", "not base64!!!"),
            Err(SessionError::Blob(_))
        ));
    }

    #[test]
    fn blob_rejects_truncated_envelope() {
        let blob = BASE64_STANDARD.encode([b'I', 0x02, b'x']);
        assert!(matches!(
            decode_blob("bob", &blob),
            Err(SessionError::Blob(_))
        ));
    }
}
