//! Outgoing frame assembly.
//!
//! Uses `bytes::BytesMut` so the prefix and payload land in one contiguous
//! buffer and reach the transport as a single logical send.

use bytes::{BufMut, Bytes, BytesMut};

use super::wire_format::{payload_length, PREFIX_SIZE};
use crate::error::Result;

/// Build a complete frame: 4-byte big-endian length followed by the payload.
///
/// # Example
///
/// ```
/// use mobilesync_client::protocol::build_frame;
///
/// let frame = build_frame(b"hello").unwrap();
/// assert_eq!(&frame[..4], &[0, 0, 0, 5]);
/// assert_eq!(&frame[4..], b"hello");
/// ```
pub fn build_frame(payload: &[u8]) -> Result<Bytes> {
    let len = payload_length(payload.len())?;
    let mut buf = BytesMut::with_capacity(PREFIX_SIZE + payload.len());
    buf.put_u32(len);
    buf.extend_from_slice(payload);
    Ok(buf.freeze())
}
