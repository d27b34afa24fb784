//! Wire format encoding and decoding.
//!
//! A frame is a 4-byte length prefix followed by the payload:
//! ```text
//! ┌──────────┬────────────────────────────┐
//! │ Length N │ Payload (binary plist)     │
//! │ 4 bytes  │ exactly N bytes            │
//! │ uint32 BE│                            │
//! └──────────┴────────────────────────────┘
//! ```
//!
//! There is no magic, checksum or version field. The protocol version is
//! negotiated inside the messages during the handshake.

use crate::error::{Result, SyncError};

/// Length prefix size in bytes.
pub const PREFIX_SIZE: usize = 4;

/// Default upper bound on a single frame payload (64 MiB).
pub const DEFAULT_MAX_FRAME_SIZE: u32 = 64 * 1024 * 1024;

/// Encode a payload length as the big-endian frame prefix.
#[inline]
pub fn encode_prefix(payload_length: u32) -> [u8; PREFIX_SIZE] {
    payload_length.to_be_bytes()
}

/// Decode a big-endian frame prefix.
///
/// Returns `None` if the buffer is shorter than `PREFIX_SIZE`.
#[inline]
pub fn decode_prefix(buf: &[u8]) -> Option<u32> {
    let bytes: [u8; PREFIX_SIZE] = buf.get(..PREFIX_SIZE)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}

/// Check a received length against the configured maximum.
pub fn validate_length(payload_length: u32, max_frame_size: u32) -> Result<()> {
    if payload_length > max_frame_size {
        return Err(SyncError::protocol(format!(
            "Frame size {} exceeds maximum {}",
            payload_length, max_frame_size
        )));
    }
    Ok(())
}

/// Convert a payload size into a prefix value, rejecting payloads that do
/// not fit in 32 bits.
pub fn payload_length(len: usize) -> Result<u32> {
    u32::try_from(len)
        .map_err(|_| SyncError::protocol(format!("Payload of {} bytes does not fit a frame", len)))
}
