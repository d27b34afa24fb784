//! Property list codec using the `plist` crate.
//!
//! Binary encoding is what goes on the wire. XML rendering exists only so a
//! message can be written to the diagnostic log; there is no XML decode path.

use std::io::Cursor;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{DecodeError, Result, SyncError};

/// Header every binary property list starts with.
pub const BINARY_MAGIC: &[u8] = b"bplist00";

/// Property list codec for structured messages.
///
/// Marker struct with static methods, so any `Serialize` type (including
/// `plist::Value` trees) can be framed without a trait object.
pub struct PlistCodec;

impl PlistCodec {
    /// Encode a value to binary plist bytes.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Encode`] if the value has no plist representation.
    pub fn encode_binary<T: Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        plist::to_writer_binary(&mut buf, value).map_err(SyncError::Encode)?;
        Ok(buf)
    }

    /// Decode binary plist bytes to a value.
    ///
    /// Only the binary form is accepted. XML or empty payloads are rejected
    /// before the parser sees them, since `plist` would otherwise detect and
    /// read the XML form too.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Decode`] if the bytes are not a valid binary plist of type `T`.
    pub fn decode_binary<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
        if !bytes.starts_with(BINARY_MAGIC) {
            return Err(SyncError::Decode(DecodeError::NotBinary));
        }
        plist::from_reader(Cursor::new(bytes))
            .map_err(|e| SyncError::Decode(DecodeError::Plist(e)))
    }

    /// Render a value as an XML plist document for logging.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Encode`] if the value has no plist representation.
    pub fn encode_xml<T: Serialize>(value: &T) -> Result<String> {
        let mut buf = Vec::new();
        plist::to_writer_xml(&mut buf, value).map_err(SyncError::Encode)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
