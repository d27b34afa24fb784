//! Error types for mobilesync-client.

use thiserror::Error;

/// Main error type for all MobileSync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Caller supplied an unusable argument (port 0, released client, ...).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The transport session could not be opened.
    #[error("Connection error: {0}")]
    Connection(#[source] std::io::Error),

    /// Read or write failure on an open session.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Payload is not a valid binary property list.
    #[error("Plist decode error: {0}")]
    Decode(#[source] DecodeError),

    /// Message could not be serialized to a property list.
    #[error("Plist encode error: {0}")]
    Encode(#[source] plist::Error),

    /// Handshake shape mismatch, version mismatch or bad frame header.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Failure that was never classified.
    #[error("Unknown error")]
    Unknown,
}

/// Why a frame payload could not be decoded.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Payload does not start with the `bplist00` header.
    #[error("payload is not a binary plist")]
    NotBinary,

    /// Binary plist is malformed or does not match the requested type.
    #[error(transparent)]
    Plist(#[from] plist::Error),
}

/// Result type alias using SyncError.
pub type Result<T> = std::result::Result<T, SyncError>;

impl SyncError {
    /// Build a [`SyncError::Protocol`] from anything printable.
    pub(crate) fn protocol(msg: impl Into<String>) -> Self {
        SyncError::Protocol(msg.into())
    }

    /// Build a [`SyncError::InvalidArgument`] from anything printable.
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SyncError::InvalidArgument(msg.into())
    }
}
