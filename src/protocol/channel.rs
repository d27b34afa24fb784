//! Framed channel: one plist message per call over a byte stream.
//!
//! Receiving reads the 4-byte prefix and then exactly `N` payload bytes,
//! retrying short reads from the current offset until the frame is complete.
//! Nothing past the end of the frame is consumed, so the next frame stays
//! intact in the stream. Sending assembles prefix and payload into one buffer
//! and hands it to the transport with `write_all`.
//!
//! # Example
//!
//! ```ignore
//! use mobilesync_client::protocol::FramedChannel;
//!
//! let mut channel = FramedChannel::new(stream);
//! channel.send_frame(&message).await?;
//! let reply = channel.receive_frame().await?;
//! channel.close().await?;
//! ```

use std::future::Future;
use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use super::frame::build_frame;
use super::messages::Message;
use super::wire_format::{validate_length, DEFAULT_MAX_FRAME_SIZE, PREFIX_SIZE};
use crate::codec::PlistCodec;
use crate::diagnostics::{default_sink, SharedSink, MOBILESYNC_CATEGORY};
use crate::error::{Result, SyncError};

/// Length-prefixed plist channel over an owned stream.
pub struct FramedChannel<S> {
    stream: S,
    sink: SharedSink,
    max_frame_size: u32,
    io_timeout: Option<Duration>,
}

impl<S> FramedChannel<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap a stream with default settings (tracing sink, 64 MiB limit, no timeout).
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            sink: default_sink(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            io_timeout: None,
        }
    }

    /// Replace the diagnostic sink.
    pub fn with_sink(mut self, sink: SharedSink) -> Self {
        self.sink = sink;
        self
    }

    /// Set the largest payload accepted by `receive_frame`.
    pub fn with_max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Bound every frame read and write by `timeout`.
    pub fn with_io_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// Receive and decode exactly one frame.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Transport`] if the stream fails or ends mid-frame
    /// - [`SyncError::Protocol`] if the prefix exceeds the frame size limit
    /// - [`SyncError::Decode`] if the payload is not a binary plist
    pub async fn receive_frame(&mut self) -> Result<Message> {
        let mut prefix = [0u8; PREFIX_SIZE];
        with_timeout(self.io_timeout, self.stream.read_exact(&mut prefix)).await?;

        let len = u32::from_be_bytes(prefix);
        validate_length(len, self.max_frame_size)?;

        let mut payload = vec![0u8; len as usize];
        with_timeout(self.io_timeout, self.stream.read_exact(&mut payload)).await?;
        tracing::trace!(len, "received frame");

        let message: Message = PlistCodec::decode_binary(&payload)?;
        self.log_message("receive_frame", &message, payload.len());

        Ok(message)
    }

    /// Encode and send exactly one frame.
    ///
    /// # Errors
    ///
    /// - [`SyncError::Encode`] if the message cannot be serialized
    /// - [`SyncError::Transport`] on any write failure
    pub async fn send_frame(&mut self, message: &Message) -> Result<()> {
        let payload = PlistCodec::encode_binary(message)?;
        self.log_message("send_frame", message, payload.len());

        let frame = build_frame(&payload)?;
        let stream = &mut self.stream;
        with_timeout(self.io_timeout, async move {
            stream.write_all(&frame).await?;
            stream.flush().await
        })
        .await?;
        tracing::trace!(len = payload.len(), "sent frame");

        Ok(())
    }

    /// Shut the stream down, returning the transport's close result.
    pub async fn close(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Get a mutable reference to the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Consume the channel, returning the stream.
    pub fn into_inner(self) -> S {
        self.stream
    }

    fn log_message(&self, op: &str, message: &Message, size: usize) {
        // Rendering failures only cost us the log line.
        if let Ok(xml) = PlistCodec::encode_xml(message) {
            self.sink.record(
                MOBILESYNC_CATEGORY,
                &format!("{}: plist size: {}\nbuffer :\n{}", op, size, xml),
            );
        }
    }
}

async fn with_timeout<T, F>(timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    let out = match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| io::Error::new(io::ErrorKind::TimedOut, "frame I/O timed out"))?,
        None => fut.await,
    };
    out.map_err(SyncError::Transport)
}
