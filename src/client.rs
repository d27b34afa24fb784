//! Client builder and session lifecycle.
//!
//! The [`ClientBuilder`] holds configuration; [`ClientBuilder::connect`]
//! manages establishment:
//! 1. Open a transport session through a [`Connector`]
//! 2. Run the version handshake
//! 3. Hand back a [`Client`] owning the session
//!
//! On any handshake failure the session is closed before the error is
//! returned. [`Client::release`] says goodbye to the device and closes the
//! transport.
//!
//! # Example
//!
//! ```ignore
//! use mobilesync_client::transport::{Device, TcpConnector};
//! use mobilesync_client::Client;
//!
//! let device = Device::with_address("00008030-001A", "192.168.1.20".parse()?);
//! let mut client = Client::builder()
//!     .io_timeout(std::time::Duration::from_secs(10))
//!     .connect(&TcpConnector::new(), &device, 49_152)
//!     .await?;
//!
//! client.send(&request).await?;
//! let reply = client.receive().await?;
//! client.release().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

use crate::diagnostics::{default_sink, DiagnosticSink, SharedSink};
use crate::error::{Result, SyncError};
use crate::handshake::Handshake;
use crate::protocol::{messages, FramedChannel, Message, ProtocolVersion, DEFAULT_MAX_FRAME_SIZE};
use crate::transport::{Connector, Device};

/// Builder for configuring and establishing a MobileSync client.
pub struct ClientBuilder {
    version: ProtocolVersion,
    max_frame_size: u32,
    io_timeout: Option<Duration>,
    sink: SharedSink,
}

impl ClientBuilder {
    /// Create a builder with the default configuration.
    pub fn new() -> Self {
        Self {
            version: ProtocolVersion::MOBILESYNC,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            io_timeout: None,
            sink: default_sink(),
        }
    }

    /// Set the protocol version the device must offer.
    ///
    /// Default: 100.100
    pub fn version(mut self, version: ProtocolVersion) -> Self {
        self.version = version;
        self
    }

    /// Set the largest frame payload accepted from the device.
    ///
    /// Default: 64 MiB
    pub fn max_frame_size(mut self, max_frame_size: u32) -> Self {
        self.max_frame_size = max_frame_size;
        self
    }

    /// Bound every frame read and write by `timeout`.
    ///
    /// Default: none; the transport's own policy applies.
    pub fn io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = Some(timeout);
        self
    }

    /// Set where XML message dumps are recorded.
    ///
    /// Default: [`TracingSink`](crate::diagnostics::TracingSink)
    pub fn diagnostic_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Open a session to `port` on `device` and perform the handshake.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidArgument`] if `port` is 0
    /// - [`SyncError::Connection`] if the transport cannot be opened
    /// - [`SyncError::Protocol`] on a handshake shape or version mismatch
    /// - transport and decode errors from the handshake frames
    pub async fn connect<C: Connector>(
        self,
        connector: &C,
        device: &Device,
        port: u16,
    ) -> Result<Client<C::Stream>> {
        if port == 0 {
            return Err(SyncError::invalid("port must be non-zero"));
        }

        let mut handshake = Handshake::new(self.version);
        let stream = match connector.connect(device, port).await {
            Ok(stream) => {
                handshake.connected(true);
                stream
            }
            Err(e) => {
                handshake.connected(false);
                tracing::debug!(%device, port, error = %e, "connection failed");
                return Err(SyncError::Connection(e));
            }
        };

        let mut channel = FramedChannel::new(stream)
            .with_sink(self.sink)
            .with_max_frame_size(self.max_frame_size)
            .with_io_timeout(self.io_timeout);

        if let Err(e) = handshake.run(&mut channel).await {
            if let Err(close_err) = channel.close().await {
                tracing::warn!(%device, error = %close_err, "closing failed session");
            }
            return Err(e);
        }

        tracing::debug!(%device, port, version = %self.version, "MobileSync session ready");
        Ok(Client {
            channel: Some(channel),
            device: device.clone(),
            version: self.version,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// An established, version-compatible MobileSync session.
///
/// Owns the transport session until [`release`](Client::release) is called.
/// Every operation on a released client fails with
/// [`SyncError::InvalidArgument`]. Any error from `send` or `receive` should
/// be treated as fatal to the session; nothing is retried.
pub struct Client<S> {
    channel: Option<FramedChannel<S>>,
    device: Device,
    version: ProtocolVersion,
}

impl Client<()> {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }
}

impl<S> Client<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Send one message to the device.
    pub async fn send(&mut self, message: &Message) -> Result<()> {
        self.channel()?.send_frame(message).await
    }

    /// Receive one message from the device.
    pub async fn receive(&mut self) -> Result<Message> {
        self.channel()?.receive_frame().await
    }

    /// Notify the device and close the session.
    ///
    /// The `DLMessageDisconnect` notification is best effort: if it cannot be
    /// sent the transport is still closed, and the close result is returned.
    pub async fn release(&mut self) -> Result<()> {
        let mut channel = self
            .channel
            .take()
            .ok_or_else(|| SyncError::invalid("client already released"))?;

        if let Err(e) = channel.send_frame(&messages::disconnect()).await {
            tracing::warn!(device = %self.device, error = %e, "disconnect notification not sent");
        }

        let result = channel.close().await;
        tracing::debug!(device = %self.device, "MobileSync session released");
        result
    }

    fn channel(&mut self) -> Result<&mut FramedChannel<S>> {
        self.channel
            .as_mut()
            .ok_or_else(|| SyncError::invalid("client already released"))
    }
}

impl<S> Client<S> {
    /// The device this session is connected to.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// The version negotiated during the handshake.
    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    /// Whether [`release`](Client::release) has already run.
    pub fn is_released(&self) -> bool {
        self.channel.is_none()
    }
}

impl<S> Drop for Client<S> {
    fn drop(&mut self) {
        if self.channel.is_some() {
            tracing::warn!(device = %self.device, "client dropped without release; closing without disconnect");
        }
    }
}

/// Establish a client with the default configuration.
pub async fn new_client<C: Connector>(
    connector: &C,
    device: &Device,
    port: u16,
) -> Result<Client<C::Stream>> {
    ClientBuilder::new().connect(connector, device, port).await
}

/// Release a client, if there is one.
///
/// # Errors
///
/// [`SyncError::InvalidArgument`] without touching the transport when
/// `client` is `None`; otherwise the result of [`Client::release`].
pub async fn release_client<S>(client: Option<Client<S>>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match client {
        Some(mut client) => client.release().await,
        None => Err(SyncError::invalid("no client to release")),
    }
}
