//! TCP connector.
//!
//! Connects to the device's address, or to a fixed relay host when one is
//! configured (e.g. a local port forwarder in front of the USB multiplexer).
//!
//! # Example
//!
//! ```ignore
//! use mobilesync_client::transport::{Connector, Device, TcpConnector};
//!
//! let device = Device::with_address("00008030-001A", "192.168.1.20".parse()?);
//! let stream = TcpConnector::new().connect(&device, 49_152).await?;
//! ```

use std::io;
use std::net::{IpAddr, SocketAddr};

use tokio::net::TcpStream;

use super::connector::{Connector, Device};

/// Opens sessions as plain TCP connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector {
    relay: Option<IpAddr>,
}

impl TcpConnector {
    /// Connect to each device's own address.
    pub fn new() -> Self {
        Self { relay: None }
    }

    /// Connect every device through `relay` instead of its own address.
    pub fn via_relay(relay: IpAddr) -> Self {
        Self { relay: Some(relay) }
    }

    fn target(&self, device: &Device, port: u16) -> io::Result<SocketAddr> {
        let ip = self.relay.or(device.address).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("device {} has no network address", device.udid),
            )
        })?;
        Ok(SocketAddr::new(ip, port))
    }
}

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, device: &Device, port: u16) -> io::Result<TcpStream> {
        let addr = self.target(device, port)?;
        tracing::debug!(%addr, udid = %device.udid, "opening TCP session");
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        Ok(stream)
    }
}
