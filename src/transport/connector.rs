//! Connector seam and device identity.

use std::future::Future;
use std::io;
use std::net::IpAddr;

use tokio::io::{AsyncRead, AsyncWrite};

/// A device the client can open sessions to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device {
    /// Unique device identifier.
    pub udid: String,
    /// Network address, when the device is reachable over IP.
    pub address: Option<IpAddr>,
}

impl Device {
    /// Device known only by its identifier.
    pub fn new(udid: impl Into<String>) -> Self {
        Self {
            udid: udid.into(),
            address: None,
        }
    }

    /// Device reachable at `address`.
    pub fn with_address(udid: impl Into<String>, address: IpAddr) -> Self {
        Self {
            udid: udid.into(),
            address: Some(address),
        }
    }
}

impl std::fmt::Display for Device {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.address {
            Some(addr) => write!(f, "{} ({})", self.udid, addr),
            None => f.write_str(&self.udid),
        }
    }
}

/// Opens byte-stream sessions to a service port on a device.
///
/// A stream may return short reads; writes go through `write_all`, and
/// `shutdown` closes the session.
pub trait Connector {
    /// Stream type produced by this connector.
    type Stream: AsyncRead + AsyncWrite + Unpin + Send;

    /// Open a session to `port` on `device`.
    fn connect(
        &self,
        device: &Device,
        port: u16,
    ) -> impl Future<Output = io::Result<Self::Stream>> + Send;
}
