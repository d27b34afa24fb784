//! Transport module - how a session to the device is opened.
//!
//! The multiplexing transport is an external collaborator. It is consumed
//! through the [`Connector`] trait, whose streams only need to implement
//! tokio's `AsyncRead + AsyncWrite`. [`TcpConnector`] covers devices reachable
//! over the network or through a forwarded port.

mod connector;
mod tcp;

pub use connector::{Connector, Device};
pub use tcp::TcpConnector;
