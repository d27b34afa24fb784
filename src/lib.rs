//! # mobilesync-client
//!
//! Rust client for the MobileSync device synchronization channel.
//!
//! This crate turns a byte-stream session to a device into an exchange of
//! discrete plist messages with a negotiated protocol version.
//!
//! ## Architecture
//!
//! - **Framed channel**: 4-byte big-endian length + binary plist payload
//! - **Handshake**: `DLMessageVersionExchange` (100.100) → `DLVersionsOk` →
//!   `DLMessageDeviceReady`
//! - **Codec**: binary plist on the wire, XML plist for diagnostic logs
//!
//! The multiplexing transport is pluggable through [`transport::Connector`].
//!
//! ## Example
//!
//! ```ignore
//! use mobilesync_client::transport::{Device, TcpConnector};
//! use mobilesync_client::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let device = Device::with_address("00008030-001A", "192.168.1.20".parse()?);
//!     let mut client = Client::builder()
//!         .connect(&TcpConnector::new(), &device, 49_152)
//!         .await?;
//!
//!     let reply = client.receive().await?;
//!     println!("{:?}", reply);
//!
//!     client.release().await?;
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod diagnostics;
pub mod error;
pub mod protocol;
pub mod transport;

mod client;
mod handshake;

pub use client::{new_client, release_client, Client, ClientBuilder};
pub use error::{DecodeError, Result, SyncError};
pub use handshake::{Handshake, HandshakeState};
pub use protocol::{Message, ProtocolVersion};
