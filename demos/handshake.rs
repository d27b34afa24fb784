//! Handshake probe - connect, negotiate, print the first message, release.
//!
//! This example demonstrates:
//! - Configuring a client with the builder pattern
//! - Opening a session over TCP (e.g. through a port forwarder)
//! - Receiving a message and releasing the session cleanly
//!
//! # Running
//!
//! ```text
//! RUST_LOG=mobilesync=debug cargo run --example handshake -- <udid> <ip> <port>
//! ```

use std::time::Duration;

use mobilesync_client::codec::PlistCodec;
use mobilesync_client::transport::{Device, TcpConnector};
use mobilesync_client::Client;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(udid), Some(ip), Some(port)) = (args.next(), args.next(), args.next()) else {
        eprintln!("usage: handshake <udid> <ip> <port>");
        std::process::exit(2);
    };

    let device = Device::with_address(udid, ip.parse()?);
    let mut client = Client::builder()
        .io_timeout(Duration::from_secs(10))
        .connect(&TcpConnector::new(), &device, port.parse()?)
        .await?;

    println!("connected to {} (protocol {})", client.device(), client.version());

    let first = client.receive().await?;
    println!("{}", PlistCodec::encode_xml(&first)?);

    client.release().await?;
    Ok(())
}
