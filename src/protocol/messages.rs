//! DeviceLink message tags and helpers.
//!
//! MobileSync messages are plist arrays whose first element is a
//! `DLMessage*` tag string, e.g.
//! `["DLMessageVersionExchange", 100, 100]`.

use plist::Value;

/// A structured protocol unit exchanged with the device.
pub type Message = Value;

/// Tag of the version exchange message (both directions).
pub const VERSION_EXCHANGE: &str = "DLMessageVersionExchange";
/// Acknowledgment sent after accepting the device version.
pub const VERSIONS_OK: &str = "DLVersionsOk";
/// Tag the device sends once it is ready for sync traffic.
pub const DEVICE_READY: &str = "DLMessageDeviceReady";
/// Tag of the goodbye message sent on release.
pub const DISCONNECT: &str = "DLMessageDisconnect";
/// Text carried by the disconnect message.
pub const DISCONNECT_REASON: &str = "All done, thanks for the memories";

/// Two-part protocol version negotiated during the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProtocolVersion {
    pub major: u64,
    pub minor: u64,
}

impl ProtocolVersion {
    /// The only version this client speaks.
    pub const MOBILESYNC: ProtocolVersion = ProtocolVersion::new(100, 100);

    pub const fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::MOBILESYNC
    }
}

impl std::fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Build a message array out of string elements.
pub fn string_array(items: &[&str]) -> Message {
    Value::Array(items.iter().map(|s| Value::String((*s).to_string())).collect())
}

/// `["DLMessageVersionExchange", "DLVersionsOk"]`
pub fn version_ok() -> Message {
    string_array(&[VERSION_EXCHANGE, VERSIONS_OK])
}

/// `["DLMessageDisconnect", "All done, thanks for the memories"]`
pub fn disconnect() -> Message {
    string_array(&[DISCONNECT, DISCONNECT_REASON])
}

/// `["DLMessageVersionExchange", major, minor]`, as the device sends it.
pub fn version_exchange(version: ProtocolVersion) -> Message {
    Value::Array(vec![
        Value::String(VERSION_EXCHANGE.to_string()),
        Value::Integer(version.major.into()),
        Value::Integer(version.minor.into()),
    ])
}

/// Extract the version offered in a version exchange message.
///
/// The message must be an array whose first element is the
/// `DLMessageVersionExchange` tag, immediately followed by two unsigned
/// integers. Anything after them is ignored. Returns `None` for any other
/// shape.
pub fn parse_version_exchange(message: &Message) -> Option<ProtocolVersion> {
    if message_tag(message)? != VERSION_EXCHANGE {
        return None;
    }

    let items = message.as_array()?;
    let major = unsigned(items.get(1)?)?;
    let minor = unsigned(items.get(2)?)?;
    Some(ProtocolVersion::new(major, minor))
}

fn unsigned(value: &Value) -> Option<u64> {
    match value {
        Value::Integer(i) => i.as_unsigned(),
        _ => None,
    }
}

/// Whether `needle` occurs as a string anywhere in the message tree,
/// including inside nested arrays and dictionary values.
pub fn contains_string(message: &Message, needle: &str) -> bool {
    match message {
        Value::String(s) => s == needle,
        Value::Array(items) => items.iter().any(|item| contains_string(item, needle)),
        Value::Dictionary(dict) => dict.values().any(|item| contains_string(item, needle)),
        _ => false,
    }
}

/// First string element of an array message, if any.
pub fn message_tag(message: &Message) -> Option<&str> {
    message.as_array()?.first()?.as_string()
}
