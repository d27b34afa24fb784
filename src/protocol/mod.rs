//! Protocol module - wire format, framing and DeviceLink messages.
//!
//! - 4-byte big-endian length prefix encoding/decoding
//! - Frame assembly for outgoing messages
//! - [`FramedChannel`] for exchanging one message per call over a stream
//! - DeviceLink message tags used by the handshake

mod channel;
mod frame;
pub mod messages;
mod wire_format;

pub use channel::FramedChannel;
pub use frame::build_frame;
pub use messages::{Message, ProtocolVersion};
pub use wire_format::{
    decode_prefix, encode_prefix, payload_length, validate_length, DEFAULT_MAX_FRAME_SIZE,
    PREFIX_SIZE,
};
