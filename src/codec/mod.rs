//! Codec module - property list serialization for message payloads.
//!
//! Two wire forms of the same message tree are used:
//!
//! - **binary** (`bplist00`) for frames sent to and received from the device
//! - **XML** for the human-readable diagnostic log; never transmitted
//!
//! # Example
//!
//! ```
//! use mobilesync_client::codec::PlistCodec;
//! use plist::Value;
//!
//! let msg = Value::Array(vec![
//!     Value::String("DLMessageVersionExchange".into()),
//!     Value::String("DLVersionsOk".into()),
//! ]);
//! let encoded = PlistCodec::encode_binary(&msg).unwrap();
//! let decoded: Value = PlistCodec::decode_binary(&encoded).unwrap();
//! assert_eq!(decoded, msg);
//! ```

mod plist_codec;

pub use plist_codec::{PlistCodec, BINARY_MAGIC};
