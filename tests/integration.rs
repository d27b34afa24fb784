//! Integration tests for mobilesync-client.
//!
//! A scripted in-memory session stands in for the multiplexing transport:
//! it replays device frames in fixed-size chunks, records everything the
//! client writes and counts how often the session is closed.

use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use mobilesync_client::codec::PlistCodec;
use mobilesync_client::diagnostics::NullSink;
use mobilesync_client::protocol::{build_frame, decode_prefix, messages, PREFIX_SIZE};
use mobilesync_client::transport::{Connector, Device};
use mobilesync_client::{release_client, Client, Message, ProtocolVersion, SyncError};
use plist::Value;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

#[derive(Default)]
struct SessionLog {
    /// Every buffer handed to `poll_write`, successful or not.
    write_attempts: Vec<Vec<u8>>,
    /// Bytes accepted by the session.
    written: Vec<u8>,
    close_calls: usize,
    /// Number of write attempts seen when the session was closed.
    attempts_at_close: usize,
    unread: usize,
    fail_writes: bool,
}

struct MockSession {
    input: Vec<u8>,
    pos: usize,
    chunk: usize,
    log: Arc<Mutex<SessionLog>>,
}

impl AsyncRead for MockSession {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let n = self
            .chunk
            .min(buf.remaining())
            .min(self.input.len() - self.pos);
        let start = self.pos;
        buf.put_slice(&self.input[start..start + n]);
        self.pos += n;
        self.log.lock().unwrap().unread = self.input.len() - self.pos;
        Poll::Ready(Ok(()))
    }
}

impl AsyncWrite for MockSession {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut log = self.log.lock().unwrap();
        log.write_attempts.push(buf.to_vec());
        if log.fail_writes {
            return Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "device gone")));
        }
        log.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let mut log = self.log.lock().unwrap();
        log.close_calls += 1;
        log.attempts_at_close = log.write_attempts.len();
        Poll::Ready(Ok(()))
    }
}

/// Connector that hands out a single scripted session.
struct ScriptedConnector {
    script: Vec<u8>,
    chunk: usize,
    log: Arc<Mutex<SessionLog>>,
    connects: Mutex<usize>,
}

impl ScriptedConnector {
    fn new(device_frames: &[Message]) -> Self {
        let mut script = Vec::new();
        for msg in device_frames {
            script.extend(frame_bytes(msg));
        }
        Self {
            script,
            chunk: usize::MAX,
            log: Arc::new(Mutex::new(SessionLog::default())),
            connects: Mutex::new(0),
        }
    }

    fn chunked(mut self, chunk: usize) -> Self {
        self.chunk = chunk;
        self
    }

    fn with_raw_tail(mut self, bytes: &[u8]) -> Self {
        self.script.extend_from_slice(bytes);
        self
    }

    /// Make every later write on the session fail.
    fn break_writes(&self) {
        self.log.lock().unwrap().fail_writes = true;
    }

    fn attempts_at_close(&self) -> usize {
        self.log.lock().unwrap().attempts_at_close
    }

    fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    fn close_calls(&self) -> usize {
        self.log.lock().unwrap().close_calls
    }

    fn unread(&self) -> usize {
        self.log.lock().unwrap().unread
    }

    /// Frames the client wrote, decoded.
    fn sent(&self) -> Vec<Message> {
        split_frames(&self.log.lock().unwrap().written)
    }

    /// Frames the client tried to write, decoded, including failed writes.
    fn attempted(&self) -> Vec<Message> {
        let log = self.log.lock().unwrap();
        log.write_attempts
            .iter()
            .flat_map(|bytes| split_frames(bytes))
            .collect()
    }
}

impl Connector for ScriptedConnector {
    type Stream = MockSession;

    async fn connect(&self, _device: &Device, _port: u16) -> io::Result<MockSession> {
        *self.connects.lock().unwrap() += 1;
        Ok(MockSession {
            input: self.script.clone(),
            pos: 0,
            chunk: self.chunk,
            log: self.log.clone(),
        })
    }
}

fn frame_bytes(msg: &Message) -> Vec<u8> {
    let payload = PlistCodec::encode_binary(msg).unwrap();
    build_frame(&payload).unwrap().to_vec()
}

/// Split a byte stream into frames, checking every prefix matches its payload.
fn split_frames(mut bytes: &[u8]) -> Vec<Message> {
    let mut out = Vec::new();
    while !bytes.is_empty() {
        let len = decode_prefix(bytes).expect("complete prefix") as usize;
        let end = PREFIX_SIZE + len;
        assert!(bytes.len() >= end, "prefix claims more bytes than were written");
        out.push(PlistCodec::decode_binary(&bytes[PREFIX_SIZE..end]).unwrap());
        bytes = &bytes[end..];
    }
    out
}

fn device_ready() -> Message {
    Value::Array(vec![Value::String(messages::DEVICE_READY.into())])
}

fn good_peer() -> Vec<Message> {
    vec![
        messages::version_exchange(ProtocolVersion::new(100, 100)),
        device_ready(),
    ]
}

async fn connect(connector: &ScriptedConnector) -> mobilesync_client::Result<Client<MockSession>> {
    Client::builder()
        .diagnostic_sink(NullSink)
        .connect(connector, &Device::new("mock"), 62078)
        .await
}

/// Test the full lifecycle: handshake, exchange, release.
#[tokio::test]
async fn test_handshake_success_and_release() {
    let record = messages::string_array(&["SDMessageProcessChanges", "com.apple.Contacts"]);
    let mut frames = good_peer();
    frames.push(record.clone());
    let connector = ScriptedConnector::new(&frames);

    let mut client = connect(&connector).await.unwrap();
    assert_eq!(connector.sent(), vec![messages::version_ok()]);
    assert_eq!(connector.close_calls(), 0);

    assert_eq!(client.receive().await.unwrap(), record);

    client.release().await.unwrap();
    assert_eq!(
        connector.sent(),
        vec![messages::version_ok(), messages::disconnect()]
    );
    assert_eq!(connector.close_calls(), 1);
}

/// Test that the handshake survives 1-byte-at-a-time delivery.
#[tokio::test]
async fn test_handshake_with_byte_at_a_time_delivery() {
    let connector = ScriptedConnector::new(&good_peer()).chunked(1);

    let client = connect(&connector).await.unwrap();

    assert_eq!(client.version(), ProtocolVersion::MOBILESYNC);
    assert_eq!(connector.unread(), 0);
}

/// Test that receiving stops exactly at the frame boundary.
#[tokio::test]
async fn test_handshake_reads_no_byte_past_ready_frame() {
    let connector = ScriptedConnector::new(&good_peer())
        .chunked(3)
        .with_raw_tail(&[0xde, 0xad, 0xbe, 0xef, 0x01]);

    let _client = connect(&connector).await.unwrap();

    assert_eq!(connector.unread(), 5);
}

/// Test version mismatch: protocol error, no ack, session closed once.
#[tokio::test]
async fn test_version_mismatch_closes_session() {
    let connector = ScriptedConnector::new(&[
        messages::version_exchange(ProtocolVersion::new(99, 100)),
        device_ready(),
    ]);

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Protocol(_))));
    assert!(connector.sent().is_empty());
    assert_eq!(connector.close_calls(), 1);
}

/// Test a first message without the version tag.
#[tokio::test]
async fn test_missing_version_tag_sends_no_ack() {
    let connector = ScriptedConnector::new(&[
        messages::string_array(&["DLMessagePing", "hello"]),
        device_ready(),
    ]);

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Protocol(_))));
    assert!(connector.attempted().is_empty());
    assert_eq!(connector.close_calls(), 1);
}

/// Test version fields of the wrong type.
#[tokio::test]
async fn test_version_fields_must_be_unsigned_integers() {
    let connector = ScriptedConnector::new(&[Value::Array(vec![
        Value::String(messages::VERSION_EXCHANGE.into()),
        Value::Integer(100u64.into()),
        Value::Real(100.0),
    ])]);

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Protocol(_))));
    assert_eq!(connector.close_calls(), 1);
}

/// Test a device that never reports ready.
#[tokio::test]
async fn test_missing_device_ready() {
    let connector = ScriptedConnector::new(&[
        messages::version_exchange(ProtocolVersion::MOBILESYNC),
        messages::string_array(&["DLMessageProcessMessage"]),
    ]);

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Protocol(_))));
    assert_eq!(connector.sent(), vec![messages::version_ok()]);
    assert_eq!(connector.close_calls(), 1);
}

/// Test a device that hangs up mid-handshake.
#[tokio::test]
async fn test_stream_ends_during_handshake() {
    let connector = ScriptedConnector::new(&[messages::version_exchange(ProtocolVersion::MOBILESYNC)]);

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Transport(_))));
    assert_eq!(connector.close_calls(), 1);
}

/// Test a garbage payload during the handshake.
#[tokio::test]
async fn test_malformed_payload_during_handshake() {
    let connector = ScriptedConnector::new(&[]).with_raw_tail(&build_frame(b"nope").unwrap());

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Decode(_))));
    assert_eq!(connector.close_calls(), 1);
}

/// Test release when the disconnect notification cannot be sent.
#[tokio::test]
async fn test_release_closes_even_if_disconnect_fails() {
    let connector = ScriptedConnector::new(&good_peer());
    let mut client = connect(&connector).await.unwrap();

    connector.break_writes();
    client.release().await.unwrap();

    assert_eq!(
        connector.attempted(),
        vec![messages::version_ok(), messages::disconnect()]
    );
    assert_eq!(connector.sent(), vec![messages::version_ok()]);
    assert_eq!(connector.close_calls(), 1);
    assert_eq!(connector.attempts_at_close(), 2);
    assert!(client.is_released());
}

/// Test a write failure while acknowledging the version.
#[tokio::test]
async fn test_ack_write_failure_closes_session() {
    let connector = ScriptedConnector::new(&good_peer());
    connector.break_writes();

    let result = connect(&connector).await;

    assert!(matches!(result, Err(SyncError::Transport(_))));
    assert_eq!(connector.attempted(), vec![messages::version_ok()]);
    assert_eq!(connector.close_calls(), 1);
}

/// Test `release_client` with no client.
#[tokio::test]
async fn test_release_client_none_touches_nothing() {
    let connector = ScriptedConnector::new(&good_peer());

    let result = release_client::<MockSession>(None).await;

    assert!(matches!(result, Err(SyncError::InvalidArgument(_))));
    assert_eq!(connector.connects(), 0);
    assert_eq!(connector.close_calls(), 0);
}

/// Test `release_client` with a live client sends exactly one disconnect.
#[tokio::test]
async fn test_release_client_sends_one_disconnect() {
    let connector = ScriptedConnector::new(&good_peer());
    let client = connect(&connector).await.unwrap();

    release_client(Some(client)).await.unwrap();

    assert_eq!(connector.attempts_at_close(), 2);
    let disconnects = connector
        .sent()
        .iter()
        .filter(|m| messages::message_tag(m) == Some(messages::DISCONNECT))
        .count();
    assert_eq!(disconnects, 1);
    assert_eq!(connector.close_calls(), 1);
}
