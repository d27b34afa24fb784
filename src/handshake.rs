//! DeviceLink version handshake.
//!
//! Linear state machine run once per session, right after the transport
//! connects:
//!
//! ```text
//! Connecting ─► AwaitingVersion ─► VersionCheck ─► SendingAck ─► AwaitingReady ─► Ready
//!      │               │                │              │               │
//!      └───────────────┴────────────────┴──────────────┴───────────────┴──► Failed
//! ```
//!
//! There is no retry: a shape or version mismatch ends in `Failed`, and the
//! caller closes the session.

use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Result, SyncError};
use crate::protocol::messages::{self, ProtocolVersion};
use crate::protocol::FramedChannel;

/// Handshake progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    /// Opening the transport session.
    Connecting,
    /// Waiting for the device's version exchange message.
    AwaitingVersion,
    /// Comparing the version the device offered.
    VersionCheck(ProtocolVersion),
    /// Acknowledging the version.
    SendingAck,
    /// Waiting for `DLMessageDeviceReady`.
    AwaitingReady,
    /// Handshake complete.
    Ready,
    /// Handshake aborted.
    Failed,
}

impl HandshakeState {
    /// Whether the handshake has finished, successfully or not.
    pub fn is_terminal(self) -> bool {
        matches!(self, HandshakeState::Ready | HandshakeState::Failed)
    }
}

/// Driver for one handshake.
#[derive(Debug)]
pub struct Handshake {
    expected: ProtocolVersion,
    state: HandshakeState,
}

impl Handshake {
    /// Start a handshake that accepts only `expected`.
    pub fn new(expected: ProtocolVersion) -> Self {
        Self {
            expected,
            state: HandshakeState::Connecting,
        }
    }

    /// Current state.
    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// Record the outcome of opening the transport.
    pub fn connected(&mut self, ok: bool) {
        debug_assert_eq!(self.state, HandshakeState::Connecting);
        self.transition(if ok {
            HandshakeState::AwaitingVersion
        } else {
            HandshakeState::Failed
        });
    }

    /// Drive the handshake over `channel` until it reaches a terminal state.
    ///
    /// Returns the error of the failing step; transport and decode errors pass
    /// through unchanged, shape and version mismatches become
    /// [`SyncError::Protocol`]. The channel is left open either way.
    pub async fn run<S>(&mut self, channel: &mut FramedChannel<S>) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        let mut failure = None;

        while !self.state.is_terminal() {
            match self.step(channel).await {
                Ok(next) => self.transition(next),
                Err(e) => {
                    tracing::debug!(state = ?self.state, error = %e, "handshake step failed");
                    failure = Some(e);
                    self.transition(HandshakeState::Failed);
                }
            }
        }

        match self.state {
            HandshakeState::Ready => Ok(()),
            _ => Err(failure.unwrap_or(SyncError::Unknown)),
        }
    }

    async fn step<S>(&self, channel: &mut FramedChannel<S>) -> Result<HandshakeState>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        match self.state {
            HandshakeState::AwaitingVersion => {
                let msg = channel.receive_frame().await?;
                let offered = messages::parse_version_exchange(&msg).ok_or_else(|| {
                    SyncError::protocol(format!(
                        "expected {} with two unsigned integers",
                        messages::VERSION_EXCHANGE
                    ))
                })?;
                Ok(HandshakeState::VersionCheck(offered))
            }
            HandshakeState::VersionCheck(offered) => {
                if offered != self.expected {
                    return Err(SyncError::protocol(format!(
                        "device speaks version {}, expected {}",
                        offered, self.expected
                    )));
                }
                Ok(HandshakeState::SendingAck)
            }
            HandshakeState::SendingAck => {
                channel.send_frame(&messages::version_ok()).await?;
                Ok(HandshakeState::AwaitingReady)
            }
            HandshakeState::AwaitingReady => {
                let msg = channel.receive_frame().await?;
                if !messages::contains_string(&msg, messages::DEVICE_READY) {
                    return Err(SyncError::protocol(format!(
                        "expected {}",
                        messages::DEVICE_READY
                    )));
                }
                Ok(HandshakeState::Ready)
            }
            // Connecting is resolved by `connected`; terminal states never step.
            state => Err(SyncError::protocol(format!(
                "handshake cannot advance from {:?}",
                state
            ))),
        }
    }

    fn transition(&mut self, next: HandshakeState) {
        tracing::debug!(from = ?self.state, to = ?next, "handshake transition");
        self.state = next;
    }
}
