//! Diagnostic log sink for message dumps.
//!
//! Every frame sent or received is rendered as XML and handed to a
//! [`DiagnosticSink`]. The sink is injected through the client builder
//! rather than reached through a global, so tests can capture or silence it.
//! Recording is best effort; a sink has no way to fail the caller.

use std::sync::Arc;

/// Category under which MobileSync message dumps are recorded.
pub const MOBILESYNC_CATEGORY: &str = "mobilesync";

/// Receiver of free-form diagnostic records.
pub trait DiagnosticSink: Send + Sync {
    /// Record one entry. Implementations must not panic.
    fn record(&self, category: &str, text: &str);
}

/// Default sink: forwards records to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, category: &str, text: &str) {
        tracing::debug!(target: "mobilesync", category, "{}", text);
    }
}

/// Sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _category: &str, _text: &str) {}
}

/// Shared handle to a sink, cloned into each channel.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// The sink used when the builder is not given one.
pub fn default_sink() -> SharedSink {
    Arc::new(TracingSink)
}
