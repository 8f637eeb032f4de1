//! Output sinks for rendered text.
//!
//! Compiled root routines emit text chunks synchronously and in document
//! order; the sink decides where they go:
//! - Buffer: collected into a string (the `render` convenience path)
//! - Callback: forwarded to a host-supplied function (streaming hosts)
//! - Null: discarded (template import evaluates for exports only)
//!
//! # Performance
//! Uses enum dispatch instead of trait objects for O(1) static dispatch
//! on this frequently-used path.

use parking_lot::Mutex;
use std::sync::Arc;

/// Sink that collects chunks into a buffer.
pub struct BufferSink {
    buffer: Mutex<String>,
}

impl BufferSink {
    /// Create a new empty buffer sink.
    pub fn new() -> Self {
        BufferSink {
            buffer: Mutex::new(String::new()),
        }
    }

    /// Append a chunk.
    pub fn write(&self, chunk: &str) {
        self.buffer.lock().push_str(chunk);
    }

    /// Get all collected output.
    pub fn contents(&self) -> String {
        self.buffer.lock().clone()
    }

    /// Clear collected output.
    pub fn clear(&self) {
        self.buffer.lock().clear();
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Output sink implementation using enum dispatch.
pub enum SinkImpl {
    /// Collects chunks into a buffer.
    Buffer(BufferSink),
    /// Forwards each chunk to a host-supplied function.
    Callback(Box<dyn Fn(&str) + Send + Sync>),
    /// Discards all output silently (template import).
    Null,
}

impl SinkImpl {
    /// Consume one chunk of rendered text.
    pub fn write(&self, chunk: &str) {
        match self {
            Self::Buffer(sink) => sink.write(chunk),
            Self::Callback(func) => func(chunk),
            Self::Null => {}
        }
    }

    /// Get all collected output.
    ///
    /// Returns the empty string for sinks that don't collect.
    pub fn contents(&self) -> String {
        match self {
            Self::Buffer(sink) => sink.contents(),
            Self::Callback(_) | Self::Null => String::new(),
        }
    }

    /// Clear collected output. No-op for sinks that don't collect.
    pub fn clear(&self) {
        if let Self::Buffer(sink) = self {
            sink.clear();
        }
    }
}

/// Shared output sink handle threaded through render states.
pub type SharedSink = Arc<SinkImpl>;

/// Create a buffer sink for collecting output.
pub fn buffer_sink() -> SharedSink {
    Arc::new(SinkImpl::Buffer(BufferSink::new()))
}

/// Create a sink that forwards each chunk to `func`.
pub fn callback_sink(func: impl Fn(&str) + Send + Sync + 'static) -> SharedSink {
    Arc::new(SinkImpl::Callback(Box::new(func)))
}

/// Create a sink that discards all output.
pub fn null_sink() -> SharedSink {
    Arc::new(SinkImpl::Null)
}
