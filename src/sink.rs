//! Output sinks
//!
//! Every component writes through a [`Sink`] instead of touching stdout
//! directly. [`StdoutSink`] is the real terminal, [`CaptureSink`] records
//! writes so tests can assert on the exact escape sequences.

use log::warn;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, PoisonError};

/// Destination for rendered lines. Write failures are the sink's problem:
/// an animation must never take the host process down.
pub trait Sink: Send + Sync {
    fn write(&self, chunk: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl StdoutSink {
    pub fn new() -> Self {
        StdoutSink
    }
}

impl Sink for StdoutSink {
    fn write(&self, chunk: &str) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = stdout
            .write_all(chunk.as_bytes())
            .and_then(|()| stdout.flush())
        {
            warn!("Failed to write to stdout: {}", e);
        }
    }
}

/// Records every write. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct CaptureSink {
    writes: Arc<Mutex<Vec<String>>>,
}

impl CaptureSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Individual writes, in order.
    pub fn writes(&self) -> Vec<String> {
        self.buffer().clone()
    }

    /// All writes concatenated.
    pub fn contents(&self) -> String {
        self.buffer().concat()
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    pub fn clear(&self) {
        self.buffer().clear();
    }

    fn buffer(&self) -> std::sync::MutexGuard<'_, Vec<String>> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Sink for CaptureSink {
    fn write(&self, chunk: &str) {
        self.buffer().push(chunk.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_sink_records_writes_in_order() {
        let sink = CaptureSink::new();
        assert!(sink.is_empty());

        sink.write("one");
        sink.write("two");

        assert_eq!(sink.writes(), vec!["one".to_string(), "two".to_string()]);
        assert_eq!(sink.contents(), "onetwo");
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_capture_sink_clones_share_buffer() {
        let sink = CaptureSink::new();
        let clone = sink.clone();

        clone.write("shared");
        assert_eq!(sink.contents(), "shared");

        sink.clear();
        assert!(clone.is_empty());
    }
}
