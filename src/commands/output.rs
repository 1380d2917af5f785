//! Line output for the evaluator.
//!
//! Every print goes through [`OutputSink::line`], which holds the writer lock
//! for exactly one line, so concurrent producers can never interleave partial
//! lines.

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

/// A mutex-guarded line writer.
pub struct OutputSink {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl OutputSink {
    /// Wraps an arbitrary writer.
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            writer: Mutex::new(Box::new(writer)),
        }
    }

    /// Writes to standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Writes one line and flushes. Write failures are logged, not raised.
    pub fn line(&self, text: &str) {
        let mut writer = self.lock();
        if let Err(e) = writeln!(writer, "{text}").and_then(|_| writer.flush()) {
            warn!("Failed to write output line: {e}");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn Write + Send>> {
        // A panic while printing leaves the writer usable.
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// In-memory writer that can be read back, for capturing output.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Everything written so far, split into lines.
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(String::from).collect()
    }

    /// Discards everything written so far.
    pub fn clear(&self) {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_written_in_order() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::new(buffer.clone());
        sink.line("first");
        sink.line("second");
        assert_eq!(buffer.lines(), vec!["first", "second"]);
    }

    #[test]
    fn test_concurrent_lines_do_not_interleave() {
        let buffer = SharedBuffer::new();
        let sink = Arc::new(OutputSink::new(buffer.clone()));

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let sink = Arc::clone(&sink);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        sink.line(&format!("worker-{n}-{}", "x".repeat(64)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let lines = buffer.lines();
        assert_eq!(lines.len(), 200);
        assert!(lines
            .iter()
            .all(|l| l.starts_with("worker-") && l.ends_with(&"x".repeat(64))));
    }

    #[test]
    fn test_clear() {
        let buffer = SharedBuffer::new();
        let sink = OutputSink::new(buffer.clone());
        sink.line("gone");
        buffer.clear();
        assert!(buffer.contents().is_empty());
    }
}
