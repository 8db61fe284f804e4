//! Serialized line sinks
//!
//! Every console write in the monitor goes through a [`LineSink`]. A sink
//! guarantees that a single line is written as one unit, so lines from
//! concurrent callers never interleave mid-line.
//!
//! - **StreamSink**: wraps any `Write` (stdout, stderr, files) behind a mutex
//! - **MemorySink**: captures lines in memory, for tests and embedding

use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard};

/// A text sink with a single synchronized write operation.
pub trait LineSink: Send + Sync {
    /// Write `line` followed by a newline.
    fn write_line(&self, line: &str) -> io::Result<()>;
}

fn poisoned<T>(_: T) -> io::Error {
    io::Error::other("sink lock poisoned")
}

/// Line sink over an arbitrary writer.
pub struct StreamSink<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> StreamSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(poisoned)
    }
}

impl StreamSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl StreamSink<io::Stderr> {
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl<W: Write + Send> LineSink for StreamSink<W> {
    fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self.writer.lock().map_err(poisoned)?;
        writeln!(writer, "{line}")?;
        writer.flush()
    }
}

/// Line sink that keeps everything it receives.
///
/// Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, Vec<String>> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Copy of all lines written so far.
    pub fn lines(&self) -> Vec<String> {
        self.buffer().clone()
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
}

impl LineSink for MemorySink {
    fn write_line(&self, line: &str) -> io::Result<()> {
        self.buffer().push(line.to_string());
        Ok(())
    }
}
