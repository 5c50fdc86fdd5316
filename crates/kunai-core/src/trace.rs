//! Line-oriented wire trace sinks.
//!
//! When a [`TraceSink`] is configured the exchange pipeline writes the
//! request line, headers and bodies it sends, and the status, headers and
//! bodies it receives, one line at a time.

use std::fmt;
use std::sync::{Mutex, MutexGuard};

/// Receives wire trace lines.
pub trait TraceSink: Send + Sync {
    /// Writes a single line (without trailing newline).
    fn write_line(&self, line: &str);
}

/// Forwards trace lines to `tracing` at debug level under the `kunai::wire` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn write_line(&self, line: &str) {
        tracing::debug!(target: "kunai::wire", "{line}");
    }
}

/// Collects trace lines in memory.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the collected lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.lock().clone()
    }

    /// Returns whether any collected line contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.lock().iter().any(|line| line.contains(needle))
    }

    /// Locks the line buffer and recovers from poisoning.
    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        match self.lines.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.lines.clear_poison();
                poisoned.into_inner()
            }
        }
    }
}

impl TraceSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lock().push(line.to_owned());
    }
}

impl fmt::Debug for MemorySink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySink")
            .field("lines", &self.lock().len())
            .finish()
    }
}
