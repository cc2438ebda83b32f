//! Script console output.
//!
//! Scripts never write to the host's stdout. Everything they log lands in a
//! [`LogSink`] handed to the runner, and is mirrored to the `log` facade under
//! the `script` target.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    Log,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn name(self) -> &'static str {
        match self {
            LogLevel::Log => "log",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<LogLevel> for log::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Log | LogLevel::Info => log::Level::Info,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Error => log::Level::Error,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: u64,
}

impl LogEntry {
    pub fn now(level: LogLevel, message: impl Into<String>) -> Self {
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            level,
            message: message.into(),
            timestamp_ms,
        }
    }
}

/// Append-only consumer of script console entries.
pub trait LogSink {
    fn record(&self, entry: &LogEntry);
}

/// Record `entry` in `sink` and mirror it to the `log` facade.
pub(crate) fn emit(sink: &dyn LogSink, level: LogLevel, message: impl Into<String>) {
    let entry = LogEntry::now(level, message);
    log::log!(target: "script", level.into(), "{}", entry.message);
    sink.record(&entry);
}

/// In-memory ring of the most recent entries.
#[derive(Debug)]
pub struct ConsoleBuffer {
    entries: RefCell<VecDeque<LogEntry>>,
    capacity: usize,
}

impl ConsoleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: RefCell::new(VecDeque::with_capacity(capacity.min(1024))),
            capacity: capacity.max(1),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.borrow().iter().cloned().collect()
    }

    pub fn messages(&self, level: LogLevel) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|e| e.level == level)
            .map(|e| e.message.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl Default for ConsoleBuffer {
    fn default() -> Self {
        Self::new(200)
    }
}

impl LogSink for ConsoleBuffer {
    fn record(&self, entry: &LogEntry) {
        let mut entries = self.entries.borrow_mut();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_drops_oldest() {
        let buffer = ConsoleBuffer::new(2);
        for message in ["a", "b", "c"] {
            emit(&buffer, LogLevel::Log, message);
        }
        let messages: Vec<_> = buffer.entries().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, ["b", "c"]);

        buffer.clear();
        assert!(buffer.is_empty());
    }
}
