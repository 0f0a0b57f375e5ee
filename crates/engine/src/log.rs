#![forbid(unsafe_code)]

use chrono::{DateTime, Local};
use std::fmt;
use std::time::SystemTime;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Critical,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARNING"),
            LogLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = DateTime::<Local>::from(self.timestamp).format("%H:%M:%S");
        write!(f, "[{at}] [{}] {}", self.level, self.message)
    }
}

/// Append-only session log of everything the engine did. Entries are also
/// mirrored to `tracing` so the daemon's structured output carries them.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LogEntry>,
}

impl EventLog {
    pub fn append(&mut self, timestamp: SystemTime, level: LogLevel, message: impl Into<String>) {
        let message = message.into();
        match level {
            LogLevel::Info => info!("{message}"),
            LogLevel::Warning => warn!("{message}"),
            LogLevel::Critical => error!("{message}"),
        }
        self.entries.push(LogEntry {
            timestamp,
            level,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    #[test]
    fn entries_accumulate_in_order() {
        let mut log = EventLog::default();
        log.append(UNIX_EPOCH, LogLevel::Info, "first");
        log.append(UNIX_EPOCH, LogLevel::Critical, "second");

        let messages: Vec<_> = log.entries().iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second"]);
        assert_eq!(log.entries()[1].level, LogLevel::Critical);
    }
}
