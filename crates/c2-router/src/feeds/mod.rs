//! System log feed for the operator console
//!
//! Newest entry first, bounded by a retention limit. The dashboard shows a
//! short recent window of it.

use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use tacmesh_core::{current_timestamp_ms, time::format_clock};

/// Log entry level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Routine operation
    Info,
    /// Degraded state or rejected command
    Warning,
}

/// One line of the system log
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemLogEntry {
    /// Unix epoch milliseconds
    pub timestamp_ms: u64,
    pub level: LogLevel,
    pub message: String,
}

impl SystemLogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp_ms: current_timestamp_ms(),
            level,
            message: message.into(),
        }
    }
}

impl fmt::Display for SystemLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_clock(self.timestamp_ms), self.message)
    }
}

/// Bounded, newest-first log buffer
#[derive(Debug, Clone)]
pub struct SystemLog {
    entries: VecDeque<SystemLogEntry>,
    retention: usize,
}

impl Default for SystemLog {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RETENTION)
    }
}

impl SystemLog {
    pub const DEFAULT_RETENTION: usize = 100;

    /// Create a log keeping at most `retention` entries (minimum one)
    pub fn new(retention: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            retention: retention.max(1),
        }
    }

    pub fn push(&mut self, entry: SystemLogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.retention);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(SystemLogEntry::new(LogLevel::Info, message));
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(SystemLogEntry::new(LogLevel::Warning, message));
    }

    /// Up to `count` entries, newest first
    pub fn recent(&self, count: usize) -> Vec<SystemLogEntry> {
        self.entries.iter().take(count).cloned().collect()
    }

    /// Most recent entry
    pub fn latest(&self) -> Option<&SystemLogEntry> {
        self.entries.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SystemLogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn retention(&self) -> usize {
        self.retention
    }
}
