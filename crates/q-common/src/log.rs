// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 Qbitel Inc.

//! Circular log buffer
//!
//! A small, no_std log sink: records are kept in a fixed-capacity ring and
//! the oldest record is evicted when the ring is full. Key material must
//! never be logged.

use core::fmt::{self, Write};
use heapless::{Deque, String};

/// Maximum length of a formatted log message
pub const MAX_MESSAGE_LEN: usize = 96;

/// Number of records the buffer retains
pub const LOG_CAPACITY: usize = 16;

/// Log severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    /// Failures that were surfaced to a caller
    Error = 0,
    /// Suspicious but recoverable conditions
    Warn = 1,
    /// Lifecycle events
    Info = 2,
    /// Development detail
    Debug = 3,
}

impl LogLevel {
    /// Level name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so the record format's width specifier applies
        f.pad(self.as_str())
    }
}

/// One recorded log message
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Severity
    pub level: LogLevel,
    /// Monotonic sequence number assigned by the buffer
    pub seq: u32,
    /// Originating module
    pub module: &'static str,
    /// Formatted message, truncated to [`MAX_MESSAGE_LEN`]
    pub message: String<MAX_MESSAGE_LEN>,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:06} {:5} [{}] {}",
            self.seq, self.level, self.module, self.message
        )
    }
}

/// Writer that keeps the prefix fitting the message buffer and drops the
/// rest, since `heapless::String` rejects an oversized write outright
struct TruncatingWriter<'a> {
    out: &'a mut String<MAX_MESSAGE_LEN>,
    full: bool,
}

impl fmt::Write for TruncatingWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.full {
            return Ok(());
        }
        for c in s.chars() {
            // push fails on the first char that no longer fits; stop there
            // so the kept prefix stays contiguous
            if self.out.push(c).is_err() {
                self.full = true;
                break;
            }
        }
        Ok(())
    }
}

/// Fixed-capacity circular log buffer
pub struct LogBuffer {
    records: Deque<LogRecord, LOG_CAPACITY>,
    next_seq: u32,
    min_level: LogLevel,
}

impl LogBuffer {
    /// Create an empty buffer recording `Info` and above
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Deque::new(),
            next_seq: 0,
            min_level: LogLevel::Info,
        }
    }

    /// Set the minimum recorded level
    pub fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }

    /// Check whether a level passes the filter
    #[must_use]
    pub fn should_log(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    /// Format and record a message, evicting the oldest record if full
    pub fn log(&mut self, level: LogLevel, module: &'static str, args: fmt::Arguments<'_>) {
        if !self.should_log(level) {
            return;
        }

        let mut message = String::new();
        let mut writer = TruncatingWriter {
            out: &mut message,
            full: false,
        };
        // Cannot fail: the writer absorbs overflow by truncating
        let _ = writer.write_fmt(args);

        if self.records.is_full() {
            self.records.pop_front();
        }
        let record = LogRecord {
            level,
            seq: self.next_seq,
            module,
            message,
        };
        self.next_seq = self.next_seq.wrapping_add(1);
        // Cannot fail: a slot was freed above if needed
        let _ = self.records.push_back(record);
    }

    /// Number of retained records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if the buffer holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop all records
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Iterate records, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &LogRecord> {
        self.records.iter()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Record an error-level message
#[macro_export]
macro_rules! log_error {
    ($buf:expr, $module:expr, $($arg:tt)*) => {
        $buf.log($crate::log::LogLevel::Error, $module, format_args!($($arg)*))
    };
}

/// Record a warning-level message
#[macro_export]
macro_rules! log_warn {
    ($buf:expr, $module:expr, $($arg:tt)*) => {
        $buf.log($crate::log::LogLevel::Warn, $module, format_args!($($arg)*))
    };
}

/// Record an info-level message
#[macro_export]
macro_rules! log_info {
    ($buf:expr, $module:expr, $($arg:tt)*) => {
        $buf.log($crate::log::LogLevel::Info, $module, format_args!($($arg)*))
    };
}

/// Record a debug-level message
#[macro_export]
macro_rules! log_debug {
    ($buf:expr, $module:expr, $($arg:tt)*) => {
        $buf.log($crate::log::LogLevel::Debug, $module, format_args!($($arg)*))
    };
}
