use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Severity of a log event.
///
/// The numeric values follow the convention of hierarchical logging
/// frameworks: coarse bands with room between them so hosts can slot
/// custom levels in without renumbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl Level {
    /// Level name as rendered into SQL text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }

    /// Numeric severity for the `level_number` value source.
    pub fn severity(&self) -> i64 {
        match self {
            Level::Trace => 20_000,
            Level::Debug => 30_000,
            Level::Info => 40_000,
            Level::Warn => 60_000,
            Level::Error => 70_000,
            Level::Fatal => 110_000,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An immutable log record produced by the host framework.
///
/// The appender only reads events; it never mutates or retains them
/// past the end of a send.
#[derive(Debug, Clone)]
pub struct LogEvent {
    /// Event time, UTC.
    pub timestamp: NaiveDateTime,
    /// Severity level.
    pub level: Level,
    /// Name of the logger that emitted the event.
    pub logger: String,
    /// Rendered message text.
    pub message: String,
    /// Exception/error text attached to the event, if any.
    pub exception: Option<String>,
    /// Contextual properties (MDC-style key/value pairs).
    pub properties: HashMap<String, JsonValue>,
}

impl LogEvent {
    /// Create an event stamped with the current UTC time.
    pub fn new(level: Level, logger: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now().naive_utc(),
            level,
            logger: logger.into(),
            message: message.into(),
            exception: None,
            properties: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_exception(mut self, exception: impl Into<String>) -> Self {
        self.exception = Some(exception.into());
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_is_monotonic() {
        let levels = [
            Level::Trace,
            Level::Debug,
            Level::Info,
            Level::Warn,
            Level::Error,
            Level::Fatal,
        ];
        for pair in levels.windows(2) {
            assert!(pair[0].severity() < pair[1].severity());
        }
    }

    #[test]
    fn builder_attaches_context() {
        let event = LogEvent::new(Level::Warn, "app.db", "slow query")
            .with_exception("timeout")
            .with_property("elapsed_ms", 1503);
        assert_eq!(event.level.as_str(), "WARN");
        assert_eq!(event.exception.as_deref(), Some("timeout"));
        assert_eq!(event.properties["elapsed_ms"], 1503);
    }
}
