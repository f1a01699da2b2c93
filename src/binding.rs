use serde::{Deserialize, Serialize};

use crate::error::SqlAppenderError;
use crate::event::LogEvent;
use crate::value::{json_to_sql_value, SqlValue};

/// Which part of a log event a parameter draws its value from.
///
/// In configuration these are written as plain strings: `"message"`,
/// `"level"`, `"level_number"`, `"logger"`, `"timestamp"`,
/// `"exception"`, or `"property:<key>"` for a contextual property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueSource {
    Timestamp,
    Level,
    LevelNumber,
    Logger,
    Message,
    Exception,
    Property(String),
}

impl ValueSource {
    /// Resolve this source against one event.
    ///
    /// An absent exception or a missing property resolves to NULL
    /// rather than failing; the column has to tolerate it.
    pub fn resolve(&self, event: &LogEvent) -> SqlValue {
        match self {
            ValueSource::Timestamp => SqlValue::Timestamp(event.timestamp),
            ValueSource::Level => SqlValue::Text(event.level.as_str().to_string()),
            ValueSource::LevelNumber => SqlValue::Int(event.level.severity()),
            ValueSource::Logger => SqlValue::Text(event.logger.clone()),
            ValueSource::Message => SqlValue::Text(event.message.clone()),
            ValueSource::Exception => event
                .exception
                .as_ref()
                .map_or(SqlValue::Null, |e| SqlValue::Text(e.clone())),
            ValueSource::Property(key) => event
                .properties
                .get(key)
                .map_or(SqlValue::Null, json_to_sql_value),
        }
    }
}

impl std::str::FromStr for ValueSource {
    type Err = SqlAppenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "timestamp" => Ok(ValueSource::Timestamp),
            "level" => Ok(ValueSource::Level),
            "level_number" => Ok(ValueSource::LevelNumber),
            "logger" => Ok(ValueSource::Logger),
            "message" => Ok(ValueSource::Message),
            "exception" => Ok(ValueSource::Exception),
            other => match other.strip_prefix("property:") {
                Some(key) if !key.is_empty() => Ok(ValueSource::Property(key.to_string())),
                _ => Err(SqlAppenderError::ConfigError(format!(
                    "unknown value source: {other}"
                ))),
            },
        }
    }
}

impl TryFrom<String> for ValueSource {
    type Error = SqlAppenderError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ValueSource> for String {
    fn from(source: ValueSource) -> Self {
        match source {
            ValueSource::Timestamp => "timestamp".to_string(),
            ValueSource::Level => "level".to_string(),
            ValueSource::LevelNumber => "level_number".to_string(),
            ValueSource::Logger => "logger".to_string(),
            ValueSource::Message => "message".to_string(),
            ValueSource::Exception => "exception".to_string(),
            ValueSource::Property(key) => format!("property:{key}"),
        }
    }
}

/// One configured parameter slot of the command template.
///
/// Bindings are an ordered sequence, configured once before the first
/// send and reused unchanged for every event in every batch. The name
/// matches a `@name` placeholder in the template (the leading `@` is
/// optional in configuration).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterBinding {
    /// Placeholder name, e.g. `@message`.
    pub name: String,
    /// Where the value comes from.
    pub source: ValueSource,
    /// Maximum length for text values; longer text is truncated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
}

impl ParameterBinding {
    pub fn new(name: impl Into<String>, source: ValueSource) -> Self {
        Self {
            name: name.into(),
            source,
            size: None,
        }
    }

    #[must_use]
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Placeholder name without the leading `@`, for matching against
    /// template placeholders.
    pub(crate) fn bare_name(&self) -> &str {
        self.name.strip_prefix('@').unwrap_or(&self.name)
    }

    /// Compute this parameter's value for one event.
    pub fn resolve(&self, event: &LogEvent) -> SqlValue {
        let value = self.source.resolve(event);
        match (self.size, value) {
            (Some(max), SqlValue::Text(s)) => SqlValue::Text(truncate_chars(s, max)),
            (_, value) => value,
        }
    }
}

/// Truncate at a character boundary, never mid code point.
fn truncate_chars(s: String, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Level;
    use serde_json::json;

    fn sample_event() -> LogEvent {
        LogEvent::new(Level::Error, "app.core", "boom")
            .with_exception("stack trace here")
            .with_property("user_id", 42)
            .with_property("tags", json!(["a", "b"]))
    }

    #[test]
    fn sources_resolve_event_fields() {
        let event = sample_event();
        assert_eq!(
            ValueSource::Message.resolve(&event),
            SqlValue::Text("boom".into())
        );
        assert_eq!(
            ValueSource::Level.resolve(&event),
            SqlValue::Text("ERROR".into())
        );
        assert_eq!(
            ValueSource::LevelNumber.resolve(&event),
            SqlValue::Int(70_000)
        );
        assert_eq!(
            ValueSource::Property("user_id".into()).resolve(&event),
            SqlValue::Int(42)
        );
        assert_eq!(
            ValueSource::Property("missing".into()).resolve(&event),
            SqlValue::Null
        );
        assert_eq!(
            ValueSource::Property("tags".into()).resolve(&event),
            SqlValue::Json(json!(["a", "b"]))
        );
    }

    #[test]
    fn absent_exception_is_null() {
        let event = LogEvent::new(Level::Info, "app", "fine");
        assert_eq!(ValueSource::Exception.resolve(&event), SqlValue::Null);
    }

    #[test]
    fn size_truncates_text_only() {
        let event = sample_event();
        let binding = ParameterBinding::new("@msg", ValueSource::Message).with_size(2);
        assert_eq!(binding.resolve(&event), SqlValue::Text("bo".into()));

        let binding = ParameterBinding::new("@lvl", ValueSource::LevelNumber).with_size(2);
        assert_eq!(binding.resolve(&event), SqlValue::Int(70_000));
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo".to_string(), 2), "hé");
        assert_eq!(truncate_chars("ab".to_string(), 5), "ab");
    }

    #[test]
    fn source_string_round_trip() {
        for s in [
            "timestamp",
            "level",
            "level_number",
            "logger",
            "message",
            "exception",
            "property:request_id",
        ] {
            let parsed: ValueSource = s.parse().unwrap();
            assert_eq!(String::from(parsed), s);
        }
        assert!("property:".parse::<ValueSource>().is_err());
        assert!("msg".parse::<ValueSource>().is_err());
    }
}
