use crate::error::SqlAppenderError;
use crate::event::LogEvent;
use crate::value::json_to_sql_value;
use crate::value::SqlValue;

const DEFAULT_TIMESTAMP_FORMAT: &str = "%F %T%.3f";

/// Pattern layout that renders one log event into one complete SQL
/// statement.
///
/// Recognized tokens: `%message`, `%level`, `%level_number`, `%logger`,
/// `%timestamp` (or `%timestamp{fmt}` with a chrono format string),
/// `%exception`, `%property{key}`, and `%%` for a literal percent sign.
/// Everything else is literal text.
///
/// Substituted text has embedded single quotes doubled, so tokens can
/// sit inside SQL string literals:
///
/// ```
/// use sql_appender::{Level, LogEvent, SqlLayout};
///
/// let layout =
///     SqlLayout::parse("INSERT INTO log(msg) VALUES ('%message')").unwrap();
/// let event = LogEvent::new(Level::Info, "app", "it's fine");
/// assert_eq!(
///     layout.render(&event),
///     "INSERT INTO log(msg) VALUES ('it''s fine')"
/// );
/// ```
///
/// This escaping is the extent of the crate's protection on the
/// rendered path; prefer the parameterized template where the message
/// content is not trusted.
#[derive(Debug, Clone, PartialEq)]
pub struct SqlLayout {
    chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq)]
enum Chunk {
    Literal(String),
    Message,
    Level,
    LevelNumber,
    Logger,
    Exception,
    Timestamp(Option<String>),
    Property(String),
}

impl SqlLayout {
    /// Parse a pattern into a layout.
    ///
    /// # Errors
    ///
    /// Returns `SqlAppenderError::ConfigError` for an unknown token or
    /// an unterminated `{...}` argument.
    pub fn parse(pattern: &str) -> Result<Self, SqlAppenderError> {
        let mut chunks = Vec::new();
        let mut literal = String::new();
        let mut chars = pattern.char_indices().peekable();

        while let Some((_, c)) = chars.next() {
            if c != '%' {
                literal.push(c);
                continue;
            }
            if let Some((_, '%')) = chars.peek() {
                chars.next();
                literal.push('%');
                continue;
            }

            let mut ident = String::new();
            while let Some((_, c)) = chars.peek() {
                if c.is_ascii_lowercase() || *c == '_' {
                    ident.push(*c);
                    chars.next();
                } else {
                    break;
                }
            }

            let arg = if let Some((_, '{')) = chars.peek() {
                chars.next();
                let mut arg = String::new();
                let mut closed = false;
                for (_, c) in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    arg.push(c);
                }
                if !closed {
                    return Err(SqlAppenderError::ConfigError(format!(
                        "unterminated argument after %{ident} in layout pattern"
                    )));
                }
                Some(arg)
            } else {
                None
            };

            let chunk = match (ident.as_str(), arg) {
                ("message", None) => Chunk::Message,
                ("level", None) => Chunk::Level,
                ("level_number", None) => Chunk::LevelNumber,
                ("logger", None) => Chunk::Logger,
                ("exception", None) => Chunk::Exception,
                ("timestamp", arg) => Chunk::Timestamp(arg),
                ("property", Some(key)) if !key.is_empty() => Chunk::Property(key),
                ("property", _) => {
                    return Err(SqlAppenderError::ConfigError(
                        "%property requires a {key} argument".to_string(),
                    ));
                }
                (other, _) => {
                    return Err(SqlAppenderError::ConfigError(format!(
                        "unknown layout token %{other}"
                    )));
                }
            };

            if !literal.is_empty() {
                chunks.push(Chunk::Literal(std::mem::take(&mut literal)));
            }
            chunks.push(chunk);
        }

        if !literal.is_empty() {
            chunks.push(Chunk::Literal(literal));
        }

        Ok(Self { chunks })
    }

    /// Render one event into a SQL statement string.
    ///
    /// Absent exceptions and missing properties render as empty text.
    pub fn render(&self, event: &LogEvent) -> String {
        let mut out = String::new();
        for chunk in &self.chunks {
            match chunk {
                Chunk::Literal(text) => out.push_str(text),
                Chunk::Message => push_escaped(&mut out, &event.message),
                Chunk::Level => out.push_str(event.level.as_str()),
                Chunk::LevelNumber => out.push_str(&event.level.severity().to_string()),
                Chunk::Logger => push_escaped(&mut out, &event.logger),
                Chunk::Exception => {
                    if let Some(exception) = &event.exception {
                        push_escaped(&mut out, exception);
                    }
                }
                Chunk::Timestamp(format) => {
                    let format = format.as_deref().unwrap_or(DEFAULT_TIMESTAMP_FORMAT);
                    push_escaped(&mut out, &event.timestamp.format(format).to_string());
                }
                Chunk::Property(key) => {
                    if let Some(value) = event.properties.get(key) {
                        match json_to_sql_value(value) {
                            SqlValue::Text(s) => push_escaped(&mut out, &s),
                            SqlValue::Int(i) => out.push_str(&i.to_string()),
                            SqlValue::Float(f) => out.push_str(&f.to_string()),
                            SqlValue::Bool(b) => out.push_str(if b { "1" } else { "0" }),
                            SqlValue::Json(j) => push_escaped(&mut out, &j.to_string()),
                            _ => {}
                        }
                    }
                }
            }
        }
        out
    }
}

/// Double embedded single quotes so the substitution stays inside one
/// SQL string literal.
fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
}
