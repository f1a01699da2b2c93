use std::fmt::Write;

use deadpool_sqlite::rusqlite;

use crate::command::CommandKind;
use crate::error::SqlAppenderError;
use crate::event::LogEvent;
use crate::sender::BufferedEventSender;
use crate::value::SqlValue;

/// Convert a single appender value to a rusqlite `Value`.
///
/// Timestamps are stored as `%F %T%.f` text, booleans as integers, and
/// JSON as its serialized text, matching SQLite's dynamic typing.
#[must_use]
pub fn value_to_sqlite(value: &SqlValue) -> rusqlite::types::Value {
    match value {
        SqlValue::Int(i) => rusqlite::types::Value::Integer(*i),
        SqlValue::Float(f) => rusqlite::types::Value::Real(*f),
        SqlValue::Text(s) => rusqlite::types::Value::Text(s.clone()),
        SqlValue::Bool(b) => rusqlite::types::Value::Integer(i64::from(*b)),
        SqlValue::Timestamp(dt) => {
            let mut formatted = String::with_capacity(32);
            // format into the buffer; writing to a String cannot fail
            let _ = write!(formatted, "{}", dt.format("%F %T%.f"));
            rusqlite::types::Value::Text(formatted)
        }
        SqlValue::Null => rusqlite::types::Value::Null,
        SqlValue::Json(jval) => rusqlite::types::Value::Text(jval.to_string()),
        SqlValue::Blob(bytes) => rusqlite::types::Value::Blob(bytes.clone()),
    }
}

/// Send a batch of events over a SQLite connection.
///
/// rusqlite is synchronous; async hosts run this inside the pool's
/// `interact` closure. Passing a `rusqlite::Transaction` (which derefs
/// to `Connection`) joins the caller's transaction; the function never
/// commits or rolls back. One statement execution per event, in input
/// order, stopping at the first failure. Row counts are ignored.
///
/// # Errors
///
/// Returns `SqlAppenderError::SqliteError` for any prepare or execute
/// failure, and `SqlAppenderError::Unimplemented` for stored procedure
/// commands, which SQLite has no equivalent of.
pub fn send_batch(
    conn: &rusqlite::Connection,
    sender: &BufferedEventSender,
    events: &[LogEvent],
) -> Result<(), SqlAppenderError> {
    match sender.prepared_template() {
        Some(template) => {
            if sender.command_kind() == CommandKind::StoredProcedure {
                return Err(SqlAppenderError::Unimplemented(
                    "stored procedure commands are not supported on SQLite".to_string(),
                ));
            }
            let mut stmt = conn.prepare(&template.sqlite_sql)?;
            for event in events {
                let values: Vec<rusqlite::types::Value> = sender
                    .resolve_ordered(event)
                    .iter()
                    .map(value_to_sqlite)
                    .collect();
                stmt.execute(rusqlite::params_from_iter(values))?;
            }
        }
        None => {
            let layout = sender.layout().ok_or_else(|| {
                SqlAppenderError::ConfigError("no layout configured".to_string())
            })?;
            for event in events {
                let sql = layout.render(event);
                conn.execute(&sql, [])?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn conversions_match_sqlite_dynamic_typing() {
        assert_eq!(
            value_to_sqlite(&SqlValue::Bool(true)),
            rusqlite::types::Value::Integer(1)
        );
        assert_eq!(
            value_to_sqlite(&SqlValue::Null),
            rusqlite::types::Value::Null
        );
        assert_eq!(
            value_to_sqlite(&SqlValue::Json(json!({"k": 1}))),
            rusqlite::types::Value::Text(r#"{"k":1}"#.to_string())
        );
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        assert_eq!(
            value_to_sqlite(&SqlValue::Timestamp(ts)),
            rusqlite::types::Value::Text("2024-03-09 12:00:00".to_string())
        );
    }
}
