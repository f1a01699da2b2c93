#![cfg(feature = "sqlite")]

use sql_appender::prelude::*;
use sql_appender::rusqlite::Connection;
use sql_appender::sqlite::send_batch;

const DDL: &str = r"
    CREATE TABLE log (
        recid INTEGER PRIMARY KEY AUTOINCREMENT,
        lvl TEXT NOT NULL,
        msg TEXT NOT NULL,
        day TEXT,
        user_name TEXT
    );
";

#[test]
fn rendered_batch_embeds_values_as_literals() -> Result<(), Box<dyn std::error::Error>> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(DDL)?;

    let config = AppenderConfig::from_json(
        r#"{
            "layout": "INSERT INTO log (lvl, msg, day, user_name) VALUES ('%level', '%message', '%timestamp{%Y-%m-%d}', '%property{user}')"
        }"#,
    )?;
    let sender = BufferedEventSender::from_config(&config)?;
    assert_eq!(sender.mode(), SendMode::Rendered);

    let events = vec![
        LogEvent::new(Level::Warn, "app", "plain message").with_property("user", "alice"),
        LogEvent::new(Level::Info, "app", "it's quoted").with_property("user", "o'brien"),
    ];
    send_batch(&conn, &sender, &events)?;

    let rows = {
        let mut stmt =
            conn.prepare("SELECT lvl, msg, user_name FROM log ORDER BY recid")?;
        let rows = stmt
            .query_map([], |r| {
                Ok((
                    r.get::<_, String>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, String>(2)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0], ("WARN".into(), "plain message".into(), "alice".into()));
    // embedded quotes survive the escaping round trip
    assert_eq!(rows[1], ("INFO".into(), "it's quoted".into(), "o'brien".into()));
    Ok(())
}

#[test]
fn rendered_mode_needs_no_parameter_bindings() -> Result<(), Box<dyn std::error::Error>> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch(DDL)?;

    let layout = SqlLayout::parse("INSERT INTO log (lvl, msg) VALUES ('%level', '%message')")?;
    let sender = BufferedEventSender::new(CommandSpec::rendered(), Vec::new(), Some(layout))?;

    let events: Vec<LogEvent> = (0..5)
        .map(|i| LogEvent::new(Level::Trace, "app", format!("event {i}")))
        .collect();
    send_batch(&conn, &sender, &events)?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM log", [], |r| r.get(0))?;
    assert_eq!(count, 5);
    Ok(())
}
