use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use crate::binding::ParameterBinding;
use crate::command::{CommandKind, CommandSpec};
use crate::config::AppenderConfig;
use crate::error::SqlAppenderError;
use crate::event::LogEvent;
use crate::layout::SqlLayout;
use crate::translation::{translate_named, PlaceholderStyle};
use crate::value::SqlValue;

#[cfg(feature = "sqlite")]
use deadpool_sqlite::rusqlite;

/// Wrapper around a caller-owned connection or transaction.
///
/// The caller decides whether the batch joins an active transaction by
/// passing the transaction variant; the sender never begins, commits,
/// or rolls anything back. For SQLite, `rusqlite::Transaction` derefs
/// to `Connection`, so `&tx` slots into the `Sqlite` variant directly.
pub enum AnyConnWrapper<'a> {
    /// PostgreSQL client connection
    #[cfg(feature = "postgres")]
    Postgres(&'a tokio_postgres::Client),
    /// PostgreSQL transaction
    #[cfg(feature = "postgres")]
    PostgresTx(&'a tokio_postgres::Transaction<'a>),
    /// SQLite connection (or transaction, via deref)
    #[cfg(feature = "sqlite")]
    Sqlite(&'a rusqlite::Connection),
}

/// Which send path a sender uses, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    /// One statement prepared per batch, values bound per event.
    Prepared,
    /// One layout-rendered literal statement per event.
    Rendered,
}

/// The command template translated for both backends, plus the value
/// order shared by them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreparedTemplate {
    pub(crate) postgres_sql: String,
    pub(crate) sqlite_sql: String,
    pub(crate) order: Vec<usize>,
}

/// Capability interface the host framework holds a sender through.
#[async_trait(?Send)]
pub trait EventSender: Send + Sync {
    /// Persist each event in `events` as one database write, in input
    /// order, aborting at the first failure.
    async fn send_buffer(
        &self,
        conn: AnyConnWrapper<'_>,
        events: &[LogEvent],
    ) -> Result<(), SqlAppenderError>;
}

/// Sends batches of log events to a database, one write per event.
///
/// Built once from configuration and immutable afterwards. A non-blank
/// command template selects the prepared-parameterized path; otherwise
/// every event goes through the layout renderer as a literal statement.
/// Events are written strictly in input order, one round trip each;
/// the first failing write aborts the rest of the batch and surfaces
/// the error to the caller. Per-write row counts are ignored.
#[derive(Debug, Clone)]
pub struct BufferedEventSender {
    kind: CommandKind,
    bindings: Vec<ParameterBinding>,
    layout: Option<SqlLayout>,
    prepared: Option<PreparedTemplate>,
}

impl BufferedEventSender {
    /// Build a sender, validating the mode selection up front.
    ///
    /// # Errors
    ///
    /// Returns `SqlAppenderError::ConfigError` when the template
    /// references an unconfigured parameter, a configured parameter is
    /// never referenced, parameter names collide, or neither template
    /// nor layout is configured.
    pub fn new(
        command: CommandSpec,
        bindings: Vec<ParameterBinding>,
        layout: Option<SqlLayout>,
    ) -> Result<Self, SqlAppenderError> {
        let prepared = if command.is_parameterized() {
            let mut seen = HashSet::new();
            for binding in &bindings {
                if !seen.insert(binding.bare_name()) {
                    return Err(SqlAppenderError::ConfigError(format!(
                        "duplicate parameter name: {}",
                        binding.name
                    )));
                }
            }

            let template = command.template_sql(&bindings)?;
            let names: Vec<&str> = bindings.iter().map(ParameterBinding::bare_name).collect();
            let postgres = translate_named(&template, PlaceholderStyle::Postgres, &names)?;
            let sqlite = translate_named(&template, PlaceholderStyle::Sqlite, &names)?;

            for (idx, binding) in bindings.iter().enumerate() {
                if !postgres.order.contains(&idx) {
                    return Err(SqlAppenderError::ConfigError(format!(
                        "parameter {} is never referenced by the command template",
                        binding.name
                    )));
                }
            }

            Some(PreparedTemplate {
                postgres_sql: postgres.sql,
                sqlite_sql: sqlite.sql,
                order: postgres.order,
            })
        } else {
            if layout.is_none() {
                return Err(SqlAppenderError::ConfigError(
                    "command template is blank and no layout is configured".to_string(),
                ));
            }
            None
        };

        Ok(Self {
            kind: command.kind,
            bindings,
            layout,
            prepared,
        })
    }

    /// Build a sender from declarative configuration.
    ///
    /// # Errors
    ///
    /// Propagates layout parse failures and the validation errors of
    /// [`BufferedEventSender::new`].
    pub fn from_config(config: &AppenderConfig) -> Result<Self, SqlAppenderError> {
        let layout = config
            .layout
            .as_deref()
            .map(SqlLayout::parse)
            .transpose()?;
        Self::new(config.command_spec(), config.parameters.clone(), layout)
    }

    /// The send path this sender was configured with.
    pub fn mode(&self) -> SendMode {
        if self.prepared.is_some() {
            SendMode::Prepared
        } else {
            SendMode::Rendered
        }
    }

    pub(crate) fn command_kind(&self) -> CommandKind {
        self.kind
    }

    pub(crate) fn prepared_template(&self) -> Option<&PreparedTemplate> {
        self.prepared.as_ref()
    }

    pub(crate) fn layout(&self) -> Option<&SqlLayout> {
        self.layout.as_ref()
    }

    /// Resolve one event into parameter values, in placeholder order.
    pub(crate) fn resolve_ordered(&self, event: &LogEvent) -> Vec<SqlValue> {
        match &self.prepared {
            Some(template) => template
                .order
                .iter()
                .filter_map(|&idx| self.bindings.get(idx))
                .map(|binding| binding.resolve(event))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Persist a batch of events over the given connection.
    ///
    /// # Errors
    ///
    /// Returns the first driver error encountered; later events in the
    /// batch are not attempted.
    pub async fn send_buffer(
        &self,
        conn: AnyConnWrapper<'_>,
        events: &[LogEvent],
    ) -> Result<(), SqlAppenderError> {
        debug!(events = events.len(), mode = ?self.mode(), "sending buffered events");
        match conn {
            #[cfg(feature = "postgres")]
            AnyConnWrapper::Postgres(client) => {
                crate::postgres::send_batch(client, self, events).await
            }
            #[cfg(feature = "postgres")]
            AnyConnWrapper::PostgresTx(tx) => crate::postgres::send_batch(tx, self, events).await,
            #[cfg(feature = "sqlite")]
            AnyConnWrapper::Sqlite(conn) => crate::sqlite::send_batch(conn, self, events),
            #[allow(unreachable_patterns)]
            _ => Err(SqlAppenderError::Unimplemented(
                "this database type is not enabled in the current build".to_string(),
            )),
        }
    }
}

#[async_trait(?Send)]
impl EventSender for BufferedEventSender {
    async fn send_buffer(
        &self,
        conn: AnyConnWrapper<'_>,
        events: &[LogEvent],
    ) -> Result<(), SqlAppenderError> {
        BufferedEventSender::send_buffer(self, conn, events).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ValueSource;

    fn msg_binding() -> ParameterBinding {
        ParameterBinding::new("@msg", ValueSource::Message)
    }

    #[test]
    fn non_blank_template_selects_prepared_mode() {
        let sender = BufferedEventSender::new(
            CommandSpec::text("INSERT INTO log(msg) VALUES (@msg)"),
            vec![msg_binding()],
            None,
        )
        .unwrap();
        assert_eq!(sender.mode(), SendMode::Prepared);

        let template = sender.prepared_template().unwrap();
        assert_eq!(template.postgres_sql, "INSERT INTO log(msg) VALUES ($1)");
        assert_eq!(template.sqlite_sql, "INSERT INTO log(msg) VALUES (?1)");
        assert_eq!(template.order, vec![0]);
    }

    #[test]
    fn blank_template_selects_rendered_mode() {
        let layout = SqlLayout::parse("INSERT INTO log(msg) VALUES ('%message')").unwrap();
        let sender =
            BufferedEventSender::new(CommandSpec::text("   "), Vec::new(), Some(layout)).unwrap();
        assert_eq!(sender.mode(), SendMode::Rendered);
        assert!(sender.prepared_template().is_none());
    }

    #[test]
    fn blank_template_without_layout_is_rejected() {
        let err =
            BufferedEventSender::new(CommandSpec::rendered(), Vec::new(), None).unwrap_err();
        assert!(matches!(err, SqlAppenderError::ConfigError(_)));
    }

    #[test]
    fn duplicate_parameter_names_are_rejected() {
        let err = BufferedEventSender::new(
            CommandSpec::text("INSERT INTO log(msg) VALUES (@msg)"),
            vec![msg_binding(), ParameterBinding::new("msg", ValueSource::Level)],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SqlAppenderError::ConfigError(_)));
    }

    #[test]
    fn unreferenced_parameter_is_rejected() {
        let err = BufferedEventSender::new(
            CommandSpec::text("INSERT INTO log(msg) VALUES (@msg)"),
            vec![
                msg_binding(),
                ParameterBinding::new("@lvl", ValueSource::Level),
            ],
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SqlAppenderError::ConfigError(_)));
    }

    #[test]
    fn stored_procedure_template_translates_for_postgres() {
        let sender = BufferedEventSender::new(
            CommandSpec::stored_procedure("write_log"),
            vec![
                ParameterBinding::new("@ts", ValueSource::Timestamp),
                msg_binding(),
            ],
            None,
        )
        .unwrap();
        assert_eq!(
            sender.prepared_template().unwrap().postgres_sql,
            "CALL write_log($1, $2)"
        );
    }

    #[test]
    fn values_resolve_in_template_order() {
        use crate::event::Level;

        let sender = BufferedEventSender::new(
            CommandSpec::text("INSERT INTO log(msg, lvl) VALUES (@msg, @lvl)"),
            vec![
                ParameterBinding::new("@lvl", ValueSource::Level),
                msg_binding(),
            ],
            None,
        )
        .unwrap();
        let event = LogEvent::new(Level::Warn, "app", "careful");
        assert_eq!(
            sender.resolve_ordered(&event),
            vec![
                SqlValue::Text("careful".into()),
                SqlValue::Text("WARN".into())
            ]
        );
    }

    #[test]
    fn from_config_builds_rendered_sender() {
        let config = AppenderConfig::from_json(
            r#"{ "layout": "INSERT INTO log(msg) VALUES ('%message')" }"#,
        )
        .unwrap();
        let sender = BufferedEventSender::from_config(&config).unwrap();
        assert_eq!(sender.mode(), SendMode::Rendered);
    }
}
