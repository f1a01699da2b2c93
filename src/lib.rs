//! Buffered database appender for log events.
//!
//! A logging framework hands this crate an open connection, an
//! optional active transaction, and a batch of log events; each event
//! becomes one database write. Two mutually exclusive send paths
//! exist, chosen once at configuration time:
//!
//! - **prepared-parameterized**: a non-blank command template is
//!   prepared once per batch, and the configured parameter bindings
//!   re-bind values from each event;
//! - **layout-rendered**: with no template configured, a [`SqlLayout`]
//!   renders one complete literal SQL statement per event.
//!
//! Events go out strictly in input order, one round trip each. The
//! first failure aborts the rest of the batch and surfaces to the
//! caller; connections and transactions stay caller-owned throughout.
//!
//! ```no_run
//! use sql_appender::{
//!     AnyConnWrapper, BufferedEventSender, CommandSpec, Level, LogEvent,
//!     ParameterBinding, SqlAppenderError, ValueSource,
//! };
//!
//! # async fn demo(client: &tokio_postgres::Client) -> Result<(), SqlAppenderError> {
//! let sender = BufferedEventSender::new(
//!     CommandSpec::text("INSERT INTO log(ts, lvl, msg) VALUES (@ts, @lvl, @msg)"),
//!     vec![
//!         ParameterBinding::new("@ts", ValueSource::Timestamp),
//!         ParameterBinding::new("@lvl", ValueSource::Level),
//!         ParameterBinding::new("@msg", ValueSource::Message).with_size(4000),
//!     ],
//!     None,
//! )?;
//!
//! let events = vec![LogEvent::new(Level::Info, "app.web", "request handled")];
//! sender.send_buffer(AnyConnWrapper::Postgres(client), &events).await?;
//! # Ok(())
//! # }
//! ```

pub mod binding;
pub mod command;
pub mod config;
pub mod error;
pub mod event;
pub mod layout;
pub mod pool;
pub mod sender;
pub mod translation;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub mod prelude;

pub use binding::{ParameterBinding, ValueSource};
pub use command::{CommandKind, CommandSpec};
pub use config::AppenderConfig;
pub use error::SqlAppenderError;
pub use event::{Level, LogEvent};
pub use layout::SqlLayout;
pub use pool::{AppenderPool, AppenderPoolConnection, ConfigAndPool, DatabaseType};
pub use sender::{AnyConnWrapper, BufferedEventSender, EventSender, SendMode};
pub use value::SqlValue;

#[cfg(feature = "sqlite")]
pub use deadpool_sqlite::rusqlite;
