//! Convenient imports for common functionality.
//!
//! Re-exports the types most hosts need to configure a sender and
//! push batches through it.

pub use crate::binding::{ParameterBinding, ValueSource};
pub use crate::command::{CommandKind, CommandSpec};
pub use crate::config::AppenderConfig;
pub use crate::error::SqlAppenderError;
pub use crate::event::{Level, LogEvent};
pub use crate::layout::SqlLayout;
pub use crate::pool::{AppenderPool, AppenderPoolConnection, ConfigAndPool, DatabaseType};
pub use crate::sender::{AnyConnWrapper, BufferedEventSender, EventSender, SendMode};
pub use crate::translation::{translate_named, PlaceholderStyle, TranslatedTemplate};
pub use crate::value::SqlValue;

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{send_batch as sqlite_send_batch, value_to_sqlite};

#[cfg(feature = "postgres")]
pub use crate::postgres::send_batch as postgres_send_batch;
