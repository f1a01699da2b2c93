use serde::{Deserialize, Serialize};

use crate::binding::ParameterBinding;
use crate::command::{CommandKind, CommandSpec};
use crate::error::SqlAppenderError;

/// Declarative appender configuration, as read from the host
/// framework's config file.
///
/// ```json
/// {
///   "command_text": "INSERT INTO log(ts, lvl, msg) VALUES (@ts, @lvl, @msg)",
///   "parameters": [
///     { "name": "@ts",  "source": "timestamp" },
///     { "name": "@lvl", "source": "level" },
///     { "name": "@msg", "source": "message", "size": 4000 }
///   ]
/// }
/// ```
///
/// Leaving `command_text` blank and setting `layout` instead selects
/// the literal-statement path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppenderConfig {
    /// Parameterized SQL template, or stored procedure name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_text: Option<String>,
    /// How `command_text` is interpreted.
    #[serde(default)]
    pub command_kind: CommandKind,
    /// Ordered parameter bindings for the template.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterBinding>,
    /// Layout pattern for the literal-statement path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
}

impl AppenderConfig {
    /// Parse a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns `SqlAppenderError::ConfigError` if the document does not
    /// match the expected shape.
    pub fn from_json(json: &str) -> Result<Self, SqlAppenderError> {
        serde_json::from_str(json)
            .map_err(|e| SqlAppenderError::ConfigError(format!("invalid appender config: {e}")))
    }

    pub(crate) fn command_spec(&self) -> CommandSpec {
        CommandSpec {
            text: self.command_text.clone(),
            kind: self.command_kind,
        }
    }
}
