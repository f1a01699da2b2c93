use serde::{Deserialize, Serialize};

use crate::binding::ParameterBinding;
use crate::error::SqlAppenderError;

/// How the command template is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    /// The template is a full SQL statement.
    #[default]
    Text,
    /// The template is a stored procedure name; the statement becomes
    /// `CALL name(...)` over the configured parameters.
    StoredProcedure,
}

/// The configured command template, or the absence of one.
///
/// A non-blank template selects the prepared-parameterized send path;
/// a blank or absent template means each event's SQL comes from the
/// layout renderer instead. The choice is fixed for the life of the
/// sender.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Parameterized SQL template with `@name` placeholders, or the
    /// stored procedure name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Template interpretation.
    #[serde(default)]
    pub kind: CommandKind,
}

impl CommandSpec {
    /// A plain SQL template.
    pub fn text(sql: impl Into<String>) -> Self {
        Self {
            text: Some(sql.into()),
            kind: CommandKind::Text,
        }
    }

    /// A stored procedure call.
    pub fn stored_procedure(name: impl Into<String>) -> Self {
        Self {
            text: Some(name.into()),
            kind: CommandKind::StoredProcedure,
        }
    }

    /// No template; events are sent as layout-rendered literal SQL.
    pub fn rendered() -> Self {
        Self::default()
    }

    /// Whether this spec selects the prepared-parameterized path.
    ///
    /// Whitespace-only templates count as absent.
    pub fn is_parameterized(&self) -> bool {
        self.text
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    /// The SQL text to prepare, still in `@name` placeholder form.
    ///
    /// For a stored procedure this synthesizes `CALL name(@a, @b, ...)`
    /// over the configured bindings, in binding order.
    pub(crate) fn template_sql(
        &self,
        bindings: &[ParameterBinding],
    ) -> Result<String, SqlAppenderError> {
        let text = self
            .text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                SqlAppenderError::ConfigError("command template is blank".to_string())
            })?;

        match self.kind {
            CommandKind::Text => Ok(text.to_string()),
            CommandKind::StoredProcedure => {
                if text.contains(char::is_whitespace) {
                    return Err(SqlAppenderError::ConfigError(format!(
                        "stored procedure name contains whitespace: {text}"
                    )));
                }
                let args = bindings
                    .iter()
                    .map(|b| format!("@{}", b.bare_name()))
                    .collect::<Vec<_>>()
                    .join(", ");
                Ok(format!("CALL {text}({args})"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ValueSource;

    #[test]
    fn blank_templates_are_not_parameterized() {
        assert!(!CommandSpec::rendered().is_parameterized());
        assert!(!CommandSpec::text("   ").is_parameterized());
        assert!(CommandSpec::text("INSERT INTO log(msg) VALUES (@msg)").is_parameterized());
    }

    #[test]
    fn stored_procedure_call_uses_binding_order() {
        let bindings = vec![
            ParameterBinding::new("@ts", ValueSource::Timestamp),
            ParameterBinding::new("msg", ValueSource::Message),
        ];
        let spec = CommandSpec::stored_procedure("write_log");
        assert_eq!(
            spec.template_sql(&bindings).unwrap(),
            "CALL write_log(@ts, @msg)"
        );
    }

    #[test]
    fn stored_procedure_name_must_be_bare() {
        let spec = CommandSpec::stored_procedure("drop table x");
        assert!(matches!(
            spec.template_sql(&[]),
            Err(SqlAppenderError::ConfigError(_))
        ));
    }
}
