use std::error::Error;

use tokio_postgres::types::{to_sql_checked, IsNull, ToSql, Type};
use tokio_postgres::GenericClient;
use tokio_util::bytes;

use crate::error::SqlAppenderError;
use crate::event::LogEvent;
use crate::sender::BufferedEventSender;
use crate::value::SqlValue;

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut bytes::BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Int(i) => (*i).to_sql(ty, out),
            SqlValue::Float(f) => (*f).to_sql(ty, out),
            SqlValue::Text(s) => s.to_sql(ty, out),
            SqlValue::Bool(b) => (*b).to_sql(ty, out),
            SqlValue::Timestamp(dt) => dt.to_sql(ty, out),
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Json(jsval) => jsval.to_sql(ty, out),
            SqlValue::Blob(bytes) => bytes.to_sql(ty, out),
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::CHAR
                | Type::NAME
                | Type::BOOL
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
                | Type::DATE
                | Type::JSON
                | Type::JSONB
                | Type::BYTEA
        )
    }

    to_sql_checked!();
}

/// Send a batch of events over a Postgres client or transaction.
///
/// The prepared path compiles the statement once and re-binds values
/// per event; the rendered path executes one layout-built literal
/// statement per event. Either way, one round trip per event, in input
/// order, stopping at the first failure. Row counts are ignored.
///
/// # Errors
///
/// Returns `SqlAppenderError::PostgresError` for any prepare or
/// execute failure.
pub async fn send_batch<C>(
    client: &C,
    sender: &BufferedEventSender,
    events: &[LogEvent],
) -> Result<(), SqlAppenderError>
where
    C: GenericClient + Sync,
{
    match sender.prepared_template() {
        Some(template) => {
            let stmt = client.prepare(&template.postgres_sql).await?;
            for event in events {
                let values = sender.resolve_ordered(event);
                let refs: Vec<&(dyn ToSql + Sync)> =
                    values.iter().map(|v| v as &(dyn ToSql + Sync)).collect();
                client.execute(&stmt, &refs).await?;
            }
        }
        None => {
            let layout = sender.layout().ok_or_else(|| {
                SqlAppenderError::ConfigError("no layout configured".to_string())
            })?;
            for event in events {
                let sql = layout.render(event);
                client.execute(sql.as_str(), &[]).await?;
            }
        }
    }
    Ok(())
}
