use quarry_core::stmt::Value as CoreValue;

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};

/// Bridges core values into rusqlite bindings.
#[derive(Debug)]
pub(crate) struct Value<'a>(pub(crate) &'a CoreValue);

impl ToSql for Value<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        use CoreValue::*;

        Ok(match self.0 {
            Bool(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            I16(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            I32(v) => ToSqlOutput::Owned(SqlValue::Integer(*v as i64)),
            I64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            F32(v) => ToSqlOutput::Owned(SqlValue::Real(*v as f64)),
            F64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            String(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
            // Temporal values bind as their canonical ISO-8601 text form;
            // SQLite compares them textually
            Date(_) | DateTime(_) | Timestamp(_) => {
                ToSqlOutput::Owned(SqlValue::Text(self.0.render()))
            }
            List(_) => {
                // The SQLite flavor expands list operators to one parameter
                // per element before binding
                return Err(rusqlite::Error::ToSqlConversionFailure(
                    "cannot bind a list as a single SQLite parameter".into(),
                ));
            }
            Null => ToSqlOutput::Owned(SqlValue::Null),
        })
    }
}

/// Converts a SQLite column value to a core value.
///
/// SQLite is dynamically typed; refinement to the declared property type
/// happens in the engine, which knows the schema.
pub(crate) fn from_sql(value: ValueRef<'_>) -> rusqlite::Result<CoreValue> {
    Ok(match value {
        ValueRef::Null => CoreValue::Null,
        ValueRef::Integer(v) => CoreValue::I64(v),
        ValueRef::Real(v) => CoreValue::F64(v),
        ValueRef::Text(v) => CoreValue::String(
            std::str::from_utf8(v)
                .map_err(|err| rusqlite::Error::Utf8Error(err))?
                .to_string(),
        ),
        ValueRef::Blob(_) => {
            return Err(rusqlite::Error::InvalidColumnType(
                0,
                "BLOB columns are not supported".to_string(),
                rusqlite::types::Type::Blob,
            ))
        }
    })
}
