use quarry_core::{
    stmt::{Type, Value},
    Error, Result,
};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A value coerced to its target column type.
///
/// `from_text` records that the value originated as text; temporal bindings
/// derived from text get an explicit SQL cast on flavors that need one.
#[derive(Debug, Clone, PartialEq)]
pub struct Coerced {
    pub value: Value,
    pub from_text: bool,
}

impl Coerced {
    fn native(value: Value) -> Self {
        Self {
            value,
            from_text: false,
        }
    }

    fn parsed(value: Value) -> Self {
        Self {
            value,
            from_text: true,
        }
    }
}

/// Coerces a filter value to the declared type of its target column.
///
/// List values are coerced element-wise; `from_text` is set when any element
/// was parsed from text.
pub fn coerce(value: Value, ty: Type) -> Result<Coerced> {
    match value {
        Value::Null => Ok(Coerced::native(Value::Null)),
        Value::List(items) => {
            let mut from_text = false;
            let mut coerced = Vec::with_capacity(items.len());
            for item in items {
                let item = coerce(item, ty)?;
                from_text |= item.from_text;
                coerced.push(item.value);
            }
            Ok(Coerced {
                value: Value::List(coerced),
                from_text,
            })
        }
        value => coerce_scalar(value, ty),
    }
}

fn coerce_scalar(value: Value, ty: Type) -> Result<Coerced> {
    match ty {
        Type::Text | Type::Enum => Ok(match value {
            Value::String(v) => Coerced::native(Value::String(v)),
            other => Coerced::native(Value::String(other.render())),
        }),
        Type::Bool => coerce_bool(value),
        Type::I16 => coerce_integer(value, ty, |v| {
            i16::try_from(v).ok().map(Value::I16)
        }),
        Type::I32 => coerce_integer(value, ty, |v| {
            i32::try_from(v).ok().map(Value::I32)
        }),
        Type::I64 => coerce_integer(value, ty, |v| Some(Value::I64(v))),
        Type::F32 => coerce_float(value, ty, |v| Value::F32(v as f32)),
        Type::F64 | Type::Decimal => coerce_float(value, ty, Value::F64),
        Type::Date => coerce_date(value),
        Type::DateTime => coerce_datetime(value),
        Type::Timestamp => coerce_timestamp(value),
    }
}

/// Accepts the universal textual forms only: `true/false/yes/no/1/0`,
/// case-insensitive.
fn coerce_bool(value: Value) -> Result<Coerced> {
    match value {
        Value::Bool(v) => Ok(Coerced::native(Value::Bool(v))),
        Value::I16(_) | Value::I32(_) | Value::I64(_) => {
            match value.as_i64() {
                Some(0) => Ok(Coerced::native(Value::Bool(false))),
                Some(1) => Ok(Coerced::native(Value::Bool(true))),
                _ => Err(conversion_error(&value, Type::Bool)),
            }
        }
        Value::String(text) => match text.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(Coerced::parsed(Value::Bool(true))),
            "false" | "no" | "0" => Ok(Coerced::parsed(Value::Bool(false))),
            _ => Err(conversion_error(&Value::String(text), Type::Bool)),
        },
        other => Err(conversion_error(&other, Type::Bool)),
    }
}

fn coerce_integer(
    value: Value,
    ty: Type,
    narrow: impl Fn(i64) -> Option<Value>,
) -> Result<Coerced> {
    match value {
        Value::I16(_) | Value::I32(_) | Value::I64(_) => {
            let wide = value.as_i64().unwrap();
            narrow(wide)
                .map(Coerced::native)
                .ok_or_else(|| conversion_error(&value, ty))
        }
        Value::String(text) => {
            let wide: i64 = text
                .trim()
                .parse()
                .map_err(|_| conversion_error(&Value::String(text.clone()), ty))?;
            narrow(wide)
                .map(Coerced::parsed)
                .ok_or_else(|| conversion_error(&Value::String(text), ty))
        }
        other => Err(conversion_error(&other, ty)),
    }
}

fn coerce_float(value: Value, ty: Type, wrap: impl Fn(f64) -> Value) -> Result<Coerced> {
    match value {
        Value::I16(_) | Value::I32(_) | Value::I64(_) | Value::F32(_) | Value::F64(_) => {
            Ok(Coerced::native(wrap(value.as_f64().unwrap())))
        }
        Value::String(text) => {
            let parsed: f64 = text
                .trim()
                .parse()
                .map_err(|_| conversion_error(&Value::String(text.clone()), ty))?;
            Ok(Coerced::parsed(wrap(parsed)))
        }
        other => Err(conversion_error(&other, ty)),
    }
}

fn coerce_date(value: Value) -> Result<Coerced> {
    match value {
        Value::Date(v) => Ok(Coerced::native(Value::Date(v))),
        Value::DateTime(v) => Ok(Coerced::native(Value::Date(v.date()))),
        Value::String(text) => {
            if let Ok(date) = text.parse::<NaiveDate>() {
                return Ok(Coerced::parsed(Value::Date(date)));
            }
            // A full datetime narrows to its date component
            if let Ok(datetime) = text.parse::<NaiveDateTime>() {
                return Ok(Coerced::parsed(Value::Date(datetime.date())));
            }
            Err(conversion_error(&Value::String(text), Type::Date))
        }
        other => Err(conversion_error(&other, Type::Date)),
    }
}

/// ISO-8601 local datetime first, then zoned datetime normalized to UTC,
/// then a bare date at midnight.
fn coerce_datetime(value: Value) -> Result<Coerced> {
    match value {
        Value::DateTime(v) => Ok(Coerced::native(Value::DateTime(v))),
        Value::Timestamp(v) => Ok(Coerced::native(Value::DateTime(v.naive_utc()))),
        Value::Date(v) => Ok(Coerced::native(Value::DateTime(
            v.and_hms_opt(0, 0, 0).unwrap(),
        ))),
        Value::String(text) => {
            if let Ok(datetime) = text.parse::<NaiveDateTime>() {
                return Ok(Coerced::parsed(Value::DateTime(datetime)));
            }
            if let Ok(zoned) = DateTime::parse_from_rfc3339(&text) {
                return Ok(Coerced::parsed(Value::DateTime(
                    zoned.with_timezone(&Utc).naive_utc(),
                )));
            }
            if let Ok(date) = text.parse::<NaiveDate>() {
                return Ok(Coerced::parsed(Value::DateTime(
                    date.and_hms_opt(0, 0, 0).unwrap(),
                )));
            }
            Err(conversion_error(&Value::String(text), Type::DateTime))
        }
        other => Err(conversion_error(&other, Type::DateTime)),
    }
}

fn coerce_timestamp(value: Value) -> Result<Coerced> {
    match value {
        Value::Timestamp(v) => Ok(Coerced::native(Value::Timestamp(v))),
        Value::DateTime(v) => Ok(Coerced::native(Value::Timestamp(v.and_utc()))),
        Value::String(text) => {
            if let Ok(zoned) = DateTime::parse_from_rfc3339(&text) {
                return Ok(Coerced::parsed(Value::Timestamp(zoned.with_timezone(&Utc))));
            }
            if let Ok(datetime) = text.parse::<NaiveDateTime>() {
                return Ok(Coerced::parsed(Value::Timestamp(datetime.and_utc())));
            }
            Err(conversion_error(&Value::String(text), Type::Timestamp))
        }
        other => Err(conversion_error(&other, Type::Timestamp)),
    }
}

fn conversion_error(value: &Value, ty: Type) -> Error {
    Error::type_conversion(value.render(), ty.name())
}
