/// The declared semantic type of an entity property.
///
/// The type drives value coercion: textual filter values are parsed into the
/// declared type before being bound, so a caller may pass `"42"` against an
/// `I64` column or an ISO-8601 string against a `DateTime` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    /// Boolean value
    Bool,

    /// String type
    Text,

    /// Signed 16-bit integer
    I16,

    /// Signed 32-bit integer
    I32,

    /// Signed 64-bit integer
    I64,

    /// 32-bit floating point
    F32,

    /// 64-bit floating point
    F64,

    /// Fixed-point decimal. Carried as a 64-bit float at the value layer; the
    /// tag stays distinct so a fixed-point representation can be swapped in
    /// behind the coercion layer.
    Decimal,

    /// Calendar date without a time component
    Date,

    /// Date and time without a timezone offset
    DateTime,

    /// An instant on the global timeline (UTC)
    Timestamp,

    /// An enumerated type, stored as its string form
    Enum,
}

impl Type {
    /// Returns `true` for date, datetime, and instant types.
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::Date | Self::DateTime | Self::Timestamp)
    }

    /// Returns `true` for integer and floating point types.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::I16 | Self::I32 | Self::I64 | Self::F32 | Self::F64 | Self::Decimal
        )
    }

    pub fn is_bool(self) -> bool {
        matches!(self, Self::Bool)
    }

    /// The name used in type-conversion error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Text => "Text",
            Self::I16 => "I16",
            Self::I32 => "I32",
            Self::I64 => "I64",
            Self::F32 => "F32",
            Self::F64 => "F64",
            Self::Decimal => "Decimal",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Timestamp => "Timestamp",
            Self::Enum => "Enum",
        }
    }
}

impl core::fmt::Display for Type {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
