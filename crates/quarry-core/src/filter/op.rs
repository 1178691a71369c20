use crate::{Error, Result};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Equality
    Eq,

    /// Inequality
    Ne,

    /// Greater than
    Gt,

    /// Less than
    Lt,

    /// Greater than or equal
    Gte,

    /// Less than or equal
    Lte,

    /// Case-insensitive prefix match; the suffix wildcard is appended at
    /// compile time
    Like,

    /// Case-insensitive equality
    EqIgnoreCase,

    /// Inclusive range; requires exactly two values
    Between,

    /// Membership in a value list
    In,

    /// Array overlap: matches when the column's array value shares any
    /// element with the given list
    Overlaps,

    /// IS NULL; carries no value and binds no parameter
    IsNull,

    /// IS NOT NULL; carries no value and binds no parameter
    IsNotNull,
}

impl FilterOp {
    /// Parse an operator wire string.
    pub fn parse(s: &str) -> Result<Self> {
        Ok(match s {
            "eq" => Self::Eq,
            "neq" => Self::Ne,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "gte" => Self::Gte,
            "lte" => Self::Lte,
            "like" => Self::Like,
            "eqic" => Self::EqIgnoreCase,
            "between" => Self::Between,
            "in" => Self::In,
            "ao" => Self::Overlaps,
            "isnull" => Self::IsNull,
            "isnotnull" => Self::IsNotNull,
            other => {
                return Err(Error::invalid_filter_criteria(format!(
                    "unknown operator `{other}`"
                )))
            }
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "neq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::EqIgnoreCase => "eqic",
            Self::Between => "between",
            Self::In => "in",
            Self::Overlaps => "ao",
            Self::IsNull => "isnull",
            Self::IsNotNull => "isnotnull",
        }
    }

    /// Null-test operators carry no value.
    pub fn takes_value(self) -> bool {
        !matches!(self, Self::IsNull | Self::IsNotNull)
    }

    /// Operators whose value is a list rather than a scalar.
    pub fn takes_list(self) -> bool {
        matches!(self, Self::Between | Self::In | Self::Overlaps)
    }
}

impl core::str::FromStr for FilterOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl core::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FilterOp {
    fn serialize<S: Serializer>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for FilterOp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> core::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

/// Logical combination of a compound node's children.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogicOp {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,

    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl LogicOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}
