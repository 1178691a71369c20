mod expr;
pub use expr::{BinaryOp, Expr};

mod materialize;
pub(crate) use materialize::Materializer;

mod spec;
pub use spec::{FieldSpec, ProjectionSpec};

use quarry_core::stmt::Value;

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// A materialized target shape: named fields in declaration order.
pub type ProjectedRow = IndexMap<String, Projected>;

/// A value in a projected shape.
///
/// Scalars come from columns or computed expressions; records from joined
/// references (and collection elements); lists from collection fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Projected {
    Scalar(Value),
    Record(ProjectedRow),
    Many(Vec<Projected>),
}

impl Projected {
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&ProjectedRow> {
        match self {
            Self::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Projected]> {
        match self {
            Self::Many(items) => Some(items),
            _ => None,
        }
    }
}

impl Serialize for Projected {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Scalar(value) => value.serialize(serializer),
            Self::Record(record) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(record.len()))?;
                for (name, value) in record {
                    map.serialize_entry(name, value)?;
                }
                map.end()
            }
            Self::Many(items) => items.serialize(serializer),
        }
    }
}

impl From<Value> for Projected {
    fn from(value: Value) -> Self {
        Self::Scalar(value)
    }
}
