use super::{FilterOp, LogicOp};
use crate::stmt::Value;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A node in the filter criteria tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterNode {
    /// Atomic condition: field, operator, value
    Leaf(Leaf),

    /// Logical grouping of sub-conditions
    Compound(Compound),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    /// Dotted property path, e.g. `status` or `items.unit.code`
    pub field: String,

    pub op: FilterOp,

    /// Null for the null-test operators
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub children: Vec<FilterNode>,

    pub logic: LogicOp,
}

impl FilterNode {
    pub fn leaf(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Self::Leaf(Leaf {
            field: field.into(),
            op,
            value: value.into(),
        })
    }

    pub fn and(children: Vec<FilterNode>) -> Self {
        Self::Compound(Compound {
            children,
            logic: LogicOp::And,
        })
    }

    pub fn or(children: Vec<FilterNode>) -> Self {
        Self::Compound(Compound {
            children,
            logic: LogicOp::Or,
        })
    }

    /// Flattens the tree to its leaves, depth-first.
    pub fn leaves(&self) -> Vec<&Leaf> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Leaf>) {
        match self {
            Self::Leaf(leaf) => out.push(leaf),
            Self::Compound(compound) => {
                for child in &compound.children {
                    child.collect_leaves(out);
                }
            }
        }
    }
}

impl From<Leaf> for FilterNode {
    fn from(value: Leaf) -> Self {
        Self::Leaf(value)
    }
}

impl From<Compound> for FilterNode {
    fn from(value: Compound) -> Self {
        Self::Compound(value)
    }
}

/// The external wire shape: one flat object carrying both leaf and compound
/// fields. A node with a `field` and an `operator` is a leaf; anything else
/// is a compound over `children` (possibly empty).
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Wire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    operator: Option<FilterOp>,

    #[serde(default, skip_serializing_if = "Value::is_null")]
    value: Value,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<FilterNode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    logical_operator: Option<LogicOp>,
}

impl<'de> Deserialize<'de> for FilterNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = Wire::deserialize(deserializer)?;

        match (wire.field, wire.operator) {
            (Some(field), Some(op)) => Ok(Self::Leaf(Leaf {
                field,
                op,
                value: wire.value,
            })),
            (Some(field), None) => Err(serde::de::Error::custom(format!(
                "filter on `{field}` is missing an operator"
            ))),
            (None, _) => Ok(Self::Compound(Compound {
                children: wire.children,
                logic: wire.logical_operator.unwrap_or_default(),
            })),
        }
    }
}

impl Serialize for FilterNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::Leaf(leaf) => Wire {
                field: Some(leaf.field.clone()),
                operator: Some(leaf.op),
                value: leaf.value.clone(),
                children: Vec::new(),
                logical_operator: None,
            },
            Self::Compound(compound) => Wire {
                field: None,
                operator: None,
                value: Value::Null,
                children: compound.children.clone(),
                logical_operator: Some(compound.logic),
            },
        };
        wire.serialize(serializer)
    }
}
