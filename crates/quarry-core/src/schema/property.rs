use crate::stmt::Type;

/// Maps an entity property to its backing column.
#[derive(Debug, Clone)]
pub struct PropertyMapping {
    /// Property name as callers reference it in filter paths
    pub name: String,

    /// Backing column name
    pub column: String,

    /// Declared semantic type, drives value coercion
    pub ty: Type,
}
