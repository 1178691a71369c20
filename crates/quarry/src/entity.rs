use quarry_core::{
    driver::Row,
    schema::EntitySchema,
    stmt::Value,
    Result,
};

use indexmap::IndexMap;

/// A stored entity materialized from a result row: every declared property,
/// in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    values: IndexMap<String, Value>,
}

impl Entity {
    /// Map a result row into the entity shape.
    ///
    /// Drivers return dynamically-typed values (SQLite has no boolean or
    /// datetime storage class), so each column is refined to the property's
    /// declared type on the way in.
    pub fn from_row(row: &Row, schema: &EntitySchema) -> Result<Self> {
        let mut values = IndexMap::with_capacity(schema.properties.len());

        for property in schema.properties.values() {
            let value = match row.get(&property.column) {
                None | Some(Value::Null) => Value::Null,
                Some(value) => quarry_sql::coerce(value.clone(), property.ty)?.value,
            };
            values.insert(property.name.clone(), value);
        }

        Ok(Self { values })
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.values.get(property)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
