mod builder;
pub use builder::Builder;

mod entity;
pub use entity::{EntityBuilder, EntitySchema};

mod property;
pub use property::PropertyMapping;

pub mod relation;
pub use relation::Relation;

use crate::Result;

use indexmap::IndexMap;

/// The registry of entity schemas, built once and shared for the process
/// lifetime.
///
/// Schemas are immutable after construction; everything downstream (the
/// resolver cache included) relies on that.
#[derive(Debug, Default)]
pub struct Schema {
    pub entities: IndexMap<String, EntitySchema>,
}

/// Supplies per-entity-type schema metadata.
///
/// Every entity type and every relationship target reachable through declared
/// relationships must be resolvable.
pub trait SchemaProvider: Send + Sync {
    fn entity(&self, name: &str) -> Result<&EntitySchema>;
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    /// Get an entity schema by name.
    pub fn entity(&self, name: &str) -> Result<&EntitySchema> {
        self.entities
            .get(name)
            .ok_or_else(|| crate::Error::invalid_schema(format!("unknown entity `{name}`")))
    }

    pub fn entities(&self) -> impl Iterator<Item = &EntitySchema> {
        self.entities.values()
    }
}

impl SchemaProvider for Schema {
    fn entity(&self, name: &str) -> Result<&EntitySchema> {
        Schema::entity(self, name)
    }
}
