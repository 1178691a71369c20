use super::{
    relation::{Collection, Reference},
    PropertyMapping, Relation,
};
use crate::stmt::Type;

use indexmap::IndexMap;

/// Schema metadata for one entity type: its table, property-to-column
/// mappings, and declared relationships.
#[derive(Debug, Clone)]
pub struct EntitySchema {
    /// Entity type name, the registry key
    pub name: String,

    /// Backing table name
    pub table: String,

    /// Name of the primary key property
    pub primary_key: String,

    /// Property mappings, keyed by property name, in declaration order
    pub properties: IndexMap<String, PropertyMapping>,

    /// Declared relationships
    pub relations: Vec<Relation>,
}

impl EntitySchema {
    pub fn builder(name: impl Into<String>, table: impl Into<String>) -> EntityBuilder {
        EntityBuilder {
            name: name.into(),
            table: table.into(),
            primary_key: "id".to_string(),
            properties: Vec::new(),
            relations: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMapping> {
        self.properties.get(name)
    }

    /// Look up a relationship by its path segment name (collection name or
    /// reference alias).
    pub fn relation(&self, segment: &str) -> Option<&Relation> {
        self.relations.iter().find(|rel| rel.name() == segment)
    }

    /// The primary key property mapping.
    ///
    /// Registry verification guarantees the property exists.
    pub fn primary_key(&self) -> &PropertyMapping {
        self.properties
            .get(&self.primary_key)
            .expect("verified schema has a primary key property")
    }
}

/// Fluent construction of an [`EntitySchema`].
///
/// Duplicate names and unresolvable targets are reported when the schema
/// registry is built, not here.
#[derive(Debug)]
pub struct EntityBuilder {
    name: String,
    table: String,
    primary_key: String,
    properties: Vec<PropertyMapping>,
    relations: Vec<Relation>,
}

impl EntityBuilder {
    /// Declare a property and its backing column.
    pub fn property(
        mut self,
        name: impl Into<String>,
        column: impl Into<String>,
        ty: Type,
    ) -> Self {
        self.properties.push(PropertyMapping {
            name: name.into(),
            column: column.into(),
            ty,
        });
        self
    }

    /// Declare a has-many collection of child rows on `target`, linked back
    /// by `foreign_key` on the target table.
    pub fn collection(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
        foreign_key: impl Into<String>,
    ) -> Self {
        self.relations.push(Relation::Collection(Collection {
            name: name.into(),
            target: target.into(),
            foreign_key: foreign_key.into(),
        }));
        self
    }

    /// Declare an aggregate reference to `target`, addressable by `alias`.
    pub fn reference(
        mut self,
        alias: impl Into<String>,
        target: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        self.relations.push(Relation::Reference(Reference {
            alias: alias.into(),
            target: target.into(),
            source_column: source_column.into(),
            target_column: target_column.into(),
        }));
        self
    }

    /// Override the primary key property name (defaults to `id`).
    pub fn primary_key(mut self, name: impl Into<String>) -> Self {
        self.primary_key = name.into();
        self
    }

    pub(crate) fn into_parts(self) -> (String, String, String, Vec<PropertyMapping>, Vec<Relation>) {
        (
            self.name,
            self.table,
            self.primary_key,
            self.properties,
            self.relations,
        )
    }
}
