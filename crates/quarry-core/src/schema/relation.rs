mod collection;
pub use collection::Collection;

mod reference;
pub use reference::Reference;

use super::{EntitySchema, Schema};
use crate::Result;

/// A declared relationship on an entity schema.
#[derive(Debug, Clone)]
pub enum Relation {
    /// Has-many link to child rows identified by a reverse foreign key
    Collection(Collection),

    /// Many-to-one link to another entity's row, addressable by alias
    Reference(Reference),
}

impl Relation {
    /// The segment name callers use in dotted paths: the collection's name or
    /// the reference's alias.
    pub fn name(&self) -> &str {
        match self {
            Self::Collection(rel) => &rel.name,
            Self::Reference(rel) => &rel.alias,
        }
    }

    /// The target entity's name.
    pub fn target(&self) -> &str {
        match self {
            Self::Collection(rel) => &rel.target,
            Self::Reference(rel) => &rel.target,
        }
    }

    pub fn target_schema<'a>(&self, schema: &'a Schema) -> Result<&'a EntitySchema> {
        schema.entity(self.target())
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    #[track_caller]
    pub fn expect_collection(&self) -> &Collection {
        match self {
            Self::Collection(rel) => rel,
            _ => panic!("expected a collection relation; actual={self:#?}"),
        }
    }

    #[track_caller]
    pub fn expect_reference(&self) -> &Reference {
        match self {
            Self::Reference(rel) => rel,
            _ => panic!("expected a reference relation; actual={self:#?}"),
        }
    }
}

impl From<Collection> for Relation {
    fn from(value: Collection) -> Self {
        Self::Collection(value)
    }
}

impl From<Reference> for Relation {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}
