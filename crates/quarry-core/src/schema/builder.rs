use super::{EntityBuilder, EntitySchema, Schema};
use crate::{Error, Result};

use indexmap::IndexMap;

/// Builds and verifies the schema registry.
///
/// Verification fails fast, before any request is compiled: duplicate
/// property names or relationship aliases within an entity, dangling
/// relationship targets, and missing primary key properties are all caught
/// here.
#[derive(Debug, Default)]
pub struct Builder {
    entities: Vec<EntityBuilder>,
}

impl Builder {
    pub fn entity(mut self, entity: EntityBuilder) -> Self {
        self.entities.push(entity);
        self
    }

    pub fn build(self) -> Result<Schema> {
        let mut entities = IndexMap::new();

        for builder in self.entities {
            let (name, table, primary_key, properties, relations) = builder.into_parts();

            let mut property_map = IndexMap::new();
            for property in properties {
                let key = property.name.clone();
                if property_map.insert(key.clone(), property).is_some() {
                    return Err(Error::invalid_schema(format!(
                        "entity `{name}` declares property `{key}` more than once"
                    )));
                }
            }

            if !property_map.contains_key(&primary_key) {
                return Err(Error::invalid_schema(format!(
                    "entity `{name}` has no `{primary_key}` property to use as its primary key"
                )));
            }

            for (index, relation) in relations.iter().enumerate() {
                let segment = relation.name();
                if property_map.contains_key(segment)
                    || relations[..index].iter().any(|r| r.name() == segment)
                {
                    return Err(Error::invalid_schema(format!(
                        "entity `{name}` declares `{segment}` more than once"
                    )));
                }
            }

            let entity = EntitySchema {
                name: name.clone(),
                table,
                primary_key,
                properties: property_map,
                relations,
            };

            if entities.insert(name.clone(), entity).is_some() {
                return Err(Error::invalid_schema(format!(
                    "entity `{name}` registered more than once"
                )));
            }
        }

        let schema = Schema { entities };
        schema.verify_relation_targets()?;
        Ok(schema)
    }
}

impl Schema {
    /// Every relationship target must be resolvable in the registry.
    fn verify_relation_targets(&self) -> Result<()> {
        for entity in self.entities() {
            for relation in &entity.relations {
                if !self.entities.contains_key(relation.target()) {
                    return Err(Error::invalid_schema(format!(
                        "relation `{}.{}` targets entity `{}`, which is not registered",
                        entity.name,
                        relation.name(),
                        relation.target(),
                    )));
                }
            }
        }
        Ok(())
    }
}
