use quarry_core::{
    schema::{EntitySchema, PropertyMapping, Relation, Schema},
    Error, Result,
};

use dashmap::DashMap;
use std::sync::Arc;

/// Alias of the base table in every generated statement.
pub const BASE_ALIAS: &str = "base";

/// Resolves dotted property paths against entity schemas.
///
/// Resolutions are memoized in a concurrent map keyed by (entity, path).
/// Population is idempotent and entries are never invalidated: schemas are
/// immutable for the process lifetime, so the first resolution for a key is
/// as good as any later one.
#[derive(Debug, Default)]
pub struct PathResolver {
    cache: DashMap<(String, String), Arc<Resolution>>,
}

/// The outcome of resolving one path: the relationships traversed, in order,
/// and the terminal property (absent when the path is a bare relationship
/// alias, as used by join discovery).
#[derive(Debug, Clone)]
pub struct Resolution {
    pub steps: Vec<Step>,
    pub property: Option<PropertyMapping>,
}

/// One relationship traversal within a path.
#[derive(Debug, Clone)]
pub struct Step {
    /// Entity the relationship was declared on
    pub entity: String,

    pub relation: Relation,
}

impl Resolution {
    /// First path segment, the join-plan key. `None` for base properties.
    pub fn prefix(&self) -> Option<&str> {
        self.steps.first().map(|step| step.relation.name())
    }

    /// The table qualifier this path's column is read from: `base` for base
    /// properties, the collection alias `<name>_table` or the reference's
    /// declared alias otherwise.
    pub fn qualifier(&self) -> String {
        match self.steps.last() {
            None => BASE_ALIAS.to_string(),
            Some(step) => match &step.relation {
                Relation::Collection(rel) => collection_alias(&rel.name),
                Relation::Reference(rel) => rel.alias.clone(),
            },
        }
    }

    /// The terminal property, required for filter and sort paths.
    pub fn expect_property(&self, path: &str) -> Result<&PropertyMapping> {
        self.property.as_ref().ok_or_else(|| {
            Error::invalid_filter_criteria(format!(
                "path `{path}` resolves to a relationship, not a property"
            ))
        })
    }
}

/// Join alias for a collection relationship.
pub fn collection_alias(name: &str) -> String {
    format!("{name}_table")
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `path` against `entity`, consulting the cache first.
    pub fn resolve(
        &self,
        schema: &Schema,
        entity: &EntitySchema,
        path: &str,
    ) -> Result<Arc<Resolution>> {
        let key = (entity.name.clone(), path.to_string());
        if let Some(found) = self.cache.get(&key) {
            return Ok(found.clone());
        }

        let resolution = Arc::new(resolve_uncached(schema, entity, path)?);

        // First write wins; a concurrent populate resolved the same
        // immutable schema and produced an equivalent value.
        Ok(self
            .cache
            .entry(key)
            .or_insert(resolution)
            .value()
            .clone())
    }
}

fn resolve_uncached(schema: &Schema, entity: &EntitySchema, path: &str) -> Result<Resolution> {
    if !path.contains('.') {
        // A dotless path may name a relationship alias directly; join
        // discovery relies on this.
        if let Some(relation) = entity.relation(path) {
            return Ok(Resolution {
                steps: vec![Step {
                    entity: entity.name.clone(),
                    relation: relation.clone(),
                }],
                property: None,
            });
        }

        let property = entity
            .property(path)
            .ok_or_else(|| Error::property_not_found(&entity.name, path))?;
        return Ok(Resolution {
            steps: Vec::new(),
            property: Some(property.clone()),
        });
    }

    let segments: Vec<&str> = path.split('.').collect();
    let mut current = entity;
    let mut steps = Vec::new();

    for segment in &segments[..segments.len() - 1] {
        match current.relation(segment) {
            Some(relation) => {
                steps.push(Step {
                    entity: current.name.clone(),
                    relation: relation.clone(),
                });
                current = relation.target_schema(schema)?;
            }
            None if current.property(segment).is_some() => {
                return Err(Error::invalid_filter_criteria(format!(
                    "path `{path}` traverses `{segment}`, which is neither a collection nor a reference relationship"
                )));
            }
            None => return Err(Error::property_not_found(&entity.name, path)),
        }
    }

    let terminal = segments[segments.len() - 1];
    let property = current
        .property(terminal)
        .ok_or_else(|| Error::property_not_found(&entity.name, path))?;

    verify_depth(path, &steps)?;

    Ok(Resolution {
        steps,
        property: Some(property.clone()),
    })
}

/// Join depth is fixed: at most one relationship hop, plus a reference
/// reached through a collection.
fn verify_depth(path: &str, steps: &[Step]) -> Result<()> {
    match steps {
        [] | [_] => Ok(()),
        [first, second] if first.relation.is_collection() && !second.relation.is_collection() => {
            Ok(())
        }
        _ => Err(Error::invalid_filter_criteria(format!(
            "path `{path}` traverses more relationships than the supported depth (a collection, then a reference)"
        ))),
    }
}
