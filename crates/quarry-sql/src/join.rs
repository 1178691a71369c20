use crate::resolve::{collection_alias, PathResolver, Step, BASE_ALIAS};

use quarry_core::{
    schema::{EntitySchema, Relation, Schema},
    Result,
};

use indexmap::IndexMap;

/// How a joined table relates to the row it joins against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Collection,
    Reference,
}

/// One LEFT JOIN in a compiled statement.
///
/// Built fresh per compilation from the current request; never shared across
/// requests.
#[derive(Debug, Clone)]
pub struct JoinDescriptor {
    pub kind: JoinKind,

    /// Joined table name
    pub table: String,

    /// Entity the joined table backs
    pub target_entity: String,

    /// Alias the joined table is addressed by
    pub alias: String,

    /// Qualifier on the left-hand side of the join predicate (`base`, or a
    /// collection alias for a nested reference)
    pub source_qualifier: String,

    /// Column on the source side
    pub source_column: String,

    /// Column on the joined table
    pub target_column: String,

    /// References reached through a collection join one level deeper.
    pub nested: Vec<JoinDescriptor>,
}

impl JoinDescriptor {
    /// A reference join off the base table. Secondary collection queries use
    /// this to pull each element's referenced row alongside the element.
    pub fn for_reference(
        reference: &quarry_core::schema::relation::Reference,
        target: &EntitySchema,
    ) -> JoinDescriptor {
        JoinDescriptor {
            kind: JoinKind::Reference,
            table: target.table.clone(),
            target_entity: target.name.clone(),
            alias: reference.alias.clone(),
            source_qualifier: BASE_ALIAS.to_string(),
            source_column: reference.source_column.clone(),
            target_column: reference.target_column.clone(),
            nested: Vec::new(),
        }
    }
}

/// The set of joins a request needs, keyed by the first path segment that
/// required them. A sort or projection path reuses the join its prefix
/// already produced.
#[derive(Debug, Default)]
pub struct JoinPlan {
    joins: IndexMap<String, JoinDescriptor>,
}

impl JoinPlan {
    /// Resolve the joins required by the given dotted paths (filter leaves,
    /// the sort field, and projection expression paths alike).
    pub fn resolve<'a>(
        schema: &Schema,
        entity: &EntitySchema,
        resolver: &PathResolver,
        paths: impl IntoIterator<Item = &'a str>,
    ) -> Result<JoinPlan> {
        let mut plan = JoinPlan::default();

        for path in paths {
            let resolution = resolver.resolve(schema, entity, path)?;
            let steps = &resolution.steps;
            if steps.is_empty() {
                continue;
            }

            let prefix = resolution.prefix().unwrap().to_string();
            if !plan.joins.contains_key(&prefix) {
                plan.joins
                    .insert(prefix.clone(), descriptor(schema, entity, &steps[0])?);
            }

            if let [collection_step, reference_step] = &steps[..] {
                let parent = plan.joins.get_mut(&prefix).unwrap();
                let nested = nested_descriptor(schema, collection_step, reference_step)?;
                if !parent.nested.iter().any(|j| j.alias == nested.alias) {
                    parent.nested.push(nested);
                }
            }
        }

        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.joins.is_empty()
    }

    pub fn len(&self) -> usize {
        self.joins.len()
    }

    pub fn get(&self, prefix: &str) -> Option<&JoinDescriptor> {
        self.joins.get(prefix)
    }

    /// Joins in insertion order; nested references follow their parent when
    /// rendered.
    pub fn iter(&self) -> impl Iterator<Item = &JoinDescriptor> {
        self.joins.values()
    }

    /// Total join count, nested references included.
    pub fn join_count(&self) -> usize {
        self.joins
            .values()
            .map(|join| 1 + join.nested.len())
            .sum()
    }

    pub fn into_joins(self) -> Vec<JoinDescriptor> {
        self.joins.into_values().collect()
    }
}

fn descriptor(schema: &Schema, entity: &EntitySchema, step: &Step) -> Result<JoinDescriptor> {
    let target = step.relation.target_schema(schema)?;

    Ok(match &step.relation {
        Relation::Collection(rel) => JoinDescriptor {
            kind: JoinKind::Collection,
            table: target.table.clone(),
            target_entity: target.name.clone(),
            alias: collection_alias(&rel.name),
            source_qualifier: BASE_ALIAS.to_string(),
            source_column: entity.primary_key().column.clone(),
            target_column: rel.foreign_key.clone(),
            nested: Vec::new(),
        },
        Relation::Reference(rel) => JoinDescriptor {
            kind: JoinKind::Reference,
            table: target.table.clone(),
            target_entity: target.name.clone(),
            alias: rel.alias.clone(),
            source_qualifier: BASE_ALIAS.to_string(),
            source_column: rel.source_column.clone(),
            target_column: rel.target_column.clone(),
            nested: Vec::new(),
        },
    })
}

/// A reference reachable through a collection joins through the collection's
/// alias, so two-hop paths cost exactly one extra join.
fn nested_descriptor(
    schema: &Schema,
    collection_step: &Step,
    reference_step: &Step,
) -> Result<JoinDescriptor> {
    let collection = collection_step.relation.expect_collection();
    let reference = reference_step.relation.expect_reference();
    let target = reference_step.relation.target_schema(schema)?;

    Ok(JoinDescriptor {
        kind: JoinKind::Reference,
        table: target.table.clone(),
        target_entity: target.name.clone(),
        alias: reference.alias.clone(),
        source_qualifier: collection_alias(&collection.name),
        source_column: reference.source_column.clone(),
        target_column: reference.target_column.clone(),
        nested: Vec::new(),
    })
}
