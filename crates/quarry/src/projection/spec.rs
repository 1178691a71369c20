use super::Expr;

use quarry_core::{
    schema::{EntitySchema, Relation},
    Result,
};

/// A caller-declared output shape, distinct from the stored entity shape.
#[derive(Debug, Clone, Default)]
pub struct ProjectionSpec {
    pub fields: Vec<FieldSpec>,
}

/// One named field of a target shape.
#[derive(Debug, Clone)]
pub enum FieldSpec {
    /// Mapped to a column by the name-transliteration convention
    /// (mixed-case field name to separator-delimited column name).
    Direct { name: String },

    /// Computed from an expression: a property path, reference-field access,
    /// or arithmetic/conditional over already-materialized scalars.
    Derived { name: String, expr: Expr },

    /// A collection of child shapes loaded through a secondary query,
    /// optionally projected per element.
    Collection {
        name: String,
        relation: String,
        element: Option<Box<ProjectionSpec>>,
    },
}

impl ProjectionSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn direct(mut self, name: impl Into<String>) -> Self {
        self.fields.push(FieldSpec::Direct { name: name.into() });
        self
    }

    /// Declare a computed field. The expression parses eagerly, so a bad
    /// expression fails at spec construction rather than per row.
    pub fn derived(mut self, name: impl Into<String>, expression: &str) -> Result<Self> {
        let expr = Expr::parse(expression)?;
        self.fields.push(FieldSpec::Derived {
            name: name.into(),
            expr,
        });
        Ok(self)
    }

    pub fn collection(self, name: impl Into<String>, relation: impl Into<String>) -> Self {
        self.collection_with(name, relation, None)
    }

    /// A collection field with a per-element shape.
    pub fn collection_of(
        self,
        name: impl Into<String>,
        relation: impl Into<String>,
        element: ProjectionSpec,
    ) -> Self {
        self.collection_with(name, relation, Some(Box::new(element)))
    }

    fn collection_with(
        mut self,
        name: impl Into<String>,
        relation: impl Into<String>,
        element: Option<Box<ProjectionSpec>>,
    ) -> Self {
        self.fields.push(FieldSpec::Collection {
            name: name.into(),
            relation: relation.into(),
            element,
        });
        self
    }

    /// The nested paths that require joins in the primary select: derived
    /// fields whose whole expression is a path through a reference
    /// relationship. Collection fields load through secondary queries and
    /// computed expressions read materialized scalars, so neither needs a
    /// join.
    pub fn join_paths(&self, entity: &EntitySchema) -> Vec<String> {
        let mut paths = Vec::new();

        for field in &self.fields {
            let FieldSpec::Derived { expr, .. } = field else {
                continue;
            };
            let Some(segments) = expr.as_path() else {
                continue;
            };
            let Some(first) = segments.first() else {
                continue;
            };
            if let Some(Relation::Reference(_)) = entity.relation(first) {
                paths.push(segments.join("."));
            }
        }

        paths
    }
}
