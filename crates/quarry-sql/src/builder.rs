use crate::{
    expr::{CompiledExpression, ExprCompiler},
    join::{JoinDescriptor, JoinKind, JoinPlan},
    resolve::PathResolver,
    serializer::Serializer,
    stmt::{OrderBy, Paging, Returning, Select, SelectColumn},
    Flavor,
};

use quarry_core::{
    driver::SqlStatement,
    filter::{FilterNode, QueryRequest},
    schema::{EntitySchema, Schema},
    Result,
};

use tracing::debug;

/// Assembles SELECT, COUNT, and projection SELECT statements from entity
/// schema, join plan, compiled filter, sort, and paging.
#[derive(Debug)]
pub struct QueryCompiler<'a> {
    schema: &'a Schema,
    resolver: &'a PathResolver,
    flavor: Flavor,
}

struct Parts {
    plan: JoinPlan,
    filter: Option<CompiledExpression>,
    order_by: Option<OrderBy>,
}

impl<'a> QueryCompiler<'a> {
    pub fn new(schema: &'a Schema, resolver: &'a PathResolver, flavor: Flavor) -> Self {
        Self {
            schema,
            resolver,
            flavor,
        }
    }

    /// The statement backing a plain entity read.
    pub fn select(&self, entity: &EntitySchema, req: &QueryRequest) -> Result<SqlStatement> {
        let parts = self.compile_parts(entity, req, &[], true)?;

        let stmt = Select {
            table: entity.table.clone(),
            returning: Returning::Base,
            joins: parts.plan.into_joins(),
            filter: parts.filter,
            order_by: parts.order_by,
            paging: paging(req),
        };

        let stmt = Serializer::new().statement(&stmt);
        debug!(entity = %entity.name, sql = %stmt.sql, "compiled select");
        Ok(stmt)
    }

    /// The statement backing `count`. Sort and paging do not affect a count,
    /// so only filter joins are taken.
    pub fn count(&self, entity: &EntitySchema, req: &QueryRequest) -> Result<SqlStatement> {
        let parts = self.compile_parts(entity, req, &[], false)?;

        let stmt = Select {
            table: entity.table.clone(),
            returning: Returning::CountDistinct {
                column: entity.primary_key().column.clone(),
            },
            joins: parts.plan.into_joins(),
            filter: parts.filter,
            order_by: None,
            paging: None,
        };

        let stmt = Serializer::new().statement(&stmt);
        debug!(entity = %entity.name, sql = %stmt.sql, "compiled count");
        Ok(stmt)
    }

    /// The statement backing a projected read: the base row plus the columns
    /// of every reference joined for the projection, aliased
    /// `<alias>__<column>`.
    ///
    /// `projection_paths` are the nested paths referenced by the target
    /// shape's derived fields; their joins are unioned with the filter's.
    pub fn projection_select(
        &self,
        entity: &EntitySchema,
        req: &QueryRequest,
        projection_paths: &[String],
    ) -> Result<SqlStatement> {
        let parts = self.compile_parts(entity, req, projection_paths, true)?;

        let mut columns = Vec::new();
        for join in parts.plan.iter() {
            if join.kind == JoinKind::Reference {
                columns.extend(self.reference_columns(join)?);
            }
        }

        let stmt = Select {
            table: entity.table.clone(),
            returning: Returning::BaseWith(columns),
            joins: parts.plan.into_joins(),
            filter: parts.filter,
            order_by: parts.order_by,
            paging: paging(req),
        };

        let stmt = Serializer::new().statement(&stmt);
        debug!(entity = %entity.name, sql = %stmt.sql, "compiled projection select");
        Ok(stmt)
    }

    fn compile_parts(
        &self,
        entity: &EntitySchema,
        req: &QueryRequest,
        extra_paths: &[String],
        with_sort: bool,
    ) -> Result<Parts> {
        let root = FilterNode::and(req.filters.clone());

        let mut paths: Vec<&str> = root.leaves().iter().map(|leaf| leaf.field.as_str()).collect();
        paths.extend(extra_paths.iter().map(String::as_str));
        if with_sort {
            paths.push(req.sort_field.as_str());
        }

        let plan = JoinPlan::resolve(self.schema, entity, self.resolver, paths)?;

        let filter = if req.filters.is_empty() {
            None
        } else {
            let compiler = ExprCompiler::new(self.schema, entity, self.resolver, self.flavor);
            Some(compiler.compile(&root)?)
        };

        let order_by = if with_sort {
            let resolution = self.resolver.resolve(self.schema, entity, &req.sort_field)?;
            let property = resolution.expect_property(&req.sort_field)?;
            Some(OrderBy {
                qualifier: resolution.qualifier(),
                column: property.column.clone(),
                direction: req.sort_direction,
            })
        } else {
            None
        };

        Ok(Parts {
            plan,
            filter,
            order_by,
        })
    }

    /// All columns of a joined reference, nested under its alias.
    fn reference_columns(&self, join: &JoinDescriptor) -> Result<Vec<SelectColumn>> {
        let target = self.schema.entity(&join.target_entity)?;

        Ok(target
            .properties
            .values()
            .map(|property| SelectColumn {
                qualifier: join.alias.clone(),
                column: property.column.clone(),
                alias: format!("{}__{}", join.alias, property.column),
            })
            .collect())
    }
}

fn paging(req: &QueryRequest) -> Option<Paging> {
    if req.unpaged {
        None
    } else {
        Some(Paging {
            limit: req.size,
            offset: req.offset(),
        })
    }
}
