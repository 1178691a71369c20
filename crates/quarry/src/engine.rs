use crate::{
    projection::{Materializer, ProjectedRow, ProjectionSpec},
    Entity, Page,
};

use quarry_core::{
    driver::Executor,
    filter::QueryRequest,
    schema::Schema,
    Result,
};
use quarry_sql::{Flavor, PathResolver, QueryCompiler};

use async_stream::try_stream;
use futures_core::Stream;
use std::sync::Arc;

/// The query engine: compiles requests against the schema registry and runs
/// them through the executor.
///
/// Stateless per call and safe for unbounded concurrent use; the only shared
/// state is the resolver's idempotent path cache.
#[derive(Debug, Clone)]
pub struct Engine {
    schema: Arc<Schema>,
    executor: Arc<dyn Executor>,
    resolver: Arc<PathResolver>,
    flavor: Flavor,
}

impl Engine {
    pub fn new(schema: Arc<Schema>, executor: Arc<dyn Executor>, flavor: Flavor) -> Self {
        debug_assert_eq!(
            executor.capability(),
            flavor.capability(),
            "executor capability must match the compilation flavor"
        );

        Self {
            schema,
            executor,
            resolver: Arc::new(PathResolver::new()),
            flavor,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn compiler(&self) -> QueryCompiler<'_> {
        QueryCompiler::new(&self.schema, &self.resolver, self.flavor)
    }

    /// Find all entities matching the request, with the total count for
    /// paging.
    pub async fn find_all(&self, entity: &str, req: &QueryRequest) -> Result<Page<Entity>> {
        let schema = self.schema.entity(entity)?;

        let stmt = self.compiler().select(schema, req)?;
        let rows = self.executor.query(&stmt).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(Entity::from_row(row, schema)?);
        }

        let total = if req.unpaged {
            items.len() as u64
        } else {
            let count_stmt = self.compiler().count(schema, req)?;
            self.executor.query_count(&count_stmt).await?
        };

        Ok(Page::new(items, total, req.page, req.size))
    }

    /// Find at most one entity matching the request.
    pub async fn find_one(&self, entity: &str, req: &QueryRequest) -> Result<Option<Entity>> {
        let schema = self.schema.entity(entity)?;

        let stmt = self.compiler().select(schema, &single(req))?;
        let rows = self.executor.query(&stmt).await?;

        match rows.first() {
            Some(row) => Ok(Some(Entity::from_row(row, schema)?)),
            None => Ok(None),
        }
    }

    /// Count the entities matching the request.
    pub async fn count(&self, entity: &str, req: &QueryRequest) -> Result<u64> {
        let schema = self.schema.entity(entity)?;
        let stmt = self.compiler().count(schema, req)?;
        self.executor.query_count(&stmt).await
    }

    /// A lazy, forward-only, non-restartable sequence of all matching
    /// entities, used by bulk export paths. The request is forced unpaged;
    /// sort is still honored.
    pub fn find_all_as_stream(
        &self,
        entity: &str,
        req: QueryRequest,
    ) -> impl Stream<Item = Result<Entity>> + 'static {
        let schema = self.schema.clone();
        let executor = self.executor.clone();
        let resolver = self.resolver.clone();
        let flavor = self.flavor;
        let entity = entity.to_string();
        let req = QueryRequest {
            unpaged: true,
            ..req
        };

        try_stream! {
            let schema_entity = schema.entity(&entity)?;
            let compiler = QueryCompiler::new(&schema, &resolver, flavor);
            let stmt = compiler.select(schema_entity, &req)?;
            let rows = executor.query(&stmt).await?;
            for row in &rows {
                yield Entity::from_row(row, schema_entity)?;
            }
        }
    }

    /// Find all matching rows, materialized into the target shape.
    pub async fn find_all_projected(
        &self,
        entity: &str,
        req: &QueryRequest,
        spec: &ProjectionSpec,
    ) -> Result<Page<ProjectedRow>> {
        let schema = self.schema.entity(entity)?;

        let paths = spec.join_paths(schema);
        let stmt = self.compiler().projection_select(schema, req, &paths)?;
        let rows = self.executor.query(&stmt).await?;

        let mut materializer = Materializer::new(&self.schema, self.executor.as_ref());
        let mut items = Vec::with_capacity(rows.len());
        for row in &rows {
            items.push(materializer.materialize(row, schema, spec).await?);
        }

        let total = if req.unpaged {
            items.len() as u64
        } else {
            let count_stmt = self.compiler().count(schema, req)?;
            self.executor.query_count(&count_stmt).await?
        };

        Ok(Page::new(items, total, req.page, req.size))
    }

    /// Find at most one matching row, materialized into the target shape.
    pub async fn find_one_projected(
        &self,
        entity: &str,
        req: &QueryRequest,
        spec: &ProjectionSpec,
    ) -> Result<Option<ProjectedRow>> {
        let schema = self.schema.entity(entity)?;

        let paths = spec.join_paths(schema);
        let stmt = self
            .compiler()
            .projection_select(schema, &single(req), &paths)?;
        let rows = self.executor.query(&stmt).await?;

        match rows.first() {
            Some(row) => {
                let mut materializer = Materializer::new(&self.schema, self.executor.as_ref());
                Ok(Some(materializer.materialize(row, schema, spec).await?))
            }
            None => Ok(None),
        }
    }

    /// Projected variant of [`find_all_as_stream`](Self::find_all_as_stream).
    pub fn find_all_projected_as_stream(
        &self,
        entity: &str,
        req: QueryRequest,
        spec: ProjectionSpec,
    ) -> impl Stream<Item = Result<ProjectedRow>> + 'static {
        let schema = self.schema.clone();
        let executor = self.executor.clone();
        let resolver = self.resolver.clone();
        let flavor = self.flavor;
        let entity = entity.to_string();
        let req = QueryRequest {
            unpaged: true,
            ..req
        };

        try_stream! {
            let schema_entity = schema.entity(&entity)?;
            let compiler = QueryCompiler::new(&schema, &resolver, flavor);
            let paths = spec.join_paths(schema_entity);
            let stmt = compiler.projection_select(schema_entity, &req, &paths)?;
            let rows = executor.query(&stmt).await?;

            let mut materializer = Materializer::new(&schema, executor.as_ref());
            for row in &rows {
                yield materializer.materialize(row, schema_entity, &spec).await?;
            }
        }
    }
}

/// A request narrowed to one row for the find-one paths.
fn single(req: &QueryRequest) -> QueryRequest {
    QueryRequest {
        size: 1,
        page: 0,
        unpaged: false,
        ..req.clone()
    }
}
