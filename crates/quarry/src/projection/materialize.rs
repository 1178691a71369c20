use super::{FieldSpec, Projected, ProjectedRow, ProjectionSpec};

use quarry_core::{
    bail,
    driver::{Executor, Param, Row},
    err,
    schema::{EntitySchema, Relation, Schema},
    stmt::Value,
    Error, Result,
};
use quarry_sql::{
    coerce,
    expr::CompiledExpression,
    join::JoinDescriptor,
    stmt::{Returning, Select, SelectColumn},
    Serializer, BASE_ALIAS,
};

use heck::ToSnakeCase;
use std::{collections::HashMap, sync::Arc};
use tracing::debug;

/// Maps result rows into a caller-declared target shape.
///
/// One materializer lives for one page of results. Collection fields load
/// through secondary queries issued inline per row; results are cached by
/// (entity, relationship, parent id) so repeated parents, or two fields
/// needing the same collection, never re-query.
pub(crate) struct Materializer<'a> {
    schema: &'a Schema,
    executor: &'a dyn Executor,
    cache: HashMap<(String, String, String), Arc<Vec<ProjectedRow>>>,
}

impl<'a> Materializer<'a> {
    pub(crate) fn new(schema: &'a Schema, executor: &'a dyn Executor) -> Self {
        Self {
            schema,
            executor,
            cache: HashMap::new(),
        }
    }

    pub(crate) async fn materialize(
        &mut self,
        row: &Row,
        entity: &EntitySchema,
        spec: &ProjectionSpec,
    ) -> Result<ProjectedRow> {
        let mut out = ProjectedRow::new();

        for field in &spec.fields {
            match field {
                FieldSpec::Direct { name } => {
                    if let Some(value) = direct_value(row, entity, name) {
                        out.insert(name.clone(), Projected::Scalar(value));
                    }
                }
                FieldSpec::Derived { name, expr } => {
                    if let Some(segments) = expr.as_path() {
                        if let Some(projected) =
                            self.materialize_path(row, entity, segments).await?
                        {
                            out.insert(name.clone(), projected);
                        }
                    } else {
                        // Computed expressions read already-materialized
                        // scalars, falling back to base row properties
                        let value = expr.eval(&|key| scalar_lookup(&out, row, entity, key))?;
                        if !value.is_null() {
                            out.insert(name.clone(), Projected::Scalar(value));
                        }
                    }
                }
                FieldSpec::Collection {
                    name,
                    relation,
                    element,
                } => {
                    let elements = self.load_collection(row, entity, relation).await?;
                    let items = match element {
                        Some(spec) => elements
                            .iter()
                            .map(|element| project_element(element, spec))
                            .collect::<Result<Vec<_>>>()?,
                        None => elements.iter().cloned().collect(),
                    };
                    out.insert(
                        name.clone(),
                        Projected::Many(items.into_iter().map(Projected::Record).collect()),
                    );
                }
            }
        }

        Ok(out)
    }

    /// A derived field whose whole expression is a property path.
    async fn materialize_path(
        &mut self,
        row: &Row,
        entity: &EntitySchema,
        segments: &[String],
    ) -> Result<Option<Projected>> {
        let (first, rest) = segments.split_first().expect("paths are non-empty");

        if rest.is_empty() {
            if entity.property(first).is_some() {
                return Ok(direct_value(row, entity, first).map(Projected::Scalar));
            }

            return match entity.relation(first) {
                Some(Relation::Collection(_)) => {
                    let elements = self.load_collection(row, entity, first).await?;
                    Ok(Some(Projected::Many(
                        elements.iter().cloned().map(Projected::Record).collect(),
                    )))
                }
                Some(Relation::Reference(reference)) => {
                    let target = self.schema.entity(&reference.target)?;
                    Ok(reference_record(row, target, &reference.alias).map(Projected::Record))
                }
                None => Err(Error::property_not_found(&entity.name, first)),
            };
        }

        match entity.relation(first) {
            Some(Relation::Reference(reference)) => {
                let [property_name] = rest else {
                    return Err(err!(
                        "path `{}` chains references deeper than one hop",
                        segments.join(".")
                    ));
                };
                let target = self.schema.entity(&reference.target)?;
                let property = target.property(property_name).ok_or_else(|| {
                    Error::property_not_found(&entity.name, segments.join("."))
                })?;

                // Read from the aliased column the projection select added
                let column = format!("{}__{}", reference.alias, property.column);
                match row.get(&column) {
                    None | Some(Value::Null) => Ok(None),
                    Some(value) => Ok(Some(Projected::Scalar(
                        coerce(value.clone(), property.ty)?.value,
                    ))),
                }
            }
            Some(Relation::Collection(_)) => {
                let elements = self.load_collection(row, entity, first).await?;
                let mut items = Vec::new();
                for element in elements.iter() {
                    if let Some(projected) = element_path(element, rest) {
                        items.push(projected);
                    }
                }
                Ok(Some(Projected::Many(items)))
            }
            None if entity.property(first).is_some() => Err(Error::invalid_filter_criteria(
                format!(
                    "path `{}` traverses `{first}`, which is neither a collection nor a reference relationship",
                    segments.join(".")
                ),
            )),
            None => Err(Error::property_not_found(&entity.name, segments.join("."))),
        }
    }

    /// Load a collection's elements for one parent row, through the
    /// per-pass cache.
    async fn load_collection(
        &mut self,
        row: &Row,
        entity: &EntitySchema,
        relation_name: &str,
    ) -> Result<Arc<Vec<ProjectedRow>>> {
        let collection = match entity.relation(relation_name) {
            Some(Relation::Collection(collection)) => collection,
            Some(Relation::Reference(_)) => bail!(
                "`{relation_name}` on `{}` is a reference, not a collection",
                entity.name
            ),
            None => return Err(Error::property_not_found(&entity.name, relation_name)),
        };

        let pk_column = &entity.primary_key().column;
        let parent_id = match row.get(pk_column) {
            Some(value) if !value.is_null() => value.clone(),
            _ => bail!(
                "row is missing primary key `{pk_column}`, required to load `{relation_name}`"
            ),
        };

        let key = (
            entity.name.clone(),
            collection.name.clone(),
            parent_id.render(),
        );
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.clone());
        }

        let element_schema = self.schema.entity(&collection.target)?;
        let stmt = secondary_select(self.schema, element_schema, &collection.foreign_key, parent_id)?;
        debug!(
            entity = %entity.name,
            relation = %relation_name,
            sql = %stmt.sql,
            "loading collection"
        );

        let rows = self.executor.query(&stmt).await?;
        let mut elements = Vec::with_capacity(rows.len());
        for element in &rows {
            elements.push(element_row(self.schema, element, element_schema)?);
        }

        let elements = Arc::new(elements);
        self.cache.insert(key, elements.clone());
        Ok(elements)
    }
}

/// The secondary query for one collection: the element table filtered by the
/// parent key, with every reference the element schema declares joined in.
fn secondary_select(
    schema: &Schema,
    element_schema: &EntitySchema,
    foreign_key: &str,
    parent_id: Value,
) -> Result<quarry_core::driver::SqlStatement> {
    let mut joins = Vec::new();
    let mut columns = Vec::new();

    for relation in &element_schema.relations {
        if let Relation::Reference(reference) = relation {
            let target = schema.entity(&reference.target)?;
            joins.push(JoinDescriptor::for_reference(reference, target));
            for property in target.properties.values() {
                columns.push(SelectColumn {
                    qualifier: reference.alias.clone(),
                    column: property.column.clone(),
                    alias: format!("{}__{}", reference.alias, property.column),
                });
            }
        }
    }

    let filter = CompiledExpression {
        sql: format!("{BASE_ALIAS}.{foreign_key} = :parent_id"),
        params: vec![Param::new("parent_id", parent_id)],
    };

    let select = Select {
        table: element_schema.table.clone(),
        returning: if columns.is_empty() {
            Returning::Base
        } else {
            Returning::BaseWith(columns)
        },
        joins,
        filter: Some(filter),
        order_by: None,
        paging: None,
    };

    Ok(Serializer::new().statement(&select))
}

/// A secondary-query row transliterated into the element shape: scalar
/// properties under their property names, referenced rows nested under
/// their alias.
fn element_row(
    schema: &Schema,
    row: &Row,
    element_schema: &EntitySchema,
) -> Result<ProjectedRow> {
    let mut out = ProjectedRow::new();

    for property in element_schema.properties.values() {
        match row.get(&property.column) {
            None | Some(Value::Null) => {}
            Some(value) => {
                out.insert(
                    property.name.clone(),
                    Projected::Scalar(coerce(value.clone(), property.ty)?.value),
                );
            }
        }
    }

    for relation in &element_schema.relations {
        if let Relation::Reference(reference) = relation {
            let target = schema.entity(&reference.target)?;
            if let Some(record) = reference_record(row, target, &reference.alias) {
                out.insert(reference.alias.clone(), Projected::Record(record));
            }
        }
    }

    Ok(out)
}

/// Reconstruct a referenced row from its aliased columns. `None` when the
/// LEFT JOIN found nothing.
fn reference_record(row: &Row, target: &EntitySchema, alias: &str) -> Option<ProjectedRow> {
    let mut record = ProjectedRow::new();

    for property in target.properties.values() {
        let column = format!("{alias}__{}", property.column);
        match row.get(&column) {
            None | Some(Value::Null) => {}
            Some(value) => {
                let value = coerce(value.clone(), property.ty).ok()?.value;
                record.insert(property.name.clone(), Projected::Scalar(value));
            }
        }
    }

    if record.is_empty() {
        None
    } else {
        Some(record)
    }
}

/// Direct fields map a target field name to a column by the fixed
/// transliteration convention; a field matching a declared property uses its
/// mapping directly. Null and absent columns are omitted, not errors.
fn direct_value(row: &Row, entity: &EntitySchema, name: &str) -> Option<Value> {
    let (column, ty) = match entity.property(name) {
        Some(property) => (property.column.clone(), Some(property.ty)),
        None => (name.to_snake_case(), None),
    };

    match row.get(&column) {
        None | Some(Value::Null) => None,
        Some(value) => match ty {
            Some(ty) => coerce(value.clone(), ty).ok().map(|coerced| coerced.value),
            None => Some(value.clone()),
        },
    }
}

/// Scalar context for computed expressions: materialized fields first, then
/// base row properties.
fn scalar_lookup(out: &ProjectedRow, row: &Row, entity: &EntitySchema, key: &str) -> Option<Value> {
    if let Some(projected) = out.get(key) {
        return projected.as_scalar().cloned();
    }
    direct_value(row, entity, key)
}

/// Walk a one- or two-segment path inside an already-loaded element shape.
fn element_path(element: &ProjectedRow, path: &[String]) -> Option<Projected> {
    match path {
        [name] => element.get(name).cloned(),
        [first, second] => element
            .get(first)?
            .as_record()?
            .get(second)
            .cloned(),
        _ => None,
    }
}

/// Apply a per-element shape to a loaded element.
fn project_element(element: &ProjectedRow, spec: &ProjectionSpec) -> Result<ProjectedRow> {
    let mut out = ProjectedRow::new();

    for field in &spec.fields {
        match field {
            FieldSpec::Direct { name } => {
                if let Some(projected) = element.get(name) {
                    out.insert(name.clone(), projected.clone());
                }
            }
            FieldSpec::Derived { name, expr } => {
                if let Some(segments) = expr.as_path() {
                    if let Some(projected) = element_path(element, segments) {
                        out.insert(name.clone(), projected);
                    }
                } else {
                    let value = expr.eval(&|key| {
                        element
                            .get(key)
                            .or_else(|| out.get(key))
                            .and_then(Projected::as_scalar)
                            .cloned()
                    })?;
                    if !value.is_null() {
                        out.insert(name.clone(), Projected::Scalar(value));
                    }
                }
            }
            FieldSpec::Collection { name, .. } => {
                bail!("collection field `{name}` cannot be nested inside an element shape")
            }
        }
    }

    Ok(out)
}
