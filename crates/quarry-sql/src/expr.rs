use crate::{
    coerce::{coerce, Coerced},
    resolve::PathResolver,
    Flavor,
};

use quarry_core::{
    driver::Param,
    filter::{Compound, FilterNode, FilterOp, Leaf},
    schema::{EntitySchema, Schema},
    stmt::{Type, Value},
    Error, Result,
};

use std::sync::atomic::{AtomicU64, Ordering::Relaxed};

/// Parameter names embed a process-wide monotonic counter, so every
/// compilation produces fresh names while the SQL shape and bound values
/// stay identical for identical input.
static PARAM_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A compiled SQL fragment with its named parameter bindings.
///
/// Every parameter name referenced in the text has exactly one binding, and
/// names are unique across the whole compiled tree.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    pub sql: String,
    pub params: Vec<Param>,
}

/// Compiles a filter criteria tree into SQL fragments.
#[derive(Debug)]
pub struct ExprCompiler<'a> {
    schema: &'a Schema,
    entity: &'a EntitySchema,
    resolver: &'a PathResolver,
    flavor: Flavor,
}

impl<'a> ExprCompiler<'a> {
    pub fn new(
        schema: &'a Schema,
        entity: &'a EntitySchema,
        resolver: &'a PathResolver,
        flavor: Flavor,
    ) -> Self {
        Self {
            schema,
            entity,
            resolver,
            flavor,
        }
    }

    pub fn compile(&self, node: &FilterNode) -> Result<CompiledExpression> {
        match node {
            FilterNode::Leaf(leaf) => self.compile_leaf(leaf),
            FilterNode::Compound(compound) => self.compile_compound(compound),
        }
    }

    fn compile_compound(&self, compound: &Compound) -> Result<CompiledExpression> {
        // An empty grouping is always true rather than an error
        if compound.children.is_empty() {
            return Ok(CompiledExpression {
                sql: "1=1".to_string(),
                params: Vec::new(),
            });
        }

        let mut fragments = Vec::with_capacity(compound.children.len());
        let mut params = Vec::new();
        for child in &compound.children {
            let compiled = self.compile(child)?;
            fragments.push(compiled.sql);
            params.extend(compiled.params);
        }

        let joined = fragments.join(compound.logic.as_sql());
        let sql = if fragments.len() > 1 {
            format!("({joined})")
        } else {
            joined
        };

        Ok(CompiledExpression { sql, params })
    }

    fn compile_leaf(&self, leaf: &Leaf) -> Result<CompiledExpression> {
        let resolution = self.resolver.resolve(self.schema, self.entity, &leaf.field)?;
        let property = resolution.expect_property(&leaf.field)?;
        let column = format!("{}.{}", resolution.qualifier(), property.column);
        let name = param_name(&leaf.field);

        match leaf.op {
            FilterOp::Eq
            | FilterOp::Ne
            | FilterOp::Gt
            | FilterOp::Lt
            | FilterOp::Gte
            | FilterOp::Lte => {
                let coerced = coerce(leaf.value.clone(), property.ty)?;
                let placeholder = self.placeholder(&name, &coerced, property.ty);
                Ok(CompiledExpression {
                    sql: format!("{column} {} {placeholder}", comparison_op(leaf.op)),
                    params: vec![Param::new(name, coerced.value)],
                })
            }
            FilterOp::Like => {
                let text = match &leaf.value {
                    Value::String(v) => v.clone(),
                    other => other.render(),
                };
                Ok(CompiledExpression {
                    sql: format!("LOWER({column}) LIKE LOWER(:{name})"),
                    params: vec![Param::new(name, format!("{text}%"))],
                })
            }
            FilterOp::EqIgnoreCase => {
                let coerced = coerce(leaf.value.clone(), Type::Text)?;
                Ok(CompiledExpression {
                    sql: format!("LOWER({column}) = LOWER(:{name})"),
                    params: vec![Param::new(name, coerced.value)],
                })
            }
            FilterOp::Between => self.compile_between(leaf, &column, &name, property.ty),
            FilterOp::In => self.compile_in(leaf, &column, &name, property.ty),
            FilterOp::Overlaps => self.compile_overlap(leaf, &column, &name, property.ty),
            FilterOp::IsNull => Ok(CompiledExpression {
                sql: format!("{column} IS NULL"),
                params: Vec::new(),
            }),
            FilterOp::IsNotNull => Ok(CompiledExpression {
                sql: format!("{column} IS NOT NULL"),
                params: Vec::new(),
            }),
        }
    }

    fn compile_between(
        &self,
        leaf: &Leaf,
        column: &str,
        name: &str,
        ty: Type,
    ) -> Result<CompiledExpression> {
        let Value::List(bounds) = &leaf.value else {
            return Err(between_arity_error(&leaf.field));
        };
        let [low, high] = &bounds[..] else {
            return Err(between_arity_error(&leaf.field));
        };

        let low = coerce(low.clone(), ty)?;
        let high = coerce(high.clone(), ty)?;

        let from_name = format!("{name}_from");
        let to_name = format!("{name}_to");
        let from_placeholder = self.placeholder(&from_name, &low, ty);
        let to_placeholder = self.placeholder(&to_name, &high, ty);

        Ok(CompiledExpression {
            sql: format!("{column} BETWEEN {from_placeholder} AND {to_placeholder}"),
            params: vec![
                Param::new(from_name, low.value),
                Param::new(to_name, high.value),
            ],
        })
    }

    fn compile_in(
        &self,
        leaf: &Leaf,
        column: &str,
        name: &str,
        ty: Type,
    ) -> Result<CompiledExpression> {
        let items = list_value(leaf);
        if items.is_empty() {
            // Membership in an empty list matches nothing
            return Ok(CompiledExpression {
                sql: "1=0".to_string(),
                params: Vec::new(),
            });
        }

        if self.flavor.capability().array_binding {
            let coerced = coerce(Value::List(items), ty)?;
            let placeholder = self.array_placeholder(name, &coerced, ty);
            return Ok(CompiledExpression {
                sql: format!("{column} = ANY({placeholder})"),
                params: vec![Param::new(name, coerced.value)],
            });
        }

        // Without array binding, expand to one parameter per element
        let mut placeholders = Vec::with_capacity(items.len());
        let mut params = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let coerced = coerce(item, ty)?;
            let item_name = format!("{name}_{index}");
            placeholders.push(format!(":{item_name}"));
            params.push(Param::new(item_name, coerced.value));
        }

        Ok(CompiledExpression {
            sql: format!("{column} IN ({})", placeholders.join(", ")),
            params,
        })
    }

    fn compile_overlap(
        &self,
        leaf: &Leaf,
        column: &str,
        name: &str,
        ty: Type,
    ) -> Result<CompiledExpression> {
        if !self.flavor.capability().array_overlap {
            return Err(Error::invalid_filter_criteria(format!(
                "operator `ao` on `{}` is not supported by this database flavor",
                leaf.field
            )));
        }

        let coerced = coerce(Value::List(list_value(leaf)), ty)?;
        let placeholder = self.array_placeholder(name, &coerced, ty);
        Ok(CompiledExpression {
            sql: format!("{column} && {placeholder}"),
            params: vec![Param::new(name, coerced.value)],
        })
    }

    /// A scalar placeholder, cast when the bound value was parsed from text
    /// into a temporal type. The same column may be compared against a
    /// natively-typed value in one call and a string-derived value in
    /// another, so the cast has to be explicit in the SQL.
    fn placeholder(&self, name: &str, coerced: &Coerced, ty: Type) -> String {
        if self.needs_cast(coerced, ty) {
            format!("CAST(:{name} AS {})", temporal_sql_type(ty))
        } else {
            format!(":{name}")
        }
    }

    fn array_placeholder(&self, name: &str, coerced: &Coerced, ty: Type) -> String {
        if self.needs_cast(coerced, ty) {
            format!("CAST(:{name} AS {}[])", temporal_sql_type(ty))
        } else {
            format!(":{name}")
        }
    }

    fn needs_cast(&self, coerced: &Coerced, ty: Type) -> bool {
        coerced.from_text && ty.is_temporal() && self.flavor.capability().cast_temporal_params
    }
}

/// Operators whose value is a list accept a scalar as a one-element list.
fn list_value(leaf: &Leaf) -> Vec<Value> {
    match &leaf.value {
        Value::List(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn between_arity_error(field: &str) -> Error {
    Error::invalid_filter_criteria(format!(
        "operator `between` on `{field}` requires exactly two values"
    ))
}

fn comparison_op(op: FilterOp) -> &'static str {
    match op {
        FilterOp::Eq => "=",
        FilterOp::Ne => "<>",
        FilterOp::Gt => ">",
        FilterOp::Lt => "<",
        FilterOp::Gte => ">=",
        FilterOp::Lte => "<=",
        _ => unreachable!("not a comparison operator: {op:?}"),
    }
}

fn temporal_sql_type(ty: Type) -> &'static str {
    match ty {
        Type::Date => "DATE",
        Type::DateTime => "TIMESTAMP",
        Type::Timestamp => "TIMESTAMPTZ",
        _ => unreachable!("not a temporal type: {ty:?}"),
    }
}

/// Derives a parameter name from a field path: dots become underscores, any
/// other non-identifier character is dropped, and the process-wide counter
/// keeps names unique.
fn param_name(field: &str) -> String {
    let sanitized: String = field
        .chars()
        .map(|c| if c == '.' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    let n = PARAM_COUNTER.fetch_add(1, Relaxed);
    format!("{sanitized}_{n}")
}
