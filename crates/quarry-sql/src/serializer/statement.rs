use super::{Comma, Formatter, Ident, Params, ToSql};

use crate::{
    expr::CompiledExpression,
    join::{JoinDescriptor, JoinKind},
    resolve::BASE_ALIAS,
    stmt::{OrderBy, Paging, Returning, Select, SelectColumn},
};

impl ToSql for &Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let returning = &self.returning;
        fmt!(f, "SELECT " returning " FROM " Ident(&self.table) " AS " BASE_ALIAS);

        for join in &self.joins {
            fmt!(f, join);
        }

        if let Some(filter) = &self.filter {
            fmt!(f, " WHERE " filter);
        }

        if let Some(order_by) = &self.order_by {
            fmt!(f, order_by);
        }

        if let Some(paging) = &self.paging {
            fmt!(f, paging);
        }
    }
}

impl ToSql for &Returning {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Returning::Base => fmt!(f, "DISTINCT " BASE_ALIAS ".*"),
            Returning::CountDistinct { column } => {
                fmt!(f, "COUNT(DISTINCT " BASE_ALIAS "." Ident(column) ")")
            }
            Returning::BaseWith(columns) => {
                fmt!(f, "DISTINCT " BASE_ALIAS ".*");
                if !columns.is_empty() {
                    fmt!(f, ", " Comma(columns));
                }
            }
        }
    }
}

impl ToSql for &SelectColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, Ident(&self.qualifier) "." Ident(&self.column) " AS " Ident(&self.alias));
    }
}

impl ToSql for &JoinDescriptor {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, " LEFT JOIN " Ident(&self.table) " AS " Ident(&self.alias) " ON ");

        match self.kind {
            // target.reverse_fk = base.pk
            JoinKind::Collection => fmt!(
                f,
                Ident(&self.alias) "." Ident(&self.target_column)
                " = "
                Ident(&self.source_qualifier) "." Ident(&self.source_column)
            ),
            // source.fk = target.key
            JoinKind::Reference => fmt!(
                f,
                Ident(&self.source_qualifier) "." Ident(&self.source_column)
                " = "
                Ident(&self.alias) "." Ident(&self.target_column)
            ),
        }

        for nested in &self.nested {
            fmt!(f, nested);
        }
    }
}

/// A compiled WHERE fragment carries its own placeholders; serializing it
/// copies the text and registers the bindings, in order.
impl ToSql for &CompiledExpression {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        f.dst.push_str(&self.sql);
        for param in &self.params {
            f.params.push(param);
        }
    }
}

impl ToSql for &OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(
            f,
            " ORDER BY " Ident(&self.qualifier) "." Ident(&self.column)
            " " self.direction.as_sql()
        );
    }
}

impl ToSql for &Paging {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, " LIMIT " self.limit " OFFSET " self.offset);
    }
}
