use crate::{expr::CompiledExpression, join::JoinDescriptor};

use quarry_core::stmt::Direction;

/// A SELECT (or COUNT) over one base table plus its join plan.
///
/// The base table is always aliased `base`. SELECT and COUNT both deduplicate
/// on the base row, because collection joins can multiply base rows.
#[derive(Debug)]
pub struct Select {
    /// Base table name
    pub table: String,

    pub returning: Returning,

    pub joins: Vec<JoinDescriptor>,

    /// Omitted entirely when the request carries no filters
    pub filter: Option<CompiledExpression>,

    pub order_by: Option<OrderBy>,

    /// Omitted when the request is unpaged
    pub paging: Option<Paging>,
}

/// What the statement selects.
#[derive(Debug)]
pub enum Returning {
    /// `DISTINCT base.*`
    Base,

    /// `COUNT(DISTINCT base.<pk>)`
    CountDistinct { column: String },

    /// `DISTINCT base.*` plus aliased joined columns, for projection reads
    BaseWith(Vec<SelectColumn>),
}

/// One additional aliased column in a projection SELECT.
#[derive(Debug)]
pub struct SelectColumn {
    pub qualifier: String,
    pub column: String,
    pub alias: String,
}

#[derive(Debug)]
pub struct OrderBy {
    pub qualifier: String,
    pub column: String,
    pub direction: Direction,
}

#[derive(Debug)]
pub struct Paging {
    pub limit: u64,
    pub offset: u64,
}
