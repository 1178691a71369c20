mod capability;
pub use capability::Capability;

mod row;
pub use row::Row;

mod statement;
pub use statement::{Param, SqlStatement};

use crate::{async_trait, Result};

use std::fmt::Debug;

/// Executes parameterized SQL against the relational engine.
///
/// This is the only thing the core needs from the database layer. Execution
/// is a blocking call from the caller's perspective (awaited inline); the
/// core adds no concurrency, cancellation, or timeout handling of its own.
///
/// Parameters are named; drivers speaking a positional protocol bind them in
/// the order they appear in [`SqlStatement::params`] (each name occurs in the
/// SQL text exactly once).
#[async_trait]
pub trait Executor: Debug + Send + Sync + 'static {
    /// Describes what the backing engine supports, which informs compilation.
    fn capability(&self) -> &Capability;

    /// Execute a SELECT, returning the ordered result rows.
    async fn query(&self, stmt: &SqlStatement) -> Result<Vec<Row>>;

    /// Execute a COUNT, returning the row count.
    async fn query_count(&self, stmt: &SqlStatement) -> Result<u64>;
}
