mod engine;
pub use engine::Engine;

mod entity;
pub use entity::Entity;

mod page;
pub use page::Page;

pub mod projection;
pub use projection::{Projected, ProjectedRow, ProjectionSpec};

pub use quarry_core::{
    driver::Executor,
    filter::{FilterNode, FilterOp, LogicOp, QueryRequest},
    schema::{self, EntitySchema, Schema},
    stmt::{Direction, Type, Value},
    Error, Result,
};
pub use quarry_sql::Flavor;
