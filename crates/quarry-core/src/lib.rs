pub mod driver;
pub use driver::Executor;

mod error;
pub use error::Error;

pub mod filter;
pub use filter::{FilterNode, QueryRequest};

pub mod schema;
pub use schema::Schema;

pub mod stmt;

/// A Result type alias that uses Quarry's [`Error`] type.
pub type Result<T> = core::result::Result<T, Error>;

pub use async_trait::async_trait;
