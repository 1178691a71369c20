mod builder;
pub use builder::QueryCompiler;

mod coerce;
pub use coerce::{coerce, Coerced};

pub mod expr;
pub use expr::{CompiledExpression, ExprCompiler};

pub mod join;
pub use join::{JoinDescriptor, JoinKind, JoinPlan};

mod flavor;
pub use flavor::Flavor;

pub mod resolve;
pub use resolve::{PathResolver, Resolution, BASE_ALIAS};

mod serializer;
pub use serializer::{Params, Serializer};

pub mod stmt;
