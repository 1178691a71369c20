#[macro_use]
mod fmt;
use fmt::ToSql;

mod delim;
use delim::Comma;

mod ident;
use ident::Ident;

mod params;
pub use params::Params;

// Fragment serializers
mod statement;

use crate::stmt::Select;

use quarry_core::driver::{Param, SqlStatement};

/// Serialize a statement to a SQL string.
#[derive(Debug)]
pub struct Serializer {
    _private: (),
}

struct Formatter<'a, T> {
    /// Where to write the serialized SQL
    dst: &'a mut String,

    /// Where to store parameter bindings
    params: &'a mut T,
}

impl Serializer {
    pub fn new() -> Self {
        Self { _private: () }
    }

    pub fn serialize(&self, stmt: &Select, params: &mut impl Params) -> String {
        let mut ret = String::new();

        let mut fmt = Formatter {
            dst: &mut ret,
            params,
        };

        stmt.to_sql(&mut fmt);

        ret.push(';');
        ret
    }

    /// Serialize into an executable statement with its bindings.
    pub fn statement(&self, stmt: &Select) -> SqlStatement {
        let mut params = Vec::<Param>::new();
        let sql = self.serialize(stmt, &mut params);
        SqlStatement::new(sql, params)
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}
