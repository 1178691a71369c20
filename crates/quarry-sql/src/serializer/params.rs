use quarry_core::driver::Param;

/// Sink for parameter bindings gathered while serializing a statement.
///
/// Bindings land in the order their placeholders appear in the SQL text, so
/// drivers speaking a positional protocol can bind by index.
pub trait Params {
    fn push(&mut self, param: &Param);
}

impl Params for Vec<Param> {
    fn push(&mut self, param: &Param) {
        self.push(param.clone());
    }
}
