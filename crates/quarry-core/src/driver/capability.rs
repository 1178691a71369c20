/// Describes the backing engine's capability, which informs compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capability {
    /// The engine can bind a list value as a single array parameter. Engines
    /// without array binding get membership tests expanded to one parameter
    /// per element.
    pub array_binding: bool,

    /// The engine supports the array-overlap operator.
    pub array_overlap: bool,

    /// Temporal placeholders derived from text require an explicit SQL cast,
    /// because the same column may be compared against a natively-typed value
    /// in one call and a string-derived value in another.
    pub cast_temporal_params: bool,
}

impl Capability {
    pub const POSTGRESQL: Capability = Capability {
        array_binding: true,
        array_overlap: true,
        cast_temporal_params: true,
    };

    /// SQLite compares temporal values textually, so casts are unnecessary
    /// as long as bindings use the canonical ISO-8601 form.
    pub const SQLITE: Capability = Capability {
        array_binding: false,
        array_overlap: false,
        cast_temporal_params: false,
    };
}
