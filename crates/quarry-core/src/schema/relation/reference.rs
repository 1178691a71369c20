/// Many-to-one link from an entity (or a collection element) to another
/// entity's row.
#[derive(Debug, Clone)]
pub struct Reference {
    /// Caller-chosen alias; also the join alias in generated SQL
    pub alias: String,

    /// Target entity name
    pub target: String,

    /// Column on the owning table holding the key
    pub source_column: String,

    /// Column on the target table being pointed at
    pub target_column: String,
}
