/// One-to-many link from a base entity to child rows.
#[derive(Debug, Clone)]
pub struct Collection {
    /// Segment name used in dotted paths
    pub name: String,

    /// Target entity name
    pub target: String,

    /// Column on the target table holding the base row's primary key
    pub foreign_key: String,
}
