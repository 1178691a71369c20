use super::FilterNode;
use crate::stmt::Direction;

use serde::{Deserialize, Serialize};

/// A complete query request: filters, pagination, and sort.
///
/// Top-level filters are implicitly ANDed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryRequest {
    pub filters: Vec<FilterNode>,

    pub page: u64,

    pub size: u64,

    pub sort_field: String,

    pub sort_direction: Direction,

    /// When set, no LIMIT/OFFSET is rendered; sort is still honored.
    pub unpaged: bool,
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            page: 0,
            size: 20,
            sort_field: "id".to_string(),
            sort_direction: Direction::Asc,
            unpaged: false,
        }
    }
}

impl QueryRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, node: impl Into<FilterNode>) -> Self {
        self.filters.push(node.into());
        self
    }

    pub fn page(mut self, page: u64) -> Self {
        self.page = page;
        self
    }

    pub fn size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort_field = field.into();
        self.sort_direction = direction;
        self
    }

    pub fn unpaged(mut self) -> Self {
        self.unpaged = true;
        self
    }

    pub fn offset(&self) -> u64 {
        self.page * self.size
    }
}
