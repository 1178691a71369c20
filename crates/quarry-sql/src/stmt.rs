mod select;
pub use select::{OrderBy, Paging, Returning, Select, SelectColumn};
