// Result-side types shared by every backend:
// - row: one row with column names shared across the result set
// - result_set: the client-buffered active result and its forward-only cursor
// - rows: owning iterator over a result detached from the adapter

pub mod result_set;
pub mod row;
pub mod rows;

// Re-export the public API
pub use result_set::ResultSet;
pub use row::Row;
pub use rows::Rows;
