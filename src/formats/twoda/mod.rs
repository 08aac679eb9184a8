//! 2DA tabular data format
//!
//! Fixed-schema tables (item stats, appearance rows, ...) stored as a
//! deduplicated string pool with per-cell offsets.

mod document;
mod reader;
mod writer;

// Public API
pub use document::{TwoDaRow, TwoDaTable, EMPTY_CELL};
pub use reader::{parse_twoda_bytes, read_twoda};
pub use writer::{serialize_twoda, write_twoda};
