//! ERF/MOD archive container format
//!
//! Packs named, typed resources (usually GFF buffers) into a flat archive
//! with a key table and offset table; used for save games and modules.

mod reader;
mod types;
mod writer;

// Public API
pub use reader::ErfReader;
pub use types::{ErfEntry, ErfFileType, ErfResource, KEY_RESREF_LEN};
pub use writer::ErfWriter;
