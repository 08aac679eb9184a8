//! GFF (General File Format) binary tree serialization
//!
//! GFF is the Aurora engine's self-describing container for almost every
//! structured resource: areas, dialogs, creature/item/placeable blueprints,
//! module info, journals, save-game state. The on-disk form is a header plus
//! five flat sections cross-referenced by index.

mod document;
mod label_table;
mod reader;
mod writer;

// Public API
pub use document::{Field, FieldValue, GffStruct, ROOT_STRUCT_TYPE};
pub use reader::{parse_gff_bytes, read_gff};
pub use writer::{serialize_gff, write_gff};
