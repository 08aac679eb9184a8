//! # aurorafmt
//!
//! A pure-Rust library for working with BioWare Aurora engine (KotOR) file
//! formats.
//!
//! ## Supported Formats
//!
//! - **GFF** - The self-describing binary tree format behind areas, dialogs,
//!   blueprints, module info, and save-game state
//! - **ERF/MOD archives** - Named, typed resource bundles used for save
//!   games and modules
//! - **2DA** - Binary tabular data with a deduplicated string pool
//! - **JSON/XML** - Editable text forms of GFF trees and 2DA tables
//!
//! ## Quick Start
//!
//! ### Building and Saving a GFF Resource
//!
//! ```no_run
//! use aurorafmt::formats::common::ResourceType;
//! use aurorafmt::formats::gff::{self, Field, GffStruct};
//!
//! let mut root = GffStruct::root();
//! root.add(Field::new_string("Tag", "door_01"));
//! root.add(Field::new_loc_string("LocName", 1234, "Rusty Door"));
//!
//! gff::write_gff(&root, ResourceType::Utp, "door_01.utp")?;
//! let back = gff::read_gff("door_01.utp")?;
//! assert_eq!(back.get_string("Tag"), Some("door_01"));
//! # Ok::<(), aurorafmt::Error>(())
//! ```
//!
//! ### Converting to Editable Text
//!
//! ```no_run
//! use aurorafmt::converter::convert_gff_to_json;
//!
//! convert_gff_to_json("door_01.utp", "door_01.json")?;
//! # Ok::<(), aurorafmt::Error>(())
//! ```
//!
//! ### Using the Prelude
//!
//! ```
//! use aurorafmt::prelude::*;
//!
//! // Now you have access to:
//! // - GffStruct, Field, FieldValue, ResourceType
//! // - ErfReader, ErfWriter, TwoDaTable
//! // - Error, Result, and more
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` - Enables the `aurorafmt` command-line binary

pub mod converter;
pub mod error;
pub mod formats;
pub mod utils;

#[cfg(feature = "cli")]
pub mod cli;

pub use error::{Error, Result};

/// Commonly used types, re-exported for convenience.
pub mod prelude {
    pub use crate::converter::{
        convert_gff_to_json, convert_gff_to_xml, convert_json_to_gff, convert_json_to_twoda,
        convert_twoda_to_json, convert_xml_to_gff,
    };
    pub use crate::error::{Error, Result};
    pub use crate::formats::common::ResourceType;
    pub use crate::formats::erf::{ErfFileType, ErfReader, ErfResource, ErfWriter};
    pub use crate::formats::gff::{
        parse_gff_bytes, read_gff, serialize_gff, write_gff, Field, FieldValue, GffStruct,
        ROOT_STRUCT_TYPE,
    };
    pub use crate::formats::twoda::{
        parse_twoda_bytes, read_twoda, serialize_twoda, write_twoda, TwoDaRow, TwoDaTable,
        EMPTY_CELL,
    };
}
