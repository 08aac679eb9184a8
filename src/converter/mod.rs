//! Format conversion utilities
//!
//! Conversions between the binary resource formats and editable text
//! forms:
//! - GFF (binary tree) to JSON and XML, and back
//! - 2DA (binary table) to JSON, and back
//!
//! The text forms preserve field order, struct type tags, and duplicate
//! labels, so binary to text to binary reproduces the original tree.

mod gff_json;
mod gff_xml;
mod twoda_json;

pub use gff_json::{convert_gff_to_json, convert_json_to_gff, gff_to_json, json_to_gff};
pub use gff_xml::{convert_gff_to_xml, convert_xml_to_gff, gff_to_xml, xml_to_gff};
pub use twoda_json::{convert_json_to_twoda, convert_twoda_to_json, json_to_twoda, twoda_to_json};
