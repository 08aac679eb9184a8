//! Error types for `aurorafmt`

use thiserror::Error;

use crate::formats::common::ResourceType;

/// The error type for `aurorafmt` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A section offset or index pointed past the end of its section.
    #[error("unexpected end of {section} section")]
    UnexpectedEof {
        /// Name of the section that was exhausted.
        section: &'static str,
    },

    // ==================== GFF Format Errors ====================
    /// The resource type has no GFF signature (not a GFF-backed type).
    #[error("unsupported GFF resource type: {0:?}")]
    UnsupportedResourceType(ResourceType),

    /// The field type id in a GFF file is outside the known set.
    #[error("unsupported GFF field type: {0}")]
    UnsupportedFieldType(u32),

    /// The file does not carry the expected `" V3.2"` version tag.
    #[error("unsupported GFF version: {0:?}")]
    UnsupportedGffVersion([u8; 5]),

    /// A struct index in the file is out of range.
    #[error("invalid struct index: {0}")]
    InvalidStructIndex(u32),

    /// A field index in the file is out of range.
    #[error("invalid field index: {0}")]
    InvalidFieldIndex(u32),

    /// A label index in the file is out of range.
    #[error("invalid label index: {0}")]
    InvalidLabelIndex(u32),

    /// A struct index is referenced more than once; the struct array must
    /// form a tree, so a repeated index is a cycle.
    #[error("cyclic struct reference: {0}")]
    CyclicStructReference(u32),

    // ==================== Encoding Errors ====================
    /// A ResRef string does not fit its single-byte length prefix, or an
    /// ERF key does not fit its 16-byte slot.
    #[error("ResRef too long: {length} bytes (max {max})")]
    ResRefTooLong {
        /// Byte length of the offending string.
        length: usize,
        /// Maximum encodable length.
        max: usize,
    },

    /// A variable-length payload does not fit its 32-bit length prefix.
    #[error("{kind} value too large: {size} bytes")]
    ValueTooLarge {
        /// The field kind being encoded.
        kind: &'static str,
        /// Byte length of the offending payload.
        size: usize,
    },

    // ==================== ERF Archive Errors ====================
    /// The file does not start with a recognized ERF signature.
    #[error("invalid ERF signature: {0:?}")]
    InvalidErfSignature([u8; 8]),

    /// The requested resource is not present in the archive.
    #[error("resource not found in ERF: {0}")]
    ResourceNotFoundInErf(String),

    // ==================== 2DA Format Errors ====================
    /// The file does not start with the `2DA V2.b` signature.
    #[error("invalid 2DA signature")]
    InvalidTwoDaSignature,

    /// A tab- or NUL-terminated token ran past the end of the file.
    #[error("2DA token not terminated")]
    TwoDaUnterminatedToken,

    /// The deduplicated cell-data pool does not fit its 16-bit size field.
    #[error("2DA cell data too large: {size} bytes")]
    TwoDaDataTooLarge {
        /// Total pool size in bytes.
        size: usize,
    },

    /// A row's cells do not line up with the table's column headers.
    #[error("2DA row {row} does not match the table columns ({found} cells, {expected} columns)")]
    TwoDaRowMismatch {
        /// Index of the offending row.
        row: usize,
        /// Number of column headers.
        expected: usize,
        /// Number of cells in the row.
        found: usize,
    },

    // ==================== Converter Errors ====================
    /// A JSON/XML document does not describe a valid GFF tree or 2DA table.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// A field `type` attribute names no known field kind.
    #[error("unknown field type name: {0}")]
    UnknownFieldTypeName(String),

    /// The file extension maps to no known resource type.
    #[error("unknown resource extension: {0}")]
    UnknownResourceExtension(String),

    // ==================== Parsing Errors ====================
    /// XML parsing error.
    #[error("XML parse error: {0}")]
    XmlError(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttrError(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),
}

// Add conversion from quick_xml::events::attributes::AttrError
impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttrError(err.to_string())
    }
}

/// A specialized Result type for `aurorafmt` operations.
pub type Result<T> = std::result::Result<T, Error>;
