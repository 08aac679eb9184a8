//! Types for ERF archive handling

use crate::formats::common::ResourceType;

/// Maximum encoded length of a resref in an ERF key entry.
pub const KEY_RESREF_LEN: usize = 16;

/// Archive flavor, selecting the 8-byte signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErfFileType {
    /// Generic archive, also used for save games (`"ERF V1.0"`).
    Erf,
    /// Module archive (`"MOD V1.0"`).
    Mod,
}

impl ErfFileType {
    #[must_use]
    pub fn signature(self) -> &'static [u8; 8] {
        match self {
            ErfFileType::Erf => b"ERF V1.0",
            ErfFileType::Mod => b"MOD V1.0",
        }
    }

    /// Match a signature read from disk.
    #[must_use]
    pub fn from_signature(signature: &[u8; 8]) -> Option<Self> {
        match signature {
            b"ERF V1.0" => Some(ErfFileType::Erf),
            b"MOD V1.0" => Some(ErfFileType::Mod),
            _ => None,
        }
    }
}

/// One named, typed blob to be packed into (or read out of) an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErfResource {
    /// Resource name; lowercased and NUL-padded to 16 bytes in the key table.
    pub res_ref: String,
    /// Resource type stored in the key entry.
    pub res_type: ResourceType,
    /// Raw resource bytes, typically a GFF-encoded buffer.
    pub data: Vec<u8>,
}

impl ErfResource {
    #[must_use]
    pub fn new(res_ref: impl Into<String>, res_type: ResourceType, data: Vec<u8>) -> Self {
        Self {
            res_ref: res_ref.into(),
            res_type,
            data,
        }
    }
}

/// Key-table entry as listed by the reader, without the blob itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErfEntry {
    pub res_ref: String,
    /// Raw numeric type id; may be outside the known [`ResourceType`] set.
    pub type_id: u16,
    /// Blob size in bytes.
    pub size: u32,
}
