//! ERF archive writing
//!
//! Layout: 32-byte header, key table (24 bytes per entry), resource table
//! (8 bytes per entry), then the raw blobs in insertion order. No
//! deduplication and no compression; offsets are a running sum of prior
//! blob sizes.

use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::types::{ErfFileType, ErfResource, KEY_RESREF_LEN};
use crate::error::{Error, Result};
use crate::utils::write_atomic;

const HEADER_SIZE: u32 = 32;
const KEY_ENTRY_SIZE: u32 = 24;
const RESOURCE_ENTRY_SIZE: u32 = 8;

/// Packs named, typed blobs into an ERF/MOD archive.
#[derive(Debug, Default)]
pub struct ErfWriter {
    resources: Vec<ErfResource>,
}

impl ErfWriter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a resource. Entries are written in insertion order.
    pub fn add(&mut self, resource: ErfResource) {
        self.resources.push(resource);
    }

    /// Write the archive to disk (write-to-temp-then-rename).
    pub fn save<P: AsRef<Path>>(&self, file_type: ErfFileType, path: P) -> Result<()> {
        let bytes = self.serialize(file_type)?;
        write_atomic(path.as_ref(), &bytes)
    }

    /// Serialize the archive to bytes.
    pub fn serialize(&self, file_type: ErfFileType) -> Result<Vec<u8>> {
        // Validate every key before emitting anything
        for resource in &self.resources {
            if resource.res_ref.len() > KEY_RESREF_LEN {
                return Err(Error::ResRefTooLong {
                    length: resource.res_ref.len(),
                    max: KEY_RESREF_LEN,
                });
            }
        }

        let num_entries = self.resources.len() as u32;
        let off_keys = HEADER_SIZE;
        let off_resources = off_keys + num_entries * KEY_ENTRY_SIZE;
        let off_data = off_resources + num_entries * RESOURCE_ENTRY_SIZE;

        debug!(num_entries, ?file_type, "serializing ERF");

        let total_data: usize = self.resources.iter().map(|r| r.data.len()).sum();
        let mut output = Vec::with_capacity(off_data as usize + total_data);

        // Header
        output.extend_from_slice(file_type.signature());
        output.extend_from_slice(&[0u8; 8]);
        output.write_u32::<LittleEndian>(num_entries)?;
        output.extend_from_slice(&[0u8; 4]);
        output.write_u32::<LittleEndian>(off_keys)?;
        output.write_u32::<LittleEndian>(off_resources)?;

        // Key table
        for (id, resource) in self.resources.iter().enumerate() {
            let res_ref = resource.res_ref.to_lowercase();
            let bytes = res_ref.as_bytes();
            output.extend_from_slice(bytes);
            output.extend_from_slice(&[0u8; KEY_RESREF_LEN][bytes.len()..]);
            output.write_u32::<LittleEndian>(id as u32)?;
            output.write_u16::<LittleEndian>(resource.res_type.type_id())?;
            output.extend_from_slice(&[0u8; 2]);
        }

        // Resource table
        let mut offset = off_data;
        for resource in &self.resources {
            output.write_u32::<LittleEndian>(offset)?;
            output.write_u32::<LittleEndian>(resource.data.len() as u32)?;
            offset += resource.data.len() as u32;
        }

        // Blob data
        for resource in &self.resources {
            output.extend_from_slice(&resource.data);
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::common::ResourceType;

    #[test]
    fn test_two_entry_layout() {
        let mut writer = ErfWriter::new();
        writer.add(ErfResource::new(
            "SaveNfo",
            ResourceType::Res,
            vec![1, 2, 3],
        ));
        writer.add(ErfResource::new(
            "module",
            ResourceType::Ifo,
            vec![4, 5, 6, 7],
        ));
        let bytes = writer.serialize(ErfFileType::Erf).unwrap();

        assert_eq!(&bytes[0..8], b"ERF V1.0");
        assert_eq!(bytes[16..20], 2u32.to_le_bytes());
        assert_eq!(bytes[24..28], 32u32.to_le_bytes()); // keys at 32
        assert_eq!(bytes[28..32], 80u32.to_le_bytes()); // resources at 32 + 2*24

        // First key: lowercased resref, id 0, type id
        assert_eq!(&bytes[32..48], b"savenfo\0\0\0\0\0\0\0\0\0");
        assert_eq!(bytes[48..52], 0u32.to_le_bytes());
        assert_eq!(bytes[52..54], 0u16.to_le_bytes());

        // Second key
        assert_eq!(&bytes[56..72], b"module\0\0\0\0\0\0\0\0\0\0");
        assert_eq!(bytes[72..76], 1u32.to_le_bytes());
        assert_eq!(
            bytes[76..78],
            ResourceType::Ifo.type_id().to_le_bytes()
        );

        // Resource table: data starts at 80 + 2*8 = 96
        assert_eq!(bytes[80..84], 96u32.to_le_bytes());
        assert_eq!(bytes[84..88], 3u32.to_le_bytes());
        assert_eq!(bytes[88..92], 99u32.to_le_bytes());
        assert_eq!(bytes[92..96], 4u32.to_le_bytes());

        assert_eq!(&bytes[96..], &[1, 2, 3, 4, 5, 6, 7]);
    }

    #[test]
    fn test_empty_archive() {
        let bytes = ErfWriter::new().serialize(ErfFileType::Mod).unwrap();
        assert_eq!(&bytes[0..8], b"MOD V1.0");
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[16..20], 0u32.to_le_bytes());
    }

    #[test]
    fn test_res_ref_too_long_for_key() {
        let mut writer = ErfWriter::new();
        writer.add(ErfResource::new(
            "a_resref_name_that_overflows",
            ResourceType::Res,
            Vec::new(),
        ));
        let err = writer.serialize(ErfFileType::Erf).unwrap_err();
        assert!(matches!(err, Error::ResRefTooLong { max: 16, .. }));
    }
}
