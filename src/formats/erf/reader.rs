//! ERF archive reading

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use super::types::{ErfEntry, ErfFileType, KEY_RESREF_LEN};
use crate::error::{Error, Result};
use crate::formats::common::ResourceType;

/// Parsed archive holding the key table and a copy of the raw file.
#[derive(Debug)]
pub struct ErfReader {
    file_type: ErfFileType,
    entries: Vec<KeyEntry>,
    data: Vec<u8>,
}

#[derive(Debug)]
struct KeyEntry {
    res_ref: String,
    type_id: u16,
    offset: u32,
    size: u32,
}

impl ErfReader {
    /// Read an archive from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        Self::from_bytes(buffer)
    }

    /// Parse an archive from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let header = data.get(..32).ok_or(Error::UnexpectedEof {
            section: "header",
        })?;

        let signature: [u8; 8] = header[0..8].try_into().unwrap();
        let file_type =
            ErfFileType::from_signature(&signature).ok_or(Error::InvalidErfSignature(signature))?;

        let num_entries = LittleEndian::read_u32(&header[16..20]) as usize;
        let off_keys = LittleEndian::read_u32(&header[24..28]) as usize;
        let off_resources = LittleEndian::read_u32(&header[28..32]) as usize;

        let keys = data
            .get(off_keys..off_keys + num_entries * 24)
            .ok_or(Error::UnexpectedEof { section: "keys" })?;
        let resources = data
            .get(off_resources..off_resources + num_entries * 8)
            .ok_or(Error::UnexpectedEof {
                section: "resources",
            })?;

        let mut entries = Vec::with_capacity(num_entries);
        for i in 0..num_entries {
            let key = &keys[i * 24..i * 24 + 24];
            let name_end = key[..KEY_RESREF_LEN]
                .iter()
                .position(|&b| b == 0)
                .unwrap_or(KEY_RESREF_LEN);
            let res_ref = String::from_utf8_lossy(&key[..name_end]).into_owned();
            let type_id = LittleEndian::read_u16(&key[20..22]);

            let resource = &resources[i * 8..i * 8 + 8];
            let offset = LittleEndian::read_u32(&resource[0..4]);
            let size = LittleEndian::read_u32(&resource[4..8]);

            if data.len() < offset as usize + size as usize {
                return Err(Error::UnexpectedEof { section: "data" });
            }

            entries.push(KeyEntry {
                res_ref,
                type_id,
                offset,
                size,
            });
        }

        Ok(Self {
            file_type,
            entries,
            data,
        })
    }

    #[must_use]
    pub fn file_type(&self) -> ErfFileType {
        self.file_type
    }

    /// Key-table listing, in archive order.
    #[must_use]
    pub fn entries(&self) -> Vec<ErfEntry> {
        self.entries
            .iter()
            .map(|e| ErfEntry {
                res_ref: e.res_ref.clone(),
                type_id: e.type_id,
                size: e.size,
            })
            .collect()
    }

    /// Blob bytes for a resource, matched by resref (case-insensitive) and
    /// type.
    #[must_use]
    pub fn find(&self, res_ref: &str, res_type: ResourceType) -> Option<&[u8]> {
        let wanted = res_ref.to_lowercase();
        let entry = self
            .entries
            .iter()
            .find(|e| e.type_id == res_type.type_id() && e.res_ref == wanted)?;
        self.data
            .get(entry.offset as usize..(entry.offset + entry.size) as usize)
    }

    /// Like [`find`](Self::find) but failing with an error naming the
    /// missing resource.
    pub fn get(&self, res_ref: &str, res_type: ResourceType) -> Result<&[u8]> {
        self.find(res_ref, res_type)
            .ok_or_else(|| Error::ResourceNotFoundInErf(res_ref.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::erf::{ErfResource, ErfWriter};

    fn sample_archive() -> Vec<u8> {
        let mut writer = ErfWriter::new();
        writer.add(ErfResource::new(
            "savenfo",
            ResourceType::Res,
            b"nfo-bytes".to_vec(),
        ));
        writer.add(ErfResource::new(
            "m01aa",
            ResourceType::Git,
            b"git-bytes".to_vec(),
        ));
        writer.serialize(ErfFileType::Erf).unwrap()
    }

    #[test]
    fn test_round_trip_entries() {
        let reader = ErfReader::from_bytes(sample_archive()).unwrap();
        assert_eq!(reader.file_type(), ErfFileType::Erf);

        let entries = reader.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].res_ref, "savenfo");
        assert_eq!(entries[0].type_id, ResourceType::Res.type_id());
        assert_eq!(entries[1].res_ref, "m01aa");
        assert_eq!(entries[1].size, 9);
    }

    #[test]
    fn test_find_is_case_insensitive() {
        let reader = ErfReader::from_bytes(sample_archive()).unwrap();
        assert_eq!(
            reader.find("SaveNfo", ResourceType::Res),
            Some(b"nfo-bytes".as_slice())
        );
        assert_eq!(reader.find("savenfo", ResourceType::Git), None);
        assert!(matches!(
            reader.get("missing", ResourceType::Res),
            Err(Error::ResourceNotFoundInErf(_))
        ));
    }

    #[test]
    fn test_rejects_bad_signature() {
        let mut bytes = sample_archive();
        bytes[0] = b'X';
        assert!(matches!(
            ErfReader::from_bytes(bytes),
            Err(Error::InvalidErfSignature(_))
        ));
    }
}
