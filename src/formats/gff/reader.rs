//! GFF file reading and parsing
//!
//! The header stores only offsets and counts, so every section is accessed
//! by direct indexing; the tree is rebuilt recursively from struct index 0.
//! All indices and offsets coming from the file are bounds-checked.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use glam::{Quat, Vec3};
use tracing::warn;

use super::document::{Field, FieldValue, GffStruct};
use crate::error::{Error, Result};
use crate::formats::common;

/// Read a GFF file from disk.
pub fn read_gff<P: AsRef<Path>>(path: P) -> Result<GffStruct> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)?;
    parse_gff_bytes(&buffer)
}

/// Parse a GFF tree from bytes.
///
/// The 3-letter signature is not interpreted (the caller already knows what
/// resource it asked for), but the version tag must read `" V3.2"`.
pub fn parse_gff_bytes(data: &[u8]) -> Result<GffStruct> {
    let header = data.get(..0x38).ok_or(Error::UnexpectedEof {
        section: "header",
    })?;

    let version: [u8; 5] = header[3..8].try_into().unwrap();
    if &version != b" V3.2" {
        return Err(Error::UnsupportedGffVersion(version));
    }

    let section = |off_at: usize, len: usize| -> Result<&[u8]> {
        let off = LittleEndian::read_u32(&header[off_at..off_at + 4]) as usize;
        data.get(off..off + len).ok_or(Error::UnexpectedEof {
            section: "body",
        })
    };

    let num_structs = LittleEndian::read_u32(&header[0x0c..0x10]) as usize;
    let num_fields = LittleEndian::read_u32(&header[0x14..0x18]) as usize;
    let num_labels = LittleEndian::read_u32(&header[0x1c..0x20]) as usize;
    let size_field_data = LittleEndian::read_u32(&header[0x24..0x28]) as usize;
    let size_field_indices = LittleEndian::read_u32(&header[0x2c..0x30]) as usize;
    let size_list_indices = LittleEndian::read_u32(&header[0x34..0x38]) as usize;

    let parser = GffParser {
        structs: section(0x08, num_structs * 12)?,
        fields: section(0x10, num_fields * 12)?,
        labels: section(0x18, num_labels * 16)?,
        field_data: section(0x20, size_field_data)?,
        field_indices: section(0x28, size_field_indices)?,
        list_indices: section(0x30, size_list_indices)?,
    };

    let mut visited = vec![false; num_structs];
    parser.read_struct(0, &mut visited)
}

struct GffParser<'a> {
    structs: &'a [u8],
    fields: &'a [u8],
    labels: &'a [u8],
    field_data: &'a [u8],
    field_indices: &'a [u8],
    list_indices: &'a [u8],
}

impl GffParser<'_> {
    fn read_struct(&self, idx: u32, visited: &mut [bool]) -> Result<GffStruct> {
        // A valid file references each struct exactly once; a repeated
        // index would recurse forever
        let seen = visited
            .get_mut(idx as usize)
            .ok_or(Error::InvalidStructIndex(idx))?;
        if *seen {
            return Err(Error::CyclicStructReference(idx));
        }
        *seen = true;

        let entry = self
            .structs
            .get(idx as usize * 12..idx as usize * 12 + 12)
            .ok_or(Error::InvalidStructIndex(idx))?;

        let struct_type = LittleEndian::read_u32(&entry[0..4]);
        let data_or_offset = LittleEndian::read_u32(&entry[4..8]);
        let field_count = LittleEndian::read_u32(&entry[8..12]);

        let mut fields = Vec::with_capacity(field_count as usize);
        if field_count == 1 {
            fields.push(self.read_field(data_or_offset, visited)?);
        } else {
            for i in 0..field_count {
                let field_idx = self.u32_at(
                    self.field_indices,
                    data_or_offset as usize + i as usize * 4,
                    "field indices",
                )?;
                fields.push(self.read_field(field_idx, visited)?);
            }
        }

        Ok(GffStruct::new(struct_type, fields))
    }

    fn read_field(&self, idx: u32, visited: &mut [bool]) -> Result<Field> {
        let entry = self
            .fields
            .get(idx as usize * 12..idx as usize * 12 + 12)
            .ok_or(Error::InvalidFieldIndex(idx))?;

        let field_type = LittleEndian::read_u32(&entry[0..4]);
        let label_index = LittleEndian::read_u32(&entry[4..8]);
        let slot = LittleEndian::read_u32(&entry[8..12]);

        let label = self.read_label(label_index)?;

        let value = match field_type {
            common::TYPE_BYTE => FieldValue::Byte(slot as u8),
            common::TYPE_CHAR => FieldValue::Char(slot as i8),
            common::TYPE_WORD => FieldValue::Word(slot as u16),
            common::TYPE_SHORT => FieldValue::Short(slot as i16),
            common::TYPE_DWORD => FieldValue::Dword(slot),
            common::TYPE_INT => FieldValue::Int(slot as i32),
            common::TYPE_DWORD64 => FieldValue::Dword64(self.u64_data(slot)?),
            common::TYPE_INT64 => FieldValue::Int64(self.u64_data(slot)? as i64),
            common::TYPE_FLOAT => FieldValue::Float(f32::from_bits(slot)),
            common::TYPE_DOUBLE => FieldValue::Double(f64::from_bits(self.u64_data(slot)?)),
            common::TYPE_CEXOSTRING => FieldValue::String(self.string_data(slot)?),
            common::TYPE_RESREF => FieldValue::ResRef(self.res_ref_data(slot)?),
            common::TYPE_CEXOLOCSTRING => {
                let (str_ref, substring) = self.loc_string_data(slot)?;
                FieldValue::LocString { str_ref, substring }
            }
            common::TYPE_VOID => FieldValue::Void(self.blob_data(slot)?),
            common::TYPE_STRUCT => {
                FieldValue::Struct(Box::new(self.read_struct(slot, visited)?))
            }
            common::TYPE_LIST => {
                let indices = self.list_data(slot)?;
                let mut children = Vec::with_capacity(indices.len());
                for child_idx in indices {
                    children.push(self.read_struct(child_idx, visited)?);
                }
                FieldValue::List(children)
            }
            common::TYPE_ORIENTATION => {
                let bytes = self.field_data_at(slot, 16)?;
                let w = LittleEndian::read_f32(&bytes[0..4]);
                let x = LittleEndian::read_f32(&bytes[4..8]);
                let y = LittleEndian::read_f32(&bytes[8..12]);
                let z = LittleEndian::read_f32(&bytes[12..16]);
                FieldValue::Orientation(Quat::from_xyzw(x, y, z, w))
            }
            common::TYPE_VECTOR => {
                let bytes = self.field_data_at(slot, 12)?;
                FieldValue::Vector(Vec3::new(
                    LittleEndian::read_f32(&bytes[0..4]),
                    LittleEndian::read_f32(&bytes[4..8]),
                    LittleEndian::read_f32(&bytes[8..12]),
                ))
            }
            common::TYPE_STRREF => {
                // totalSize prefix, then the string-ref itself
                let bytes = self.field_data_at(slot, 8)?;
                FieldValue::StrRef(LittleEndian::read_i32(&bytes[4..8]))
            }
            other => return Err(Error::UnsupportedFieldType(other)),
        };

        Ok(Field::from_parts(label, value))
    }

    fn read_label(&self, idx: u32) -> Result<String> {
        let bytes = self
            .labels
            .get(idx as usize * 16..idx as usize * 16 + 16)
            .ok_or(Error::InvalidLabelIndex(idx))?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(16);
        Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    fn u32_at(&self, section: &[u8], off: usize, name: &'static str) -> Result<u32> {
        section
            .get(off..off + 4)
            .map(LittleEndian::read_u32)
            .ok_or(Error::UnexpectedEof { section: name })
    }

    fn field_data_at(&self, off: u32, len: usize) -> Result<&[u8]> {
        self.field_data
            .get(off as usize..off as usize + len)
            .ok_or(Error::UnexpectedEof {
                section: "field data",
            })
    }

    fn u64_data(&self, off: u32) -> Result<u64> {
        self.field_data_at(off, 8).map(LittleEndian::read_u64)
    }

    fn string_data(&self, off: u32) -> Result<String> {
        let len = self.u32_at(self.field_data, off as usize, "field data")? as usize;
        let bytes = self.field_data_at(off + 4, len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn res_ref_data(&self, off: u32) -> Result<String> {
        let len = usize::from(
            *self
                .field_data
                .get(off as usize)
                .ok_or(Error::UnexpectedEof {
                    section: "field data",
                })?,
        );
        let bytes = self.field_data_at(off + 1, len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    fn loc_string_data(&self, off: u32) -> Result<(i32, String)> {
        let header = self.field_data_at(off, 12)?;
        let str_ref = LittleEndian::read_i32(&header[4..8]);
        let count = LittleEndian::read_u32(&header[8..12]);

        let substring = match count {
            0 => String::new(),
            1 => {
                // Language id (ignored), then length-prefixed substring
                let sub_header = self.field_data_at(off + 12, 8)?;
                let len = LittleEndian::read_u32(&sub_header[4..8]) as usize;
                let bytes = self.field_data_at(off + 20, len)?;
                String::from_utf8_lossy(bytes).into_owned()
            }
            _ => {
                warn!(count, "more than one substring in CExoLocString, ignoring");
                String::new()
            }
        };

        Ok((str_ref, substring))
    }

    fn blob_data(&self, off: u32) -> Result<Vec<u8>> {
        let len = self.u32_at(self.field_data, off as usize, "field data")? as usize;
        Ok(self.field_data_at(off + 4, len)?.to_vec())
    }

    fn list_data(&self, off: u32) -> Result<Vec<u32>> {
        let count = self.u32_at(self.list_indices, off as usize, "list indices")?;
        let mut indices = Vec::with_capacity(count as usize);
        for i in 0..count {
            indices.push(self.u32_at(
                self.list_indices,
                off as usize + 4 + i as usize * 4,
                "list indices",
            )?);
        }
        Ok(indices)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::common::ResourceType;
    use crate::formats::gff::{serialize_gff, ROOT_STRUCT_TYPE};

    #[test]
    fn test_round_trip_preserves_tree() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![
                Field::new_byte("Byte", 255),
                Field::new_short("Short", -2),
                Field::new_float("Float", 2.5),
                Field::new_double("Double", -0.25),
                Field::new_string("Tag", "m01aa_door"),
                Field::new_res_ref("TemplateResRef", "plc_footlker"),
                Field::new_loc_string("LocName", -1, "Footlocker"),
                Field::new_void("Payload", vec![0xde, 0xad, 0xbe, 0xef]),
                Field::new_str_ref("Description", 31337),
                Field::new_struct(
                    "SubStruct",
                    GffStruct::new(7, vec![Field::new_int("Inner", -42)]),
                ),
                Field::new_list(
                    "ItemList",
                    vec![
                        GffStruct::new(0, vec![Field::new_dword("Gold", 100)]),
                        GffStruct::new(
                            1,
                            vec![
                                Field::new_dword("Gold", 200),
                                Field::new_byte("Dropable", 1),
                            ],
                        ),
                    ],
                ),
            ],
        );

        let bytes = serialize_gff(&root, ResourceType::Git).unwrap();
        let parsed = parse_gff_bytes(&bytes).unwrap();
        assert_eq!(parsed, root);
    }

    #[test]
    fn test_round_trip_empty_root() {
        let bytes = serialize_gff(&GffStruct::root(), ResourceType::Res).unwrap();
        let parsed = parse_gff_bytes(&bytes).unwrap();
        assert_eq!(parsed, GffStruct::root());
    }

    #[test]
    fn test_rejects_wrong_version() {
        let mut bytes = serialize_gff(&GffStruct::root(), ResourceType::Res).unwrap();
        bytes[7] = b'1';
        assert!(matches!(
            parse_gff_bytes(&bytes),
            Err(Error::UnsupportedGffVersion(_))
        ));
    }

    #[test]
    fn test_rejects_truncated_file() {
        let bytes = serialize_gff(&GffStruct::root(), ResourceType::Res).unwrap();
        assert!(matches!(
            parse_gff_bytes(&bytes[..20]),
            Err(Error::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_rejects_cyclic_struct_reference() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![Field::new_struct("Child", GffStruct::new(0, Vec::new()))],
        );
        let mut bytes = serialize_gff(&root, ResourceType::Res).unwrap();
        // Point the struct field's slot back at the root
        let off_fields = u32::from_le_bytes(bytes[0x10..0x14].try_into().unwrap()) as usize;
        bytes[off_fields + 8] = 0;
        assert!(matches!(
            parse_gff_bytes(&bytes),
            Err(Error::CyclicStructReference(0))
        ));
    }

    #[test]
    fn test_rejects_cyclic_list_reference() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![Field::new_list("Kids", vec![GffStruct::new(0, Vec::new())])],
        );
        let mut bytes = serialize_gff(&root, ResourceType::Res).unwrap();
        // The list indices are [count = 1, child = 1]; point the child at
        // the root
        let off_list = u32::from_le_bytes(bytes[0x30..0x34].try_into().unwrap()) as usize;
        bytes[off_list + 4] = 0;
        assert!(matches!(
            parse_gff_bytes(&bytes),
            Err(Error::CyclicStructReference(0))
        ));
    }

    #[test]
    fn test_rejects_unknown_field_type() {
        let root = GffStruct::new(ROOT_STRUCT_TYPE, vec![Field::new_byte("Byte", 1)]);
        let mut bytes = serialize_gff(&root, ResourceType::Res).unwrap();
        // Corrupt the field type id of the only field
        let off_fields = u32::from_le_bytes(bytes[0x10..0x14].try_into().unwrap()) as usize;
        bytes[off_fields] = 200;
        assert!(matches!(
            parse_gff_bytes(&bytes),
            Err(Error::UnsupportedFieldType(200))
        ));
    }
}
