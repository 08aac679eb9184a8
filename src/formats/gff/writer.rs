//! GFF file writing and serialization
//!
//! Flattens a [`GffStruct`] tree into the five parallel on-disk sections
//! (structs, fields, labels, field data, index arrays) in a single
//! breadth-first pass, then emits the fixed 56-byte header followed by the
//! sections in order. The input tree is never mutated.

use std::collections::VecDeque;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};
use tracing::debug;

use super::document::{FieldValue, GffStruct};
use super::label_table::LabelTable;
use crate::error::{Error, Result};
use crate::formats::common::ResourceType;
use crate::utils::write_atomic;

/// Fixed header size; the struct array always starts here.
const HEADER_SIZE: u32 = 0x38;
/// Version tag following the 3-letter signature.
const VERSION_TAG: &[u8; 5] = b" V3.2";
/// Serialized labels occupy exactly this many bytes.
const LABEL_SIZE: usize = 16;
/// ResRef length must fit a single-byte prefix.
const MAX_RESREF_LEN: usize = 255;

/// Write a GFF tree to disk under the given resource type's signature.
///
/// The output is staged in a temporary file and renamed into place, so a
/// failed save leaves any existing destination untouched.
pub fn write_gff<P: AsRef<Path>>(root: &GffStruct, res_type: ResourceType, path: P) -> Result<()> {
    let bytes = serialize_gff(root, res_type)?;
    write_atomic(path.as_ref(), &bytes)
}

/// Serialize a GFF tree to bytes.
pub fn serialize_gff(root: &GffStruct, res_type: ResourceType) -> Result<Vec<u8>> {
    // Reject unknown signatures before doing any work
    let signature = res_type
        .gff_signature()
        .ok_or(Error::UnsupportedResourceType(res_type))?;

    let ctx = flatten_tree(root)?;

    let num_structs = ctx.structs.len() as u32;
    let num_fields = ctx.fields.len() as u32;
    let num_labels = ctx.labels.len() as u32;

    let size_structs = num_structs * 12;
    let size_fields = num_fields * 12;
    let size_labels = num_labels * LABEL_SIZE as u32;
    let size_field_data = ctx.field_data.len() as u32;
    let size_field_indices = ctx.field_indices.len() as u32 * 4;
    let size_list_indices = ctx.list_indices.len() as u32 * 4;

    let off_structs = HEADER_SIZE;
    let off_fields = off_structs + size_structs;
    let off_labels = off_fields + size_fields;
    let off_field_data = off_labels + size_labels;
    let off_field_indices = off_field_data + size_field_data;
    let off_list_indices = off_field_indices + size_field_indices;

    debug!(
        num_structs,
        num_fields, num_labels, size_field_data, "serializing GFF"
    );

    let mut output = Vec::with_capacity((off_list_indices + size_list_indices) as usize);

    // Header
    output.extend_from_slice(signature.as_bytes());
    output.extend_from_slice(VERSION_TAG);
    output.write_u32::<LittleEndian>(off_structs)?;
    output.write_u32::<LittleEndian>(num_structs)?;
    output.write_u32::<LittleEndian>(off_fields)?;
    output.write_u32::<LittleEndian>(num_fields)?;
    output.write_u32::<LittleEndian>(off_labels)?;
    output.write_u32::<LittleEndian>(num_labels)?;
    output.write_u32::<LittleEndian>(off_field_data)?;
    output.write_u32::<LittleEndian>(size_field_data)?;
    output.write_u32::<LittleEndian>(off_field_indices)?;
    output.write_u32::<LittleEndian>(size_field_indices)?;
    output.write_u32::<LittleEndian>(off_list_indices)?;
    output.write_u32::<LittleEndian>(size_list_indices)?;

    // Struct array
    for ws in &ctx.structs {
        output.write_u32::<LittleEndian>(ws.struct_type)?;
        output.write_u32::<LittleEndian>(ws.data_or_offset)?;
        output.write_u32::<LittleEndian>(ws.field_count)?;
    }

    // Field array
    for wf in &ctx.fields {
        output.write_u32::<LittleEndian>(wf.field_type)?;
        output.write_u32::<LittleEndian>(wf.label_index)?;
        output.write_u32::<LittleEndian>(wf.data_or_offset)?;
    }

    // Label array, truncated/NUL-padded to 16 bytes each
    for label in ctx.labels.labels() {
        let bytes = label.as_bytes();
        let used = bytes.len().min(LABEL_SIZE);
        output.extend_from_slice(&bytes[..used]);
        output.extend_from_slice(&[0u8; LABEL_SIZE][used..]);
    }

    // Field data blob
    output.extend_from_slice(&ctx.field_data);

    // Index arrays
    for &index in &ctx.field_indices {
        output.write_u32::<LittleEndian>(index)?;
    }
    for &index in &ctx.list_indices {
        output.write_u32::<LittleEndian>(index)?;
    }

    Ok(output)
}

struct WriteStruct {
    struct_type: u32,
    data_or_offset: u32,
    field_count: u32,
}

struct WriteField {
    field_type: u32,
    label_index: u32,
    data_or_offset: u32,
}

#[derive(Default)]
struct WriteContext {
    structs: Vec<WriteStruct>,
    fields: Vec<WriteField>,
    labels: LabelTable,
    field_data: Vec<u8>,
    field_indices: Vec<u32>,
    list_indices: Vec<u32>,
}

/// Storage class of a field value, decided at flattening time.
enum FieldClass<'a> {
    /// Fits the 4-byte slot directly.
    Simple(u32),
    /// Appended to the field data blob; the slot holds the byte offset.
    Complex(Vec<u8>),
    /// The slot holds the child's struct index.
    Struct(&'a GffStruct),
    /// The slot holds a byte offset into the list indices array.
    List(&'a [GffStruct]),
}

fn classify(value: &FieldValue) -> Result<FieldClass<'_>> {
    let class = match value {
        FieldValue::Byte(v) => FieldClass::Simple(u32::from(*v)),
        FieldValue::Char(v) => FieldClass::Simple(i32::from(*v) as u32),
        FieldValue::Word(v) => FieldClass::Simple(u32::from(*v)),
        FieldValue::Short(v) => FieldClass::Simple(i32::from(*v) as u32),
        FieldValue::Dword(v) => FieldClass::Simple(*v),
        FieldValue::Int(v) => FieldClass::Simple(*v as u32),
        FieldValue::Float(v) => FieldClass::Simple(v.to_bits()),
        FieldValue::Dword64(v) => FieldClass::Complex(v.to_le_bytes().to_vec()),
        FieldValue::Int64(v) => FieldClass::Complex(v.to_le_bytes().to_vec()),
        FieldValue::Double(v) => FieldClass::Complex(v.to_le_bytes().to_vec()),
        FieldValue::String(s) => {
            let len = check_len("CExoString", s.len())?;
            let mut data = Vec::with_capacity(4 + s.len());
            data.write_u32::<LittleEndian>(len)?;
            data.extend_from_slice(s.as_bytes());
            FieldClass::Complex(data)
        }
        FieldValue::ResRef(s) => {
            if s.len() > MAX_RESREF_LEN {
                return Err(Error::ResRefTooLong {
                    length: s.len(),
                    max: MAX_RESREF_LEN,
                });
            }
            let mut data = Vec::with_capacity(1 + s.len());
            data.push(s.len() as u8);
            data.extend_from_slice(s.as_bytes());
            FieldClass::Complex(data)
        }
        FieldValue::LocString { str_ref, substring } => {
            let sub_len = check_len("CExoLocString", substring.len())?;
            let num_substrings: u32 = u32::from(!substring.is_empty());
            let total_size = 8 + if num_substrings > 0 { 8 + sub_len } else { 0 };
            let mut data = Vec::with_capacity(4 + total_size as usize);
            data.write_u32::<LittleEndian>(total_size)?;
            data.write_i32::<LittleEndian>(*str_ref)?;
            data.write_u32::<LittleEndian>(num_substrings)?;
            if num_substrings > 0 {
                // Single substring, language id 0
                data.write_u32::<LittleEndian>(0)?;
                data.write_u32::<LittleEndian>(sub_len)?;
                data.extend_from_slice(substring.as_bytes());
            }
            FieldClass::Complex(data)
        }
        FieldValue::Void(blob) => {
            let len = check_len("Void", blob.len())?;
            let mut data = Vec::with_capacity(4 + blob.len());
            data.write_u32::<LittleEndian>(len)?;
            data.extend_from_slice(blob);
            FieldClass::Complex(data)
        }
        FieldValue::Orientation(q) => {
            let mut data = Vec::with_capacity(16);
            for component in [q.w, q.x, q.y, q.z] {
                data.write_f32::<LittleEndian>(component)?;
            }
            FieldClass::Complex(data)
        }
        FieldValue::Vector(v) => {
            let mut data = Vec::with_capacity(12);
            for component in [v.x, v.y, v.z] {
                data.write_f32::<LittleEndian>(component)?;
            }
            FieldClass::Complex(data)
        }
        FieldValue::StrRef(v) => {
            let mut data = Vec::with_capacity(8);
            data.write_u32::<LittleEndian>(4)?;
            data.write_i32::<LittleEndian>(*v)?;
            FieldClass::Complex(data)
        }
        FieldValue::Struct(child) => FieldClass::Struct(child),
        FieldValue::List(children) => FieldClass::List(children),
    };
    Ok(class)
}

fn check_len(kind: &'static str, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::ValueTooLarge { kind, size: len })
}

/// Breadth-first flattening pass.
///
/// Structs are appended in dequeue order, so the root lands at index 0 and
/// every child's pre-assigned index matches its final position. Children are
/// enqueued only after all of the current struct's fields are recorded,
/// keeping each struct's field run contiguous.
fn flatten_tree(root: &GffStruct) -> Result<WriteContext> {
    let mut ctx = WriteContext::default();
    let mut queue: VecDeque<&GffStruct> = VecDeque::new();
    queue.push_back(root);

    // Index of the most recently assigned struct; the root implicitly holds 0
    let mut num_structs: u32 = 0;

    while let Some(current) = queue.pop_front() {
        let mut field_indices = Vec::with_capacity(current.fields().len());

        for field in current.fields() {
            // Current field count is this field's index
            field_indices.push(ctx.fields.len() as u32);

            let label_index = ctx.labels.intern(field.label());

            let data_or_offset = match classify(field.value())? {
                FieldClass::Simple(slot) => slot,
                FieldClass::Complex(data) => {
                    let offset = ctx.field_data.len() as u32;
                    ctx.field_data.extend_from_slice(&data);
                    offset
                }
                FieldClass::Struct(child) => {
                    num_structs += 1;
                    queue.push_back(child);
                    num_structs
                }
                FieldClass::List(children) => {
                    let offset = ctx.list_indices.len() as u32 * 4;
                    ctx.list_indices.push(children.len() as u32);
                    for child in children {
                        num_structs += 1;
                        ctx.list_indices.push(num_structs);
                        queue.push_back(child);
                    }
                    offset
                }
            };

            ctx.fields.push(WriteField {
                field_type: field.value().type_id(),
                label_index,
                data_or_offset,
            });
        }

        // A single-field struct stores the field index directly; otherwise
        // the slot is a byte offset into the field indices array
        let data_or_offset = if field_indices.len() == 1 {
            field_indices[0]
        } else {
            let offset = ctx.field_indices.len() as u32 * 4;
            ctx.field_indices.extend_from_slice(&field_indices);
            offset
        };

        ctx.structs.push(WriteStruct {
            struct_type: current.struct_type(),
            data_or_offset,
            field_count: current.fields().len() as u32,
        });
    }

    Ok(ctx)
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::gff::{Field, ROOT_STRUCT_TYPE};

    fn push_u32s(out: &mut Vec<u8>, values: &[u32]) {
        for v in values {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    fn push_label(out: &mut Vec<u8>, label: &str) {
        let mut bytes = [0u8; 16];
        bytes[..label.len()].copy_from_slice(label.as_bytes());
        out.extend_from_slice(&bytes);
    }

    /// Reference tree exercising every field kind.
    fn reference_tree() -> GffStruct {
        GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![
                Field::new_byte("Byte", 0),
                Field::new_int("Int", 1),
                Field::new_dword("Uint", 2),
                Field::new_int64("Int64", 3),
                Field::new_dword64("Uint64", 4),
                Field::new_float("Float", 1.0),
                Field::new_double("Double", 1.0),
                Field::new_string("CExoString", "John"),
                Field::new_res_ref("ResRef", "Jane"),
                Field::new_loc_string("CExoLocString", -1, "Jill"),
                Field::new_void("Void", vec![0xff, 0xff]),
                Field::new_orientation("Orientation", Quat::from_xyzw(1.0, 1.0, 1.0, 1.0)),
                Field::new_vector("Vector", Vec3::new(1.0, 1.0, 1.0)),
                Field::new_str_ref("StrRef", 1),
                Field::new_struct(
                    "Struct",
                    GffStruct::new(1, vec![Field::new_char("Struct1Char", 1)]),
                ),
                Field::new_list(
                    "List",
                    vec![
                        GffStruct::new(2, vec![Field::new_word("Struct2Word", 2)]),
                        GffStruct::new(3, vec![Field::new_short("Struct3Short", 3)]),
                    ],
                ),
            ],
        )
    }

    fn reference_bytes() -> Vec<u8> {
        let mut out = Vec::new();

        // Header
        out.extend_from_slice(b"RES V3.2");
        push_u32s(
            &mut out,
            &[
                0x38, 4, // structs
                0x68, 19, // fields
                0x14c, 19, // labels
                0x27c, 0x67, // field data
                0x2e3, 0x40, // field indices
                0x323, 0x0c, // list indices
            ],
        );

        // Structs: (type, dataOrDataOffset, fieldCount)
        push_u32s(&mut out, &[0xffffffff, 0x00, 16]);
        push_u32s(&mut out, &[0x01, 0x10, 1]);
        push_u32s(&mut out, &[0x02, 0x11, 1]);
        push_u32s(&mut out, &[0x03, 0x12, 1]);

        // Fields: (type, labelIndex, dataOrDataOffset)
        push_u32s(&mut out, &[0, 0, 0x00]); // Byte
        push_u32s(&mut out, &[5, 1, 0x01]); // Int
        push_u32s(&mut out, &[4, 2, 0x02]); // Dword
        push_u32s(&mut out, &[7, 3, 0x00]); // Int64
        push_u32s(&mut out, &[6, 4, 0x08]); // Dword64
        push_u32s(&mut out, &[8, 5, 0x3f800000]); // Float
        push_u32s(&mut out, &[9, 6, 0x10]); // Double
        push_u32s(&mut out, &[10, 7, 0x18]); // CExoString
        push_u32s(&mut out, &[11, 8, 0x20]); // ResRef
        push_u32s(&mut out, &[12, 9, 0x25]); // CExoLocString
        push_u32s(&mut out, &[13, 10, 0x3d]); // Void
        push_u32s(&mut out, &[16, 11, 0x43]); // Orientation
        push_u32s(&mut out, &[17, 12, 0x53]); // Vector
        push_u32s(&mut out, &[18, 13, 0x5f]); // StrRef
        push_u32s(&mut out, &[14, 14, 0x01]); // Struct
        push_u32s(&mut out, &[15, 15, 0x00]); // List
        push_u32s(&mut out, &[1, 16, 0x01]); // Char
        push_u32s(&mut out, &[2, 17, 0x02]); // Word
        push_u32s(&mut out, &[3, 18, 0x03]); // Short

        // Labels
        for label in [
            "Byte",
            "Int",
            "Uint",
            "Int64",
            "Uint64",
            "Float",
            "Double",
            "CExoString",
            "ResRef",
            "CExoLocString",
            "Void",
            "Orientation",
            "Vector",
            "StrRef",
            "Struct",
            "List",
            "Struct1Char",
            "Struct2Word",
            "Struct3Short",
        ] {
            push_label(&mut out, label);
        }

        // Field data
        out.extend_from_slice(&3u64.to_le_bytes()); // Int64
        out.extend_from_slice(&4u64.to_le_bytes()); // Dword64
        out.extend_from_slice(&1.0f64.to_le_bytes()); // Double
        out.extend_from_slice(&4u32.to_le_bytes()); // CExoString
        out.extend_from_slice(b"John");
        out.push(4); // ResRef
        out.extend_from_slice(b"Jane");
        out.extend_from_slice(&20u32.to_le_bytes()); // CExoLocString
        out.extend_from_slice(&(-1i32).to_le_bytes());
        push_u32s(&mut out, &[1, 0, 4]);
        out.extend_from_slice(b"Jill");
        out.extend_from_slice(&2u32.to_le_bytes()); // Void
        out.extend_from_slice(&[0xff, 0xff]);
        for _ in 0..4 {
            out.extend_from_slice(&1.0f32.to_le_bytes()); // Orientation
        }
        for _ in 0..3 {
            out.extend_from_slice(&1.0f32.to_le_bytes()); // Vector
        }
        push_u32s(&mut out, &[4]); // StrRef
        out.extend_from_slice(&1i32.to_le_bytes());

        // Field indices for the root's 16 fields
        let indices: Vec<u32> = (0..16).collect();
        push_u32s(&mut out, &indices);

        // List indices: count, then struct indices
        push_u32s(&mut out, &[2, 2, 3]);

        out
    }

    #[test]
    fn test_writes_reference_tree_bit_exact() {
        let bytes = serialize_gff(&reference_tree(), ResourceType::Res).unwrap();
        assert_eq!(bytes, reference_bytes());
    }

    #[test]
    fn test_empty_root_header() {
        let bytes = serialize_gff(&GffStruct::root(), ResourceType::Gui).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(b"GUI V3.2");
        push_u32s(
            &mut expected,
            &[0x38, 1, 0x44, 0, 0x44, 0, 0x44, 0, 0x44, 0, 0x44, 0],
        );
        // The lone struct entry: field-indices offset valid, zero entries
        push_u32s(&mut expected, &[0xffffffff, 0, 0]);

        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_loc_string_without_substring() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![Field::new_loc_string("LocName", 42, "")],
        );
        let bytes = serialize_gff(&root, ResourceType::Utc).unwrap();

        // Single field, so the struct entry points at field 0 directly
        let struct_entry = &bytes[0x38..0x44];
        assert_eq!(struct_entry[4..8], 0u32.to_le_bytes());

        // Field data: totalSize 8, strref 42, zero substrings
        let field_data = &bytes[bytes.len() - 12..];
        assert_eq!(field_data[0..4], 8u32.to_le_bytes());
        assert_eq!(field_data[4..8], 42u32.to_le_bytes());
        assert_eq!(field_data[8..12], 0u32.to_le_bytes());
    }

    #[test]
    fn test_labels_deduplicated_across_tree() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![
                Field::new_byte("Value", 1),
                Field::new_struct(
                    "Child",
                    GffStruct::new(0, vec![Field::new_byte("Value", 2)]),
                ),
            ],
        );
        let bytes = serialize_gff(&root, ResourceType::Utp).unwrap();

        let num_labels = u32::from_le_bytes(bytes[0x1c..0x20].try_into().unwrap());
        assert_eq!(num_labels, 2); // "Value" and "Child"

        // Both Value fields reference label 0
        let off_fields = u32::from_le_bytes(bytes[0x10..0x14].try_into().unwrap()) as usize;
        let first_label_idx =
            u32::from_le_bytes(bytes[off_fields + 4..off_fields + 8].try_into().unwrap());
        let third_label_idx = u32::from_le_bytes(
            bytes[off_fields + 28..off_fields + 32].try_into().unwrap(),
        );
        assert_eq!(first_label_idx, 0);
        assert_eq!(third_label_idx, 0);
    }

    #[test]
    fn test_long_label_truncated_to_16_bytes() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![Field::new_byte("AVeryLongLabelIndeed", 1)],
        );
        let bytes = serialize_gff(&root, ResourceType::Utp).unwrap();

        let off_labels = u32::from_le_bytes(bytes[0x18..0x1c].try_into().unwrap()) as usize;
        assert_eq!(&bytes[off_labels..off_labels + 16], b"AVeryLongLabelIn");
    }

    #[test]
    fn test_unsupported_resource_type() {
        let err = serialize_gff(&GffStruct::root(), ResourceType::TwoDa).unwrap_err();
        assert!(matches!(err, Error::UnsupportedResourceType(_)));
    }

    #[test]
    fn test_res_ref_too_long() {
        let root = GffStruct::new(
            ROOT_STRUCT_TYPE,
            vec![Field::new_res_ref("TemplateResRef", "x".repeat(256))],
        );
        let err = serialize_gff(&root, ResourceType::Utp).unwrap_err();
        assert!(matches!(err, Error::ResRefTooLong { length: 256, .. }));
    }
}
