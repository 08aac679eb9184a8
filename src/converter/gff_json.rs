//! GFF to JSON conversion and back
//!
//! The JSON form mirrors the tree shape directly: a struct is an object
//! with a `type` tag and a `fields` array; every field carries its label,
//! a lowercase type name, and a `value` whose shape depends on the type.
//! `void` payloads are base64. Field order is preserved both ways.

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::formats::common::ResourceType;
use crate::formats::gff::{self, Field, FieldValue, GffStruct};

/// Convert a GFF file to JSON.
pub fn convert_gff_to_json<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::debug!(
        "Converting GFF to JSON: {:?} -> {:?}",
        source.as_ref(),
        dest.as_ref()
    );
    let root = gff::read_gff(&source)?;
    let json = gff_to_json(&root)?;
    std::fs::write(dest, json)?;
    Ok(())
}

/// Convert a JSON file back to binary GFF. The destination extension
/// selects the resource type and thus the file signature.
pub fn convert_json_to_gff<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::debug!(
        "Converting JSON to GFF: {:?} -> {:?}",
        source.as_ref(),
        dest.as_ref()
    );
    let res_type = resource_type_for(dest.as_ref())?;
    let content = std::fs::read_to_string(source)?;
    let root = json_to_gff(&content)?;
    gff::write_gff(&root, res_type, dest)
}

/// Serialize a GFF tree as a pretty-printed JSON string.
pub fn gff_to_json(root: &GffStruct) -> Result<String> {
    Ok(serde_json::to_string_pretty(&JsonStruct::from_tree(root)?)?)
}

/// Parse a JSON string into a GFF tree.
pub fn json_to_gff(content: &str) -> Result<GffStruct> {
    let doc: JsonStruct = serde_json::from_str(content)?;
    doc.into_tree()
}

pub(crate) fn resource_type_for(path: &Path) -> Result<ResourceType> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    ResourceType::from_extension(ext).ok_or_else(|| Error::UnknownResourceExtension(ext.to_string()))
}

#[derive(Serialize, Deserialize)]
struct JsonStruct {
    #[serde(rename = "type")]
    struct_type: u32,
    fields: Vec<JsonField>,
}

#[derive(Serialize, Deserialize)]
struct JsonField {
    label: String,
    #[serde(flatten)]
    value: JsonValue,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
enum JsonValue {
    Byte(u8),
    Char(i8),
    Word(u16),
    Short(i16),
    Dword(u32),
    Int(i32),
    Dword64(u64),
    Int64(i64),
    Float(f32),
    Double(f64),
    String(String),
    ResRef(String),
    LocString {
        str_ref: i32,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        substring: String,
    },
    /// Base64 of the raw bytes.
    Void(String),
    Struct(JsonStruct),
    List(Vec<JsonStruct>),
    /// `[w, x, y, z]`
    Orientation([f32; 4]),
    /// `[x, y, z]`
    Vector([f32; 3]),
    StrRef(i32),
}

impl JsonStruct {
    fn from_tree(node: &GffStruct) -> Result<Self> {
        let mut fields = Vec::with_capacity(node.fields().len());
        for field in node.fields() {
            let value = match field.value() {
                FieldValue::Byte(v) => JsonValue::Byte(*v),
                FieldValue::Char(v) => JsonValue::Char(*v),
                FieldValue::Word(v) => JsonValue::Word(*v),
                FieldValue::Short(v) => JsonValue::Short(*v),
                FieldValue::Dword(v) => JsonValue::Dword(*v),
                FieldValue::Int(v) => JsonValue::Int(*v),
                FieldValue::Dword64(v) => JsonValue::Dword64(*v),
                FieldValue::Int64(v) => JsonValue::Int64(*v),
                FieldValue::Float(v) => JsonValue::Float(*v),
                FieldValue::Double(v) => JsonValue::Double(*v),
                FieldValue::String(v) => JsonValue::String(v.clone()),
                FieldValue::ResRef(v) => JsonValue::ResRef(v.clone()),
                FieldValue::LocString { str_ref, substring } => JsonValue::LocString {
                    str_ref: *str_ref,
                    substring: substring.clone(),
                },
                FieldValue::Void(data) => JsonValue::Void(BASE64.encode(data)),
                FieldValue::Struct(child) => JsonValue::Struct(Self::from_tree(child)?),
                FieldValue::List(children) => JsonValue::List(
                    children.iter().map(Self::from_tree).collect::<Result<_>>()?,
                ),
                FieldValue::Orientation(q) => JsonValue::Orientation([q.w, q.x, q.y, q.z]),
                FieldValue::Vector(v) => JsonValue::Vector([v.x, v.y, v.z]),
                FieldValue::StrRef(v) => JsonValue::StrRef(*v),
            };
            fields.push(JsonField {
                label: field.label().to_string(),
                value,
            });
        }
        Ok(Self {
            struct_type: node.struct_type(),
            fields,
        })
    }

    fn into_tree(self) -> Result<GffStruct> {
        let mut node = GffStruct::new(self.struct_type, Vec::new());
        for field in self.fields {
            let value = match field.value {
                JsonValue::Byte(v) => FieldValue::Byte(v),
                JsonValue::Char(v) => FieldValue::Char(v),
                JsonValue::Word(v) => FieldValue::Word(v),
                JsonValue::Short(v) => FieldValue::Short(v),
                JsonValue::Dword(v) => FieldValue::Dword(v),
                JsonValue::Int(v) => FieldValue::Int(v),
                JsonValue::Dword64(v) => FieldValue::Dword64(v),
                JsonValue::Int64(v) => FieldValue::Int64(v),
                JsonValue::Float(v) => FieldValue::Float(v),
                JsonValue::Double(v) => FieldValue::Double(v),
                JsonValue::String(v) => FieldValue::String(v),
                JsonValue::ResRef(v) => FieldValue::ResRef(v),
                JsonValue::LocString { str_ref, substring } => {
                    FieldValue::LocString { str_ref, substring }
                }
                JsonValue::Void(encoded) => FieldValue::Void(
                    BASE64
                        .decode(&encoded)
                        .map_err(|e| Error::MalformedDocument(format!("bad void data: {e}")))?,
                ),
                JsonValue::Struct(child) => FieldValue::Struct(Box::new(child.into_tree()?)),
                JsonValue::List(children) => FieldValue::List(
                    children
                        .into_iter()
                        .map(JsonStruct::into_tree)
                        .collect::<Result<_>>()?,
                ),
                JsonValue::Orientation([w, x, y, z]) => {
                    FieldValue::Orientation(glam::Quat::from_xyzw(x, y, z, w))
                }
                JsonValue::Vector([x, y, z]) => FieldValue::Vector(glam::Vec3::new(x, y, z)),
                JsonValue::StrRef(v) => FieldValue::StrRef(v),
            };
            node.add(Field::from_parts(field.label, value));
        }
        Ok(node)
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::formats::gff::ROOT_STRUCT_TYPE;

    fn sample_tree() -> GffStruct {
        let mut item = GffStruct::new(0, Vec::new());
        item.add(Field::new_byte("Slot", 3));
        item.add(Field::new_res_ref("Template", "g_w_dblsbr001"));

        let mut root = GffStruct::root();
        root.add(Field::new_loc_string("LocName", 1234, "Rusty Door"));
        root.add(Field::new_void("Payload", vec![0xde, 0xad, 0xbe, 0xef]));
        root.add(Field::new_vector("Position", Vec3::new(1.0, 2.0, 3.0)));
        root.add(Field::new_orientation("Bearing", Quat::from_xyzw(0.0, 0.0, 0.0, 1.0)));
        root.add(Field::new_list("ItemList", vec![item]));
        root
    }

    #[test]
    fn test_json_round_trip() {
        let root = sample_tree();
        let json = gff_to_json(&root).unwrap();
        assert_eq!(json_to_gff(&json).unwrap(), root);
    }

    #[test]
    fn test_json_shape() {
        let mut root = GffStruct::new(ROOT_STRUCT_TYPE, Vec::new());
        root.add(Field::new_void("Blob", vec![1, 2, 3]));
        let json = gff_to_json(&root).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed["type"], u64::from(ROOT_STRUCT_TYPE));
        assert_eq!(parsed["fields"][0]["label"], "Blob");
        assert_eq!(parsed["fields"][0]["type"], "void");
        assert_eq!(parsed["fields"][0]["value"], BASE64.encode([1, 2, 3]));
    }

    #[test]
    fn test_loc_string_substring_is_optional() {
        let mut root = GffStruct::root();
        root.add(Field::new_loc_string("Name", 77, ""));
        let json = gff_to_json(&root).unwrap();
        assert!(!json.contains("substring"));

        let parsed = json_to_gff(&json).unwrap();
        assert_eq!(parsed.get_loc_string("Name"), Some((77, "")));
    }

    #[test]
    fn test_rejects_bad_base64() {
        let json = r#"{"type": 0, "fields": [
            {"label": "Blob", "type": "void", "value": "???"}
        ]}"#;
        assert!(matches!(
            json_to_gff(json),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_resource_type_from_destination_extension() {
        assert_eq!(
            resource_type_for(Path::new("out/door.utp")).unwrap(),
            ResourceType::Utp
        );
        assert!(matches!(
            resource_type_for(Path::new("out/door.png")),
            Err(Error::UnknownResourceExtension(_))
        ));
    }
}
