//! GFF to XML conversion and back
//!
//! The XML schema uses fixed element names so arbitrary labels survive
//! round trips: `<gff type="..">` wraps the root, `<field label=".."
//! type=".." value="..">` carries scalar values in attributes, and
//! `struct`/`list` fields nest `<struct type="..">` children. `void`
//! payloads are base64 in the `value` attribute.

use std::fmt::Display;
use std::path::Path;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use glam::{Quat, Vec3};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};

use super::gff_json::resource_type_for;
use crate::error::{Error, Result};
use crate::formats::gff::{self, Field, FieldValue, GffStruct};

/// Convert a GFF file to XML.
pub fn convert_gff_to_xml<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::debug!(
        "Converting GFF to XML: {:?} -> {:?}",
        source.as_ref(),
        dest.as_ref()
    );
    let root = gff::read_gff(&source)?;
    let xml = gff_to_xml(&root)?;
    std::fs::write(dest, xml)?;
    Ok(())
}

/// Convert an XML file back to binary GFF. The destination extension
/// selects the resource type and thus the file signature.
pub fn convert_xml_to_gff<P: AsRef<Path>>(source: P, dest: P) -> Result<()> {
    tracing::debug!(
        "Converting XML to GFF: {:?} -> {:?}",
        source.as_ref(),
        dest.as_ref()
    );
    let res_type = resource_type_for(dest.as_ref())?;
    let content = std::fs::read_to_string(source)?;
    let root = xml_to_gff(&content)?;
    gff::write_gff(&root, res_type, dest)
}

/// Serialize a GFF tree as an XML string.
pub fn gff_to_xml(root: &GffStruct) -> Result<String> {
    let mut output = Vec::new();
    let mut writer = Writer::new_with_indent(&mut output, b' ', 2);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;

    let mut gff = BytesStart::new("gff");
    gff.push_attribute(("type", root.struct_type().to_string().as_str()));
    if root.fields().is_empty() {
        writer.write_event(Event::Empty(gff))?;
    } else {
        writer.write_event(Event::Start(gff.borrow()))?;
        write_fields(&mut writer, root)?;
        writer.write_event(Event::End(BytesEnd::new("gff")))?;
    }

    Ok(String::from_utf8(output)?)
}

fn write_fields<W: std::io::Write>(writer: &mut Writer<W>, node: &GffStruct) -> Result<()> {
    for field in node.fields() {
        let mut start = BytesStart::new("field");
        start.push_attribute(("label", field.label()));
        start.push_attribute(("type", type_name(field.value())));

        match field.value() {
            FieldValue::Byte(v) => write_scalar(writer, start, v)?,
            FieldValue::Char(v) => write_scalar(writer, start, v)?,
            FieldValue::Word(v) => write_scalar(writer, start, v)?,
            FieldValue::Short(v) => write_scalar(writer, start, v)?,
            FieldValue::Dword(v) => write_scalar(writer, start, v)?,
            FieldValue::Int(v) => write_scalar(writer, start, v)?,
            FieldValue::Dword64(v) => write_scalar(writer, start, v)?,
            FieldValue::Int64(v) => write_scalar(writer, start, v)?,
            FieldValue::Float(v) => write_scalar(writer, start, v)?,
            FieldValue::Double(v) => write_scalar(writer, start, v)?,
            FieldValue::String(v) | FieldValue::ResRef(v) => write_scalar(writer, start, v)?,
            FieldValue::StrRef(v) => write_scalar(writer, start, v)?,
            FieldValue::Void(data) => write_scalar(writer, start, BASE64.encode(data))?,
            FieldValue::LocString { str_ref, substring } => {
                start.push_attribute(("strref", str_ref.to_string().as_str()));
                if !substring.is_empty() {
                    start.push_attribute(("value", substring.as_str()));
                }
                writer.write_event(Event::Empty(start))?;
            }
            FieldValue::Orientation(q) => {
                write_scalar(writer, start, format!("{} {} {} {}", q.w, q.x, q.y, q.z))?;
            }
            FieldValue::Vector(v) => {
                write_scalar(writer, start, format!("{} {} {}", v.x, v.y, v.z))?;
            }
            FieldValue::Struct(child) => {
                writer.write_event(Event::Start(start.borrow()))?;
                write_struct(writer, child)?;
                writer.write_event(Event::End(BytesEnd::new("field")))?;
            }
            FieldValue::List(children) => {
                if children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start.borrow()))?;
                    for child in children {
                        write_struct(writer, child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new("field")))?;
                }
            }
        }
    }
    Ok(())
}

fn write_scalar<W: std::io::Write>(
    writer: &mut Writer<W>,
    mut start: BytesStart,
    value: impl Display,
) -> Result<()> {
    start.push_attribute(("value", value.to_string().as_str()));
    writer.write_event(Event::Empty(start))?;
    Ok(())
}

fn write_struct<W: std::io::Write>(writer: &mut Writer<W>, node: &GffStruct) -> Result<()> {
    let mut start = BytesStart::new("struct");
    start.push_attribute(("type", node.struct_type().to_string().as_str()));
    if node.fields().is_empty() {
        writer.write_event(Event::Empty(start))?;
    } else {
        writer.write_event(Event::Start(start.borrow()))?;
        write_fields(writer, node)?;
        writer.write_event(Event::End(BytesEnd::new("struct")))?;
    }
    Ok(())
}

fn type_name(value: &FieldValue) -> &'static str {
    match value {
        FieldValue::Byte(_) => "byte",
        FieldValue::Char(_) => "char",
        FieldValue::Word(_) => "word",
        FieldValue::Short(_) => "short",
        FieldValue::Dword(_) => "dword",
        FieldValue::Int(_) => "int",
        FieldValue::Dword64(_) => "dword64",
        FieldValue::Int64(_) => "int64",
        FieldValue::Float(_) => "float",
        FieldValue::Double(_) => "double",
        FieldValue::String(_) => "string",
        FieldValue::ResRef(_) => "resref",
        FieldValue::LocString { .. } => "locstring",
        FieldValue::Void(_) => "void",
        FieldValue::Struct(_) => "struct",
        FieldValue::List(_) => "list",
        FieldValue::Orientation(_) => "orientation",
        FieldValue::Vector(_) => "vector",
        FieldValue::StrRef(_) => "strref",
    }
}

/// Parser stack entry: a struct being filled, or an open struct/list field
/// collecting its children.
enum Frame {
    Node(GffStruct),
    Field {
        label: String,
        is_list: bool,
        children: Vec<GffStruct>,
    },
}

/// Parse an XML string into a GFF tree.
pub fn xml_to_gff(content: &str) -> Result<GffStruct> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"gff" | b"struct" => {
                    let struct_type = struct_type_attr(&e)?;
                    stack.push(Frame::Node(GffStruct::new(struct_type, Vec::new())));
                }
                b"field" => {
                    let attrs = FieldAttrs::read(&e)?;
                    match attrs.type_name.as_str() {
                        "struct" => stack.push(Frame::Field {
                            label: attrs.label,
                            is_list: false,
                            children: Vec::new(),
                        }),
                        "list" => stack.push(Frame::Field {
                            label: attrs.label,
                            is_list: true,
                            children: Vec::new(),
                        }),
                        _ => {
                            let field = attrs.into_field()?;
                            match stack.last_mut() {
                                Some(Frame::Node(node)) => node.add(field),
                                _ => {
                                    return Err(Error::MalformedDocument(
                                        "field outside of a struct".to_string(),
                                    ))
                                }
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"gff" | b"struct" => {
                    let node = GffStruct::new(struct_type_attr(&e)?, Vec::new());
                    match stack.last_mut() {
                        Some(Frame::Field { children, .. }) => children.push(node),
                        None if e.name().as_ref() == b"gff" => return Ok(node),
                        _ => {
                            return Err(Error::MalformedDocument(
                                "struct outside of a struct or list field".to_string(),
                            ))
                        }
                    }
                }
                b"field" => {
                    let attrs = FieldAttrs::read(&e)?;
                    let field = match attrs.type_name.as_str() {
                        "list" => Field::from_parts(attrs.label, FieldValue::List(Vec::new())),
                        "struct" => {
                            return Err(Error::MalformedDocument(
                                "struct field without a child struct".to_string(),
                            ))
                        }
                        _ => attrs.into_field()?,
                    };
                    match stack.last_mut() {
                        Some(Frame::Node(node)) => node.add(field),
                        _ => {
                            return Err(Error::MalformedDocument(
                                "field outside of a struct".to_string(),
                            ))
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"gff" => {
                    if let Some(Frame::Node(node)) = stack.pop() {
                        return Ok(node);
                    }
                    return Err(Error::MalformedDocument("unbalanced gff element".to_string()));
                }
                b"struct" => {
                    let Some(Frame::Node(node)) = stack.pop() else {
                        return Err(Error::MalformedDocument(
                            "unbalanced struct element".to_string(),
                        ));
                    };
                    match stack.last_mut() {
                        Some(Frame::Field { children, .. }) => children.push(node),
                        _ => {
                            return Err(Error::MalformedDocument(
                                "struct outside of a struct or list field".to_string(),
                            ))
                        }
                    }
                }
                b"field" => {
                    // Simple fields close against their enclosing struct
                    if matches!(stack.last(), Some(Frame::Field { .. })) {
                        let Some(Frame::Field {
                            label,
                            is_list,
                            mut children,
                        }) = stack.pop()
                        else {
                            unreachable!()
                        };
                        let value = if is_list {
                            FieldValue::List(children)
                        } else if children.len() == 1 {
                            FieldValue::Struct(Box::new(children.remove(0)))
                        } else {
                            return Err(Error::MalformedDocument(format!(
                                "struct field {label:?} needs exactly one child, got {}",
                                children.len()
                            )));
                        };
                        match stack.last_mut() {
                            Some(Frame::Node(node)) => node.add(Field::from_parts(label, value)),
                            _ => {
                                return Err(Error::MalformedDocument(
                                    "field outside of a struct".to_string(),
                                ))
                            }
                        }
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => {
                return Err(Error::MalformedDocument("missing gff element".to_string()))
            }
            Err(e) => return Err(Error::XmlError(e)),
            _ => {}
        }
        buf.clear();
    }
}

fn struct_type_attr(e: &BytesStart) -> Result<u32> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == b"type" {
            return parse_num(&attr.unescape_value()?, "struct type");
        }
    }
    Err(Error::MalformedDocument(
        "struct element without a type attribute".to_string(),
    ))
}

struct FieldAttrs {
    label: String,
    type_name: String,
    value: Option<String>,
    str_ref: Option<String>,
}

impl FieldAttrs {
    fn read(e: &BytesStart) -> Result<Self> {
        let mut label = None;
        let mut type_name = None;
        let mut value = None;
        let mut str_ref = None;
        for attr in e.attributes() {
            let attr = attr?;
            match attr.key.as_ref() {
                b"label" => label = Some(attr.unescape_value()?.into_owned()),
                b"type" => type_name = Some(attr.unescape_value()?.into_owned()),
                b"value" => value = Some(attr.unescape_value()?.into_owned()),
                b"strref" => str_ref = Some(attr.unescape_value()?.into_owned()),
                _ => {}
            }
        }
        Ok(Self {
            label: label
                .ok_or_else(|| Error::MalformedDocument("field without a label".to_string()))?,
            type_name: type_name
                .ok_or_else(|| Error::MalformedDocument("field without a type".to_string()))?,
            value,
            str_ref,
        })
    }

    fn into_field(self) -> Result<Field> {
        let value = if self.type_name == "locstring" {
            let str_ref = self.str_ref.ok_or_else(|| {
                Error::MalformedDocument("locstring field without a strref".to_string())
            })?;
            FieldValue::LocString {
                str_ref: parse_num(&str_ref, "strref")?,
                substring: self.value.unwrap_or_default(),
            }
        } else {
            let raw = self.value.ok_or_else(|| {
                Error::MalformedDocument(format!("field {:?} without a value", self.label))
            })?;
            match self.type_name.as_str() {
                "byte" => FieldValue::Byte(parse_num(&raw, "byte")?),
                "char" => FieldValue::Char(parse_num(&raw, "char")?),
                "word" => FieldValue::Word(parse_num(&raw, "word")?),
                "short" => FieldValue::Short(parse_num(&raw, "short")?),
                "dword" => FieldValue::Dword(parse_num(&raw, "dword")?),
                "int" => FieldValue::Int(parse_num(&raw, "int")?),
                "dword64" => FieldValue::Dword64(parse_num(&raw, "dword64")?),
                "int64" => FieldValue::Int64(parse_num(&raw, "int64")?),
                "float" => FieldValue::Float(parse_num(&raw, "float")?),
                "double" => FieldValue::Double(parse_num(&raw, "double")?),
                "string" => FieldValue::String(raw),
                "resref" => FieldValue::ResRef(raw),
                "void" => FieldValue::Void(BASE64.decode(&raw).map_err(|e| {
                    Error::MalformedDocument(format!("bad void data: {e}"))
                })?),
                "orientation" => {
                    let [w, x, y, z] = parse_floats(&raw)?;
                    FieldValue::Orientation(Quat::from_xyzw(x, y, z, w))
                }
                "vector" => {
                    let [x, y, z] = parse_floats(&raw)?;
                    FieldValue::Vector(Vec3::new(x, y, z))
                }
                "strref" => FieldValue::StrRef(parse_num(&raw, "strref")?),
                other => return Err(Error::UnknownFieldTypeName(other.to_string())),
            }
        };
        Ok(Field::from_parts(self.label, value))
    }
}

fn parse_num<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    raw.parse()
        .map_err(|_| Error::MalformedDocument(format!("bad {what}: {raw:?}")))
}

fn parse_floats<const N: usize>(raw: &str) -> Result<[f32; N]> {
    let mut out = [0.0; N];
    let mut parts = raw.split_whitespace();
    for slot in &mut out {
        let part = parts.next().ok_or_else(|| {
            Error::MalformedDocument(format!("expected {N} components: {raw:?}"))
        })?;
        *slot = parse_num(part, "component")?;
    }
    if parts.next().is_some() {
        return Err(Error::MalformedDocument(format!(
            "expected {N} components: {raw:?}"
        )));
    }
    Ok(out)
}
