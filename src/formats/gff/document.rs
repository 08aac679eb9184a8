//! In-memory GFF tree model
//!
//! A GFF resource is a tree of [`GffStruct`] nodes. Each struct carries a
//! 32-bit type tag and an ordered list of labeled [`Field`]s; nesting happens
//! through the `Struct` and `List` field kinds, which exclusively own their
//! child structs. The tree is built through kind-specific constructors so an
//! ill-typed field cannot be represented.

use glam::{Quat, Vec3};

use crate::formats::common::{self, FieldTypeId};

/// Struct type tag conventionally used for the root of a GFF tree.
pub const ROOT_STRUCT_TYPE: u32 = 0xffffffff;

/// One node of a GFF tree: a 32-bit type tag plus ordered, labeled fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GffStruct {
    struct_type: u32,
    fields: Vec<Field>,
}

/// One labeled, typed value attached to a [`GffStruct`].
///
/// Labels longer than 16 bytes are truncated when serialized; duplicates
/// within a struct are legal and preserved.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    label: String,
    value: FieldValue,
}

/// The closed set of GFF field value kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
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
    /// Length-prefixed string (`CExoString`).
    String(String),
    /// Resource name, at most 255 bytes when encoded.
    ResRef(String),
    /// Localized string: a string-ref into the external talk table plus at
    /// most one inline substring (an empty substring serializes as none).
    LocString {
        str_ref: i32,
        substring: String,
    },
    /// Opaque binary blob.
    Void(Vec<u8>),
    /// Exactly one owned child struct.
    Struct(Box<GffStruct>),
    /// Ordered sequence of owned child structs.
    List(Vec<GffStruct>),
    /// Quaternion, serialized w,x,y,z.
    Orientation(Quat),
    Vector(Vec3),
    /// Bare string-ref into the external talk table.
    StrRef(i32),
}

impl FieldValue {
    /// The on-disk field type id for this kind.
    #[must_use]
    pub fn type_id(&self) -> FieldTypeId {
        match self {
            FieldValue::Byte(_) => common::TYPE_BYTE,
            FieldValue::Char(_) => common::TYPE_CHAR,
            FieldValue::Word(_) => common::TYPE_WORD,
            FieldValue::Short(_) => common::TYPE_SHORT,
            FieldValue::Dword(_) => common::TYPE_DWORD,
            FieldValue::Int(_) => common::TYPE_INT,
            FieldValue::Dword64(_) => common::TYPE_DWORD64,
            FieldValue::Int64(_) => common::TYPE_INT64,
            FieldValue::Float(_) => common::TYPE_FLOAT,
            FieldValue::Double(_) => common::TYPE_DOUBLE,
            FieldValue::String(_) => common::TYPE_CEXOSTRING,
            FieldValue::ResRef(_) => common::TYPE_RESREF,
            FieldValue::LocString { .. } => common::TYPE_CEXOLOCSTRING,
            FieldValue::Void(_) => common::TYPE_VOID,
            FieldValue::Struct(_) => common::TYPE_STRUCT,
            FieldValue::List(_) => common::TYPE_LIST,
            FieldValue::Orientation(_) => common::TYPE_ORIENTATION,
            FieldValue::Vector(_) => common::TYPE_VECTOR,
            FieldValue::StrRef(_) => common::TYPE_STRREF,
        }
    }
}

impl Field {
    fn new(label: impl Into<String>, value: FieldValue) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }

    /// Assemble a field from an already-validated label/value pair; used by
    /// the binary reader and the document converters.
    pub(crate) fn from_parts(label: String, value: FieldValue) -> Self {
        Self { label, value }
    }

    pub fn new_byte(label: impl Into<String>, value: u8) -> Self {
        Self::new(label, FieldValue::Byte(value))
    }

    pub fn new_char(label: impl Into<String>, value: i8) -> Self {
        Self::new(label, FieldValue::Char(value))
    }

    pub fn new_word(label: impl Into<String>, value: u16) -> Self {
        Self::new(label, FieldValue::Word(value))
    }

    pub fn new_short(label: impl Into<String>, value: i16) -> Self {
        Self::new(label, FieldValue::Short(value))
    }

    pub fn new_dword(label: impl Into<String>, value: u32) -> Self {
        Self::new(label, FieldValue::Dword(value))
    }

    pub fn new_int(label: impl Into<String>, value: i32) -> Self {
        Self::new(label, FieldValue::Int(value))
    }

    pub fn new_dword64(label: impl Into<String>, value: u64) -> Self {
        Self::new(label, FieldValue::Dword64(value))
    }

    pub fn new_int64(label: impl Into<String>, value: i64) -> Self {
        Self::new(label, FieldValue::Int64(value))
    }

    pub fn new_float(label: impl Into<String>, value: f32) -> Self {
        Self::new(label, FieldValue::Float(value))
    }

    pub fn new_double(label: impl Into<String>, value: f64) -> Self {
        Self::new(label, FieldValue::Double(value))
    }

    pub fn new_string(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, FieldValue::String(value.into()))
    }

    pub fn new_res_ref(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(label, FieldValue::ResRef(value.into()))
    }

    pub fn new_loc_string(
        label: impl Into<String>,
        str_ref: i32,
        substring: impl Into<String>,
    ) -> Self {
        Self::new(
            label,
            FieldValue::LocString {
                str_ref,
                substring: substring.into(),
            },
        )
    }

    pub fn new_void(label: impl Into<String>, data: Vec<u8>) -> Self {
        Self::new(label, FieldValue::Void(data))
    }

    pub fn new_struct(label: impl Into<String>, child: GffStruct) -> Self {
        Self::new(label, FieldValue::Struct(Box::new(child)))
    }

    pub fn new_list(label: impl Into<String>, children: Vec<GffStruct>) -> Self {
        Self::new(label, FieldValue::List(children))
    }

    pub fn new_orientation(label: impl Into<String>, value: Quat) -> Self {
        Self::new(label, FieldValue::Orientation(value))
    }

    pub fn new_vector(label: impl Into<String>, value: Vec3) -> Self {
        Self::new(label, FieldValue::Vector(value))
    }

    pub fn new_str_ref(label: impl Into<String>, value: i32) -> Self {
        Self::new(label, FieldValue::StrRef(value))
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn value(&self) -> &FieldValue {
        &self.value
    }
}

impl GffStruct {
    #[must_use]
    pub fn new(struct_type: u32, fields: Vec<Field>) -> Self {
        Self {
            struct_type,
            fields,
        }
    }

    /// An empty root struct with the conventional `0xFFFFFFFF` type tag.
    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_STRUCT_TYPE, Vec::new())
    }

    /// Append a field. Duplicate labels are not rejected; on-disk order is
    /// insertion order.
    pub fn add(&mut self, field: Field) {
        self.fields.push(field);
    }

    #[must_use]
    pub fn struct_type(&self) -> u32 {
        self.struct_type
    }

    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// First field with the given label, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.label == name)
    }

    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get_int(name).map(|v| v != 0)
    }

    /// Signed integer payload of a `Byte`/`Char`/`Word`/`Short`/`Dword`/`Int`
    /// field.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i32> {
        match self.get(name)?.value {
            FieldValue::Byte(v) => Some(i32::from(v)),
            FieldValue::Char(v) => Some(i32::from(v)),
            FieldValue::Word(v) => Some(i32::from(v)),
            FieldValue::Short(v) => Some(i32::from(v)),
            FieldValue::Dword(v) => Some(v as i32),
            FieldValue::Int(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_uint(&self, name: &str) -> Option<u32> {
        match self.get(name)?.value {
            FieldValue::Byte(v) => Some(u32::from(v)),
            FieldValue::Word(v) => Some(u32::from(v)),
            FieldValue::Dword(v) => Some(v),
            FieldValue::Int(v) => Some(v as u32),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_int64(&self, name: &str) -> Option<i64> {
        match self.get(name)?.value {
            FieldValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_uint64(&self, name: &str) -> Option<u64> {
        match self.get(name)?.value {
            FieldValue::Dword64(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_float(&self, name: &str) -> Option<f32> {
        match self.get(name)?.value {
            FieldValue::Float(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_double(&self, name: &str) -> Option<f64> {
        match self.get(name)?.value {
            FieldValue::Double(v) => Some(v),
            _ => None,
        }
    }

    /// String payload of a `CExoString` or `ResRef` field, or the substring
    /// of a `CExoLocString`.
    #[must_use]
    pub fn get_string(&self, name: &str) -> Option<&str> {
        match &self.get(name)?.value {
            FieldValue::String(v) | FieldValue::ResRef(v) => Some(v),
            FieldValue::LocString { substring, .. } => Some(substring),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_res_ref(&self, name: &str) -> Option<&str> {
        match &self.get(name)?.value {
            FieldValue::ResRef(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_loc_string(&self, name: &str) -> Option<(i32, &str)> {
        match &self.get(name)?.value {
            FieldValue::LocString { str_ref, substring } => Some((*str_ref, substring)),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_blob(&self, name: &str) -> Option<&[u8]> {
        match &self.get(name)?.value {
            FieldValue::Void(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_orientation(&self, name: &str) -> Option<Quat> {
        match self.get(name)?.value {
            FieldValue::Orientation(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_vector(&self, name: &str) -> Option<Vec3> {
        match self.get(name)?.value {
            FieldValue::Vector(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_str_ref(&self, name: &str) -> Option<i32> {
        match self.get(name)?.value {
            FieldValue::StrRef(v) => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_struct(&self, name: &str) -> Option<&GffStruct> {
        match &self.get(name)?.value {
            FieldValue::Struct(child) => Some(child),
            _ => None,
        }
    }

    #[must_use]
    pub fn get_list(&self, name: &str) -> Option<&[GffStruct]> {
        match &self.get(name)?.value {
            FieldValue::List(children) => Some(children),
            _ => None,
        }
    }
}
