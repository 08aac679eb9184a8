//! Types shared across the Aurora file formats

mod types;

pub use types::{FieldTypeId, ResourceType};

pub(crate) use types::{
    TYPE_BYTE, TYPE_CEXOLOCSTRING, TYPE_CEXOSTRING, TYPE_CHAR, TYPE_DOUBLE, TYPE_DWORD,
    TYPE_DWORD64, TYPE_FLOAT, TYPE_INT, TYPE_INT64, TYPE_LIST, TYPE_ORIENTATION, TYPE_RESREF,
    TYPE_SHORT, TYPE_STRREF, TYPE_STRUCT, TYPE_VECTOR, TYPE_VOID, TYPE_WORD,
};
